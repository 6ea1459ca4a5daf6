//! Session events and notifiers for observability.
//!
//! Events are emitted as the session moves through its states so UI
//! layers can render progress without reaching into engine internals.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Events emitted during a classification session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEvent {
  /// A subject was assigned and classification began.
  Started {
    session_id: String,
    workflow_id: String,
    subject_id: String,
  },

  /// The tutorial must be acknowledged before classification proceeds.
  TutorialRequired {
    session_id: String,
    workflow_id: String,
  },

  /// The cursor moved to a task.
  TaskPresented {
    session_id: String,
    task_id: String,
  },

  /// An answer was recorded for a task.
  AnnotationRecorded {
    session_id: String,
    task_id: String,
  },

  /// The classification was assembled and handed to submission.
  Completed {
    session_id: String,
    subject_id: String,
  },

  /// The session reached a terminal failure.
  Failed {
    session_id: String,
    reason: String,
  },
}

/// Trait for receiving session events.
///
/// The session calls `notify` for each event - implementations decide
/// what to do with them (render, persist, log, ignore).
pub trait SessionNotifier: Send + Sync {
  fn notify(&self, event: SessionEvent);
}

/// A no-op notifier that discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl SessionNotifier for NoopNotifier {
  fn notify(&self, _event: SessionEvent) {
    // Intentionally empty
  }
}

/// A notifier that sends events to an unbounded channel.
///
/// Event volume is one per task visited, so the unbounded buffer cannot
/// grow meaningfully even with a slow consumer.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  sender: mpsc::UnboundedSender<SessionEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<SessionEvent>) -> Self {
    Self { sender }
  }
}

impl SessionNotifier for ChannelNotifier {
  fn notify(&self, event: SessionEvent) {
    // Ignore send errors - receiver may have been dropped
    let _ = self.sender.send(event);
  }
}
