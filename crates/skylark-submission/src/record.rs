use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skylark_annotations::Classification;
use skylark_store::{StoredSubmission, SubmissionStatus};
use sqlx::types::Json;

/// Delivery state of a buffered submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DeliveryState {
  /// Waiting for the next flush.
  Pending,
  /// A flush is currently attempting delivery.
  InFlight,
  /// The last attempt failed; retried on the next flush.
  Failed { reason: String },
  /// Accepted by the remote service.
  Delivered,
  /// Retries exhausted or the service rejected the payload permanently.
  /// Surfaced for user-visible reporting, never silently dropped.
  Abandoned { reason: String },
}

impl DeliveryState {
  /// Whether a flush should attempt delivery of this record.
  pub fn is_deliverable(&self) -> bool {
    matches!(self, DeliveryState::Pending | DeliveryState::Failed { .. })
  }
}

/// A classification owned by the submission queue, plus its delivery state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingSubmission {
  pub submission_id: String,
  pub classification: Classification,
  pub state: DeliveryState,
  pub attempts: u32,
  pub enqueued_at: DateTime<Utc>,
}

impl PendingSubmission {
  pub(crate) fn new(classification: Classification) -> Self {
    Self {
      submission_id: classification.classification_id.clone(),
      classification,
      state: DeliveryState::Pending,
      attempts: 0,
      enqueued_at: Utc::now(),
    }
  }

  /// Map to the store's row representation.
  pub(crate) fn to_stored(&self) -> StoredSubmission {
    let (status, last_error, completed_at) = match &self.state {
      DeliveryState::Pending => (SubmissionStatus::Pending, None, None),
      DeliveryState::InFlight => (SubmissionStatus::InFlight, None, None),
      DeliveryState::Failed { reason } => (SubmissionStatus::Failed, Some(reason.clone()), None),
      DeliveryState::Delivered => (SubmissionStatus::Delivered, None, Some(Utc::now())),
      DeliveryState::Abandoned { reason } => {
        (SubmissionStatus::Abandoned, Some(reason.clone()), Some(Utc::now()))
      }
    };

    StoredSubmission {
      submission_id: self.submission_id.clone(),
      classification: Json(self.classification.clone()),
      status,
      attempts: self.attempts as i32,
      last_error,
      enqueued_at: self.enqueued_at,
      completed_at,
    }
  }

  /// Rebuild from a stored row. A record that was in flight when the app
  /// stopped goes back to pending - the attempt's outcome was never
  /// observed.
  pub(crate) fn from_stored(stored: StoredSubmission) -> Self {
    let state = match stored.status {
      SubmissionStatus::Pending | SubmissionStatus::InFlight => DeliveryState::Pending,
      SubmissionStatus::Failed => DeliveryState::Failed {
        reason: stored.last_error.clone().unwrap_or_default(),
      },
      SubmissionStatus::Delivered => DeliveryState::Delivered,
      SubmissionStatus::Abandoned => DeliveryState::Abandoned {
        reason: stored.last_error.clone().unwrap_or_default(),
      },
    };

    Self {
      submission_id: stored.submission_id,
      classification: stored.classification.0,
      state,
      attempts: stored.attempts.max(0) as u32,
      enqueued_at: stored.enqueued_at,
    }
  }
}
