//! Skylark Session
//!
//! This crate is the orchestrator of the classification engine: a
//! [`ClassificationSession`] owns one in-progress classification, drives
//! task traversal through the workflow graph, delegates answer storage to
//! the annotation recorder, and on completion hands the finished
//! classification to the submission queue.
//!
//! A session instance is single-use. Once it reaches `Submitted` or
//! `Failed` it never resets in place - the next subject gets a fresh
//! instance, so annotations cannot leak between classifications.

mod error;
mod events;
mod session;
mod tutorial;

pub use error::SessionError;
pub use events::{ChannelNotifier, NoopNotifier, SessionEvent, SessionNotifier};
pub use session::{ClassificationSession, FailureReason, SessionConfig, SessionState};
pub use tutorial::TutorialGate;
