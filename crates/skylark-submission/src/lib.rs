//! Skylark Submission
//!
//! This crate buffers completed classifications for durable, possibly-
//! offline delivery to the remote classification service. Enqueueing
//! always succeeds locally; delivery happens in [`SubmissionQueue::flush`],
//! which retries failed records in FIFO order up to a configured attempt
//! bound and surfaces abandoned records instead of dropping them.
//!
//! The remote service is an opaque collaborator behind
//! [`ClassificationService`]; durability is delegated to the optional
//! [`skylark_store::SubmissionStore`].

mod connectivity;
mod queue;
mod record;
mod service;

pub use connectivity::watch_connectivity;
pub use queue::{FlushReport, SubmissionQueue};
pub use record::{DeliveryState, PendingSubmission};
pub use service::{ClassificationService, ServiceError};
