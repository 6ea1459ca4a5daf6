//! Skylark Subjects
//!
//! This crate supplies subjects to classify. The [`SubjectQueue`] holds a
//! prefetched batch from an external [`SubjectProvider`] and filters out
//! subjects already seen this session, so a subject is never shown twice
//! unless the seen set is explicitly reset (pull-to-refresh).
//!
//! The provider is the only I/O boundary here; the queue itself is an
//! in-memory contract from the session's point of view.

mod error;
mod provider;
mod queue;
mod seen;
mod subject;

pub use error::SubjectError;
pub use provider::{ProviderError, SubjectProvider};
pub use queue::SubjectQueue;
pub use seen::SeenSet;
pub use subject::{DisplayMedia, Subject};
