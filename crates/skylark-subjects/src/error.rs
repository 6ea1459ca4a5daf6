use thiserror::Error;

use crate::provider::ProviderError;

/// Errors surfaced by the subject queue.
///
/// "No subjects available" is not an error - [`crate::SubjectQueue::next`]
/// returns `Ok(None)` for that, so callers can show an empty state instead
/// of failing.
#[derive(Debug, Error)]
pub enum SubjectError {
  #[error("subject provider unavailable: {0}")]
  Provider(#[from] ProviderError),
}
