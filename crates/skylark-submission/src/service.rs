use async_trait::async_trait;
use skylark_annotations::Classification;
use thiserror::Error;

/// Errors the remote classification service can report.
///
/// Transient failures (network, timeouts, 5xx) are retried on later
/// flushes; permanent failures (malformed payload, rejected workflow)
/// abandon the record immediately.
#[derive(Debug, Error)]
pub enum ServiceError {
  #[error("transient delivery failure: {reason}")]
  Transient { reason: String },

  #[error("permanent delivery failure: {reason}")]
  Permanent { reason: String },
}

impl ServiceError {
  pub fn is_permanent(&self) -> bool {
    matches!(self, ServiceError::Permanent { .. })
  }

  /// The human-readable reason, used for record state and reporting.
  pub fn reason(&self) -> &str {
    match self {
      ServiceError::Transient { reason } => reason,
      ServiceError::Permanent { reason } => reason,
    }
  }
}

/// External collaborator that accepts a serialized classification.
#[async_trait]
pub trait ClassificationService: Send + Sync {
  async fn submit(&self, classification: &Classification) -> Result<(), ServiceError>;
}
