use std::collections::HashSet;

use async_trait::async_trait;
use thiserror::Error;

use crate::subject::Subject;

/// Errors a subject provider can report.
#[derive(Debug, Error)]
pub enum ProviderError {
  #[error("subject provider transport failure: {0}")]
  Transport(String),
}

/// External collaborator that fetches batches of subjects for a workflow.
///
/// `exclude` is a hint listing subject ids already seen this session; a
/// provider should avoid returning them, but the queue filters regardless,
/// so a provider that ignores the hint is still correct.
#[async_trait]
pub trait SubjectProvider: Send + Sync {
  async fn fetch_batch(
    &self,
    workflow_id: &str,
    exclude: &HashSet<String>,
  ) -> Result<Vec<Subject>, ProviderError>;
}
