use thiserror::Error;

/// Errors raised while validating or traversing a workflow.
///
/// Everything except [`WorkflowError::AnswerOutOfRange`] and
/// [`WorkflowError::ValueKindMismatch`] is detected when the graph is
/// built, before any session starts.
#[derive(Debug, Error)]
pub enum WorkflowError {
  #[error("first task '{0}' not found in workflow tasks")]
  FirstTaskMissing(String),

  #[error("task not found: {0}")]
  UnknownTask(String),

  #[error("task '{task}' declares successor '{next}' which does not exist")]
  UnknownSuccessor { task: String, next: String },

  #[error("task '{task}' answer {index} points at unknown task '{next}'")]
  UnknownAnswerTarget {
    task: String,
    index: usize,
    next: String,
  },

  #[error("task '{task}' declares both per-answer branching and a task-level successor")]
  ConflictingSuccessors { task: String },

  #[error("task '{task}' is {kind} and cannot branch per answer")]
  BranchingNotSupported { task: String, kind: String },

  #[error("task '{task}' has no answer at index {index}")]
  AnswerOutOfRange { task: String, index: usize },

  #[error("task '{task}' expects a {expected} value, got {got}")]
  ValueKindMismatch {
    task: String,
    expected: &'static str,
    got: &'static str,
  },
}
