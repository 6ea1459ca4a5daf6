use skylark_workflow::WorkflowError;
use thiserror::Error;

/// Errors raised by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
  /// The operation is not valid in the session's current state. This is a
  /// programmer/integration error and is never swallowed.
  #[error("operation '{operation}' not valid in session state {state}")]
  InvalidState {
    operation: &'static str,
    state: String,
  },

  /// An answer arrived for a task that is not the current one - typically
  /// a stale UI callback after navigation. Session state is unchanged.
  #[error("answer for task '{got}' does not match current task '{expected}'")]
  TaskMismatch { expected: String, got: String },

  /// The workflow rejected the traversal (bad value kind, index out of
  /// range). Session state is unchanged.
  #[error(transparent)]
  Workflow(#[from] WorkflowError),
}
