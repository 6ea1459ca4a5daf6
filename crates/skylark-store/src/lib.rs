//! Skylark Store
//!
//! This crate provides the durable local state the engine relies on across
//! app restarts: the buffered submissions awaiting delivery and the per-
//! workflow tutorial progress. Data is persisted to SQLite.
//!
//! The [`SubmissionStore`] and [`TutorialStore`] traits define the
//! contracts; [`SqliteStore`] is the shipped implementation.

mod sqlite;
mod types;

pub use sqlite::SqliteStore;
pub use types::{StoredSubmission, SubmissionStatus};

use async_trait::async_trait;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  /// The requested record was not found.
  #[error("not found: {0}")]
  NotFound(String),

  /// A database error occurred.
  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),

  /// Running migrations failed.
  #[error("migration error: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),
}

/// Durable buffer for classifications awaiting delivery.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
  /// Persist a newly enqueued submission.
  async fn save(&self, submission: &StoredSubmission) -> Result<(), StoreError>;

  /// Update a submission's delivery state and attempt counter.
  async fn update(&self, submission: &StoredSubmission) -> Result<(), StoreError>;

  /// Remove a submission (after delivery).
  async fn delete(&self, submission_id: &str) -> Result<(), StoreError>;

  /// Load undelivered submissions in enqueue order, oldest first.
  async fn load_undelivered(&self) -> Result<Vec<StoredSubmission>, StoreError>;
}

/// Durable record of which workflows' tutorials the user has completed.
#[async_trait]
pub trait TutorialStore: Send + Sync {
  async fn has_seen(&self, workflow_id: &str) -> Result<bool, StoreError>;

  async fn mark_seen(&self, workflow_id: &str) -> Result<(), StoreError>;
}
