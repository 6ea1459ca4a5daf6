use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::types::StoredSubmission;
use crate::{StoreError, SubmissionStore, TutorialStore};

/// SQLite-based store implementation.
pub struct SqliteStore {
  pool: SqlitePool,
}

impl SqliteStore {
  /// Create a new SQLite store with the given connection pool.
  pub fn new(pool: SqlitePool) -> Self {
    Self { pool }
  }

  /// Run database migrations.
  pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(&self.pool).await
  }
}

#[async_trait]
impl SubmissionStore for SqliteStore {
  async fn save(&self, submission: &StoredSubmission) -> Result<(), StoreError> {
    sqlx::query(
            r#"
            INSERT INTO submissions (submission_id, classification, status, attempts, last_error, enqueued_at, completed_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&submission.submission_id)
        .bind(&submission.classification)
        .bind(submission.status)
        .bind(submission.attempts)
        .bind(&submission.last_error)
        .bind(submission.enqueued_at)
        .bind(submission.completed_at)
        .execute(&self.pool)
        .await?;

    Ok(())
  }

  async fn update(&self, submission: &StoredSubmission) -> Result<(), StoreError> {
    sqlx::query(
      r#"
            UPDATE submissions
            SET status = ?, attempts = ?, last_error = ?, completed_at = ?
            WHERE submission_id = ?
            "#,
    )
    .bind(submission.status)
    .bind(submission.attempts)
    .bind(&submission.last_error)
    .bind(submission.completed_at)
    .bind(&submission.submission_id)
    .execute(&self.pool)
    .await?;

    Ok(())
  }

  async fn delete(&self, submission_id: &str) -> Result<(), StoreError> {
    sqlx::query("DELETE FROM submissions WHERE submission_id = ?")
      .bind(submission_id)
      .execute(&self.pool)
      .await?;

    Ok(())
  }

  async fn load_undelivered(&self) -> Result<Vec<StoredSubmission>, StoreError> {
    let rows = sqlx::query_as(
            r#"
            SELECT submission_id, classification, status, attempts, last_error, enqueued_at, completed_at
            FROM submissions
            WHERE status IN ('pending', 'in_flight', 'failed')
            ORDER BY enqueued_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

    Ok(rows)
  }
}

#[async_trait]
impl TutorialStore for SqliteStore {
  async fn has_seen(&self, workflow_id: &str) -> Result<bool, StoreError> {
    let row: Option<(String,)> =
      sqlx::query_as("SELECT workflow_id FROM tutorial_progress WHERE workflow_id = ?")
        .bind(workflow_id)
        .fetch_optional(&self.pool)
        .await?;

    Ok(row.is_some())
  }

  async fn mark_seen(&self, workflow_id: &str) -> Result<(), StoreError> {
    sqlx::query(
      r#"
            INSERT INTO tutorial_progress (workflow_id, seen_at)
            VALUES (?, ?)
            ON CONFLICT (workflow_id) DO NOTHING
            "#,
    )
    .bind(workflow_id)
    .bind(Utc::now())
    .execute(&self.pool)
    .await?;

    Ok(())
  }
}
