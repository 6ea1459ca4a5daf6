use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skylark_annotations::Classification;
use sqlx::FromRow;
use sqlx::types::Json;

/// Delivery status of a stored submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum SubmissionStatus {
  Pending,
  InFlight,
  Failed,
  Delivered,
  Abandoned,
}

/// A buffered submission as stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct StoredSubmission {
  pub submission_id: String,
  pub classification: Json<Classification>,
  pub status: SubmissionStatus,
  pub attempts: i32,
  pub last_error: Option<String>,
  pub enqueued_at: DateTime<Utc>,
  pub completed_at: Option<DateTime<Utc>>,
}
