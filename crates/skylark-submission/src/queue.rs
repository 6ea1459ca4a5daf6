use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use skylark_annotations::Classification;
use skylark_store::{StoreError, StoredSubmission, SubmissionStore};
use tracing::{debug, info, instrument, warn};

use crate::record::{DeliveryState, PendingSubmission};
use crate::service::{ClassificationService, ServiceError};

/// Counts from one completed flush pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
  /// Records visited by this pass.
  pub attempted: usize,
  pub delivered: usize,
  pub failed: usize,
  pub abandoned: usize,
}

/// Buffers completed classifications for durable, possibly-offline delivery.
///
/// `enqueue` always succeeds locally; `flush` attempts delivery of all
/// pending and previously-failed records in FIFO order. The queue owns its
/// records exclusively - the session hands a classification over and
/// retains no further reference.
pub struct SubmissionQueue {
  service: Arc<dyn ClassificationService>,
  store: Option<Arc<dyn SubmissionStore>>,
  records: Mutex<Vec<PendingSubmission>>,
  flush_lock: tokio::sync::Mutex<()>,
  max_attempts: u32,
}

impl SubmissionQueue {
  /// Create a queue delivering through `service`, abandoning records after
  /// `max_attempts` failed delivery attempts.
  pub fn new(service: Arc<dyn ClassificationService>, max_attempts: u32) -> Self {
    Self {
      service,
      store: None,
      records: Mutex::new(Vec::new()),
      flush_lock: tokio::sync::Mutex::new(()),
      max_attempts,
    }
  }

  /// Attach a durable store. Writes are best-effort: a store failure is
  /// logged and the in-memory record stands regardless.
  pub fn with_store(mut self, store: Arc<dyn SubmissionStore>) -> Self {
    self.store = Some(store);
    self
  }

  /// Reload undelivered submissions from the store, placing them ahead of
  /// anything enqueued this session. Call once at startup.
  pub async fn restore(&self) -> Result<usize, StoreError> {
    let Some(store) = &self.store else {
      return Ok(0);
    };

    let stored = store.load_undelivered().await?;
    let mut restored: Vec<PendingSubmission> = stored
      .into_iter()
      .map(PendingSubmission::from_stored)
      .collect();
    let count = restored.len();

    let mut records = self.lock_records();
    restored.append(&mut records);
    *records = restored;

    info!(restored = count, "submission_queue_restored");
    Ok(count)
  }

  /// Append a classification in `Pending` state.
  ///
  /// Never fails and never touches the network. A record added while a
  /// flush is running is picked up by the next flush, not the current one.
  #[instrument(name = "submission_enqueue", skip(self, classification), fields(classification_id = %classification.classification_id))]
  pub async fn enqueue(&self, classification: Classification) -> String {
    let record = PendingSubmission::new(classification);
    let submission_id = record.submission_id.clone();

    self.persist_save(&record).await;

    info!(
      subject_id = %record.classification.subject_id,
      "classification_enqueued"
    );
    self.lock_records().push(record);

    submission_id
  }

  /// Attempt delivery of all deliverable records, oldest first.
  ///
  /// Returns `None` when a flush is already running - the concurrent call
  /// is ignored rather than stacked. The set of records to visit is
  /// snapshotted at entry so the pass's ordering stays stable.
  #[instrument(name = "submission_flush", skip(self))]
  pub async fn flush(&self) -> Option<FlushReport> {
    let Ok(_guard) = self.flush_lock.try_lock() else {
      debug!("flush already running, ignoring");
      return None;
    };

    let snapshot: Vec<String> = self
      .lock_records()
      .iter()
      .filter(|r| r.state.is_deliverable())
      .map(|r| r.submission_id.clone())
      .collect();

    let mut report = FlushReport::default();

    for submission_id in snapshot {
      let Some(classification) = self.begin_attempt(&submission_id).await else {
        continue;
      };
      report.attempted += 1;

      match self.service.submit(&classification).await {
        Ok(()) => {
          self.finish_delivered(&submission_id).await;
          report.delivered += 1;
        }
        Err(error) => {
          let abandoned = self.finish_failed(&submission_id, &error).await;
          if abandoned {
            report.abandoned += 1;
          } else {
            report.failed += 1;
          }
        }
      }
    }

    info!(
      attempted = report.attempted,
      delivered = report.delivered,
      failed = report.failed,
      abandoned = report.abandoned,
      "flush_completed"
    );
    Some(report)
  }

  /// Mark a record in flight and take a copy of its classification.
  async fn begin_attempt(&self, submission_id: &str) -> Option<Classification> {
    let (stored, classification) = {
      let mut records = self.lock_records();
      let record = records
        .iter_mut()
        .find(|r| r.submission_id == submission_id && r.state.is_deliverable())?;
      record.state = DeliveryState::InFlight;
      record.attempts += 1;
      (record.to_stored(), record.classification.clone())
    };

    self.persist_update(&stored).await;
    Some(classification)
  }

  async fn finish_delivered(&self, submission_id: &str) {
    {
      let mut records = self.lock_records();
      records.retain(|r| r.submission_id != submission_id);
    }
    if let Some(store) = &self.store {
      if let Err(error) = store.delete(submission_id).await {
        warn!(submission_id = %submission_id, error = %error, "submission_store_delete_failed");
      }
    }
    info!(submission_id = %submission_id, "classification_delivered");
  }

  /// Transition a failed attempt; returns true if the record was abandoned.
  async fn finish_failed(&self, submission_id: &str, error: &ServiceError) -> bool {
    let (stored, abandoned) = {
      let mut records = self.lock_records();
      let Some(record) = records
        .iter_mut()
        .find(|r| r.submission_id == submission_id)
      else {
        return false;
      };

      let abandoned = error.is_permanent() || record.attempts >= self.max_attempts;
      record.state = if abandoned {
        DeliveryState::Abandoned {
          reason: error.reason().to_string(),
        }
      } else {
        DeliveryState::Failed {
          reason: error.reason().to_string(),
        }
      };
      (record.to_stored(), abandoned)
    };

    self.persist_update(&stored).await;

    if abandoned {
      warn!(submission_id = %submission_id, error = %error, "classification_abandoned");
    } else {
      warn!(submission_id = %submission_id, error = %error, "classification_delivery_failed");
    }
    abandoned
  }

  /// Records awaiting delivery (pending or failed).
  pub fn pending_len(&self) -> usize {
    self
      .lock_records()
      .iter()
      .filter(|r| r.state.is_deliverable())
      .count()
  }

  /// Abandoned records, for user-visible reporting.
  pub fn abandoned(&self) -> Vec<PendingSubmission> {
    self
      .lock_records()
      .iter()
      .filter(|r| matches!(r.state, DeliveryState::Abandoned { .. }))
      .cloned()
      .collect()
  }

  /// Copy of every record currently held, in enqueue order.
  pub fn snapshot(&self) -> Vec<PendingSubmission> {
    self.lock_records().clone()
  }

  pub fn is_empty(&self) -> bool {
    self.lock_records().is_empty()
  }

  fn lock_records(&self) -> MutexGuard<'_, Vec<PendingSubmission>> {
    self.records.lock().unwrap_or_else(PoisonError::into_inner)
  }

  async fn persist_save(&self, record: &PendingSubmission) {
    if let Some(store) = &self.store {
      if let Err(error) = store.save(&record.to_stored()).await {
        warn!(
          submission_id = %record.submission_id,
          error = %error,
          "submission_store_save_failed"
        );
      }
    }
  }

  async fn persist_update(&self, stored: &StoredSubmission) {
    if let Some(store) = &self.store {
      if let Err(error) = store.update(stored).await {
        warn!(
          submission_id = %stored.submission_id,
          error = %error,
          "submission_store_update_failed"
        );
      }
    }
  }
}
