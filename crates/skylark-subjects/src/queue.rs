use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::error::SubjectError;
use crate::provider::SubjectProvider;
use crate::seen::SeenSet;
use crate::subject::Subject;

/// Supplies the next subject to classify, deduplicated against subjects
/// already seen this session.
///
/// The queue buffers one prefetched batch at a time. When the buffer runs
/// dry it asks the provider for another batch, passing the seen ids as an
/// exclusion hint; the hint is advisory and the queue re-filters every
/// batch, so dedup stays sticky across batch boundaries.
pub struct SubjectQueue {
  workflow_id: String,
  provider: Arc<dyn SubjectProvider>,
  buffer: VecDeque<Subject>,
  seen: SeenSet,
}

impl SubjectQueue {
  pub fn new(workflow_id: impl Into<String>, provider: Arc<dyn SubjectProvider>) -> Self {
    Self {
      workflow_id: workflow_id.into(),
      provider,
      buffer: VecDeque::new(),
      seen: SeenSet::new(),
    }
  }

  /// Pull the next unseen subject.
  ///
  /// `Ok(None)` means the provider has nothing left for this session -
  /// an empty state, not a failure. Provider errors are surfaced as
  /// [`SubjectError::Provider`] so callers can distinguish "nothing to
  /// classify" from "could not reach the provider".
  #[instrument(name = "subject_next", skip(self), fields(workflow_id = %self.workflow_id))]
  pub async fn next(&mut self) -> Result<Option<Subject>, SubjectError> {
    if let Some(subject) = self.pop_unseen() {
      return Ok(Some(subject));
    }

    let batch = self
      .provider
      .fetch_batch(&self.workflow_id, self.seen.ids())
      .await?;

    debug!(fetched = batch.len(), "subject_batch_fetched");

    self
      .buffer
      .extend(batch.into_iter().filter(|s| !self.seen.contains(&s.id)));

    Ok(self.pop_unseen())
  }

  fn pop_unseen(&mut self) -> Option<Subject> {
    while let Some(subject) = self.buffer.pop_front() {
      if !self.seen.contains(&subject.id) {
        return Some(subject);
      }
    }
    None
  }

  /// Record a subject id as seen this session.
  pub fn mark_seen(&mut self, subject_id: impl Into<String>) {
    self.seen.mark(subject_id);
  }

  pub fn seen(&self, subject_id: &str) -> bool {
    self.seen.contains(subject_id)
  }

  /// Forget seen subjects and drop the buffered batch so the next pull
  /// fetches fresh. Used when the user explicitly restarts.
  pub fn reset(&mut self) {
    self.seen.reset();
    self.buffer.clear();
  }

  pub fn seen_len(&self) -> usize {
    self.seen.len()
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;
  use std::sync::Mutex;

  use async_trait::async_trait;

  use super::*;
  use crate::provider::ProviderError;
  use crate::subject::DisplayMedia;

  fn subject(id: &str) -> Subject {
    Subject {
      id: id.to_string(),
      display: DisplayMedia {
        src: format!("{id}.jpg"),
      },
      metadata: serde_json::Value::Null,
    }
  }

  /// Provider that serves a scripted sequence of batches, recording the
  /// exclusion hint it was given on each call.
  struct ScriptedProvider {
    batches: Mutex<VecDeque<Result<Vec<Subject>, ProviderError>>>,
    exclusions: Mutex<Vec<HashSet<String>>>,
  }

  impl ScriptedProvider {
    fn new(batches: Vec<Result<Vec<Subject>, ProviderError>>) -> Arc<Self> {
      Arc::new(Self {
        batches: Mutex::new(batches.into()),
        exclusions: Mutex::new(Vec::new()),
      })
    }
  }

  #[async_trait]
  impl SubjectProvider for ScriptedProvider {
    async fn fetch_batch(
      &self,
      _workflow_id: &str,
      exclude: &HashSet<String>,
    ) -> Result<Vec<Subject>, ProviderError> {
      self.exclusions.lock().unwrap().push(exclude.clone());
      self
        .batches
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Ok(Vec::new()))
    }
  }

  #[tokio::test]
  async fn test_skips_seen_subjects_within_batch() {
    let provider = ScriptedProvider::new(vec![Ok(vec![subject("s1"), subject("s2")])]);
    let mut queue = SubjectQueue::new("w1", provider);

    queue.mark_seen("s1");
    let next = queue.next().await.unwrap().unwrap();
    assert_eq!(next.id, "s2");
  }

  #[tokio::test]
  async fn test_empty_provider_is_not_an_error() {
    let provider = ScriptedProvider::new(vec![Ok(vec![subject("s1"), subject("s2")])]);
    let mut queue = SubjectQueue::new("w1", provider);

    queue.mark_seen("s1");
    assert_eq!(queue.next().await.unwrap().unwrap().id, "s2");

    queue.mark_seen("s2");
    assert!(queue.next().await.unwrap().is_none());
  }

  #[tokio::test]
  async fn test_dedup_sticky_across_batches() {
    // Second batch resurfaces s1 even though it was excluded; the queue
    // must still filter it.
    let provider = ScriptedProvider::new(vec![
      Ok(vec![subject("s1")]),
      Ok(vec![subject("s1"), subject("s3")]),
    ]);
    let mut queue = SubjectQueue::new("w1", Arc::clone(&provider) as Arc<dyn SubjectProvider>);

    assert_eq!(queue.next().await.unwrap().unwrap().id, "s1");
    queue.mark_seen("s1");

    assert_eq!(queue.next().await.unwrap().unwrap().id, "s3");

    let exclusions = provider.exclusions.lock().unwrap();
    assert!(exclusions[1].contains("s1"));
  }

  #[tokio::test]
  async fn test_provider_error_distinguishable_from_empty() {
    let provider = ScriptedProvider::new(vec![Err(ProviderError::Transport(
      "connection refused".to_string(),
    ))]);
    let mut queue = SubjectQueue::new("w1", provider);

    let result = queue.next().await;
    assert!(matches!(result, Err(SubjectError::Provider(_))));
  }

  #[tokio::test]
  async fn test_reset_allows_repeats() {
    let provider = ScriptedProvider::new(vec![
      Ok(vec![subject("s1")]),
      Ok(vec![]),
      Ok(vec![subject("s1")]),
    ]);
    let mut queue = SubjectQueue::new("w1", provider);

    assert_eq!(queue.next().await.unwrap().unwrap().id, "s1");
    queue.mark_seen("s1");
    assert!(queue.next().await.unwrap().is_none());

    queue.reset();
    assert_eq!(queue.next().await.unwrap().unwrap().id, "s1");
  }
}
