use std::collections::HashMap;

use crate::value::{Annotation, AnnotationValue};

/// Accumulates annotations for the tasks visited during one classification.
///
/// Entries keep their first-recorded position: re-visiting a task (back
/// navigation, toggling a multi-select answer) replaces the stored value in
/// place rather than appending a duplicate or moving it to the end.
#[derive(Debug, Clone, Default)]
pub struct AnnotationRecorder {
  entries: Vec<Annotation>,
  positions: HashMap<String, usize>,
}

impl AnnotationRecorder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Store or replace the annotation for `task`.
  pub fn record(&mut self, task: impl Into<String>, value: AnnotationValue) {
    let task = task.into();
    match self.positions.get(&task) {
      Some(&position) => {
        self.entries[position].value = value;
      }
      None => {
        self.positions.insert(task.clone(), self.entries.len());
        self.entries.push(Annotation { task, value });
      }
    }
  }

  /// Get the recorded value for a task, if any.
  pub fn get(&self, task: &str) -> Option<&AnnotationValue> {
    self.positions.get(task).map(|&p| &self.entries[p].value)
  }

  /// Number of distinct tasks recorded.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Annotations in first-recorded order.
  pub fn sequence(&self) -> &[Annotation] {
    &self.entries
  }

  /// Consume the recorder, yielding annotations in first-recorded order.
  pub fn into_sequence(self) -> Vec<Annotation> {
    self.entries
  }
}
