use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The recorded answer for a single task.
///
/// The serialized form matches what classification services accept: a bare
/// answer index for single-select tasks, an array of indices for
/// multi-select ("unlinked") tasks, and a string for free-text tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnotationValue {
  /// Index of the selected answer within the task's answer list.
  Selection(usize),
  /// Indices of all toggled answers on a multi-select task.
  Selections(BTreeSet<usize>),
  /// Free-form text entered by the user.
  Text(String),
}

impl AnnotationValue {
  /// Human-readable name of the value variant, used in error messages.
  pub fn kind_name(&self) -> &'static str {
    match self {
      AnnotationValue::Selection(_) => "selection",
      AnnotationValue::Selections(_) => "selections",
      AnnotationValue::Text(_) => "text",
    }
  }
}

/// One entry in a classification: the task visited and the value recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
  /// Task id this annotation answers.
  pub task: String,
  /// The recorded value.
  pub value: AnnotationValue,
}

/// Flip one answer index in a multi-select set.
///
/// UI layers call this on each switch press; the resulting set is then
/// re-recorded wholesale, replacing the previous selection.
pub fn toggle(selections: &mut BTreeSet<usize>, index: usize) {
  if !selections.remove(&index) {
    selections.insert(index);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_toggle_inserts_then_removes() {
    let mut selections = BTreeSet::new();

    toggle(&mut selections, 1);
    assert!(selections.contains(&1));

    toggle(&mut selections, 1);
    assert!(selections.is_empty());
  }

  #[test]
  fn test_serialized_forms() {
    let single = AnnotationValue::Selection(2);
    assert_eq!(serde_json::to_value(&single).unwrap(), serde_json::json!(2));

    let multi = AnnotationValue::Selections(BTreeSet::from([0, 2]));
    assert_eq!(
      serde_json::to_value(&multi).unwrap(),
      serde_json::json!([0, 2])
    );

    let text = AnnotationValue::Text("a bird".to_string());
    assert_eq!(
      serde_json::to_value(&text).unwrap(),
      serde_json::json!("a bird")
    );
  }

  #[test]
  fn test_deserialize_untagged() {
    let value: AnnotationValue = serde_json::from_str("1").unwrap();
    assert_eq!(value, AnnotationValue::Selection(1));

    let value: AnnotationValue = serde_json::from_str("[0, 1]").unwrap();
    assert_eq!(value, AnnotationValue::Selections(BTreeSet::from([0, 1])));

    let value: AnnotationValue = serde_json::from_str("\"notes\"").unwrap();
    assert_eq!(value, AnnotationValue::Text("notes".to_string()));
  }
}
