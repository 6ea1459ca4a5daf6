use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value::Annotation;

/// Session metadata attached to a finished classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetadata {
  pub started_at: DateTime<Utc>,
  pub finished_at: DateTime<Utc>,
  /// Whether the tutorial was shown during this session.
  pub seen_tutorial: bool,
}

/// The complete, ordered record of annotations for one subject under one
/// workflow.
///
/// A classification is immutable once handed to the submission queue.
/// Corrections must produce a new classification, never mutate a
/// submitted one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
  pub classification_id: String,
  pub project_id: String,
  pub workflow_id: String,
  pub subject_id: String,
  /// Annotations in visitation order.
  pub annotations: Vec<Annotation>,
  pub metadata: ClassificationMetadata,
}

impl Classification {
  /// Assemble a classification with a fresh id.
  pub fn new(
    project_id: impl Into<String>,
    workflow_id: impl Into<String>,
    subject_id: impl Into<String>,
    annotations: Vec<Annotation>,
    metadata: ClassificationMetadata,
  ) -> Self {
    Self {
      classification_id: uuid::Uuid::new_v4().to_string(),
      project_id: project_id.into(),
      workflow_id: workflow_id.into(),
      subject_id: subject_id.into(),
      annotations,
      metadata,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::value::AnnotationValue;

  #[test]
  fn test_new_assigns_unique_ids() {
    let metadata = ClassificationMetadata {
      started_at: Utc::now(),
      finished_at: Utc::now(),
      seen_tutorial: false,
    };

    let annotations = vec![Annotation {
      task: "T0".to_string(),
      value: AnnotationValue::Selection(0),
    }];

    let a = Classification::new("p1", "w1", "s1", annotations.clone(), metadata.clone());
    let b = Classification::new("p1", "w1", "s1", annotations, metadata);

    assert_ne!(a.classification_id, b.classification_id);
    assert_eq!(a.subject_id, "s1");
    assert_eq!(a.annotations.len(), 1);
  }
}
