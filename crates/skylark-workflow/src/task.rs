use serde::{Deserialize, Serialize};

/// Kind tag for a task's answer schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
  /// One answer selected by index; the selected answer may branch.
  #[default]
  Single,
  /// Any number of answers toggled by index ("unlinked" task). Never
  /// branches per answer.
  Multiple,
  /// Free-form text entry.
  Text,
}

impl TaskKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      TaskKind::Single => "single",
      TaskKind::Multiple => "multiple",
      TaskKind::Text => "text",
    }
  }
}

/// One answer definition within a task.
///
/// Answers are referenced by index within the task - order is significant
/// and must be preserved across renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
  pub label: String,
  /// Branching pointer: the task to present when this answer is selected.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub next: Option<String>,
}

/// A single question presented to the user, with its answer schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
  pub question: String,
  #[serde(default, rename = "type")]
  pub kind: TaskKind,
  #[serde(default)]
  pub answers: Vec<Answer>,
  /// Declared successor for non-branching traversal. Absent means the
  /// workflow ends after this task (unless an answer branches).
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub next: Option<String>,
}

impl Task {
  /// Whether any answer carries a branching pointer.
  pub fn branches(&self) -> bool {
    self.answers.iter().any(|a| a.next.is_some())
  }
}
