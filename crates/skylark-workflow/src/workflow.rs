use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::configuration::WorkflowConfiguration;
use crate::task::{Task, TaskKind};

/// A named graph of tasks defining one classification procedure.
///
/// Immutable for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
  pub workflow_id: String,
  #[serde(default)]
  pub display_name: String,
  /// Entry task id.
  pub first_task: String,
  pub tasks: HashMap<String, Task>,
  #[serde(default)]
  pub configuration: WorkflowConfiguration,
}

impl Workflow {
  /// Get a task by id.
  pub fn get_task(&self, task_id: &str) -> Option<&Task> {
    self.tasks.get(task_id)
  }

  /// Whether this workflow fits the swipe-to-answer presentation: a single
  /// entry question with at most two non-branching answers.
  pub fn swipe_compatible(&self) -> bool {
    if !self.configuration.swipe_enabled {
      return false;
    }
    match self.tasks.get(&self.first_task) {
      Some(task) => {
        task.kind == TaskKind::Single && task.answers.len() <= 2 && !task.branches()
      }
      None => false,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::task::Answer;

  fn yes_no_task() -> Task {
    Task {
      question: "What was that?".to_string(),
      kind: TaskKind::Single,
      answers: vec![
        Answer {
          label: "Yes".to_string(),
          next: None,
        },
        Answer {
          label: "No".to_string(),
          next: None,
        },
      ],
      next: None,
    }
  }

  #[test]
  fn test_deserialize_minimal_definition() {
    let workflow: Workflow = serde_json::from_value(serde_json::json!({
      "workflow_id": "w1",
      "first_task": "T0",
      "tasks": {
        "T0": {
          "question": "What was that?",
          "answers": [{ "label": "Yes" }, { "label": "No" }]
        }
      },
      "configuration": { "pan_and_zoom": true }
    }))
    .unwrap();

    assert_eq!(workflow.first_task, "T0");
    assert!(workflow.configuration.pan_and_zoom);
    assert!(workflow.configuration.tutorial.is_none());
    let task = workflow.get_task("T0").unwrap();
    assert_eq!(task.kind, TaskKind::Single);
    assert_eq!(task.answers[1].label, "No");
  }

  #[test]
  fn test_swipe_compatible() {
    let mut tasks = HashMap::new();
    tasks.insert("T0".to_string(), yes_no_task());

    let mut workflow = Workflow {
      workflow_id: "w1".to_string(),
      display_name: "Swipe Test".to_string(),
      first_task: "T0".to_string(),
      tasks,
      configuration: WorkflowConfiguration {
        swipe_enabled: true,
        ..Default::default()
      },
    };
    assert!(workflow.swipe_compatible());

    workflow.configuration.swipe_enabled = false;
    assert!(!workflow.swipe_compatible());
  }

  #[test]
  fn test_branching_first_task_is_not_swipe_compatible() {
    let mut task = yes_no_task();
    task.answers[0].next = Some("T1".to_string());

    let mut tasks = HashMap::new();
    tasks.insert("T0".to_string(), task);

    let workflow = Workflow {
      workflow_id: "w1".to_string(),
      display_name: String::new(),
      first_task: "T0".to_string(),
      tasks,
      configuration: WorkflowConfiguration {
        swipe_enabled: true,
        ..Default::default()
      },
    };
    assert!(!workflow.swipe_compatible());
  }
}
