use skylark_workflow::Workflow;

/// Decides whether a tutorial must be shown before classification starts.
pub struct TutorialGate;

impl TutorialGate {
  /// A tutorial is required when the workflow declares one and the user
  /// has not completed it for this workflow.
  ///
  /// Pure function of its inputs - durable "has seen" state lives behind
  /// [`skylark_store::TutorialStore`].
  pub fn required(workflow: &Workflow, user_has_seen_tutorial: bool) -> bool {
    workflow.configuration.tutorial.is_some() && !user_has_seen_tutorial
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use skylark_workflow::{Task, TaskKind, WorkflowConfiguration};

  use super::*;

  fn workflow(tutorial: Option<&str>) -> Workflow {
    let mut tasks = HashMap::new();
    tasks.insert(
      "T0".to_string(),
      Task {
        question: "q".to_string(),
        kind: TaskKind::Single,
        answers: Vec::new(),
        next: None,
      },
    );

    Workflow {
      workflow_id: "w1".to_string(),
      display_name: String::new(),
      first_task: "T0".to_string(),
      tasks,
      configuration: WorkflowConfiguration {
        tutorial: tutorial.map(str::to_string),
        ..Default::default()
      },
    }
  }

  #[test]
  fn test_required_for_first_time_user() {
    assert!(TutorialGate::required(&workflow(Some("tut-1")), false));
  }

  #[test]
  fn test_not_required_once_seen() {
    assert!(!TutorialGate::required(&workflow(Some("tut-1")), true));
  }

  #[test]
  fn test_not_required_without_tutorial() {
    assert!(!TutorialGate::required(&workflow(None), false));
    assert!(!TutorialGate::required(&workflow(None), true));
  }
}
