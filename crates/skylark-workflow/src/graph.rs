use std::sync::Arc;

use skylark_annotations::AnnotationValue;

use crate::error::WorkflowError;
use crate::task::{Task, TaskKind};
use crate::workflow::Workflow;

/// Validated read-only view over a workflow for task traversal.
///
/// Construction checks every branching and successor pointer against the
/// task map, so traversal cannot dead-end on an unknown task id
/// mid-session.
#[derive(Debug, Clone)]
pub struct WorkflowGraph {
  workflow: Arc<Workflow>,
}

impl WorkflowGraph {
  /// Validate the workflow and build its graph.
  pub fn new(workflow: Arc<Workflow>) -> Result<Self, WorkflowError> {
    if !workflow.tasks.contains_key(&workflow.first_task) {
      return Err(WorkflowError::FirstTaskMissing(workflow.first_task.clone()));
    }

    for (task_id, task) in &workflow.tasks {
      Self::validate_task(&workflow, task_id, task)?;
    }

    Ok(Self { workflow })
  }

  fn validate_task(workflow: &Workflow, task_id: &str, task: &Task) -> Result<(), WorkflowError> {
    if task.branches() && task.kind != TaskKind::Single {
      return Err(WorkflowError::BranchingNotSupported {
        task: task_id.to_string(),
        kind: task.kind.as_str().to_string(),
      });
    }

    if task.branches() && task.next.is_some() {
      return Err(WorkflowError::ConflictingSuccessors {
        task: task_id.to_string(),
      });
    }

    for (index, answer) in task.answers.iter().enumerate() {
      if let Some(next) = &answer.next
        && !workflow.tasks.contains_key(next)
      {
        return Err(WorkflowError::UnknownAnswerTarget {
          task: task_id.to_string(),
          index,
          next: next.clone(),
        });
      }
    }

    if let Some(next) = &task.next
      && !workflow.tasks.contains_key(next)
    {
      return Err(WorkflowError::UnknownSuccessor {
        task: task_id.to_string(),
        next: next.clone(),
      });
    }

    Ok(())
  }

  /// The entry task id.
  pub fn first_task(&self) -> &str {
    &self.workflow.first_task
  }

  /// The workflow this graph was built from.
  pub fn workflow(&self) -> &Arc<Workflow> {
    &self.workflow
  }

  /// Resolve the task that follows `current` given the recorded value.
  ///
  /// For single-select tasks the selected answer's branching pointer wins;
  /// otherwise the task's declared successor applies. `Ok(None)` means the
  /// workflow is exhausted and the classification is complete.
  pub fn next_task(
    &self,
    current: &str,
    value: &AnnotationValue,
  ) -> Result<Option<&str>, WorkflowError> {
    let task = self
      .workflow
      .tasks
      .get(current)
      .ok_or_else(|| WorkflowError::UnknownTask(current.to_string()))?;

    match (task.kind, value) {
      (TaskKind::Single, AnnotationValue::Selection(index)) => {
        let answer =
          task
            .answers
            .get(*index)
            .ok_or_else(|| WorkflowError::AnswerOutOfRange {
              task: current.to_string(),
              index: *index,
            })?;
        match &answer.next {
          Some(next) => Ok(Some(next.as_str())),
          None => Ok(task.next.as_deref()),
        }
      }
      (TaskKind::Multiple, AnnotationValue::Selections(indices)) => {
        if let Some(&index) = indices.iter().find(|&&i| i >= task.answers.len()) {
          return Err(WorkflowError::AnswerOutOfRange {
            task: current.to_string(),
            index,
          });
        }
        Ok(task.next.as_deref())
      }
      (TaskKind::Text, AnnotationValue::Text(_)) => Ok(task.next.as_deref()),
      (kind, value) => Err(WorkflowError::ValueKindMismatch {
        task: current.to_string(),
        expected: match kind {
          TaskKind::Single => "selection",
          TaskKind::Multiple => "selections",
          TaskKind::Text => "text",
        },
        got: value.kind_name(),
      }),
    }
  }
}

#[cfg(test)]
mod tests {
  use std::collections::{BTreeSet, HashMap};

  use super::*;
  use crate::configuration::WorkflowConfiguration;
  use crate::task::Answer;

  fn workflow_from_tasks(first_task: &str, tasks: HashMap<String, Task>) -> Arc<Workflow> {
    Arc::new(Workflow {
      workflow_id: "w1".to_string(),
      display_name: String::new(),
      first_task: first_task.to_string(),
      tasks,
      configuration: WorkflowConfiguration::default(),
    })
  }

  /// Two-task workflow: T0 branches to T1 on "Yes", ends on "No".
  fn branching_workflow() -> Arc<Workflow> {
    let mut tasks = HashMap::new();
    tasks.insert(
      "T0".to_string(),
      Task {
        question: "See anything?".to_string(),
        kind: TaskKind::Single,
        answers: vec![
          Answer {
            label: "Yes".to_string(),
            next: Some("T1".to_string()),
          },
          Answer {
            label: "No".to_string(),
            next: None,
          },
        ],
        next: None,
      },
    );
    tasks.insert(
      "T1".to_string(),
      Task {
        question: "What kind?".to_string(),
        kind: TaskKind::Single,
        answers: vec![Answer {
          label: "Done".to_string(),
          next: None,
        }],
        next: None,
      },
    );
    workflow_from_tasks("T0", tasks)
  }

  #[test]
  fn test_first_task_present() {
    let graph = WorkflowGraph::new(branching_workflow()).unwrap();
    assert_eq!(graph.first_task(), "T0");
  }

  #[test]
  fn test_missing_first_task_rejected() {
    let workflow = workflow_from_tasks("T9", HashMap::new());
    let result = WorkflowGraph::new(workflow);
    assert!(matches!(result, Err(WorkflowError::FirstTaskMissing(id)) if id == "T9"));
  }

  #[test]
  fn test_unknown_answer_target_rejected() {
    let mut tasks = HashMap::new();
    tasks.insert(
      "T0".to_string(),
      Task {
        question: "q".to_string(),
        kind: TaskKind::Single,
        answers: vec![Answer {
          label: "Yes".to_string(),
          next: Some("missing".to_string()),
        }],
        next: None,
      },
    );
    let result = WorkflowGraph::new(workflow_from_tasks("T0", tasks));
    assert!(matches!(
      result,
      Err(WorkflowError::UnknownAnswerTarget { next, .. }) if next == "missing"
    ));
  }

  #[test]
  fn test_unknown_successor_rejected() {
    let mut tasks = HashMap::new();
    tasks.insert(
      "T0".to_string(),
      Task {
        question: "q".to_string(),
        kind: TaskKind::Text,
        answers: vec![],
        next: Some("missing".to_string()),
      },
    );
    let result = WorkflowGraph::new(workflow_from_tasks("T0", tasks));
    assert!(matches!(
      result,
      Err(WorkflowError::UnknownSuccessor { next, .. }) if next == "missing"
    ));
  }

  #[test]
  fn test_multi_select_branching_rejected() {
    let mut tasks = HashMap::new();
    tasks.insert(
      "T0".to_string(),
      Task {
        question: "q".to_string(),
        kind: TaskKind::Multiple,
        answers: vec![Answer {
          label: "a".to_string(),
          next: Some("T0".to_string()),
        }],
        next: None,
      },
    );
    let result = WorkflowGraph::new(workflow_from_tasks("T0", tasks));
    assert!(matches!(
      result,
      Err(WorkflowError::BranchingNotSupported { kind, .. }) if kind == "multiple"
    ));
  }

  #[test]
  fn test_conflicting_successors_rejected() {
    let mut tasks = HashMap::new();
    tasks.insert(
      "T0".to_string(),
      Task {
        question: "q".to_string(),
        kind: TaskKind::Single,
        answers: vec![Answer {
          label: "Yes".to_string(),
          next: Some("T1".to_string()),
        }],
        next: Some("T1".to_string()),
      },
    );
    tasks.insert(
      "T1".to_string(),
      Task {
        question: "q".to_string(),
        kind: TaskKind::Single,
        answers: vec![],
        next: None,
      },
    );
    let result = WorkflowGraph::new(workflow_from_tasks("T0", tasks));
    assert!(matches!(
      result,
      Err(WorkflowError::ConflictingSuccessors { task }) if task == "T0"
    ));
  }

  #[test]
  fn test_branch_follows_selected_answer() {
    let graph = WorkflowGraph::new(branching_workflow()).unwrap();

    let next = graph
      .next_task("T0", &AnnotationValue::Selection(0))
      .unwrap();
    assert_eq!(next, Some("T1"));

    let next = graph
      .next_task("T1", &AnnotationValue::Selection(0))
      .unwrap();
    assert_eq!(next, None);
  }

  #[test]
  fn test_unbranched_answer_ends_workflow() {
    let graph = WorkflowGraph::new(branching_workflow()).unwrap();
    let next = graph
      .next_task("T0", &AnnotationValue::Selection(1))
      .unwrap();
    assert_eq!(next, None);
  }

  #[test]
  fn test_selection_out_of_range() {
    let graph = WorkflowGraph::new(branching_workflow()).unwrap();
    let result = graph.next_task("T0", &AnnotationValue::Selection(5));
    assert!(matches!(
      result,
      Err(WorkflowError::AnswerOutOfRange { index: 5, .. })
    ));
  }

  #[test]
  fn test_value_kind_mismatch() {
    let graph = WorkflowGraph::new(branching_workflow()).unwrap();
    let result = graph.next_task("T0", &AnnotationValue::Text("nope".to_string()));
    assert!(matches!(
      result,
      Err(WorkflowError::ValueKindMismatch { expected: "selection", .. })
    ));
  }

  #[test]
  fn test_multi_select_advances_to_declared_successor() {
    let mut tasks = HashMap::new();
    tasks.insert(
      "T0".to_string(),
      Task {
        question: "Which apply?".to_string(),
        kind: TaskKind::Multiple,
        answers: vec![
          Answer {
            label: "Moving".to_string(),
            next: None,
          },
          Answer {
            label: "Eating".to_string(),
            next: None,
          },
        ],
        next: Some("T1".to_string()),
      },
    );
    tasks.insert(
      "T1".to_string(),
      Task {
        question: "Anything else?".to_string(),
        kind: TaskKind::Text,
        answers: vec![],
        next: None,
      },
    );
    let graph = WorkflowGraph::new(workflow_from_tasks("T0", tasks)).unwrap();

    let next = graph
      .next_task("T0", &AnnotationValue::Selections(BTreeSet::from([0, 1])))
      .unwrap();
    assert_eq!(next, Some("T1"));

    let result = graph.next_task("T0", &AnnotationValue::Selections(BTreeSet::from([7])));
    assert!(matches!(
      result,
      Err(WorkflowError::AnswerOutOfRange { index: 7, .. })
    ));
  }
}
