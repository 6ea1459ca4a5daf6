use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use skylark_annotations::{
  AnnotationRecorder, AnnotationValue, Classification, ClassificationMetadata,
};
use skylark_store::TutorialStore;
use skylark_subjects::{Subject, SubjectError, SubjectQueue};
use skylark_submission::SubmissionQueue;
use skylark_workflow::{Workflow, WorkflowGraph};
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};

use crate::error::SessionError;
use crate::events::{NoopNotifier, SessionEvent, SessionNotifier};
use crate::tutorial::TutorialGate;

/// Reason a session reached the `Failed` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
  /// The workflow failed validation when the session started.
  MalformedWorkflow,
  /// The provider had no subjects left for this session.
  NoSubjectsAvailable,
  /// The provider could not be reached.
  SubjectsUnavailable,
}

impl fmt::Display for FailureReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let text = match self {
      FailureReason::MalformedWorkflow => "malformed workflow",
      FailureReason::NoSubjectsAvailable => "no subjects available",
      FailureReason::SubjectsUnavailable => "subject provider unavailable",
    };
    f.write_str(text)
  }
}

/// State of a classification session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
  /// No active subject yet.
  Idle,
  /// Blocked until the tutorial is acknowledged.
  AwaitingTutorial,
  /// Traversing the task graph for the assigned subject.
  InProgress,
  /// Assembling and handing off the finished classification.
  Completing,
  /// Terminal: the classification was handed to the submission queue.
  Submitted,
  /// Terminal: the session could not run to completion.
  Failed(FailureReason),
}

/// Static configuration for a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
  pub project_id: String,
}

/// Drives a user through a workflow's task graph for one subject.
///
/// The session owns the annotation recorder and the traversal cursor; it
/// talks only to the subject queue and the submission queue, both
/// in-memory contracts from its point of view. Generic over
/// `N: SessionNotifier` for observability; use
/// [`ClassificationSession::new`] for a session that discards events.
pub struct ClassificationSession<N: SessionNotifier = NoopNotifier> {
  session_id: String,
  project_id: String,
  workflow: Arc<Workflow>,
  graph: Option<WorkflowGraph>,
  subjects: Arc<Mutex<SubjectQueue>>,
  submissions: Arc<SubmissionQueue>,
  tutorials: Option<Arc<dyn TutorialStore>>,
  notifier: N,
  state: SessionState,
  current_task: Option<String>,
  subject: Option<Subject>,
  recorder: AnnotationRecorder,
  started_at: DateTime<Utc>,
  seen_tutorial: bool,
}

impl ClassificationSession<NoopNotifier> {
  /// Create a session that discards events.
  pub fn new(
    config: SessionConfig,
    workflow: Arc<Workflow>,
    subjects: Arc<Mutex<SubjectQueue>>,
    submissions: Arc<SubmissionQueue>,
  ) -> Self {
    Self::with_notifier(config, workflow, subjects, submissions, NoopNotifier)
  }
}

impl<N: SessionNotifier> ClassificationSession<N> {
  /// Create a session with a custom notifier.
  pub fn with_notifier(
    config: SessionConfig,
    workflow: Arc<Workflow>,
    subjects: Arc<Mutex<SubjectQueue>>,
    submissions: Arc<SubmissionQueue>,
    notifier: N,
  ) -> Self {
    Self {
      session_id: uuid::Uuid::new_v4().to_string(),
      project_id: config.project_id,
      workflow,
      graph: None,
      subjects,
      submissions,
      tutorials: None,
      notifier,
      state: SessionState::Idle,
      current_task: None,
      subject: None,
      recorder: AnnotationRecorder::new(),
      started_at: Utc::now(),
      seen_tutorial: false,
    }
  }

  /// Attach the durable tutorial-progress collaborator.
  pub fn with_tutorial_store(mut self, store: Arc<dyn TutorialStore>) -> Self {
    self.tutorials = Some(store);
    self
  }

  /// Start the session: validate the workflow, consult the tutorial gate,
  /// and (unless a tutorial blocks) pull a subject and present the first
  /// task.
  #[instrument(
    name = "session_start",
    skip(self),
    fields(session_id = %self.session_id, workflow_id = %self.workflow.workflow_id)
  )]
  pub async fn start(&mut self) -> Result<&SessionState, SessionError> {
    if self.state != SessionState::Idle {
      return Err(self.invalid_state("start"));
    }

    self.started_at = Utc::now();

    let graph = match WorkflowGraph::new(Arc::clone(&self.workflow)) {
      Ok(graph) => graph,
      Err(e) => {
        error!(error = %e, "workflow_malformed");
        self.fail(FailureReason::MalformedWorkflow);
        return Err(e.into());
      }
    };
    self.graph = Some(graph);

    let user_has_seen = match &self.tutorials {
      Some(store) => store
        .has_seen(&self.workflow.workflow_id)
        .await
        .unwrap_or_else(|e| {
          warn!(error = %e, "tutorial_store_read_failed");
          false
        }),
      None => false,
    };

    if TutorialGate::required(&self.workflow, user_has_seen) {
      info!("tutorial_required");
      self.state = SessionState::AwaitingTutorial;
      self.notifier.notify(SessionEvent::TutorialRequired {
        session_id: self.session_id.clone(),
        workflow_id: self.workflow.workflow_id.clone(),
      });
      return Ok(&self.state);
    }

    self.begin_classifying().await
  }

  /// Unblock a session waiting on the tutorial. Marks the tutorial seen
  /// (best effort) and proceeds to classification.
  #[instrument(
    name = "session_tutorial_acknowledged",
    skip(self),
    fields(session_id = %self.session_id)
  )]
  pub async fn tutorial_acknowledged(&mut self) -> Result<&SessionState, SessionError> {
    if self.state != SessionState::AwaitingTutorial {
      return Err(self.invalid_state("tutorial_acknowledged"));
    }

    self.seen_tutorial = true;
    if let Some(store) = &self.tutorials {
      if let Err(e) = store.mark_seen(&self.workflow.workflow_id).await {
        warn!(error = %e, "tutorial_store_write_failed");
      }
    }

    self.begin_classifying().await
  }

  /// Record an answer for the current task and advance the cursor. When
  /// the graph is exhausted the classification is assembled, the subject
  /// marked seen, and the result handed to the submission queue.
  #[instrument(
    name = "session_answer",
    skip(self, value),
    fields(session_id = %self.session_id, task_id = %task_id)
  )]
  pub async fn answer(
    &mut self,
    task_id: &str,
    value: AnnotationValue,
  ) -> Result<&SessionState, SessionError> {
    if self.state != SessionState::InProgress {
      return Err(self.invalid_state("answer"));
    }

    let current = match &self.current_task {
      Some(current) => current.clone(),
      None => return Err(self.invalid_state("answer")),
    };

    if task_id != current {
      return Err(SessionError::TaskMismatch {
        expected: current,
        got: task_id.to_string(),
      });
    }

    let next = {
      let graph = match &self.graph {
        Some(graph) => graph,
        None => return Err(self.invalid_state("answer")),
      };
      graph.next_task(&current, &value)?.map(str::to_string)
    };

    self.recorder.record(task_id, value);
    self.notifier.notify(SessionEvent::AnnotationRecorded {
      session_id: self.session_id.clone(),
      task_id: task_id.to_string(),
    });

    match next {
      Some(next) => {
        info!(next_task = %next, "task_presented");
        self.notifier.notify(SessionEvent::TaskPresented {
          session_id: self.session_id.clone(),
          task_id: next.clone(),
        });
        self.current_task = Some(next);
      }
      None => self.complete().await?,
    }

    Ok(&self.state)
  }

  /// Pull a subject and present the first task.
  async fn begin_classifying(&mut self) -> Result<&SessionState, SessionError> {
    let pulled = { self.subjects.lock().await.next().await };

    match pulled {
      Ok(Some(subject)) => {
        let first_task = match &self.graph {
          Some(graph) => graph.first_task().to_string(),
          None => return Err(self.invalid_state("start")),
        };

        info!(subject_id = %subject.id, task_id = %first_task, "classification_started");
        self.notifier.notify(SessionEvent::Started {
          session_id: self.session_id.clone(),
          workflow_id: self.workflow.workflow_id.clone(),
          subject_id: subject.id.clone(),
        });
        self.notifier.notify(SessionEvent::TaskPresented {
          session_id: self.session_id.clone(),
          task_id: first_task.clone(),
        });

        self.subject = Some(subject);
        self.current_task = Some(first_task);
        self.state = SessionState::InProgress;
      }
      Ok(None) => {
        self.fail(FailureReason::NoSubjectsAvailable);
      }
      Err(SubjectError::Provider(e)) => {
        warn!(error = %e, "subject_provider_failed");
        self.fail(FailureReason::SubjectsUnavailable);
      }
    }

    Ok(&self.state)
  }

  /// Assemble the classification and hand it off. Enqueue is
  /// fire-and-forget: delivery failures are the submission queue's
  /// concern, not the session's.
  async fn complete(&mut self) -> Result<(), SessionError> {
    self.state = SessionState::Completing;

    let subject_id = match &self.subject {
      Some(subject) => subject.id.clone(),
      None => return Err(self.invalid_state("complete")),
    };

    let finished_at = Utc::now();
    let classification = Classification::new(
      self.project_id.clone(),
      self.workflow.workflow_id.clone(),
      subject_id.clone(),
      std::mem::take(&mut self.recorder).into_sequence(),
      ClassificationMetadata {
        started_at: self.started_at,
        finished_at,
        seen_tutorial: self.seen_tutorial,
      },
    );

    {
      self.subjects.lock().await.mark_seen(subject_id.as_str());
    }
    let submission_id = self.submissions.enqueue(classification).await;

    info!(
      subject_id = %subject_id,
      submission_id = %submission_id,
      "classification_completed"
    );
    self.notifier.notify(SessionEvent::Completed {
      session_id: self.session_id.clone(),
      subject_id,
    });

    self.current_task = None;
    self.state = SessionState::Submitted;
    Ok(())
  }

  fn fail(&mut self, reason: FailureReason) {
    warn!(reason = %reason, "session_failed");
    self.state = SessionState::Failed(reason);
    self.notifier.notify(SessionEvent::Failed {
      session_id: self.session_id.clone(),
      reason: reason.to_string(),
    });
  }

  fn invalid_state(&self, operation: &'static str) -> SessionError {
    error!(state = ?self.state, operation = operation, "invalid_session_operation");
    SessionError::InvalidState {
      operation,
      state: format!("{:?}", self.state),
    }
  }

  pub fn state(&self) -> &SessionState {
    &self.state
  }

  /// The task the session is waiting on, while in progress.
  pub fn current_task(&self) -> Option<&str> {
    self.current_task.as_deref()
  }

  /// The subject assigned to this session, once classification began.
  pub fn subject(&self) -> Option<&Subject> {
    self.subject.as_ref()
  }

  pub fn session_id(&self) -> &str {
    &self.session_id
  }

  pub fn workflow(&self) -> &Arc<Workflow> {
    &self.workflow
  }
}
