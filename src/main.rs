use std::collections::HashSet;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use sqlx::SqlitePool;
use tokio::sync::Mutex;

use skylark_annotations::{Annotation, Classification};
use skylark_session::{ClassificationSession, SessionConfig, SessionState};
use skylark_store::{SqliteStore, SubmissionStore, TutorialStore};
use skylark_subjects::{ProviderError, Subject, SubjectProvider, SubjectQueue};
use skylark_submission::{ClassificationService, ServiceError, SubmissionQueue};
use skylark_workflow::{Workflow, WorkflowGraph};

/// Skylark - a classification session engine for citizen-science workflows
#[derive(Parser)]
#[command(name = "skylark")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.skylark)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Validate a workflow definition file
  Validate {
    /// Path to the workflow file (JSON)
    workflow_file: PathBuf,
  },

  /// Run one classification session against a workflow
  ///
  /// The answer script is read from stdin as a JSON array of
  /// `{"task": "...", "value": ...}` entries, in traversal order.
  Classify {
    /// Path to the workflow file (JSON)
    workflow_file: PathBuf,

    /// Path to the subject batch file (JSON array)
    #[arg(long)]
    subjects: PathBuf,

    /// Project id recorded on the classification
    #[arg(long, default_value = "local")]
    project: String,
  },

  /// List submissions still awaiting delivery
  Pending,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_writer(io::stderr)
    .init();

  let cli = Cli::parse();

  let data_dir = cli.data_dir.unwrap_or_else(|| {
    dirs::home_dir()
      .expect("could not determine home directory")
      .join(".skylark")
  });

  match cli.command {
    Some(Commands::Validate { workflow_file }) => {
      validate(workflow_file)?;
    }
    Some(Commands::Classify {
      workflow_file,
      subjects,
      project,
    }) => {
      let rt = tokio::runtime::Runtime::new()?;
      rt.block_on(async { classify(workflow_file, subjects, project, data_dir).await })?;
    }
    Some(Commands::Pending) => {
      let rt = tokio::runtime::Runtime::new()?;
      rt.block_on(async { list_pending(data_dir).await })?;
    }
    None => {
      println!("skylark - use --help to see available commands");
    }
  }

  Ok(())
}

fn validate(workflow_file: PathBuf) -> Result<()> {
  let workflow = load_workflow(&workflow_file)?;
  WorkflowGraph::new(Arc::clone(&workflow))
    .with_context(|| format!("workflow '{}' is malformed", workflow.workflow_id))?;

  eprintln!(
    "Workflow '{}' is valid: {} tasks, entry task '{}'",
    workflow.workflow_id,
    workflow.tasks.len(),
    workflow.first_task
  );
  if workflow.swipe_compatible() {
    eprintln!("Workflow is swipe compatible");
  }

  Ok(())
}

async fn classify(
  workflow_file: PathBuf,
  subjects_file: PathBuf,
  project_id: String,
  data_dir: PathBuf,
) -> Result<()> {
  let workflow = load_workflow(&workflow_file)?;

  let subjects_content = tokio::fs::read_to_string(&subjects_file)
    .await
    .with_context(|| format!("failed to read subjects file: {}", subjects_file.display()))?;
  let subjects: Vec<Subject> = serde_json::from_str(&subjects_content)
    .with_context(|| format!("failed to parse subjects file: {}", subjects_file.display()))?;

  eprintln!(
    "Loaded workflow '{}' with {} subjects",
    workflow.workflow_id,
    subjects.len()
  );

  let answers = read_answers_from_stdin()?;

  let store = open_store(&data_dir).await?;

  let queue = Arc::new(Mutex::new(SubjectQueue::new(
    workflow.workflow_id.clone(),
    Arc::new(FileSubjectProvider { subjects }) as Arc<dyn SubjectProvider>,
  )));
  let submissions = Arc::new(
    SubmissionQueue::new(Arc::new(StdoutService) as Arc<dyn ClassificationService>, 3)
      .with_store(Arc::clone(&store) as Arc<dyn SubmissionStore>),
  );

  let restored = submissions
    .restore()
    .await
    .context("failed to restore buffered submissions")?;
  if restored > 0 {
    eprintln!("Restored {restored} buffered submissions from a previous run");
  }

  let mut session = ClassificationSession::new(
    SessionConfig { project_id },
    workflow,
    queue,
    Arc::clone(&submissions),
  )
  .with_tutorial_store(store as Arc<dyn TutorialStore>);

  session.start().await.context("failed to start session")?;

  if session.state() == &SessionState::AwaitingTutorial {
    eprintln!("Tutorial required - acknowledging");
    session
      .tutorial_acknowledged()
      .await
      .context("failed to acknowledge tutorial")?;
  }

  if let SessionState::Failed(reason) = session.state() {
    bail!("session failed: {reason}");
  }

  for Annotation { task, value } in answers {
    session
      .answer(&task, value)
      .await
      .with_context(|| format!("failed to answer task '{task}'"))?;
  }

  if session.state() != &SessionState::Submitted {
    bail!(
      "answer script ended before the workflow completed (waiting on task {:?})",
      session.current_task()
    );
  }

  match submissions.flush().await {
    Some(report) => {
      eprintln!(
        "Flush: {} delivered, {} failed, {} abandoned",
        report.delivered, report.failed, report.abandoned
      );
    }
    None => eprintln!("Flush already in progress"),
  }

  Ok(())
}

async fn list_pending(data_dir: PathBuf) -> Result<()> {
  let store = open_store(&data_dir).await?;
  let pending = store
    .load_undelivered()
    .await
    .context("failed to load buffered submissions")?;

  if pending.is_empty() {
    eprintln!("No submissions awaiting delivery");
    return Ok(());
  }

  for record in pending {
    println!(
      "{}  subject={}  status={:?}  attempts={}  enqueued={}",
      record.submission_id,
      record.classification.subject_id,
      record.status,
      record.attempts,
      record.enqueued_at
    );
  }

  Ok(())
}

fn load_workflow(workflow_file: &PathBuf) -> Result<Arc<Workflow>> {
  let content = std::fs::read_to_string(workflow_file)
    .with_context(|| format!("failed to read workflow file: {}", workflow_file.display()))?;
  let workflow: Workflow = serde_json::from_str(&content)
    .with_context(|| format!("failed to parse workflow file: {}", workflow_file.display()))?;
  Ok(Arc::new(workflow))
}

async fn open_store(data_dir: &PathBuf) -> Result<Arc<SqliteStore>> {
  tokio::fs::create_dir_all(data_dir)
    .await
    .with_context(|| format!("failed to create data directory: {}", data_dir.display()))?;

  let db_path = data_dir.join("skylark.db");
  let pool = SqlitePool::connect(&format!("sqlite://{}?mode=rwc", db_path.display()))
    .await
    .with_context(|| format!("failed to open database: {}", db_path.display()))?;

  let store = SqliteStore::new(pool);
  store.migrate().await.context("migrations failed")?;

  Ok(Arc::new(store))
}

fn read_answers_from_stdin() -> Result<Vec<Annotation>> {
  use std::io::IsTerminal;

  if io::stdin().is_terminal() {
    // No stdin pipe, empty script
    return Ok(Vec::new());
  }

  let mut input = String::new();
  io::stdin()
    .read_to_string(&mut input)
    .context("failed to read answer script from stdin")?;

  if input.trim().is_empty() {
    Ok(Vec::new())
  } else {
    serde_json::from_str(&input).context("failed to parse answer script JSON from stdin")
  }
}

/// Serves the subject batch loaded from a file, honoring the exclusion
/// hint.
struct FileSubjectProvider {
  subjects: Vec<Subject>,
}

#[async_trait]
impl SubjectProvider for FileSubjectProvider {
  async fn fetch_batch(
    &self,
    _workflow_id: &str,
    exclude: &HashSet<String>,
  ) -> Result<Vec<Subject>, ProviderError> {
    Ok(
      self
        .subjects
        .iter()
        .filter(|s| !exclude.contains(&s.id))
        .cloned()
        .collect(),
    )
  }
}

/// Prints delivered classifications to stdout instead of posting them to
/// a remote service.
struct StdoutService;

#[async_trait]
impl ClassificationService for StdoutService {
  async fn submit(&self, classification: &Classification) -> Result<(), ServiceError> {
    let json =
      serde_json::to_string_pretty(classification).map_err(|e| ServiceError::Permanent {
        reason: format!("failed to serialize classification: {e}"),
      })?;
    println!("{json}");
    Ok(())
  }
}
