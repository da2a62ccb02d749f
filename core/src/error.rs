// kiln/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum KilnError {
  // --- Definition-time errors (reported by `PipelineBuilder::build`) ---
  #[error("Step '{step_name}' is declared more than once in pipeline '{pipeline}'")]
  DuplicateStep { pipeline: String, step_name: String },

  #[error("Binding refers to unknown step '{step_name}'")]
  UnknownStep { step_name: String },

  #[error("Step '{step_name}' declares no output named '{output}'")]
  UnknownOutput { step_name: String, output: String },

  #[error("Step '{step_name}' declares no input named '{input}'")]
  UnknownInput { step_name: String, input: String },

  #[error("Input '{input}' of step '{step_name}' is bound more than once")]
  DuplicateBinding { step_name: String, input: String },

  #[error("Input '{input}' of step '{step_name}' is not bound to any output or constant")]
  UnresolvedInput { step_name: String, input: String },

  #[error("Pipeline '{pipeline}' has a dependency cycle between steps: {}", steps.join(", "))]
  CyclicDependency { pipeline: String, steps: Vec<String> },

  // --- Execution-time errors ---
  #[error("Step '{step_name}' failed in run {run_id}. Source: {source}")]
  StepFailed {
    run_id: Uuid,
    step_name: String,
    #[source]
    source: AnyhowError,
  },

  #[error("Step '{step_name}' did not produce its declared output '{output}'")]
  MissingOutput { step_name: String, output: String },

  #[error("Step '{step_name}' produced output '{output}' which it does not declare")]
  UndeclaredOutput { step_name: String, output: String },

  #[error("Type mismatch reading '{artifact}' of step '{step_name}' (expected {expected_type}, found {actual_type})")]
  TypeMismatch {
    step_name: String,
    artifact: String,
    expected_type: String,
    actual_type: String,
  },

  #[error("Step '{step_name}' has no input named '{input}'")]
  InputNotFound { step_name: String, input: String },

  // --- Registry / run query errors ---
  #[error("No pipeline registered under the name '{name}'")]
  PipelineNotFound { name: String },

  #[error("No run found: {query}")]
  RunNotFound { query: String },

  #[error("Run {run_id} has no step named '{step_name}'")]
  StepNotFound { run_id: Uuid, step_name: String },

  #[error("Step '{step_name}' has no output named '{output}'")]
  OutputNotFound { step_name: String, output: String },

  // --- Data errors ---
  #[error("Dataset source '{source_name}' is unavailable: {reason}")]
  DatasetUnavailable { source_name: String, reason: String },

  #[error("Invalid dataset: {0}")]
  InvalidDataset(String),

  #[error("Invalid train/test split: {0}")]
  InvalidSplit(String),

  #[error("Failed to write '{path}'. Source: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("Serialization failed. Source: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("Error in a step body or external operation. Source: {source}")]
  HandlerError {
    #[source]
    source: AnyhowError,
  },

  #[error("Internal kiln error: {0}")]
  Internal(String),
}

impl From<AnyhowError> for KilnError {
  fn from(err: AnyhowError) -> Self {
    // A step body that `?`-propagated a KilnError through anyhow gets it back unwrapped.
    match err.downcast::<KilnError>() {
      Ok(kiln_err) => kiln_err,
      Err(source) => KilnError::HandlerError { source },
    }
  }
}

impl KilnError {
  /// The step this error is attributed to, if any.
  pub fn step_name(&self) -> Option<&str> {
    match self {
      KilnError::DuplicateStep { step_name, .. }
      | KilnError::UnknownStep { step_name }
      | KilnError::UnknownOutput { step_name, .. }
      | KilnError::UnknownInput { step_name, .. }
      | KilnError::DuplicateBinding { step_name, .. }
      | KilnError::UnresolvedInput { step_name, .. }
      | KilnError::StepFailed { step_name, .. }
      | KilnError::MissingOutput { step_name, .. }
      | KilnError::UndeclaredOutput { step_name, .. }
      | KilnError::TypeMismatch { step_name, .. }
      | KilnError::InputNotFound { step_name, .. }
      | KilnError::StepNotFound { step_name, .. }
      | KilnError::OutputNotFound { step_name, .. } => Some(step_name),
      _ => None,
    }
  }
}

pub type KilnResult<T, E = KilnError> = std::result::Result<T, E>;
