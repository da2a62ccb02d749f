// kiln/src/pipeline/run.rs

//! The record of one pipeline execution: per-step status, timestamps and outputs.

use crate::core::artifact::Artifact;
use crate::core::control::{RunStatus, StepStatus};
use crate::error::{KilnError, KilnResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// One step's slot in a run.
#[derive(Debug, Clone)]
pub struct StepRun {
  pub(crate) name: String,
  pub(crate) status: StepStatus,
  pub(crate) started_at: Option<DateTime<Utc>>,
  pub(crate) finished_at: Option<DateTime<Utc>>,
  pub(crate) outputs: BTreeMap<String, Artifact>,
}

impl StepRun {
  pub(crate) fn not_run(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      status: StepStatus::NotRun,
      started_at: None,
      finished_at: None,
      outputs: BTreeMap::new(),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn status(&self) -> StepStatus {
    self.status
  }

  pub fn started_at(&self) -> Option<DateTime<Utc>> {
    self.started_at
  }

  pub fn finished_at(&self) -> Option<DateTime<Utc>> {
    self.finished_at
  }

  pub fn outputs(&self) -> &BTreeMap<String, Artifact> {
    &self.outputs
  }

  pub fn output(&self, name: &str) -> KilnResult<&Artifact> {
    self.outputs.get(name).ok_or_else(|| KilnError::OutputNotFound {
      step_name: self.name.clone(),
      output: name.to_string(),
    })
  }

  /// Reads output `name` as `T`.
  pub fn read<T: Any + Send + Sync>(&self, name: &str) -> KilnResult<Arc<T>> {
    self.output(name)?.read::<T>(&self.name, name)
  }
}

/// Which step ended a failed run, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepFailure {
  pub step_name: String,
  pub message: String,
}

/// One concrete execution of a `Pipeline`. Immutable once the runner hands it out.
#[derive(Debug, Clone)]
pub struct PipelineRun {
  pub(crate) id: Uuid,
  pub(crate) pipeline_name: String,
  pub(crate) status: RunStatus,
  pub(crate) started_at: DateTime<Utc>,
  pub(crate) finished_at: DateTime<Utc>,
  pub(crate) steps: Vec<StepRun>,
  pub(crate) failure: Option<StepFailure>,
}

impl PipelineRun {
  pub fn id(&self) -> Uuid {
    self.id
  }

  pub fn pipeline_name(&self) -> &str {
    &self.pipeline_name
  }

  pub fn status(&self) -> RunStatus {
    self.status
  }

  pub fn started_at(&self) -> DateTime<Utc> {
    self.started_at
  }

  pub fn finished_at(&self) -> DateTime<Utc> {
    self.finished_at
  }

  /// Steps in execution order, including those never reached.
  pub fn steps(&self) -> &[StepRun] {
    &self.steps
  }

  pub fn failure(&self) -> Option<&StepFailure> {
    self.failure.as_ref()
  }

  pub fn get_step(&self, name: &str) -> KilnResult<&StepRun> {
    self.steps.iter().find(|s| s.name == name).ok_or_else(|| KilnError::StepNotFound {
      run_id: self.id,
      step_name: name.to_string(),
    })
  }

  pub fn summary(&self) -> RunSummary {
    RunSummary {
      id: self.id,
      pipeline: self.pipeline_name.clone(),
      status: self.status,
      started_at: self.started_at,
      finished_at: self.finished_at,
      failure: self.failure.clone(),
      steps: self
        .steps
        .iter()
        .map(|step| StepSummary {
          name: step.name.clone(),
          status: step.status,
          started_at: step.started_at,
          finished_at: step.finished_at,
          outputs: step
            .outputs
            .iter()
            .map(|(name, artifact)| {
              (
                name.clone(),
                OutputSummary {
                  type_name: artifact.type_name().to_string(),
                  metadata: artifact.metadata().clone(),
                },
              )
            })
            .collect(),
        })
        .collect(),
    }
  }
}

/// Serializable view of a run. Artifact values are described, not serialized.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
  pub id: Uuid,
  pub pipeline: String,
  pub status: RunStatus,
  pub started_at: DateTime<Utc>,
  pub finished_at: DateTime<Utc>,
  pub failure: Option<StepFailure>,
  pub steps: Vec<StepSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepSummary {
  pub name: String,
  pub status: StepStatus,
  pub started_at: Option<DateTime<Utc>>,
  pub finished_at: Option<DateTime<Utc>>,
  pub outputs: BTreeMap<String, OutputSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputSummary {
  pub type_name: String,
  pub metadata: BTreeMap<String, Value>,
}

/// What `Pipeline::execute` hands back: the run record, plus the error if a step failed.
#[derive(Debug)]
pub struct RunOutcome {
  pub run: PipelineRun,
  pub error: Option<KilnError>,
}

impl RunOutcome {
  pub fn is_success(&self) -> bool {
    self.error.is_none()
  }

  pub fn into_result(self) -> KilnResult<PipelineRun> {
    match self.error {
      Some(err) => Err(err),
      None => Ok(self.run),
    }
  }
}
