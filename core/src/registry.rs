// kiln/src/registry.rs

//! Defines `Kiln`, a name-keyed registry of pipelines that also keeps every run it executed.

use crate::error::{KilnError, KilnResult};
use crate::pipeline::definition::Pipeline;
use crate::pipeline::run::{PipelineRun, RunSummary};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{event, instrument, Level};
use uuid::Uuid;

/// The kiln registry.
///
/// Runs are appended in completion order and never modified afterwards; queries hand
/// out `Arc<PipelineRun>` clones, so callers can keep a run while new ones are recorded.
///
/// History is unbounded unless the registry is built with [`Kiln::with_run_retention`].
pub struct Kiln {
  pipelines: RwLock<HashMap<String, Arc<Pipeline>>>,
  runs: RwLock<Vec<Arc<PipelineRun>>>,
  max_runs_per_pipeline: Option<usize>,
}

impl Default for Kiln {
  fn default() -> Self {
    Self::new()
  }
}

impl Kiln {
  /// Creates a new, empty registry.
  pub fn new() -> Self {
    Self {
      pipelines: RwLock::new(HashMap::new()),
      runs: RwLock::new(Vec::new()),
      max_runs_per_pipeline: None,
    }
  }

  /// Creates a registry that keeps at most `max_runs_per_pipeline` runs for each
  /// pipeline, dropping the oldest first. A limit of 0 is treated as 1, so the run
  /// just returned by `run` can always be found again.
  pub fn with_run_retention(max_runs_per_pipeline: usize) -> Self {
    Self {
      max_runs_per_pipeline: Some(max_runs_per_pipeline.max(1)),
      ..Self::new()
    }
  }

  /// Registers `pipeline` under its name, replacing any pipeline already registered there.
  pub fn register_pipeline(&self, pipeline: Pipeline) -> Arc<Pipeline> {
    let name = pipeline.name().to_string();
    let pipeline = Arc::new(pipeline);
    let replaced = self.pipelines.write().insert(name.clone(), Arc::clone(&pipeline));
    event!(Level::DEBUG, pipeline = %name, replaced = replaced.is_some(), "Pipeline registered.");
    pipeline
  }

  pub fn pipeline(&self, name: &str) -> KilnResult<Arc<Pipeline>> {
    self
      .pipelines
      .read()
      .get(name)
      .cloned()
      .ok_or_else(|| KilnError::PipelineNotFound { name: name.to_string() })
  }

  pub fn pipeline_names(&self) -> Vec<String> {
    let mut names: Vec<String> = self.pipelines.read().keys().cloned().collect();
    names.sort();
    names
  }

  /// Runs the pipeline registered as `name` and records the run.
  ///
  /// A failed run is recorded too, so `run_by_id` with the `run_id` carried by
  /// `KilnError::StepFailed` gives access to the outputs of the steps that completed.
  #[instrument(name = "Kiln::run", skip(self), err(Display))]
  pub async fn run(&self, name: &str) -> KilnResult<Arc<PipelineRun>> {
    // Clone the Arc out so no lock is held while the pipeline runs.
    let pipeline = self.pipeline(name)?;
    let outcome = pipeline.execute().await;

    let run = Arc::new(outcome.run);
    let evicted = {
      let mut runs = self.runs.write();
      runs.push(Arc::clone(&run));
      match self.max_runs_per_pipeline {
        Some(limit) => evict_oldest(&mut runs, name, limit),
        None => 0,
      }
    };
    event!(Level::DEBUG, run_id = %run.id(), status = ?run.status(), evicted, "Run recorded.");

    match outcome.error {
      Some(err) => Err(err),
      None => Ok(run),
    }
  }

  /// Runs of pipeline `name`, most recent first.
  pub fn runs(&self, name: &str) -> Vec<Arc<PipelineRun>> {
    self
      .runs
      .read()
      .iter()
      .rev()
      .filter(|run| run.pipeline_name() == name)
      .cloned()
      .collect()
  }

  pub fn latest_run(&self, name: &str) -> KilnResult<Arc<PipelineRun>> {
    self
      .runs
      .read()
      .iter()
      .rev()
      .find(|run| run.pipeline_name() == name)
      .cloned()
      .ok_or_else(|| KilnError::RunNotFound {
        query: format!("no runs recorded for pipeline '{}'", name),
      })
  }

  pub fn run_by_id(&self, id: Uuid) -> KilnResult<Arc<PipelineRun>> {
    self
      .runs
      .read()
      .iter()
      .find(|run| run.id() == id)
      .cloned()
      .ok_or_else(|| KilnError::RunNotFound {
        query: format!("run id {}", id),
      })
  }

  /// Every recorded run across pipelines, most recent first.
  pub fn all_runs(&self) -> Vec<Arc<PipelineRun>> {
    self.runs.read().iter().rev().cloned().collect()
  }

  /// Drops every recorded run of pipeline `name` and returns how many were removed.
  pub fn clear_runs(&self, name: &str) -> usize {
    let mut runs = self.runs.write();
    let before = runs.len();
    runs.retain(|run| run.pipeline_name() != name);
    let removed = before - runs.len();
    event!(Level::DEBUG, pipeline = %name, removed, "Runs cleared.");
    removed
  }

  /// JSON array of the summaries of pipeline `name`'s runs, most recent first.
  pub fn export_summaries(&self, name: &str) -> KilnResult<String> {
    let summaries: Vec<RunSummary> = self.runs(name).iter().map(|run| run.summary()).collect();
    Ok(serde_json::to_string_pretty(&summaries)?)
  }
}

// Removes the oldest runs of `name` until at most `limit` remain.
fn evict_oldest(runs: &mut Vec<Arc<PipelineRun>>, name: &str, limit: usize) -> usize {
  let kept = runs.iter().filter(|run| run.pipeline_name() == name).count();
  let mut excess = kept.saturating_sub(limit);
  let evicted = excess;
  runs.retain(|run| {
    if excess > 0 && run.pipeline_name() == name {
      excess -= 1;
      return false;
    }
    true
  });
  evicted
}
