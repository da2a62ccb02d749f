// kiln/src/pipeline/execution.rs

//! Contains `Pipeline::execute()` and `Pipeline::run()`, which run a validated pipeline's
//! steps one at a time in execution order and record the outcome as a `PipelineRun`.

use crate::core::artifact::Artifact;
use crate::core::control::{RunStatus, StepStatus};
use crate::core::step::StepInputs;
use crate::error::{KilnError, KilnResult};
use crate::pipeline::definition::{BoundStep, InputSource, Pipeline};
use crate::pipeline::run::{PipelineRun, RunOutcome, StepFailure, StepRun};
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use tracing::{event, instrument, span, Instrument, Level};
use uuid::Uuid;

impl Pipeline {
  /// Executes every step in order and returns the run record.
  ///
  /// A failing step aborts the run: its error is returned in `RunOutcome::error` as
  /// `KilnError::StepFailed`, the outputs of steps that already completed stay in the
  /// run, and the remaining steps are recorded as `StepStatus::NotRun`.
  #[instrument(
    name = "Pipeline::execute",
    skip_all,
    fields(pipeline = %self.name, num_steps = self.steps.len(), run_id = tracing::field::Empty)
  )]
  pub async fn execute(&self) -> RunOutcome {
    let run_id = Uuid::new_v4();
    tracing::Span::current().record("run_id", tracing::field::display(run_id));
    let started_at = Utc::now();
    event!(Level::DEBUG, "Pipeline execution starting.");

    let mut step_runs: Vec<StepRun> = Vec::with_capacity(self.steps.len());
    let mut position: HashMap<&str, usize> = HashMap::new();
    let mut failure: Option<StepFailure> = None;
    let mut error: Option<KilnError> = None;

    for (step_idx, bound) in self.steps.iter().enumerate() {
      if error.is_some() {
        event!(Level::DEBUG, step_name = %bound.name, "Step not run, pipeline already failed.");
        step_runs.push(StepRun::not_run(&bound.name));
        continue;
      }

      let step_span = span!(
        Level::INFO,
        "pipeline_step_execution",
        step_name = bound.name.as_str(),
        step_index = step_idx
      );

      let step_started = Utc::now();
      let result = match gather_inputs(bound, &step_runs, &position) {
        Ok(inputs) => bound.step.run(inputs).instrument(step_span.clone()).await,
        Err(err) => Err(anyhow::Error::new(err)),
      };
      let checked = result.and_then(|outputs| check_outputs(bound, outputs.into_map()).map_err(anyhow::Error::new));
      let step_finished = Utc::now();

      match checked {
        Ok(outputs) => {
          step_span.in_scope(|| event!(Level::DEBUG, num_outputs = outputs.len(), "Step completed."));
          position.insert(bound.name.as_str(), step_runs.len());
          step_runs.push(StepRun {
            name: bound.name.clone(),
            status: StepStatus::Completed,
            started_at: Some(step_started),
            finished_at: Some(step_finished),
            outputs,
          });
        }
        Err(source) => {
          step_span.in_scope(|| event!(Level::ERROR, error = %source, "Step failed, aborting run."));
          step_runs.push(StepRun {
            name: bound.name.clone(),
            status: StepStatus::Failed,
            started_at: Some(step_started),
            finished_at: Some(step_finished),
            outputs: BTreeMap::new(),
          });
          failure = Some(StepFailure {
            step_name: bound.name.clone(),
            message: format!("{:#}", source),
          });
          error = Some(KilnError::StepFailed {
            run_id,
            step_name: bound.name.clone(),
            source,
          });
        }
      }
    }

    let status = if error.is_some() {
      RunStatus::Failed
    } else {
      RunStatus::Completed
    };
    event!(Level::INFO, ?status, "Pipeline execution finished.");

    RunOutcome {
      run: PipelineRun {
        id: run_id,
        pipeline_name: self.name.clone(),
        status,
        started_at,
        finished_at: Utc::now(),
        steps: step_runs,
        failure,
      },
      error,
    }
  }

  /// Executes the pipeline and returns the run, or the failing step's error.
  ///
  /// Use `execute()` (or `Kiln::run`) when the partial run of a failure is needed.
  #[instrument(name = "Pipeline::run", skip_all, fields(pipeline = %self.name), err(Display))]
  pub async fn run(&self) -> KilnResult<PipelineRun> {
    self.execute().await.into_result()
  }
}

fn gather_inputs(bound: &BoundStep, step_runs: &[StepRun], position: &HashMap<&str, usize>) -> KilnResult<StepInputs> {
  let mut values: HashMap<String, Artifact> = HashMap::with_capacity(bound.bindings.len());
  for (input, source) in &bound.bindings {
    let artifact = match source {
      InputSource::Constant(value) => value.clone(),
      InputSource::Output { step_name, output } => {
        // Execution order guarantees the producer ran; anything else is a bug.
        let producer = position
          .get(step_name.as_str())
          .and_then(|idx| step_runs.get(*idx))
          .ok_or_else(|| {
            KilnError::Internal(format!(
              "step '{}' scheduled before its upstream '{}'",
              bound.name, step_name
            ))
          })?;
        producer.output(output)?.clone()
      }
    };
    event!(Level::TRACE, step_name = %bound.name, %input, type_name = artifact.type_name(), "Input bound.");
    values.insert(input.clone(), artifact);
  }
  Ok(StepInputs::new(bound.name.clone(), values))
}

fn check_outputs(bound: &BoundStep, outputs: BTreeMap<String, Artifact>) -> KilnResult<BTreeMap<String, Artifact>> {
  if let Some(extra) = outputs.keys().find(|name| !bound.signature.has_output(name)) {
    return Err(KilnError::UndeclaredOutput {
      step_name: bound.name.clone(),
      output: extra.clone(),
    });
  }
  if let Some(missing) = bound.signature.outputs.iter().find(|name| !outputs.contains_key(*name)) {
    return Err(KilnError::MissingOutput {
      step_name: bound.name.clone(),
      output: missing.clone(),
    });
  }
  Ok(outputs)
}
