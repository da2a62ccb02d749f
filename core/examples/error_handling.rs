// kiln/examples/error_handling.rs

use kiln::{FnStep, Kiln, KilnError, Pipeline, StepInputs, StepOutputs, StepSignature, StepStatus};
use tracing::{error, info};

// 1. Define a custom application error type for step bodies
#[derive(Debug, thiserror::Error)]
enum ExampleAppError {
  #[error("Sensor '{0}' returned no data")]
  NoData(String),
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Error Handling Example ---");

  // Scenario 1: A step body fails at run time
  info!("\nScenario 1: Step body returns a custom error");
  run_pipeline_with_step_error().await;

  // Scenario 2: The declaration itself is invalid
  info!("\nScenario 2: Definition error (unbound input)");
  build_pipeline_with_unbound_input();
}

async fn run_pipeline_with_step_error() {
  let read_sensor = FnStep::new(StepSignature::new().output("samples"), |_inputs: StepInputs| async move {
    info!("Executing read_sensor");
    Ok::<_, anyhow::Error>(StepOutputs::new().with("samples", vec![3_u32, 4, 5]))
  });
  let calibrate = FnStep::new(
    StepSignature::new().input("samples").output("calibrated"),
    |_inputs: StepInputs| async move {
      info!("Executing calibrate - this will error");
      Err::<StepOutputs, _>(ExampleAppError::NoData("thermo-2".to_string()))
    },
  );
  let report = FnStep::new(
    StepSignature::new().input("calibrated").output("report"),
    |_inputs: StepInputs| async move { Ok::<_, anyhow::Error>(StepOutputs::new().with("report", String::new())) },
  );

  let registry = Kiln::new();
  let pipeline = Pipeline::builder("sensors")
    .step("read_sensor", read_sensor)
    .step("calibrate", calibrate)
    .step("report", report)
    .connect("read_sensor", "samples", "calibrate", "samples")
    .connect("calibrate", "calibrated", "report", "calibrated")
    .build();
  let pipeline = match pipeline {
    Ok(p) => p,
    Err(e) => {
      error!("Unexpected definition error: {}", e);
      return;
    }
  };
  registry.register_pipeline(pipeline);

  match registry.run("sensors").await {
    Ok(_) => error!("Pipeline unexpectedly succeeded!"),
    Err(KilnError::StepFailed { run_id, step_name, source }) => {
      info!("Step '{}' failed: {}", step_name, source);
      if let Some(app_err) = source.downcast_ref::<ExampleAppError>() {
        info!("Recovered the original application error: {:?}", app_err);
      }

      // The failed run is recorded; upstream outputs are still there.
      if let Ok(run) = registry.run_by_id(run_id) {
        for step in run.steps() {
          info!("  {} -> {:?}", step.name(), step.status());
        }
        let samples = run.get_step("read_sensor").and_then(|s| s.read::<Vec<u32>>("samples"));
        info!("Samples read before the failure: {:?}", samples.ok());
        assert_eq!(run.get_step("report").map(|s| s.status()).ok(), Some(StepStatus::NotRun));
      }
    }
    Err(e) => error!("Unexpected error: {}", e),
  }
}

fn build_pipeline_with_unbound_input() {
  let calibrate = FnStep::new(
    StepSignature::new().input("samples").output("calibrated"),
    |_inputs: StepInputs| async move { Ok::<_, anyhow::Error>(StepOutputs::new().with("calibrated", 0_u32)) },
  );

  match Pipeline::builder("incomplete").step("calibrate", calibrate).build() {
    Ok(_) => error!("Pipeline with an unbound input was accepted!"),
    Err(e @ KilnError::UnresolvedInput { .. }) => {
      info!("Rejected before running: {}", e);
    }
    Err(e) => error!("Unexpected error: {}", e),
  }
}
