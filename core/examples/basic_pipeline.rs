// kiln/examples/basic_pipeline.rs

use kiln::{Artifact, FnStep, KilnError, Pipeline, StepInputs, StepOutputs, StepSignature};
use tracing::info;

// A tiny preprocessing pipeline over a vector of readings:
//
//   load ──readings──▶ scale ──scaled──▶ summarize
//                        ▲
//              factor (constant)

#[tokio::main]
async fn main() -> Result<(), KilnError> {
  // Initialize tracing (optional, for demonstration)
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Basic Pipeline Example ---");

  // 1. Define the steps: a signature naming inputs and outputs, plus an async body.
  let load = FnStep::new(StepSignature::new().output("readings"), |_inputs: StepInputs| async move {
    let readings: Vec<f64> = vec![1.0, 2.5, 4.0, 5.5];
    info!(count = readings.len(), "Readings loaded.");
    Ok::<_, anyhow::Error>(StepOutputs::new().with("readings", readings))
  });

  let scale = FnStep::new(
    StepSignature::new().input("readings").input("factor").output("scaled"),
    |inputs: StepInputs| async move {
      let readings = inputs.get::<Vec<f64>>("readings")?;
      let factor = inputs.get::<f64>("factor")?;
      let scaled: Vec<f64> = readings.iter().map(|r| r * *factor).collect();
      Ok::<_, anyhow::Error>(StepOutputs::new().with("scaled", scaled))
    },
  );

  let summarize = FnStep::new(
    StepSignature::new().input("values").output("mean"),
    |inputs: StepInputs| async move {
      let values = inputs.get::<Vec<f64>>("values")?;
      let mean = values.iter().sum::<f64>() / values.len() as f64;
      Ok::<_, anyhow::Error>(StepOutputs::new().with("mean", mean))
    },
  );

  // 2. Declare the pipeline. Declaration order doesn't matter; `build` orders by data flow
  //    and rejects unbound inputs or cycles before anything runs.
  let pipeline = Pipeline::builder("basic")
    .step("summarize", summarize)
    .step("scale", scale)
    .step("load", load)
    .connect("load", "readings", "scale", "readings")
    .connect("scale", "scaled", "summarize", "values")
    .constant("scale", "factor", Artifact::new(2.0_f64))
    .build()?;
  info!(order = ?pipeline.step_names(), "Pipeline validated.");

  // 3. Run it and inspect the outputs.
  let run = pipeline.run().await?;
  info!(run_id = %run.id(), status = ?run.status(), "Pipeline finished.");

  let mean = run.get_step("summarize")?.read::<f64>("mean")?;
  info!("Mean of the scaled readings: {}", mean);

  // Expected: 2 * (1.0 + 2.5 + 4.0 + 5.5) / 4 = 6.5
  assert_eq!(*mean, 6.5);

  Ok(())
}
