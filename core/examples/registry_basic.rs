// kiln/examples/registry_basic.rs

use kiln::pipelines::{data_statistics_pipeline, FACETS_VISUALIZER};
use kiln::{FacetsComparison, IrisProvider, Kiln, SplitConfig};
use tracing::info;

// Registers the Iris statistics pipeline under two split configurations, runs each a
// couple of times, and then queries the recorded history.

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Kiln Registry Basic Example ---");

  // 1. Create a registry and register the pipelines
  let registry = Kiln::new();
  registry.register_pipeline(data_statistics_pipeline("iris_80_20", IrisProvider::new(SplitConfig::new(0.2, 42)))?);
  registry.register_pipeline(data_statistics_pipeline("iris_50_50", IrisProvider::new(SplitConfig::new(0.5, 7)))?);
  info!(pipelines = ?registry.pipeline_names(), "Pipelines registered.");

  // 2. Run them; every run is kept
  for name in ["iris_80_20", "iris_50_50", "iris_80_20"] {
    let run = registry.run(name).await?;
    info!(pipeline = name, run_id = %run.id(), "Run finished.");
  }

  // 3. Query history, most recent first
  for name in registry.pipeline_names() {
    let runs = registry.runs(&name);
    info!("{} has {} run(s)", name, runs.len());

    let latest = registry.latest_run(&name)?;
    let comparison = latest.get_step(FACETS_VISUALIZER)?.read::<FacetsComparison>("statistics")?;
    info!(
      "  latest {}: {} train rows vs {} test rows",
      latest.id(),
      comparison.left.num_rows,
      comparison.right.num_rows
    );
  }
  assert_eq!(registry.runs("iris_80_20").len(), 2);
  assert_eq!(registry.all_runs().len(), 3);

  // 4. Export summaries as JSON
  println!("{}", registry.export_summaries("iris_50_50")?);

  Ok(())
}
