// demos/iris_facets/src/main.rs

//! Loads a labelled dataset (the bundled Iris data by default), splits it into train and
//! test partitions, and compares their summary statistics with a Facets-style overview.

mod config;
mod errors;

use crate::config::{AppConfig, LogFormat};
use crate::errors::Result as AppResult;

use kiln::pipelines::{data_statistics_pipeline, FACETS_VISUALIZER, IMPORTER};
use kiln::{CsvProvider, FacetsVisualizer, IrisProvider, Kiln, Pipeline, Visualizer};
use tracing_subscriber::EnvFilter;

const PIPELINE_NAME: &str = "facets_pipeline";

fn init_tracing(format: LogFormat) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt().with_env_filter(filter);
  match format {
    LogFormat::Json => builder.json().init(),
    LogFormat::Pretty => builder.init(),
  }
}

fn build_pipeline(config: &AppConfig) -> AppResult<Pipeline> {
  let pipeline = match &config.dataset_csv {
    Some((path, label)) => data_statistics_pipeline(PIPELINE_NAME, CsvProvider::new(path, label.as_str(), config.split))?,
    None => data_statistics_pipeline(PIPELINE_NAME, IrisProvider::new(config.split))?,
  };
  Ok(pipeline)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Configuration comes first so it can choose the log format.
  let app_config = AppConfig::from_env()?;
  init_tracing(app_config.log_format);
  tracing::info!(?app_config, "Starting iris facets demo.");

  let registry = Kiln::new();
  registry.register_pipeline(build_pipeline(&app_config)?);

  registry.run(PIPELINE_NAME).await?;

  // Query the run back the way a notebook would: most recent run, then the step by name.
  let runs = registry.runs(PIPELINE_NAME);
  tracing::info!(num_runs = runs.len(), "Runs recorded.");
  let last_run = registry.latest_run(PIPELINE_NAME)?;

  let importer = last_run.get_step(IMPORTER)?;
  for (name, artifact) in importer.outputs() {
    tracing::info!(output = %name, metadata = ?artifact.metadata(), "Importer output.");
  }

  let facets_step = last_run.get_step(FACETS_VISUALIZER)?;
  let visualization = FacetsVisualizer.visualize(facets_step)?;
  println!("{}", visualization.text());

  let html_path = app_config.output_dir.join(format!("{}.html", last_run.id()));
  visualization.save(&html_path)?;
  tracing::info!(path = %html_path.display(), "Facets overview written.");

  let summary_path = app_config.output_dir.join("runs.json");
  std::fs::write(&summary_path, registry.export_summaries(PIPELINE_NAME)?)?;
  tracing::info!(path = %summary_path.display(), "Run summaries written.");

  Ok(())
}
