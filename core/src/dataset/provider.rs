// kiln/src/dataset/provider.rs

//! Dataset providers hand out a ready-made train/test split; `DatasetImportStep`
//! exposes one as the first step of a pipeline.

use crate::core::artifact::Artifact;
use crate::core::step::{Step, StepInputs, StepOutputs, StepSignature};
use crate::dataset::csv::parse_labeled_csv;
use crate::dataset::iris::load_iris;
use crate::dataset::split::{train_test_split, SplitConfig, TrainTestSplit};
use crate::dataset::table::{Series, TabularDataset};
use crate::error::{KilnError, KilnResult};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{event, instrument, Level};

pub const X_TRAIN: &str = "X_train";
pub const X_TEST: &str = "X_test";
pub const Y_TRAIN: &str = "y_train";
pub const Y_TEST: &str = "y_test";

/// Supplies a labelled dataset already split into training and test partitions.
#[async_trait]
pub trait DatasetProvider: Send + Sync {
  /// Short name of the source, used in logs and errors.
  fn name(&self) -> &str;

  /// Loads the source and splits it. Fails with `DatasetUnavailable` if the source can't be read.
  async fn load(&self) -> KilnResult<TrainTestSplit>;
}

/// The bundled Iris data, split with `config`.
#[derive(Debug, Clone, Default)]
pub struct IrisProvider {
  config: SplitConfig,
}

impl IrisProvider {
  pub fn new(config: SplitConfig) -> Self {
    Self { config }
  }
}

#[async_trait]
impl DatasetProvider for IrisProvider {
  fn name(&self) -> &str {
    "iris"
  }

  #[instrument(name = "IrisProvider::load", skip_all, err(Display))]
  async fn load(&self) -> KilnResult<TrainTestSplit> {
    let (features, labels) = load_iris()?;
    train_test_split(&features, &labels, &self.config)
  }
}

/// A headered CSV file on disk, with one column used as the label.
#[derive(Debug, Clone)]
pub struct CsvProvider {
  path: PathBuf,
  label_column: String,
  delimiter: char,
  config: SplitConfig,
}

impl CsvProvider {
  pub fn new(path: impl Into<PathBuf>, label_column: impl Into<String>, config: SplitConfig) -> Self {
    Self {
      path: path.into(),
      label_column: label_column.into(),
      delimiter: ',',
      config,
    }
  }

  pub fn with_delimiter(mut self, delimiter: char) -> Self {
    self.delimiter = delimiter;
    self
  }

  fn read_source(&self) -> KilnResult<(TabularDataset, Series)> {
    let content = std::fs::read_to_string(&self.path).map_err(|e| KilnError::DatasetUnavailable {
      source_name: self.path.display().to_string(),
      reason: e.to_string(),
    })?;
    parse_labeled_csv(&content, self.delimiter, &self.label_column)
  }
}

#[async_trait]
impl DatasetProvider for CsvProvider {
  fn name(&self) -> &str {
    "csv"
  }

  #[instrument(name = "CsvProvider::load", skip_all, fields(path = %self.path.display()), err(Display))]
  async fn load(&self) -> KilnResult<TrainTestSplit> {
    let (features, labels) = self.read_source()?;
    train_test_split(&features, &labels, &self.config)
  }
}

/// A pipeline step with no inputs that loads a provider's split and outputs
/// `X_train`, `X_test`, `y_train` and `y_test`.
///
/// Feature tables are output as `TabularDataset`, labels as `Series`; each artifact
/// carries `rows` and `columns` metadata.
pub struct DatasetImportStep<P: DatasetProvider> {
  provider: P,
}

impl<P: DatasetProvider> DatasetImportStep<P> {
  pub fn new(provider: P) -> Self {
    Self { provider }
  }
}

#[async_trait]
impl<P: DatasetProvider + 'static> Step for DatasetImportStep<P> {
  fn signature(&self) -> StepSignature {
    StepSignature::new()
      .output(X_TRAIN)
      .output(X_TEST)
      .output(Y_TRAIN)
      .output(Y_TEST)
  }

  async fn run(&self, _inputs: StepInputs) -> anyhow::Result<StepOutputs> {
    let split = self.provider.load().await?;
    event!(
      Level::INFO,
      provider = self.provider.name(),
      train_rows = split.x_train.num_rows(),
      test_rows = split.x_test.num_rows(),
      "Dataset imported."
    );
    Ok(
      StepOutputs::new()
        .with_artifact(X_TRAIN, table_artifact(split.x_train))
        .with_artifact(X_TEST, table_artifact(split.x_test))
        .with_artifact(Y_TRAIN, series_artifact(split.y_train))
        .with_artifact(Y_TEST, series_artifact(split.y_test)),
    )
  }
}

fn table_artifact(table: TabularDataset) -> Artifact {
  let rows = table.num_rows();
  let columns: Vec<String> = table.column_names().into_iter().map(String::from).collect();
  Artifact::new(table)
    .with_metadata("rows", rows)
    .with_metadata("columns", columns)
}

fn series_artifact(series: Series) -> Artifact {
  let rows = series.len();
  let name = series.name().to_string();
  Artifact::new(series)
    .with_metadata("rows", rows)
    .with_metadata("columns", vec![name])
}
