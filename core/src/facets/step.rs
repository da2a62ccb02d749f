// kiln/src/facets/step.rs

//! The pipeline step that computes statistics for two datasets and compares them.

use crate::core::artifact::Artifact;
use crate::core::step::{Step, StepInputs, StepOutputs, StepSignature};
use crate::dataset::table::TabularDataset;
use crate::facets::comparison::FacetsComparison;
use async_trait::async_trait;
use tracing::{event, Level};

pub const LEFT: &str = "left";
pub const RIGHT: &str = "right";
pub const STATISTICS: &str = "statistics";

/// Compares two `TabularDataset` inputs (`left`, `right`) and outputs a
/// `FacetsComparison` as `statistics`.
#[derive(Debug, Clone)]
pub struct FacetsVisualizationStep {
  left_label: String,
  right_label: String,
}

impl Default for FacetsVisualizationStep {
  fn default() -> Self {
    Self::new("train", "test")
  }
}

impl FacetsVisualizationStep {
  /// `left_label` and `right_label` name the two sides in the rendered overview.
  pub fn new(left_label: impl Into<String>, right_label: impl Into<String>) -> Self {
    Self {
      left_label: left_label.into(),
      right_label: right_label.into(),
    }
  }
}

#[async_trait]
impl Step for FacetsVisualizationStep {
  fn signature(&self) -> StepSignature {
    StepSignature::new().input(LEFT).input(RIGHT).output(STATISTICS)
  }

  async fn run(&self, inputs: StepInputs) -> anyhow::Result<StepOutputs> {
    let left = inputs.get::<TabularDataset>(LEFT)?;
    let right = inputs.get::<TabularDataset>(RIGHT)?;
    let comparison = FacetsComparison::from_datasets(&self.left_label, &left, &self.right_label, &right);
    let features = comparison.feature_names().len();
    event!(
      Level::DEBUG,
      features,
      left_rows = comparison.left.num_rows,
      right_rows = comparison.right.num_rows,
      "Statistics computed."
    );
    let artifact = Artifact::new(comparison).with_metadata("features", features);
    Ok(StepOutputs::new().with_artifact(STATISTICS, artifact))
  }
}
