// kiln/src/pipelines.rs

//! Ready-made pipelines.

use crate::dataset::provider::{DatasetImportStep, DatasetProvider, X_TEST, X_TRAIN};
use crate::error::KilnResult;
use crate::facets::step::{FacetsVisualizationStep, LEFT, RIGHT};
use crate::pipeline::definition::Pipeline;

pub const IMPORTER: &str = "importer";
pub const FACETS_VISUALIZER: &str = "facets_visualizer";

/// `importer` loads `provider`'s split; `facets_visualizer` compares its training
/// features (left, labelled "train") with its test features (right, labelled "test").
pub fn data_statistics_pipeline<P>(name: impl Into<String>, provider: P) -> KilnResult<Pipeline>
where
  P: DatasetProvider + 'static,
{
  Pipeline::builder(name)
    .step(IMPORTER, DatasetImportStep::new(provider))
    .step(FACETS_VISUALIZER, FacetsVisualizationStep::new("train", "test"))
    .connect(IMPORTER, X_TRAIN, FACETS_VISUALIZER, LEFT)
    .connect(IMPORTER, X_TEST, FACETS_VISUALIZER, RIGHT)
    .build()
}
