// kiln/src/facets/mod.rs

//! Side-by-side summary statistics of two datasets, as a pipeline step and as a
//! renderable artifact.

pub mod comparison;
pub mod statistics;
pub mod step;
pub mod visualizer;

pub use comparison::FacetsComparison;
pub use statistics::{CategoricalStatistics, DatasetStatistics, FeatureKind, FeatureStatistics, NumericStatistics};
pub use step::FacetsVisualizationStep;
pub use visualizer::{FacetsVisualizer, Visualization, Visualizer};
