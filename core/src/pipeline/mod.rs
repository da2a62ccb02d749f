// kiln/src/pipeline/mod.rs

//! Defines the `Pipeline` type: its declaration and validation, its execution,
//! and the run records execution produces.

pub mod definition;
pub mod execution;
pub mod run;

pub use definition::{Pipeline, PipelineBuilder};
pub use run::{OutputSummary, PipelineRun, RunOutcome, RunSummary, StepFailure, StepRun, StepSummary};
