// src/lib.rs

//! Kiln: an ASYNC, type-checked ML pipeline engine for Rust.
//!
//! Kiln lets you declare a pipeline as named steps plus the data flowing between them,
//! and gives you:
//!  - Definition-time validation: every step input bound exactly once, no cycles.
//!  - A runner that executes steps one at a time in dependency order.
//!  - Immutable run records with per-step status and type-checked output access.
//!  - A registry that keeps every run, queryable most-recent-first.
//!  - Tabular datasets, seeded train/test splitting, and the bundled Iris data.
//!  - A Facets-style statistics step comparing two datasets, renderable as HTML or text.

pub mod core;
pub mod dataset;
pub mod error;
pub mod facets;
pub mod pipeline;
pub mod pipelines;
pub mod registry;

// --- Re-exports for the Public API ---

pub use crate::core::{Artifact, FnStep, RunStatus, Step, StepHandler, StepInputs, StepOutputs, StepSignature, StepStatus};

pub use crate::pipeline::{Pipeline, PipelineBuilder, PipelineRun, RunOutcome, RunSummary, StepFailure, StepRun};

pub use crate::dataset::{
  train_test_split, Column, ColumnData, ColumnType, CsvProvider, DatasetImportStep, DatasetProvider, IrisProvider, Series,
  SplitConfig, TabularDataset, TrainTestSplit,
};

pub use crate::facets::{DatasetStatistics, FacetsComparison, FacetsVisualizationStep, FacetsVisualizer, Visualization, Visualizer};

pub use crate::error::{KilnError, KilnResult};

pub use crate::registry::Kiln;

/*
    Core Workflow:
    1. Implement `Step` for each unit of work (or wrap an async closure in `FnStep`),
       declaring its input and output names in a `StepSignature`.
    2. Declare a pipeline: `Pipeline::builder("name").step(..).connect(..).build()?`.
       `build` rejects unknown names, unbound or doubly bound inputs, and cycles.
    3. Register it with a `Kiln` registry and call `kiln.run("name").await`.
    4. Query `kiln.latest_run("name")?.get_step("step")?` and read outputs with
       `.read::<T>("output")`, or hand the step to a `Visualizer`.
*/
