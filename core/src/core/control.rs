// kiln/src/core/control.rs

//! Status values recorded for runs and for the steps inside them.

use serde::{Deserialize, Serialize};

/// Outcome of a full pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
  /// Every step ran and produced its declared outputs.
  Completed,
  /// A step failed; the steps after it were not run.
  Failed,
}

/// Outcome of one step within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
  Completed,
  Failed,
  /// The run was aborted before this step was reached.
  NotRun,
}
