// kiln/src/core/artifact.rs

//! Defines `Artifact`, the immutable, type-erased value that flows along a pipeline edge.

use crate::error::{KilnError, KilnResult};
use serde_json::Value;
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A step output (or constant input) shared by reference between steps and runs.
///
/// The value itself is behind an `Arc`, so cloning an `Artifact` never copies the data.
/// Downstream steps and run queries read it back with `read::<T>()`, which checks the
/// concrete type recorded when the artifact was created.
#[derive(Clone)]
pub struct Artifact {
  value: Arc<dyn Any + Send + Sync>,
  type_name: &'static str,
  metadata: BTreeMap<String, Value>,
}

impl Artifact {
  pub fn new<T: Any + Send + Sync>(value: T) -> Self {
    Self::from_arc(Arc::new(value))
  }

  pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
    Self {
      value,
      type_name: std::any::type_name::<T>(),
      metadata: BTreeMap::new(),
    }
  }

  /// Attaches a metadata entry (row counts, column names, ...) recorded alongside the value.
  pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.metadata.insert(key.into(), value.into());
    self
  }

  pub fn type_name(&self) -> &'static str {
    self.type_name
  }

  pub fn metadata(&self) -> &BTreeMap<String, Value> {
    &self.metadata
  }

  pub fn is<T: Any + Send + Sync>(&self) -> bool {
    self.value.is::<T>()
  }

  /// Returns the value if it is a `T`.
  pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
    Arc::clone(&self.value).downcast::<T>().ok()
  }

  /// Like `downcast`, but reports a `TypeMismatch` naming the owning step and artifact.
  pub fn read<T: Any + Send + Sync>(&self, step_name: &str, artifact_name: &str) -> KilnResult<Arc<T>> {
    self.downcast::<T>().ok_or_else(|| KilnError::TypeMismatch {
      step_name: step_name.to_string(),
      artifact: artifact_name.to_string(),
      expected_type: std::any::type_name::<T>().to_string(),
      actual_type: self.type_name.to_string(),
    })
  }
}

impl std::fmt::Debug for Artifact {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Artifact")
      .field("type_name", &self.type_name)
      .field("metadata", &self.metadata)
      .finish()
  }
}
