// kiln/src/core/step.rs

//! Defines the `Step` trait, the declared signature of a step, and the input/output
//! containers handed to and returned from a step body.

use crate::core::artifact::Artifact;
use crate::error::{KilnError, KilnResult};
use async_trait::async_trait;
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Declared input and output names of a step.
///
/// The pipeline builder checks every binding against this signature, and the runner
/// checks every step's returned outputs against it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepSignature {
  pub inputs: Vec<String>,
  pub outputs: Vec<String>,
}

impl StepSignature {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn input(mut self, name: impl Into<String>) -> Self {
    self.inputs.push(name.into());
    self
  }

  pub fn output(mut self, name: impl Into<String>) -> Self {
    self.outputs.push(name.into());
    self
  }

  pub fn has_input(&self, name: &str) -> bool {
    self.inputs.iter().any(|i| i == name)
  }

  pub fn has_output(&self, name: &str) -> bool {
    self.outputs.iter().any(|o| o == name)
  }
}

/// The artifacts bound to a step's declared inputs for one invocation.
#[derive(Debug, Clone)]
pub struct StepInputs {
  step_name: String,
  values: HashMap<String, Artifact>,
}

impl StepInputs {
  pub(crate) fn new(step_name: impl Into<String>, values: HashMap<String, Artifact>) -> Self {
    Self {
      step_name: step_name.into(),
      values,
    }
  }

  pub fn step_name(&self) -> &str {
    &self.step_name
  }

  pub fn artifact(&self, input: &str) -> KilnResult<&Artifact> {
    self.values.get(input).ok_or_else(|| KilnError::InputNotFound {
      step_name: self.step_name.clone(),
      input: input.to_string(),
    })
  }

  /// Reads an input as `T`, failing with `TypeMismatch` if the upstream produced something else.
  pub fn get<T: Any + Send + Sync>(&self, input: &str) -> KilnResult<Arc<T>> {
    self.artifact(input)?.read::<T>(&self.step_name, input)
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }
}

/// The named artifacts a step produced.
#[derive(Debug, Clone, Default)]
pub struct StepOutputs {
  values: BTreeMap<String, Artifact>,
}

impl StepOutputs {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert<T: Any + Send + Sync>(&mut self, name: impl Into<String>, value: T) {
    self.values.insert(name.into(), Artifact::new(value));
  }

  pub fn insert_artifact(&mut self, name: impl Into<String>, artifact: Artifact) {
    self.values.insert(name.into(), artifact);
  }

  pub fn with<T: Any + Send + Sync>(mut self, name: impl Into<String>, value: T) -> Self {
    self.insert(name, value);
    self
  }

  pub fn with_artifact(mut self, name: impl Into<String>, artifact: Artifact) -> Self {
    self.insert_artifact(name, artifact);
    self
  }

  pub fn get(&self, name: &str) -> Option<&Artifact> {
    self.values.get(name)
  }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.values.keys().map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  pub(crate) fn into_map(self) -> BTreeMap<String, Artifact> {
    self.values
  }
}

/// A named unit of computation inside a pipeline.
///
/// A step only sees the artifacts bound to its declared inputs and must return
/// exactly its declared outputs. Errors are plain `anyhow::Error`s; the runner
/// attributes them to the step and aborts the run.
#[async_trait]
pub trait Step: Send + Sync {
  fn signature(&self) -> StepSignature;

  async fn run(&self, inputs: StepInputs) -> anyhow::Result<StepOutputs>;
}

/// Type alias for a closure-backed step body.
///
/// The closure takes ownership of the step's `StepInputs` and returns a boxed `Future`
/// resolving to the step's outputs.
pub type StepHandler =
  Box<dyn Fn(StepInputs) -> Pin<Box<dyn Future<Output = anyhow::Result<StepOutputs>> + Send>> + Send + Sync>;

/// A `Step` built from a signature and an async closure.
pub struct FnStep {
  signature: StepSignature,
  handler: StepHandler,
}

impl FnStep {
  pub fn new<F, Fut, UserProvidedErr>(signature: StepSignature, handler_fn: F) -> Self
  where
    F: Fn(StepInputs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<StepOutputs, UserProvidedErr>> + Send + 'static,
    UserProvidedErr: Into<anyhow::Error> + Send + 'static,
  {
    let handler: StepHandler = Box::new(move |inputs| {
      let user_fut = handler_fn(inputs);
      Box::pin(async move { user_fut.await.map_err(Into::into) })
    });
    Self { signature, handler }
  }
}

#[async_trait]
impl Step for FnStep {
  fn signature(&self) -> StepSignature {
    self.signature.clone()
  }

  async fn run(&self, inputs: StepInputs) -> anyhow::Result<StepOutputs> {
    (self.handler)(inputs).await
  }
}

impl std::fmt::Debug for FnStep {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FnStep").field("signature", &self.signature).finish()
  }
}
