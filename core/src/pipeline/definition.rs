// kiln/src/pipeline/definition.rs

//! Contains the `PipelineBuilder` used to declare steps and their data-flow edges,
//! and the validated `Pipeline` it produces.

use crate::core::artifact::Artifact;
use crate::core::step::{Step, StepSignature};
use crate::error::{KilnError, KilnResult};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{event, instrument, Level};

/// Where a step input gets its value from.
#[derive(Debug, Clone)]
pub(crate) enum InputSource {
  /// A declared output of an upstream step.
  Output { step_name: String, output: String },
  /// A value fixed at definition time.
  Constant(Artifact),
}

/// A step placed in a validated pipeline, with every declared input resolved.
pub(crate) struct BoundStep {
  pub(crate) name: String,
  pub(crate) step: Arc<dyn Step>,
  pub(crate) signature: StepSignature,
  pub(crate) bindings: BTreeMap<String, InputSource>,
}

impl BoundStep {
  pub(crate) fn upstream_steps(&self) -> BTreeSet<&str> {
    self
      .bindings
      .values()
      .filter_map(|source| match source {
        InputSource::Output { step_name, .. } => Some(step_name.as_str()),
        InputSource::Constant(_) => None,
      })
      .collect()
  }
}

#[derive(Debug, Clone)]
struct Edge {
  from_step: String,
  output: String,
  to_step: String,
  input: String,
}

/// Declares the steps of a pipeline and how their outputs feed each other's inputs.
///
/// Nothing is checked until `build()`, which reports the first problem found as a
/// `KilnError` before anything runs.
pub struct PipelineBuilder {
  name: String,
  steps: Vec<(String, Arc<dyn Step>)>,
  edges: Vec<Edge>,
  constants: Vec<(String, String, Artifact)>,
}

impl PipelineBuilder {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      steps: Vec::new(),
      edges: Vec::new(),
      constants: Vec::new(),
    }
  }

  /// Adds a named step instance. Declaration order breaks ties in the execution order.
  pub fn step(mut self, name: impl Into<String>, step: impl Step + 'static) -> Self {
    self.steps.push((name.into(), Arc::new(step)));
    self
  }

  /// Adds a step that is already shared, e.g. the same instance used in several pipelines.
  pub fn shared_step(mut self, name: impl Into<String>, step: Arc<dyn Step>) -> Self {
    self.steps.push((name.into(), step));
    self
  }

  /// Binds `from_step.output` to `to_step.input`.
  pub fn connect(
    mut self,
    from_step: impl Into<String>,
    output: impl Into<String>,
    to_step: impl Into<String>,
    input: impl Into<String>,
  ) -> Self {
    self.edges.push(Edge {
      from_step: from_step.into(),
      output: output.into(),
      to_step: to_step.into(),
      input: input.into(),
    });
    self
  }

  /// Binds `step.input` to a fixed value.
  pub fn constant(mut self, step: impl Into<String>, input: impl Into<String>, value: Artifact) -> Self {
    self.constants.push((step.into(), input.into(), value));
    self
  }

  #[instrument(name = "PipelineBuilder::build", skip_all, fields(pipeline = %self.name, num_steps = self.steps.len()), err(Display))]
  pub fn build(self) -> KilnResult<Pipeline> {
    let PipelineBuilder {
      name,
      steps,
      edges,
      constants,
    } = self;

    let mut index: HashMap<String, usize> = HashMap::new();
    for (idx, (step_name, _)) in steps.iter().enumerate() {
      if index.insert(step_name.clone(), idx).is_some() {
        return Err(KilnError::DuplicateStep {
          pipeline: name,
          step_name: step_name.clone(),
        });
      }
    }

    let signatures: Vec<StepSignature> = steps.iter().map(|(_, step)| step.signature()).collect();
    let mut bindings: Vec<BTreeMap<String, InputSource>> = vec![BTreeMap::new(); steps.len()];

    let lookup = |step_name: &str| {
      index.get(step_name).copied().ok_or_else(|| KilnError::UnknownStep {
        step_name: step_name.to_string(),
      })
    };

    let bind = |bindings: &mut Vec<BTreeMap<String, InputSource>>,
                to_idx: usize,
                input: &str,
                source: InputSource|
     -> KilnResult<()> {
      let step_name = &steps[to_idx].0;
      if !signatures[to_idx].has_input(input) {
        return Err(KilnError::UnknownInput {
          step_name: step_name.clone(),
          input: input.to_string(),
        });
      }
      if bindings[to_idx].insert(input.to_string(), source).is_some() {
        return Err(KilnError::DuplicateBinding {
          step_name: step_name.clone(),
          input: input.to_string(),
        });
      }
      Ok(())
    };

    for edge in &edges {
      let from_idx = lookup(&edge.from_step)?;
      let to_idx = lookup(&edge.to_step)?;
      if !signatures[from_idx].has_output(&edge.output) {
        return Err(KilnError::UnknownOutput {
          step_name: edge.from_step.clone(),
          output: edge.output.clone(),
        });
      }
      bind(
        &mut bindings,
        to_idx,
        &edge.input,
        InputSource::Output {
          step_name: edge.from_step.clone(),
          output: edge.output.clone(),
        },
      )?;
    }

    for (step_name, input, value) in constants {
      let to_idx = lookup(&step_name)?;
      bind(&mut bindings, to_idx, &input, InputSource::Constant(value))?;
    }

    for (idx, signature) in signatures.iter().enumerate() {
      if let Some(input) = signature.inputs.iter().find(|i| !bindings[idx].contains_key(*i)) {
        return Err(KilnError::UnresolvedInput {
          step_name: steps[idx].0.clone(),
          input: input.clone(),
        });
      }
    }

    // Per-step upstream dependencies, by declaration index.
    let upstream: Vec<BTreeSet<usize>> = bindings
      .iter()
      .map(|step_bindings| {
        step_bindings
          .values()
          .filter_map(|source| match source {
            InputSource::Output { step_name, .. } => index.get(step_name).copied(),
            InputSource::Constant(_) => None,
          })
          .collect()
      })
      .collect();

    let order = topological_order(&upstream).map_err(|cycle| KilnError::CyclicDependency {
      pipeline: name.clone(),
      steps: cycle.into_iter().map(|idx| steps[idx].0.clone()).collect(),
    })?;

    let mut slots: Vec<Option<BoundStep>> = steps
      .into_iter()
      .zip(signatures)
      .zip(bindings)
      .map(|(((step_name, step), signature), bindings)| {
        Some(BoundStep {
          name: step_name,
          step,
          signature,
          bindings,
        })
      })
      .collect();

    let ordered: Vec<BoundStep> = order.iter().filter_map(|idx| slots[*idx].take()).collect();
    if ordered.len() != order.len() {
      return Err(KilnError::Internal(format!(
        "execution order for pipeline '{}' references a step twice",
        name
      )));
    }

    event!(Level::DEBUG, pipeline = %name, order = ?ordered.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(), "Pipeline validated.");
    Ok(Pipeline { name, steps: ordered })
  }
}

/// Kahn's algorithm; among ready steps the earliest declared goes first.
///
/// On failure returns the declaration indices of the steps that sit on a cycle.
fn topological_order(upstream: &[BTreeSet<usize>]) -> Result<Vec<usize>, Vec<usize>> {
  let n = upstream.len();
  let mut downstream: Vec<Vec<usize>> = vec![Vec::new(); n];
  let mut in_degree: Vec<usize> = vec![0; n];
  for (idx, deps) in upstream.iter().enumerate() {
    in_degree[idx] = deps.len();
    for dep in deps {
      downstream[*dep].push(idx);
    }
  }

  let mut ready: BTreeSet<usize> = (0..n).filter(|idx| in_degree[*idx] == 0).collect();
  let mut order = Vec::with_capacity(n);
  while let Some(idx) = ready.pop_first() {
    order.push(idx);
    for next in &downstream[idx] {
      in_degree[*next] -= 1;
      if in_degree[*next] == 0 {
        ready.insert(*next);
      }
    }
  }

  if order.len() == n {
    return Ok(order);
  }

  // Leftover steps sit on a cycle or downstream of one; only those that reach themselves are on it.
  let remaining: BTreeSet<usize> = (0..n).filter(|idx| in_degree[*idx] > 0).collect();
  let on_cycle = remaining
    .iter()
    .copied()
    .filter(|start| reaches(&downstream, &remaining, *start, *start))
    .collect();
  Err(on_cycle)
}

/// Whether `to` is reachable from `from` by following at least one edge within `within`.
fn reaches(downstream: &[Vec<usize>], within: &BTreeSet<usize>, from: usize, to: usize) -> bool {
  let mut seen: BTreeSet<usize> = BTreeSet::new();
  let mut stack: Vec<usize> = downstream[from].clone();
  while let Some(idx) = stack.pop() {
    if idx == to {
      return true;
    }
    if within.contains(&idx) && seen.insert(idx) {
      stack.extend(downstream[idx].iter().copied());
    }
  }
  false
}

/// A validated pipeline: every input is bound and the steps are in a fixed,
/// dependency-respecting execution order.
pub struct Pipeline {
  pub(crate) name: String,
  pub(crate) steps: Vec<BoundStep>,
}

impl Pipeline {
  pub fn builder(name: impl Into<String>) -> PipelineBuilder {
    PipelineBuilder::new(name)
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// Step names in execution order.
  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  pub fn len(&self) -> usize {
    self.steps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.steps.is_empty()
  }

  pub fn signature(&self, step_name: &str) -> Option<&StepSignature> {
    self.steps.iter().find(|s| s.name == step_name).map(|s| &s.signature)
  }

  /// Names of the steps whose outputs feed `step_name`.
  pub fn upstream_of(&self, step_name: &str) -> KilnResult<Vec<&str>> {
    self
      .steps
      .iter()
      .find(|s| s.name == step_name)
      .map(|s| s.upstream_steps().into_iter().collect())
      .ok_or_else(|| KilnError::UnknownStep {
        step_name: step_name.to_string(),
      })
  }
}

impl std::fmt::Debug for Pipeline {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Pipeline")
      .field("name", &self.name)
      .field("steps", &self.step_names())
      .finish()
  }
}
