// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use kiln::{FnStep, StepInputs, StepOutputs, StepSignature};
use parking_lot::Mutex;
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use tracing::Level;

// --- Shared execution log: step bodies append their name when they run ---
pub type ExecutionLog = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> ExecutionLog {
  Arc::new(Mutex::new(Vec::new()))
}

// --- Common Error Type for Tests ---
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("Test step failed: {0}")]
  Step(String),
}

// --- Common Step Creators ---

/// No inputs; outputs `value` = `value`.
pub fn source_step(log: &ExecutionLog, step_name: &'static str, value: i64) -> FnStep {
  let log = log.clone();
  FnStep::new(StepSignature::new().output("value"), move |_inputs: StepInputs| {
    let log = log.clone();
    async move {
      log.lock().push(step_name.to_string());
      HANDLER_EXEC_COUNTER.fetch_add(1, Ordering::SeqCst);
      tracing::debug!(target: "test_steps", step = step_name, value, "source executed");
      Ok::<_, anyhow::Error>(StepOutputs::new().with("value", value))
    }
  })
}

/// Inputs `a`, `b` (i64); outputs `sum`.
pub fn add_step(log: &ExecutionLog, step_name: &'static str) -> FnStep {
  let log = log.clone();
  FnStep::new(
    StepSignature::new().input("a").input("b").output("sum"),
    move |inputs: StepInputs| {
      let log = log.clone();
      async move {
        let a = inputs.get::<i64>("a")?;
        let b = inputs.get::<i64>("b")?;
        log.lock().push(step_name.to_string());
        HANDLER_EXEC_COUNTER.fetch_add(1, Ordering::SeqCst);
        Ok::<_, anyhow::Error>(StepOutputs::new().with("sum", *a + *b))
      }
    },
  )
}

/// Input `x` (i64); outputs `doubled`.
pub fn double_step(log: &ExecutionLog, step_name: &'static str) -> FnStep {
  let log = log.clone();
  FnStep::new(
    StepSignature::new().input("x").output("doubled"),
    move |inputs: StepInputs| {
      let log = log.clone();
      async move {
        let x = inputs.get::<i64>("x")?;
        log.lock().push(step_name.to_string());
        HANDLER_EXEC_COUNTER.fetch_add(1, Ordering::SeqCst);
        Ok::<_, anyhow::Error>(StepOutputs::new().with("doubled", *x * 2))
      }
    },
  )
}

/// Input `x`; always fails with `TestError::Step(message)`.
pub fn failing_step(log: &ExecutionLog, step_name: &'static str, message: &'static str) -> FnStep {
  let log = log.clone();
  FnStep::new(
    StepSignature::new().input("x").output("never"),
    move |_inputs: StepInputs| {
      let log = log.clone();
      async move {
        log.lock().push(step_name.to_string());
        tracing::warn!(target: "test_steps", step = step_name, "failing with: '{}'", message);
        Err::<StepOutputs, _>(TestError::Step(message.to_string()))
      }
    },
  )
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Atomic counter for checking execution counts ---
pub static HANDLER_EXEC_COUNTER: Lazy<Arc<AtomicUsize>> = Lazy::new(|| Arc::new(AtomicUsize::new(0)));

pub fn reset_counters() {
  HANDLER_EXEC_COUNTER.store(0, Ordering::SeqCst);
}

pub fn exec_count() -> usize {
  HANDLER_EXEC_COUNTER.load(Ordering::SeqCst)
}
