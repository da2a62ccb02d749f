// tests/error_handling_tests.rs
mod common;
use common::*;
use kiln::{Artifact, FnStep, Kiln, KilnError, Pipeline, StepInputs, StepOutputs, StepSignature};
use serial_test::serial;

// A step body that propagates a KilnError through anyhow gets it back intact on conversion.
#[test]
fn test_anyhow_roundtrip_preserves_kiln_error() {
  setup_tracing();
  let original = KilnError::InvalidSplit("bad ratio".to_string());
  let wrapped: anyhow::Error = original.into();
  let back: KilnError = wrapped.into();
  assert!(matches!(back, KilnError::InvalidSplit(ref msg) if msg == "bad ratio"));
}

#[test]
fn test_foreign_anyhow_error_becomes_handler_error() {
  setup_tracing();
  let err: KilnError = anyhow::anyhow!("disk on fire").into();
  match err {
    KilnError::HandlerError { source } => assert_eq!(source.to_string(), "disk on fire"),
    other => panic!("Expected HandlerError, got {:?}", other),
  }
}

#[test]
fn test_step_name_attribution() {
  setup_tracing();
  let err = KilnError::UnresolvedInput {
    step_name: "facets".to_string(),
    input: "right".to_string(),
  };
  assert_eq!(err.step_name(), Some("facets"));
  assert!(err.to_string().contains("'right'"));
  assert_eq!(KilnError::Internal("x".to_string()).step_name(), None);

  let cycle = KilnError::CyclicDependency {
    pipeline: "p".to_string(),
    steps: vec!["a".to_string(), "b".to_string()],
  };
  assert!(cycle.to_string().ends_with("a, b"));
}

#[tokio::test]
#[serial]
async fn test_step_error_keeps_its_original_type() {
  setup_tracing();
  let log = new_log();
  let pipeline = Pipeline::builder("typed_failure")
    .step("boom", failing_step(&log, "boom", "typed"))
    .constant("boom", "x", Artifact::new(0_i64))
    .build()
    .unwrap();

  let err = pipeline.run().await.unwrap_err();
  let source = match &err {
    KilnError::StepFailed { source, .. } => source,
    other => panic!("Expected StepFailed, got {:?}", other),
  };
  assert_eq!(source.downcast_ref::<TestError>(), Some(&TestError::Step("typed".to_string())));
  // std::error::Error::source exposes the same cause.
  let cause = std::error::Error::source(&err).unwrap();
  assert_eq!(cause.to_string(), "Test step failed: typed");
}

#[tokio::test]
#[serial]
async fn test_missing_input_lookup_in_step_body() {
  setup_tracing();
  // Asks for an input it never declared; the lookup error propagates out of the body.
  let confused = FnStep::new(StepSignature::new().output("out"), |inputs: StepInputs| async move {
    let value = inputs.get::<i64>("ghost")?;
    Ok::<_, anyhow::Error>(StepOutputs::new().with("out", *value))
  });
  let registry = Kiln::new();
  registry.register_pipeline(Pipeline::builder("confused").step("confused", confused).build().unwrap());

  let err = registry.run("confused").await.unwrap_err();
  let KilnError::StepFailed { source, step_name, .. } = err else {
    panic!("Expected StepFailed");
  };
  assert_eq!(step_name, "confused");
  assert!(matches!(
    source.downcast_ref::<KilnError>(),
    Some(KilnError::InputNotFound { input, .. }) if input == "ghost"
  ));
}
