// tests/pipeline_definition_tests.rs
mod common;

use common::*;
use kiln::{Artifact, KilnError, Pipeline};

#[test]
fn test_build_orders_steps_by_dependency_not_declaration() {
  setup_tracing();
  let log = new_log();
  // Declared consumer-first; the builder must still schedule producers before it.
  let pipeline = Pipeline::builder("ordering")
    .step("sum", add_step(&log, "sum"))
    .step("left", source_step(&log, "left", 1))
    .step("right", source_step(&log, "right", 2))
    .connect("left", "value", "sum", "a")
    .connect("right", "value", "sum", "b")
    .build()
    .unwrap();

  assert_eq!(pipeline.step_names(), vec!["left", "right", "sum"]);
  assert_eq!(pipeline.len(), 3);
  assert_eq!(pipeline.upstream_of("sum").unwrap(), vec!["left", "right"]);

  let sum = pipeline.signature("sum").unwrap();
  assert_eq!(sum.inputs, vec!["a", "b"]);
  assert_eq!(sum.outputs, vec!["sum"]);
  assert!(pipeline.signature("left").unwrap().inputs.is_empty());
  assert!(pipeline.signature("nope").is_none());
  assert!(pipeline.upstream_of("left").unwrap().is_empty());
}

#[test]
fn test_unbound_input_fails_before_execution() {
  setup_tracing();
  let log = new_log();
  let result = Pipeline::builder("unbound")
    .step("left", source_step(&log, "left", 1))
    .step("sum", add_step(&log, "sum"))
    .connect("left", "value", "sum", "a")
    .build();

  match result {
    Err(KilnError::UnresolvedInput { step_name, input }) => {
      assert_eq!(step_name, "sum");
      assert_eq!(input, "b");
    }
    other => panic!("Expected UnresolvedInput, got {:?}", other.map(|p| p.step_names().join(","))),
  }
  // Nothing ran.
  assert!(log.lock().is_empty());
}

#[test]
fn test_input_bound_twice_is_rejected() {
  setup_tracing();
  let log = new_log();
  let result = Pipeline::builder("double_bound")
    .step("left", source_step(&log, "left", 1))
    .step("twice", double_step(&log, "twice"))
    .connect("left", "value", "twice", "x")
    .constant("twice", "x", Artifact::new(5_i64))
    .build();

  assert!(matches!(
    result,
    Err(KilnError::DuplicateBinding { ref step_name, ref input }) if step_name == "twice" && input == "x"
  ));
}

#[test]
fn test_unknown_names_are_rejected() {
  setup_tracing();
  let log = new_log();

  let unknown_step = Pipeline::builder("p")
    .step("left", source_step(&log, "left", 1))
    .step("twice", double_step(&log, "twice"))
    .connect("missing", "value", "twice", "x")
    .build();
  assert!(matches!(unknown_step, Err(KilnError::UnknownStep { ref step_name }) if step_name == "missing"));

  let unknown_output = Pipeline::builder("p")
    .step("left", source_step(&log, "left", 1))
    .step("twice", double_step(&log, "twice"))
    .connect("left", "nope", "twice", "x")
    .build();
  assert!(matches!(unknown_output, Err(KilnError::UnknownOutput { ref output, .. }) if output == "nope"));

  let unknown_input = Pipeline::builder("p")
    .step("left", source_step(&log, "left", 1))
    .step("twice", double_step(&log, "twice"))
    .connect("left", "value", "twice", "y")
    .build();
  assert!(matches!(unknown_input, Err(KilnError::UnknownInput { ref input, .. }) if input == "y"));
}

#[test]
fn test_duplicate_step_names_are_rejected() {
  setup_tracing();
  let log = new_log();
  let result = Pipeline::builder("dupes")
    .step("left", source_step(&log, "left", 1))
    .step("left", source_step(&log, "left", 2))
    .build();
  assert!(matches!(result, Err(KilnError::DuplicateStep { ref step_name, .. }) if step_name == "left"));
}

#[test]
fn test_cycle_is_rejected_and_reports_only_cycle_members() {
  setup_tracing();
  let log = new_log();
  // a -> b -> a is a cycle; c hangs off b and is not part of it.
  let result = Pipeline::builder("cyclic")
    .step("a", double_step(&log, "a"))
    .step("b", double_step(&log, "b"))
    .step("c", double_step(&log, "c"))
    .connect("a", "doubled", "b", "x")
    .connect("b", "doubled", "a", "x")
    .connect("b", "doubled", "c", "x")
    .build();

  match result {
    Err(KilnError::CyclicDependency { pipeline, steps }) => {
      assert_eq!(pipeline, "cyclic");
      assert_eq!(steps, vec!["a", "b"]);
    }
    other => panic!("Expected CyclicDependency, got {:?}", other.map(|p| p.step_names().join(","))),
  }
}

#[test]
fn test_step_bridging_two_cycles_is_not_reported() {
  setup_tracing();
  let log = new_log();
  // a <-> b and c <-> d are cycles; x only carries b's output into c.
  let result = Pipeline::builder("two_cycles")
    .step("a", double_step(&log, "a"))
    .step("b", double_step(&log, "b"))
    .step("x", double_step(&log, "x"))
    .step("c", add_step(&log, "c"))
    .step("d", double_step(&log, "d"))
    .connect("a", "doubled", "b", "x")
    .connect("b", "doubled", "a", "x")
    .connect("b", "doubled", "x", "x")
    .connect("x", "doubled", "c", "a")
    .connect("d", "doubled", "c", "b")
    .connect("c", "sum", "d", "x")
    .build();

  match result {
    Err(KilnError::CyclicDependency { steps, .. }) => assert_eq!(steps, vec!["a", "b", "c", "d"]),
    other => panic!("Expected CyclicDependency, got {:?}", other.map(|p| p.step_names().join(","))),
  }
}

#[test]
fn test_self_edge_is_a_cycle() {
  setup_tracing();
  let log = new_log();
  let result = Pipeline::builder("self_loop")
    .step("a", double_step(&log, "a"))
    .connect("a", "doubled", "a", "x")
    .build();
  assert!(matches!(result, Err(KilnError::CyclicDependency { ref steps, .. }) if steps == &vec!["a".to_string()]));
}

#[test]
fn test_constant_binding_resolves_input() {
  setup_tracing();
  let log = new_log();
  let pipeline = Pipeline::builder("constants")
    .step("twice", double_step(&log, "twice"))
    .constant("twice", "x", Artifact::new(21_i64))
    .build()
    .unwrap();
  assert_eq!(pipeline.step_names(), vec!["twice"]);
  assert!(pipeline.upstream_of("twice").unwrap().is_empty());
  assert!(matches!(pipeline.upstream_of("nope"), Err(KilnError::UnknownStep { .. })));
}
