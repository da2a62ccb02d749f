// tests/registry_tests.rs
mod common;

use common::*;
use kiln::{Artifact, Kiln, KilnError, Pipeline, RunStatus, StepStatus};
use serial_test::serial;

fn chain(log: &ExecutionLog, name: &str, value: i64) -> Pipeline {
  Pipeline::builder(name)
    .step("seed", source_step(log, "seed", value))
    .step("double", double_step(log, "double"))
    .connect("seed", "value", "double", "x")
    .build()
    .unwrap()
}

#[tokio::test]
#[serial]
async fn test_registry_runs_the_named_pipeline() {
  setup_tracing();
  let log = new_log();
  let registry = Kiln::new();
  registry.register_pipeline(chain(&log, "alpha", 2));
  registry.register_pipeline(chain(&log, "beta", 10));
  assert_eq!(registry.pipeline_names(), vec!["alpha", "beta"]);

  let alpha = registry.run("alpha").await.unwrap();
  assert_eq!(alpha.pipeline_name(), "alpha");
  assert_eq!(*alpha.get_step("double").unwrap().read::<i64>("doubled").unwrap(), 4);

  let beta = registry.run("beta").await.unwrap();
  assert_eq!(*beta.get_step("double").unwrap().read::<i64>("doubled").unwrap(), 20);
}

#[tokio::test]
#[serial]
async fn test_registry_pipeline_not_found() {
  setup_tracing();
  let registry = Kiln::new();
  let result = registry.run("ghost").await;
  assert!(matches!(result, Err(KilnError::PipelineNotFound { ref name }) if name == "ghost"));
  assert!(registry.all_runs().is_empty());
}

#[tokio::test]
#[serial]
async fn test_latest_run_is_the_most_recent() {
  setup_tracing();
  let log = new_log();
  let registry = Kiln::new();
  registry.register_pipeline(chain(&log, "alpha", 1));

  assert!(matches!(registry.latest_run("alpha"), Err(KilnError::RunNotFound { .. })));

  let only = registry.run("alpha").await.unwrap();
  assert_eq!(registry.latest_run("alpha").unwrap().id(), only.id());

  let second = registry.run("alpha").await.unwrap();
  let third = registry.run("alpha").await.unwrap();
  let ids: Vec<_> = registry.runs("alpha").iter().map(|r| r.id()).collect();
  assert_eq!(ids, vec![third.id(), second.id(), only.id()]);
  assert_eq!(registry.latest_run("alpha").unwrap().id(), third.id());
}

#[tokio::test]
#[serial]
async fn test_runs_are_kept_per_pipeline() {
  setup_tracing();
  let log = new_log();
  let registry = Kiln::new();
  registry.register_pipeline(chain(&log, "alpha", 1));
  registry.register_pipeline(chain(&log, "beta", 1));

  registry.run("alpha").await.unwrap();
  let beta = registry.run("beta").await.unwrap();

  assert_eq!(registry.runs("alpha").len(), 1);
  assert_eq!(registry.runs("beta").len(), 1);
  assert_eq!(registry.all_runs().len(), 2);
  assert_eq!(registry.all_runs()[0].id(), beta.id());
  assert_eq!(registry.run_by_id(beta.id()).unwrap().pipeline_name(), "beta");
  assert!(registry.runs("gamma").is_empty());
}

#[tokio::test]
#[serial]
async fn test_run_retention_drops_oldest_runs_of_that_pipeline() {
  setup_tracing();
  let log = new_log();
  let registry = Kiln::with_run_retention(2);
  registry.register_pipeline(chain(&log, "alpha", 1));
  registry.register_pipeline(chain(&log, "beta", 1));

  let first = registry.run("alpha").await.unwrap();
  let beta = registry.run("beta").await.unwrap();
  let second = registry.run("alpha").await.unwrap();
  let third = registry.run("alpha").await.unwrap();

  let ids: Vec<_> = registry.runs("alpha").iter().map(|r| r.id()).collect();
  assert_eq!(ids, vec![third.id(), second.id()]);
  assert!(matches!(registry.run_by_id(first.id()), Err(KilnError::RunNotFound { .. })));
  // Other pipelines' history is untouched.
  assert_eq!(registry.runs("beta").len(), 1);
  assert_eq!(registry.all_runs().len(), 3);
  assert_eq!(registry.latest_run("beta").unwrap().id(), beta.id());

  // The dropped run is still usable by whoever held on to it.
  assert_eq!(*first.get_step("double").unwrap().read::<i64>("doubled").unwrap(), 2);
}

#[tokio::test]
#[serial]
async fn test_zero_retention_still_keeps_the_latest_run() {
  setup_tracing();
  let log = new_log();
  let registry = Kiln::with_run_retention(0);
  registry.register_pipeline(chain(&log, "alpha", 1));

  registry.run("alpha").await.unwrap();
  let latest = registry.run("alpha").await.unwrap();
  assert_eq!(registry.runs("alpha").len(), 1);
  assert_eq!(registry.latest_run("alpha").unwrap().id(), latest.id());
}

#[tokio::test]
#[serial]
async fn test_clear_runs_only_touches_the_named_pipeline() {
  setup_tracing();
  let log = new_log();
  let registry = Kiln::new();
  registry.register_pipeline(chain(&log, "alpha", 1));
  registry.register_pipeline(chain(&log, "beta", 1));
  for _ in 0..3 {
    registry.run("alpha").await.unwrap();
  }
  registry.run("beta").await.unwrap();

  assert_eq!(registry.clear_runs("alpha"), 3);
  assert!(registry.runs("alpha").is_empty());
  assert!(matches!(registry.latest_run("alpha"), Err(KilnError::RunNotFound { .. })));
  assert_eq!(registry.runs("beta").len(), 1);
  assert_eq!(registry.clear_runs("alpha"), 0);

  // The pipeline itself stays registered and can run again.
  registry.run("alpha").await.unwrap();
  assert_eq!(registry.runs("alpha").len(), 1);
}

#[tokio::test]
#[serial]
async fn test_failed_run_is_recorded_and_queryable() {
  setup_tracing();
  let log = new_log();
  let registry = Kiln::new();
  registry.register_pipeline(
    Pipeline::builder("flaky")
      .step("seed", source_step(&log, "seed", 7))
      .step("boom", failing_step(&log, "boom", "flaky failure"))
      .connect("seed", "value", "boom", "x")
      .build()
      .unwrap(),
  );

  let err = registry.run("flaky").await.unwrap_err();
  let KilnError::StepFailed { run_id, step_name, .. } = err else {
    panic!("Expected StepFailed");
  };
  assert_eq!(step_name, "boom");

  let run = registry.run_by_id(run_id).unwrap();
  assert_eq!(run.status(), RunStatus::Failed);
  assert_eq!(registry.latest_run("flaky").unwrap().id(), run_id);
  assert_eq!(*run.get_step("seed").unwrap().read::<i64>("value").unwrap(), 7);
  assert_eq!(run.get_step("boom").unwrap().status(), StepStatus::Failed);
}

#[tokio::test]
#[serial]
async fn test_registering_same_name_replaces_pipeline() {
  setup_tracing();
  let log = new_log();
  let registry = Kiln::new();
  registry.register_pipeline(chain(&log, "alpha", 1));
  registry.register_pipeline(chain(&log, "alpha", 50));
  assert_eq!(registry.pipeline_names(), vec!["alpha"]);

  let run = registry.run("alpha").await.unwrap();
  assert_eq!(*run.get_step("double").unwrap().read::<i64>("doubled").unwrap(), 100);
}

#[tokio::test]
#[serial]
async fn test_step_and_output_queries_report_missing_names() {
  setup_tracing();
  let log = new_log();
  let registry = Kiln::new();
  registry.register_pipeline(chain(&log, "alpha", 3));
  let run = registry.run("alpha").await.unwrap();

  assert!(matches!(run.get_step("nope"), Err(KilnError::StepNotFound { ref step_name, .. }) if step_name == "nope"));
  let double = run.get_step("double").unwrap();
  assert!(matches!(double.output("nope"), Err(KilnError::OutputNotFound { .. })));
  assert!(matches!(
    double.read::<String>("doubled"),
    Err(KilnError::TypeMismatch { ref artifact, .. }) if artifact == "doubled"
  ));
}

#[tokio::test]
#[serial]
async fn test_export_summaries_describes_runs_as_json() {
  setup_tracing();
  let log = new_log();
  let registry = Kiln::new();
  registry.register_pipeline(
    Pipeline::builder("annotated")
      .step("double", double_step(&log, "double"))
      .constant("double", "x", Artifact::new(4_i64).with_metadata("origin", "constant"))
      .build()
      .unwrap(),
  );
  let run = registry.run("annotated").await.unwrap();

  let json = registry.export_summaries("annotated").unwrap();
  let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
  let runs = parsed.as_array().unwrap();
  assert_eq!(runs.len(), 1);
  assert_eq!(runs[0]["id"], run.id().to_string());
  assert_eq!(runs[0]["pipeline"], "annotated");
  assert_eq!(runs[0]["status"], "completed");
  assert_eq!(runs[0]["steps"][0]["name"], "double");
  assert_eq!(runs[0]["steps"][0]["outputs"]["doubled"]["type_name"], "i64");
}
