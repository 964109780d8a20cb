//! End-to-end pipeline runs against a temporary project.

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use common::*;
use poolpack::{
    ConfigError, Error, OxcMinifier, Pipeline, RunScope, TaskError, TaskState, task_names,
};

#[tokio::test]
async fn test_default_run_produces_all_artifacts() {
    let project = Project::new();
    let report = project.pipeline().run_default().await.unwrap();

    assert!(report.is_success(), "{:?}", report.failure);
    assert_eq!(report.exit_code(), 0);
    assert!(report.states.values().all(|s| *s == TaskState::Done));
    assert_eq!(
        report.states.keys().map(String::as_str).collect::<Vec<_>>(),
        vec![
            task_names::BUNDLE_WORKER,
            task_names::EMBED_WORKER,
            task_names::BUNDLE_MAIN,
            task_names::MINIFY_MAIN,
            task_names::DEFAULT,
        ]
    );

    assert_eq!(project.read("dist/worker.js"), WORKER_V1);
    assert!(project.exists("lib/generated/embeddedWorker.js"));
    assert!(project.exists("dist/workerpool.map"));

    let main = project.read("dist/workerpool.js");
    assert!(main.starts_with("/**\n * workerpool.js\n"));
    assert!(main.contains("@version 6.1.0"));
    assert!(main.contains("@date    2024-03-07"));
}

#[tokio::test]
async fn test_embedded_module_wraps_minified_worker() {
    let project = Project::new();
    project.pipeline().run_default().await.unwrap();

    let embedded = project.read("lib/generated/embeddedWorker.js");
    assert!(embedded.starts_with(
        "/**\n * embeddedWorker.js contains an embedded version of worker.js.\n"
    ));
    assert!(embedded.contains("automatically generated"));

    let literal = embedded
        .lines()
        .find_map(|line| line.strip_prefix("module.exports = "))
        .and_then(|rest| rest.strip_suffix(';'))
        .unwrap();
    let code: String = serde_json::from_str(literal).unwrap();
    assert!(code.contains("postMessage"));
    assert!(code.contains("+1"));
    assert!(code.len() < WORKER_V1.len());
}

#[tokio::test]
async fn test_minified_output_keeps_only_rendered_license() {
    let project = Project::new();
    project.pipeline().run_default().await.unwrap();

    let minified = project.read("dist/workerpool.min.js");
    assert!(minified.starts_with("/**\n * workerpool.js\n"));
    assert_eq!(minified.matches("@license").count(), 1);
    assert!(!minified.contains("@@version"));
    assert!(!minified.contains("@@date"));
    assert!(minified.ends_with("\n//# sourceMappingURL=workerpool.map"));

    let map: serde_json::Value =
        serde_json::from_str(&project.read("dist/workerpool.map")).unwrap();
    assert_eq!(map["version"], 3);
}

#[tokio::test]
async fn test_main_bundle_embeds_worker_from_same_run() {
    let project = Project::new();
    let pipeline = project.pipeline();

    pipeline.run_default().await.unwrap();
    let first_embedded = project.read("lib/generated/embeddedWorker.js");
    assert!(project.read("dist/workerpool.js").contains("+1"));

    project.write("lib/worker.js", WORKER_V2);
    pipeline.run_default().await.unwrap();

    let second_embedded = project.read("lib/generated/embeddedWorker.js");
    assert_ne!(first_embedded, second_embedded);
    assert!(second_embedded.contains("+2"));

    let main = project.read("dist/workerpool.js");
    assert!(main.contains("+2"));
    assert!(!main.contains("+1"));
}

#[tokio::test]
async fn test_rerun_without_changes_is_byte_identical() {
    let project = Project::new();
    let pipeline = project.pipeline();

    pipeline.run_default().await.unwrap();
    let embedded = project.read("lib/generated/embeddedWorker.js");
    let minified = project.read("dist/workerpool.min.js");

    pipeline.run_default().await.unwrap();
    assert_eq!(project.read("lib/generated/embeddedWorker.js"), embedded);
    assert_eq!(project.read("dist/workerpool.min.js"), minified);
}

#[tokio::test]
async fn test_banner_rendered_once_per_run() {
    let project = Project::new();
    let clock = Arc::new(TickingClock::new(date(2024, 12, 31)));
    let pipeline = Pipeline::builder(project.config())
        .bundler(Arc::new(FakeBundler::new(&project)))
        .minifier(Arc::new(OxcMinifier::new()))
        .clock(clock.clone())
        .build()
        .unwrap();

    pipeline.run_default().await.unwrap();

    assert_eq!(clock.calls.load(Ordering::SeqCst), 1);
    assert!(project.read("dist/workerpool.js").contains("2024-12-31"));
    assert!(project.read("dist/workerpool.min.js").contains("2024-12-31"));

    pipeline.run_default().await.unwrap();
    assert_eq!(clock.calls.load(Ordering::SeqCst), 2);
    assert!(project.read("dist/workerpool.js").contains("2025-01-01"));
}

#[tokio::test]
async fn test_bundling_error_is_not_fatal() {
    let project = Project::new();
    let bundler = Arc::new(FakeBundler::new(&project));
    let pipeline =
        project.pipeline_with(project.config(), bundler.clone(), Arc::new(OxcMinifier::new()));

    pipeline.run_default().await.unwrap();

    bundler.fail_worker.store(true, Ordering::SeqCst);
    let report = pipeline.run_default().await.unwrap();

    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.state(task_names::BUNDLE_WORKER), Some(TaskState::Done));
    assert_eq!(report.state(task_names::DEFAULT), Some(TaskState::Done));
    // the failure itself, then the stale worker picked up from disk
    assert_eq!(report.warnings.len(), 2);
    assert!(report.warnings[0].contains("Unexpected token"));
    assert!(report.warnings[1].contains("worker.js"));
}

#[tokio::test]
async fn test_strict_mode_makes_bundling_error_fatal() {
    let project = Project::new();
    let bundler = Arc::new(FakeBundler::new(&project));
    bundler.fail_main.store(true, Ordering::SeqCst);

    let mut config = project.config();
    config.strict = true;
    let pipeline = project.pipeline_with(config, bundler, Arc::new(OxcMinifier::new()));

    let report = pipeline.run_default().await.unwrap();

    assert_eq!(report.exit_code(), 1);
    assert_eq!(report.state(task_names::BUNDLE_MAIN), Some(TaskState::Failed));
    assert_eq!(report.state(task_names::MINIFY_MAIN), Some(TaskState::Pending));
    assert!(!project.exists("dist/workerpool.min.js"));
}

#[tokio::test]
async fn test_minification_error_is_fatal() {
    let project = Project::new();
    let pipeline = project.pipeline_with(
        project.config(),
        Arc::new(FakeBundler::new(&project)),
        Arc::new(FailingMainMinifier),
    );

    let report = pipeline.run_default().await.unwrap();

    assert_eq!(report.exit_code(), 1);
    let failure = report.failure.as_ref().unwrap();
    assert_eq!(failure.task, task_names::MINIFY_MAIN);
    assert!(matches!(failure.error, TaskError::Minify(_)));
    assert_eq!(report.state(task_names::DEFAULT), Some(TaskState::Pending));
    // earlier artifacts are not rolled back
    assert!(project.exists("dist/workerpool.js"));
    assert!(!project.exists("dist/workerpool.min.js"));
}

#[tokio::test]
async fn test_missing_template_aborts_before_any_task() {
    let project = Project::new();
    std::fs::remove_file(project.path("lib/header.js")).unwrap();

    let err = project.pipeline().run_default().await.unwrap_err();

    assert!(matches!(
        err,
        Error::Config(ConfigError::TemplateUnreadable { .. })
    ));
    assert!(!project.exists("dist"));
}

#[tokio::test]
async fn test_missing_entry_aborts_before_any_task() {
    let project = Project::new();
    std::fs::remove_file(project.path("index.js")).unwrap();

    let err = project.pipeline().run_default().await.unwrap_err();

    assert!(matches!(err, Error::Config(ConfigError::EntryNotFound(_))));
    assert!(!project.exists("dist"));
}

#[tokio::test]
async fn test_embed_only_run() {
    let project = Project::new();
    let pipeline = project.pipeline();

    let report = pipeline
        .run(&[task_names::EMBED_WORKER], RunScope::WithPrerequisites)
        .await
        .unwrap();
    assert!(report.is_success());
    assert_eq!(report.states.len(), 2);
    assert!(project.exists("lib/generated/embeddedWorker.js"));
    assert!(!project.exists("dist/workerpool.js"));
}

#[tokio::test]
async fn test_no_deps_run_reads_worker_from_disk() {
    let project = Project::new();
    let pipeline = project.pipeline();

    let report = pipeline
        .run(&[task_names::EMBED_WORKER], RunScope::Only)
        .await
        .unwrap();
    assert!(!report.is_success());
    assert!(matches!(
        report.failure.as_ref().unwrap().error,
        TaskError::Read { .. }
    ));

    project.write("dist/worker.js", WORKER_V2);
    let report = pipeline
        .run(&[task_names::EMBED_WORKER], RunScope::Only)
        .await
        .unwrap();
    assert!(report.is_success());
    assert_eq!(report.warnings.len(), 1);
    assert!(project.read("lib/generated/embeddedWorker.js").contains("+2"));
}

#[tokio::test]
async fn test_unknown_task() {
    let project = Project::new();
    let err = project
        .pipeline()
        .run(&["deploy"], RunScope::WithPrerequisites)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Graph(_)));
}
