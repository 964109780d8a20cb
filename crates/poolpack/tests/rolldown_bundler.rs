//! Pipeline runs through the real rolldown bundler.

mod common;

use std::sync::Arc;

use common::*;
use poolpack::{OxcMinifier, Rebuild, RolldownBundler};

fn project() -> Project {
    let project = Project::new();
    project.write(
        "index.js",
        &format!(
            "{HEADER}var embeddedWorker = require('./lib/generated/embeddedWorker.js');\nmodule.exports = {{ worker: embeddedWorker }};\n"
        ),
    );
    project
}

#[tokio::test]
async fn test_main_bundle_exposes_global() {
    let project = project();
    let bundler = Arc::new(RolldownBundler::new(project.root()));
    let pipeline = project.pipeline_with(project.config(), bundler, Arc::new(OxcMinifier::new()));

    let report = pipeline.run_default().await.unwrap();
    assert!(report.is_success(), "{:?}", report.failure);

    let main = project.read("dist/workerpool.js");
    assert!(main.starts_with("/**\n * workerpool.js\n"));
    assert!(main.contains("workerpool = factory("), "{main}");
    assert!(main.contains("module.exports"));
    assert!(main.contains("postMessage"));

    // The entry shim lives outside the project.
    assert!(!project.exists("lib/workerpool.entry.mjs"));
    assert!(!project.exists("workerpool.entry.mjs"));
}

#[tokio::test]
async fn test_cached_bundler_picks_up_worker_changes() {
    let project = project();
    let bundler = Arc::new(RolldownBundler::new(project.root()).with_cache(true));
    let pipeline = project.pipeline_with(project.config(), bundler, Arc::new(OxcMinifier::new()));

    let report = pipeline.run_default().await.unwrap();
    assert!(report.is_success(), "{:?}", report.failure);
    assert!(project.read("dist/workerpool.js").contains("+1"));

    project.write("lib/worker.js", WORKER_V2);
    let report = pipeline.rebuild().await.unwrap();
    assert!(report.is_success(), "{:?}", report.failure);

    assert!(project.read("lib/generated/embeddedWorker.js").contains("+2"));

    let main = project.read("dist/workerpool.js");
    assert!(main.contains("+2"), "{main}");
    assert!(!main.contains("+1"));
    assert!(main.contains("workerpool = factory("));
}
