//! The build pipeline.
//!
//! [`Pipeline`] owns the configuration, the adapters and the task graph:
//!
//! ```text
//! bundle-worker -> embed-worker -> bundle-main -> minify-main
//!                                       \              /
//!                                        +- default --+
//! ```
//!
//! Every run renders the banner once, before the first task starts, and
//! passes it to the tasks through a fresh [`RunContext`].

mod tasks;

pub use tasks::{BundleTask, EmbedTask, MinifyTask, write_artifact};

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::banner::{BannerTemplate, Clock, SystemClock};
use crate::bundler::{Bundler, RolldownBundler};
use crate::config::PipelineConfig;
use crate::embed::CodeEmbedder;
use crate::error::{ConfigError, Result};
use crate::metadata::PackageMetadata;
use crate::minify::{Minifier, OxcMinifier, RetentionPredicate};
use crate::task::{Orchestrator, RunContext, RunReport, RunScope, TaskGraph, TaskNode};
use crate::watch::Rebuild;

/// Names of the pipeline tasks.
pub mod task_names {
    pub const BUNDLE_WORKER: &str = "bundle-worker";
    pub const EMBED_WORKER: &str = "embed-worker";
    pub const BUNDLE_MAIN: &str = "bundle-main";
    pub const MINIFY_MAIN: &str = "minify-main";
    pub const DEFAULT: &str = "default";
}

use task_names::*;

/// Configured build pipeline.
pub struct Pipeline {
    config: Arc<PipelineConfig>,
    orchestrator: Orchestrator,
    clock: Arc<dyn Clock>,
}

/// Builder for [`Pipeline`], used to swap adapters.
pub struct PipelineBuilder {
    config: PipelineConfig,
    bundler: Option<Arc<dyn Bundler>>,
    minifier: Option<Arc<dyn Minifier>>,
    clock: Option<Arc<dyn Clock>>,
}

impl PipelineBuilder {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            bundler: None,
            minifier: None,
            clock: None,
        }
    }

    pub fn bundler(mut self, bundler: Arc<dyn Bundler>) -> Self {
        self.bundler = Some(bundler);
        self
    }

    pub fn minifier(mut self, minifier: Arc<dyn Minifier>) -> Self {
        self.minifier = Some(minifier);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<Pipeline> {
        let config = self.config;
        config.validate()?;

        let bundler = self.bundler.unwrap_or_else(|| {
            Arc::new(RolldownBundler::new(config.root.clone()).with_cache(config.cache))
        });
        let minifier = self
            .minifier
            .unwrap_or_else(|| Arc::new(OxcMinifier::new()));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        let graph = task_graph(&config, bundler, minifier)?;
        Ok(Pipeline {
            config: Arc::new(config),
            orchestrator: Orchestrator::new(graph)?,
            clock,
        })
    }
}

fn task_graph(
    config: &PipelineConfig,
    bundler: Arc<dyn Bundler>,
    minifier: Arc<dyn Minifier>,
) -> Result<TaskGraph> {
    let predicate = RetentionPredicate::new(
        &config.comments.license_marker,
        [
            config.banner.date_placeholder.clone(),
            config.banner.version_placeholder.clone(),
            config.filename_marker(),
        ],
    )?;
    let embedder = CodeEmbedder::new(
        Arc::clone(&minifier),
        config.embedded_module.clone(),
        config.worker.output_file_name(),
    );

    let mut graph = TaskGraph::new();
    graph.add(
        TaskNode::new(
            BUNDLE_WORKER,
            Arc::new(BundleTask::new(config.worker.clone(), Arc::clone(&bundler))),
        )
        .describe("Bundle the worker entry point"),
    )?;
    graph.add(
        TaskNode::new(
            EMBED_WORKER,
            Arc::new(EmbedTask::new(embedder, &config.worker)),
        )
        .after([BUNDLE_WORKER])
        .describe("Minify the worker bundle into the embedded module"),
    )?;
    graph.add(
        TaskNode::new(
            BUNDLE_MAIN,
            Arc::new(BundleTask::new(config.main.clone(), bundler).with_banner()),
        )
        .after([EMBED_WORKER])
        .describe("Bundle the main entry point with the license banner"),
    )?;
    graph.add(
        TaskNode::new(
            MINIFY_MAIN,
            Arc::new(MinifyTask::new(
                &config.main,
                config.minified.output.clone(),
                config.minified.source_map.clone(),
                predicate,
                minifier,
            )),
        )
        .after([BUNDLE_MAIN])
        .describe("Minify the main bundle and write its source map"),
    )?;
    graph.add(
        TaskNode::aggregate(DEFAULT)
            .after([BUNDLE_MAIN, MINIFY_MAIN])
            .describe("Run the full pipeline"),
    )?;
    Ok(graph)
}

impl Pipeline {
    /// Pipeline with the default adapters.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        PipelineBuilder::new(config).build()
    }

    pub fn builder(config: PipelineConfig) -> PipelineBuilder {
        PipelineBuilder::new(config)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn graph(&self) -> &TaskGraph {
        self.orchestrator.graph()
    }

    /// Check inputs and render the banner for a run of `plan`.
    ///
    /// Every failure here is a configuration error and no task has run yet.
    pub async fn prepare(&self, plan: &[String]) -> Result<RunContext, ConfigError> {
        let config = &self.config;
        for (task, entry) in [(BUNDLE_WORKER, &config.worker), (BUNDLE_MAIN, &config.main)] {
            if plan.iter().any(|name| name == task) && !is_file(&entry.input).await {
                return Err(ConfigError::EntryNotFound(entry.input.clone()));
            }
        }

        let template = BannerTemplate::load(&config.banner.template)
            .await?
            .with_placeholders(
                config.banner.date_placeholder.clone(),
                config.banner.version_placeholder.clone(),
            );
        let metadata = PackageMetadata::read(&config.package).await?;
        let banner = template.render_now(&metadata.version, self.clock.as_ref());

        Ok(RunContext::new(banner).with_strict(config.strict))
    }

    /// Run `targets`, with or without their prerequisites.
    pub async fn run(&self, targets: &[&str], scope: RunScope) -> Result<RunReport> {
        let plan = self.orchestrator.plan(targets, scope)?;
        let ctx = self.prepare(&plan).await?;

        info!(tasks = %plan.join(", "), strict = ctx.is_strict(), "starting run");
        Ok(self.orchestrator.run(targets, scope, &ctx).await?)
    }

    /// Run the default pipeline.
    pub async fn run_default(&self) -> Result<RunReport> {
        self.run(&[DEFAULT], RunScope::WithPrerequisites).await
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

#[async_trait]
impl Rebuild for Pipeline {
    async fn rebuild(&self) -> Result<RunReport> {
        self.run_default().await
    }
}
