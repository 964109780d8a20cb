//! Shared fixtures for pipeline integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use poolpack::{
    Banner, BundleArtifact, BundleError, Bundler, Clock, EntryPoint, MinifyError, MinifyOptions,
    MinifyOutput, Minifier, OxcMinifier, Pipeline, PipelineConfig,
};
use tempfile::TempDir;

pub const HEADER: &str = "/**\n * workerpool.js\n * https://github.com/josdejong/workerpool\n *\n * @version @@version\n * @date    @@date\n *\n * @license\n * Licensed under the Apache License, Version 2.0.\n */\n";

pub const WORKER_V1: &str =
    "self.onmessage = function (event) {\n  self.postMessage(event.data + 1);\n};\n";
pub const WORKER_V2: &str =
    "self.onmessage = function (event) {\n  self.postMessage(event.data + 2);\n};\n";

/// A project laid out the way the default configuration expects.
pub struct Project {
    pub dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let project = Self { dir };
        project.write("package.json", r#"{"name": "workerpool", "version": "6.1.0"}"#);
        project.write("lib/header.js", HEADER);
        project.write("lib/worker.js", WORKER_V1);
        // The main source carries its own copy of the unrendered header.
        project.write(
            "index.js",
            &format!(
                "{HEADER}var pool = {{ worker: embeddedWorker }};\nmodule.exports = pool;\n"
            ),
        );
        project
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).unwrap()
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.path(relative).exists()
    }

    pub fn config(&self) -> PipelineConfig {
        PipelineConfig::for_root(self.root())
    }

    /// Pipeline with the fake bundler and the real minifier.
    pub fn pipeline(&self) -> Pipeline {
        self.pipeline_with(self.config(), Arc::new(FakeBundler::new(self)), Arc::new(OxcMinifier::new()))
    }

    pub fn pipeline_with(
        &self,
        config: PipelineConfig,
        bundler: Arc<dyn Bundler>,
        minifier: Arc<dyn Minifier>,
    ) -> Pipeline {
        Pipeline::builder(config)
            .bundler(bundler)
            .minifier(minifier)
            .clock(Arc::new(FixedClock(date(2024, 3, 7))))
            .build()
            .unwrap()
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Advances one day on every call.
pub struct TickingClock {
    start: NaiveDate,
    pub calls: AtomicUsize,
}

impl TickingClock {
    pub fn new(start: NaiveDate) -> Self {
        Self {
            start,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Clock for TickingClock {
    fn today(&self) -> NaiveDate {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.start.checked_add_days(Days::new(n as u64)).unwrap()
    }
}

/// Stand-in for a real bundler.
///
/// The worker bundle is the worker source. The main bundle inlines the
/// embedded module as it is on disk at bundling time, followed by the main
/// source, the way a bundler resolves the import.
pub struct FakeBundler {
    embedded_module: PathBuf,
    main_entry: String,
    pub fail_worker: AtomicBool,
    pub fail_main: AtomicBool,
    pub calls: AtomicUsize,
}

impl FakeBundler {
    pub fn new(project: &Project) -> Self {
        let config = project.config();
        Self {
            embedded_module: config.embedded_module,
            main_entry: config.main.name,
            fail_worker: AtomicBool::new(false),
            fail_main: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Bundler for FakeBundler {
    async fn bundle(
        &self,
        entry: &EntryPoint,
        banner: Option<&Banner>,
    ) -> Result<BundleArtifact, BundleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let is_main = entry.name == self.main_entry;
        let failing = if is_main {
            &self.fail_main
        } else {
            &self.fail_worker
        };
        if failing.load(Ordering::SeqCst) {
            return Err(BundleError::Build {
                entry: entry.name.clone(),
                message: "Unexpected token (1:5)".to_string(),
            });
        }

        let source = tokio::fs::read_to_string(&entry.input)
            .await
            .map_err(|e| BundleError::build(entry, &e))?;

        let code = if is_main {
            let embedded = tokio::fs::read_to_string(&self.embedded_module)
                .await
                .map_err(|e| BundleError::build(entry, &e))?;
            format!(
                "var embeddedWorker = (function () {{\nvar module = {{ exports: {{}} }};\n{embedded}return module.exports;\n}})();\n{source}"
            )
        } else {
            source
        };

        let code = match banner {
            Some(banner) => banner.prepend_to(&code),
            None => code,
        };
        Ok(BundleArtifact::new(entry.output.clone(), code))
    }
}

/// Minifier that fails for the main bundle (the only call with a source map)
/// and delegates everything else.
pub struct FailingMainMinifier;

#[async_trait]
impl Minifier for FailingMainMinifier {
    async fn minify(
        &self,
        source: &str,
        options: &MinifyOptions,
    ) -> Result<MinifyOutput, MinifyError> {
        if options.source_map.is_some() {
            return Err(MinifyError::Parse {
                message: "Unexpected token".to_string(),
            });
        }
        OxcMinifier::new().minify(source, options).await
    }
}
