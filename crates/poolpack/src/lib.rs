//! # poolpack
//!
//! Build pipeline for JavaScript libraries that ship a worker script next to
//! their main module.
//!
//! A run goes through four tasks, in this order:
//!
//! 1. `bundle-worker` bundles the worker entry point.
//! 2. `embed-worker` minifies that bundle and writes it into a generated
//!    module exporting the code as a string.
//! 3. `bundle-main` bundles the main entry point (which imports the generated
//!    module) and prepends the license banner.
//! 4. `minify-main` minifies the main bundle, keeping genuine license
//!    comments, and writes a source map next to it.
//!
//! The bundler and the minifier sit behind the [`Bundler`] and [`Minifier`]
//! traits. [`RolldownBundler`] and [`OxcMinifier`] are the defaults.
//!
//! ```no_run
//! use poolpack::{Pipeline, PipelineConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::load(".", None, &Default::default())?;
//! let pipeline = Pipeline::new(config)?;
//! let report = pipeline.run_default().await?;
//! std::process::exit(report.exit_code());
//! # }
//! ```

pub mod banner;
pub mod bundler;
pub mod config;
pub mod embed;
pub mod entry;
pub mod error;
pub mod metadata;
pub mod minify;
pub mod pipeline;
pub mod task;
pub mod watch;

pub use banner::{Banner, BannerTemplate, Clock, SystemClock};
pub use bundler::{BundleArtifact, BundleError, Bundler, RolldownBundler};
pub use config::{ConfigOverrides, PipelineConfig};
pub use embed::{CodeEmbedder, EmbedError, EmbeddedModule};
pub use entry::{BundleFormat, EntryPoint, EnvironmentProfile, HostGlobal, TargetPlatform};
pub use error::{ConfigError, Error, Result};
pub use minify::{
    CommentPolicy, MinifyError, MinifyOptions, MinifyOutput, Minifier, OxcMinifier,
    RetentionPredicate,
};
pub use pipeline::{Pipeline, PipelineBuilder, task_names};
pub use task::{
    FailurePolicy, Orchestrator, RunContext, RunReport, RunScope, Task, TaskError, TaskGraph,
    TaskNode, TaskState,
};
pub use watch::{FileChange, FileWatcher, Rebuild, RebuildLoop, WatchFilter};
