//! The concrete tasks of the pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::bundler::{BundleArtifact, Bundler};
use crate::embed::CodeEmbedder;
use crate::entry::EntryPoint;
use crate::minify::{
    CommentPolicy, MinifyError, MinifyOptions, Minifier, RetentionPredicate,
    append_source_map_reference,
};
use crate::task::{FailurePolicy, RunContext, Task, TaskError};

/// Write `content` to `path`, creating parent directories.
///
/// Returns `false` without touching the file when it already holds exactly
/// `content`.
pub async fn write_artifact(path: &Path, content: &str) -> Result<bool, TaskError> {
    let write_err = |source: std::io::Error| TaskError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Ok(existing) = tokio::fs::read(path).await {
        if existing == content.as_bytes() {
            debug!(path = %path.display(), "unchanged, skipping write");
            return Ok(false);
        }
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }
    tokio::fs::write(path, content).await.map_err(write_err)?;
    Ok(true)
}

/// Artifact produced earlier in the run, or the copy on disk.
///
/// Falling back to disk means the artifact may come from an earlier run, so
/// the fallback is reported as a warning naming the path.
async fn current_or_on_disk(
    ctx: &RunContext,
    key: &str,
    path: &Path,
) -> Result<BundleArtifact, TaskError> {
    if let Some(artifact) = ctx.artifact(key) {
        return Ok(artifact);
    }

    ctx.warn(format!(
        "{key} was not bundled in this run, using {} from disk",
        path.display()
    ));
    let code = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| TaskError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(BundleArtifact::new(path, code))
}

/// Bundles one entry point and writes the result.
pub struct BundleTask {
    entry: EntryPoint,
    bundler: Arc<dyn Bundler>,
    with_banner: bool,
}

impl BundleTask {
    pub fn new(entry: EntryPoint, bundler: Arc<dyn Bundler>) -> Self {
        Self {
            entry,
            bundler,
            with_banner: false,
        }
    }

    /// Prepend the run's banner to the bundle.
    pub fn with_banner(mut self) -> Self {
        self.with_banner = true;
        self
    }
}

#[async_trait]
impl Task for BundleTask {
    fn policy(&self) -> FailurePolicy {
        FailurePolicy::BestEffort
    }

    async fn run(&self, ctx: &RunContext) -> Result<(), TaskError> {
        let banner = self.with_banner.then(|| ctx.banner());
        let artifact = self.bundler.bundle(&self.entry, banner).await?;

        write_artifact(&artifact.path, &artifact.code).await?;
        info!(path = %artifact.path.display(), "bundled");

        ctx.put_artifact(self.entry.name.clone(), artifact);
        Ok(())
    }
}

/// Minifies the worker bundle into the embedded module.
pub struct EmbedTask {
    embedder: CodeEmbedder,
    worker_key: String,
    worker_output: PathBuf,
}

impl EmbedTask {
    pub fn new(embedder: CodeEmbedder, worker: &EntryPoint) -> Self {
        Self {
            embedder,
            worker_key: worker.name.clone(),
            worker_output: worker.output.clone(),
        }
    }
}

#[async_trait]
impl Task for EmbedTask {
    async fn run(&self, ctx: &RunContext) -> Result<(), TaskError> {
        let worker = current_or_on_disk(ctx, &self.worker_key, &self.worker_output).await?;
        let module = self.embedder.embed(&worker).await?;

        let written = write_artifact(&module.path, &module.content).await?;
        info!(path = %module.path.display(), written, "embedded worker");
        Ok(())
    }
}

/// Minifies the main bundle, keeping license comments, and writes the
/// minified file and its source map.
pub struct MinifyTask {
    main_key: String,
    main_output: PathBuf,
    output: PathBuf,
    source_map: PathBuf,
    source_map_name: String,
    predicate: RetentionPredicate,
    minifier: Arc<dyn Minifier>,
}

impl MinifyTask {
    pub fn new(
        main: &EntryPoint,
        output: impl Into<PathBuf>,
        source_map: impl Into<PathBuf>,
        predicate: RetentionPredicate,
        minifier: Arc<dyn Minifier>,
    ) -> Self {
        let source_map = source_map.into();
        let source_map_name = crate::entry::file_name(&source_map);
        Self {
            main_key: main.name.clone(),
            main_output: main.output.clone(),
            output: output.into(),
            source_map,
            source_map_name,
            predicate,
            minifier,
        }
    }
}

#[async_trait]
impl Task for MinifyTask {
    async fn run(&self, ctx: &RunContext) -> Result<(), TaskError> {
        let main = current_or_on_disk(ctx, &self.main_key, &self.main_output).await?;

        let options = MinifyOptions::default()
            .with_comments(CommentPolicy::Retain(self.predicate.clone()))
            .with_source_map(crate::entry::file_name(&self.main_output));
        let minified = self.minifier.minify(&main.code, &options).await?;

        let map = minified.map.ok_or_else(|| {
            MinifyError::SourceMap(format!(
                "no source map produced for {}",
                self.output.display()
            ))
        })?;
        let code = append_source_map_reference(&minified.code, &self.source_map_name);

        write_artifact(&self.output, &code).await?;
        info!(path = %self.output.display(), "minified");
        write_artifact(&self.source_map, &map).await?;
        info!(path = %self.source_map.display(), "mapped");
        Ok(())
    }
}
