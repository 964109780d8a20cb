//! Shared utilities for command implementations.

use std::path::{Path, PathBuf};

use poolpack::{ConfigOverrides, Pipeline, PipelineConfig, RunReport};
use tracing::debug;

use crate::cli::ProjectArgs;
use crate::error::{CliError, Result};
use crate::ui;

/// Resolve a path relative to a working directory.
pub fn resolve_path(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// The project root named by `--cwd`, or the current directory.
///
/// The root is canonicalized so that it compares equal to the paths the
/// file watcher reports.
pub fn project_root(project: &ProjectArgs) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    let root = match &project.cwd {
        Some(dir) => resolve_path(dir, &cwd),
        None => cwd,
    };

    if !root.is_dir() {
        return Err(CliError::InvalidArgument(format!(
            "Project root is not a directory: {}",
            root.display()
        )));
    }

    Ok(root.canonicalize()?)
}

pub fn overrides(project: &ProjectArgs) -> ConfigOverrides {
    ConfigOverrides {
        strict: project.strict.then_some(true),
        cache: project.no_cache.then_some(false),
    }
}

/// Load the configuration and assemble the pipeline with its default adapters.
pub fn load_pipeline(project: &ProjectArgs) -> Result<Pipeline> {
    let root = project_root(project)?;
    debug!(root = %root.display(), config = ?project.config, "loading configuration");
    let config = PipelineConfig::load(&root, project.config.as_deref(), &overrides(project))?;
    Ok(Pipeline::new(config)?)
}

/// Print the warnings and outcome of a run.
///
/// A run that stopped on a fatal task failure becomes [`CliError::RunFailed`].
pub fn report_run(report: &RunReport) -> Result<()> {
    for warning in &report.warnings {
        ui::warning(warning);
    }

    match &report.failure {
        Some(failure) => Err(CliError::RunFailed {
            task: failure.task.clone(),
            message: failure.error.to_string(),
        }),
        None => {
            let completed = report.completed().count();
            ui::success(&format!(
                "Finished {} task{} in {}",
                completed,
                if completed == 1 { "" } else { "s" },
                ui::format_duration(report.duration)
            ));
            Ok(())
        }
    }
}

/// Every distributable the configuration names, relative to the root where
/// possible, with its size if it exists.
pub fn artifacts(config: &PipelineConfig) -> Vec<(String, Option<u64>)> {
    [
        &config.worker.output,
        &config.embedded_module,
        &config.main.output,
        &config.minified.output,
        &config.minified.source_map,
    ]
    .into_iter()
    .map(|path| {
        let name = path.strip_prefix(&config.root).unwrap_or(path.as_path());
        let size = std::fs::metadata(path).ok().map(|m| m.len());
        (name.display().to_string(), size)
    })
    .collect()
}
