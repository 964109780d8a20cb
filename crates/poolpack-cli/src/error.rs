//! Error handling for the poolpack CLI.
//!
//! Library errors pass through [`CliError`] unchanged; the variants added
//! here cover what only the CLI knows about, such as a run that finished
//! with a failed task. [`cli_error_to_miette`] turns any of them into a
//! diagnostic for `main`.

mod miette;

use thiserror::Error;

pub use self::miette::cli_error_to_miette;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Errors from the pipeline library (configuration, task graph, watcher)
    #[error(transparent)]
    Pipeline(#[from] poolpack::Error),

    /// A run finished with a fatal task failure
    #[error("Task '{task}' failed: {message}")]
    RunFailed {
        /// Name of the failed task
        task: String,
        /// The task's error
        message: String,
    },

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<poolpack::ConfigError> for CliError {
    fn from(err: poolpack::ConfigError) -> Self {
        CliError::Pipeline(err.into())
    }
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_config_error_converts() {
        let err: CliError = poolpack::ConfigError::EntryNotFound(PathBuf::from("lib/worker.js")).into();
        assert!(matches!(err, CliError::Pipeline(poolpack::Error::Config(_))));
        assert!(err.to_string().contains("lib/worker.js"));
    }

    #[test]
    fn test_run_failed_names_task() {
        let err = CliError::RunFailed {
            task: "minify-main".to_string(),
            message: "Unexpected token".to_string(),
        };
        assert_eq!(err.to_string(), "Task 'minify-main' failed: Unexpected token");
    }
}
