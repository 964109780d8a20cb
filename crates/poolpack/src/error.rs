//! Error types shared across the pipeline.
//!
//! Adapter-specific errors live next to their adapter ([`BundleError`],
//! [`MinifyError`], [`EmbedError`]); task failures wrap them in
//! [`TaskError`]. This module holds the configuration errors, which are
//! raised before any task runs, and the top-level [`Error`].
//!
//! [`BundleError`]: crate::bundler::BundleError
//! [`MinifyError`]: crate::minify::MinifyError
//! [`EmbedError`]: crate::embed::EmbedError
//! [`TaskError`]: crate::task::TaskError

use std::path::PathBuf;
use thiserror::Error;

use crate::task::GraphError;

/// Configuration errors.
///
/// All of these are fatal and abort a run before the first task starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The banner template could not be read.
    #[error("Banner template not readable: {}\n\nHint: Check the 'banner.template' path", .path.display())]
    TemplateUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An entry point source file does not exist.
    #[error("Entry point not found: {}\n\nHint: Check the 'input' field of the entry", .0.display())]
    EntryNotFound(PathBuf),

    /// The package manifest could not be read.
    #[error("Package manifest not readable: {}", .path.display())]
    ManifestUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The package manifest is not valid JSON or has no version.
    #[error("Invalid package manifest {}: {reason}", .path.display())]
    ManifestInvalid { path: PathBuf, reason: String },

    /// A glob or regular expression failed to compile.
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Invalid value for a configuration option.
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        field: String,
        value: String,
        hint: String,
    },

    /// Layered configuration could not be extracted.
    #[error("Failed to load configuration: {0}")]
    Load(String),
}

/// Top-level error for pipeline operations.
///
/// Task failures are not represented here: they are reported through
/// [`RunReport`](crate::task::RunReport) so that the caller sees which task
/// failed and what state every other task reached.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Task graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),
}

/// Result type alias for pipeline operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
