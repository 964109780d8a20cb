//! Minifier adapter.
//!
//! Minification is used twice per run: once on the worker bundle before it is
//! embedded (no comments, no source map) and once on the main bundle (license
//! comments kept, source map emitted). Both go through the [`Minifier`]
//! trait. [`OxcMinifier`] is the production implementation.

mod oxc;
mod retention;

pub use self::oxc::OxcMinifier;
pub use self::retention::{CommentPolicy, RetentionPredicate};

use async_trait::async_trait;
use thiserror::Error;

/// Options for one minification.
#[derive(Debug, Clone)]
pub struct MinifyOptions {
    pub comments: CommentPolicy,
    /// File name recorded in the source map. `None` skips the map.
    pub source_map: Option<String>,
    pub compress: bool,
    pub mangle: bool,
}

impl Default for MinifyOptions {
    fn default() -> Self {
        Self {
            comments: CommentPolicy::DropAll,
            source_map: None,
            compress: true,
            mangle: true,
        }
    }
}

impl MinifyOptions {
    pub fn with_comments(mut self, comments: CommentPolicy) -> Self {
        self.comments = comments;
        self
    }

    pub fn with_source_map(mut self, file: impl Into<String>) -> Self {
        self.source_map = Some(file.into());
        self
    }
}

/// Minified code and, if requested, its source map as JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinifyOutput {
    pub code: String,
    pub map: Option<String>,
}

/// Minification failures. Every one of them is fatal to the pipeline.
#[derive(Debug, Error)]
pub enum MinifyError {
    #[error("Failed to parse input: {message}")]
    Parse { message: String },

    #[error("Failed to produce source map: {0}")]
    SourceMap(String),

    #[error("Minifier task failed: {0}")]
    Join(String),
}

/// Capability to minify JavaScript.
#[async_trait]
pub trait Minifier: Send + Sync {
    async fn minify(&self, source: &str, options: &MinifyOptions)
    -> Result<MinifyOutput, MinifyError>;
}

/// Append the trailing source map reference to minified code.
pub fn append_source_map_reference(code: &str, map_file: &str) -> String {
    format!("{code}\n//# sourceMappingURL={map_file}")
}
