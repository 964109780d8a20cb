//! Worker embedding.
//!
//! The minified worker bundle is shipped inside the main bundle as a string
//! constant. [`CodeEmbedder`] minifies the worker and renders the generated
//! module the main entry imports.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::bundler::BundleArtifact;
use crate::entry::file_name;
use crate::minify::{CommentPolicy, MinifyError, MinifyOptions, Minifier};

/// Embedding failures. Both are fatal.
#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("Failed to minify worker bundle {}: {source}", .path.display())]
    Minify {
        path: PathBuf,
        #[source]
        source: MinifyError,
    },

    #[error("Failed to encode worker code as a string literal: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Generated module holding the minified worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedModule {
    pub path: PathBuf,
    pub content: String,
}

/// Render the generated module source.
///
/// The result is a notice comment followed by a single CommonJS export of
/// `minified` as a JSON string literal.
pub fn render_embedded_module(
    file_name: &str,
    worker_name: &str,
    minified: &str,
) -> Result<String, EmbedError> {
    let literal = serde_json::to_string(minified)?;
    Ok(format!(
        "/**\n * {file_name} contains an embedded version of {worker_name}.\n * This file is automatically generated,\n * changes made in this file will be overwritten.\n */\nmodule.exports = {literal};\n"
    ))
}

/// Minifies the worker bundle and renders the embedded module.
pub struct CodeEmbedder {
    minifier: Arc<dyn Minifier>,
    module_path: PathBuf,
    worker_name: String,
}

impl CodeEmbedder {
    /// `module_path` is where the generated module lives; `worker_name` is
    /// the file name mentioned in its notice.
    pub fn new(
        minifier: Arc<dyn Minifier>,
        module_path: impl Into<PathBuf>,
        worker_name: impl Into<String>,
    ) -> Self {
        Self {
            minifier,
            module_path: module_path.into(),
            worker_name: worker_name.into(),
        }
    }

    pub fn module_path(&self) -> &Path {
        &self.module_path
    }

    /// Minify `worker` and render the embedded module.
    ///
    /// Every comment is stripped and no source map is produced.
    pub async fn embed(&self, worker: &BundleArtifact) -> Result<EmbeddedModule, EmbedError> {
        let options = MinifyOptions::default().with_comments(CommentPolicy::DropAll);
        let minified = self
            .minifier
            .minify(&worker.code, &options)
            .await
            .map_err(|source| EmbedError::Minify {
                path: worker.path.clone(),
                source,
            })?;

        let content = render_embedded_module(
            &file_name(&self.module_path),
            &self.worker_name,
            &minified.code,
        )?;

        Ok(EmbeddedModule {
            path: self.module_path.clone(),
            content,
        })
    }
}
