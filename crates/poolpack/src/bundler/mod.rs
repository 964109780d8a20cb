//! Module bundler adapter.
//!
//! The pipeline bundles two entry points per run. Bundling itself is a black
//! box behind the [`Bundler`] trait; [`RolldownBundler`] is the production
//! implementation. Writing the artifact to disk is left to the caller, which
//! treats write failures differently from bundling failures.

mod rolldown;

pub use self::rolldown::RolldownBundler;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::banner::Banner;
use crate::entry::EntryPoint;

/// Output of one bundler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleArtifact {
    /// Where the artifact belongs on disk.
    pub path: PathBuf,
    pub code: String,
}

impl BundleArtifact {
    pub fn new(path: impl Into<PathBuf>, code: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            code: code.into(),
        }
    }
}

/// Bundling failures.
#[derive(Debug, Error)]
pub enum BundleError {
    /// The bundler reported errors for the entry.
    #[error("Failed to bundle '{entry}': {message}")]
    Build { entry: String, message: String },

    /// The bundler finished without producing an entry chunk.
    #[error("Bundler produced no entry chunk for '{entry}'")]
    NoOutput { entry: String },
}

impl BundleError {
    pub fn build(entry: &EntryPoint, error: &dyn std::fmt::Debug) -> Self {
        BundleError::Build {
            entry: entry.name.clone(),
            message: format!("{error:?}"),
        }
    }
}

/// Capability to turn an entry point into a bundle.
///
/// Implementations must prepend `banner`, when given, verbatim to the output
/// so that minification later sees it as the first comment.
#[async_trait]
pub trait Bundler: Send + Sync {
    async fn bundle(
        &self,
        entry: &EntryPoint,
        banner: Option<&Banner>,
    ) -> Result<BundleArtifact, BundleError>;
}
