//! Package metadata.
//!
//! Only the version is needed; it is stamped into the banner.

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// The fields of `package.json` the pipeline reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMetadata {
    pub name: Option<String>,
    pub version: String,
}

#[derive(Deserialize)]
struct RawManifest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

impl PackageMetadata {
    /// Read and parse a package manifest.
    pub async fn read(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::ManifestUnreadable {
                path: path.to_path_buf(),
                source,
            })?;
        Self::parse(path, &content)
    }

    fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
        let raw: RawManifest =
            serde_json::from_str(content).map_err(|e| ConfigError::ManifestInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        match raw.version {
            Some(version) if !version.trim().is_empty() => Ok(Self {
                name: raw.name,
                version,
            }),
            _ => Err(ConfigError::ManifestInvalid {
                path: path.to_path_buf(),
                reason: "missing \"version\" field".to_string(),
            }),
        }
    }
}
