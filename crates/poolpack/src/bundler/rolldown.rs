//! Rolldown-backed bundler.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rolldown::{
    Bundler as RolldownInstance, BundlerBuilder, BundlerOptions, InputItem, IsExternal,
    OutputFormat, Platform,
};
use rustc_hash::FxHashMap;
use tempfile::TempDir;
use tracing::{debug, warn};

use super::{BundleArtifact, BundleError, Bundler};
use crate::banner::Banner;
use crate::entry::{BundleFormat, EntryPoint, TargetPlatform};

type SharedInstance = Arc<tokio::sync::Mutex<RolldownInstance>>;

/// Bundles entry points with rolldown.
///
/// With caching enabled, one rolldown instance is kept per entry name and
/// reused on later runs so rolldown can skip work it already did. The cache
/// is keyed by entry identity only: a rerun is triggered by a content change
/// anyway, and rolldown rescans its inputs on every `generate`.
///
/// Entries with a global name are bundled through a generated ES module that
/// re-exports the entry's default export. Rolldown only assigns the UMD or
/// IIFE global from ES exports, and a CommonJS entry has none of its own.
pub struct RolldownBundler {
    cwd: PathBuf,
    cache: Option<Mutex<FxHashMap<String, SharedInstance>>>,
    shim_dir: Mutex<Option<TempDir>>,
}

impl RolldownBundler {
    /// Create a bundler resolving modules from `cwd`.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            cache: None,
            shim_dir: Mutex::new(None),
        }
    }

    /// Keep one rolldown instance per entry across invocations.
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache = enabled.then(|| Mutex::new(FxHashMap::default()));
        self
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    fn options_for(&self, entry: &EntryPoint, import: String) -> BundlerOptions {
        let externals = entry.profile.external_modules();

        BundlerOptions {
            input: Some(vec![InputItem {
                name: Some(chunk_name(entry)),
                import,
            }]),
            cwd: Some(self.cwd.clone()),
            format: Some(output_format(entry.format)),
            name: entry.global_name.clone(),
            platform: Some(platform(entry.profile.platform)),
            external: (!externals.is_empty()).then(|| IsExternal::from(externals)),
            ..Default::default()
        }
    }

    /// The module rolldown starts from for `entry`.
    ///
    /// Without a global name this is the entry's own input. Otherwise a
    /// shim importing the input is written to a private temporary directory,
    /// outside the project so the watcher never sees it.
    async fn entry_import(&self, entry: &EntryPoint) -> Result<String, BundleError> {
        let input = entry.input.to_string_lossy().into_owned();
        if entry.global_name.is_none() {
            return Ok(input);
        }

        let shim = self
            .shim_dir()
            .map_err(|e| BundleError::build(entry, &e))?
            .join(format!("{}.entry.mjs", entry.name));
        let source = shim_source(&input).map_err(|e| BundleError::build(entry, &e))?;
        tokio::fs::write(&shim, source)
            .await
            .map_err(|e| BundleError::build(entry, &e))?;

        debug!(entry = %entry.name, shim = %shim.display(), "bundling through entry shim");
        Ok(shim.to_string_lossy().into_owned())
    }

    fn shim_dir(&self) -> std::io::Result<PathBuf> {
        let mut slot = self.shim_dir.lock();
        if let Some(dir) = slot.as_ref() {
            return Ok(dir.path().to_path_buf());
        }

        let dir = tempfile::Builder::new().prefix("poolpack-").tempdir()?;
        let path = dir.path().to_path_buf();
        *slot = Some(dir);
        Ok(path)
    }

    async fn create_instance(&self, entry: &EntryPoint) -> Result<RolldownInstance, BundleError> {
        let import = self.entry_import(entry).await?;
        BundlerBuilder::default()
            .with_options(self.options_for(entry, import))
            .build()
            .map_err(|e| BundleError::build(entry, &e))
    }

    /// Fetch the cached instance for `entry`, creating it on first use.
    async fn instance(&self, entry: &EntryPoint) -> Result<SharedInstance, BundleError> {
        if let Some(cache) = &self.cache {
            let cached = cache.lock().get(&entry.name).cloned();
            if let Some(instance) = cached {
                debug!(entry = %entry.name, "reusing cached bundler");
                return Ok(instance);
            }
        }

        let instance = Arc::new(tokio::sync::Mutex::new(self.create_instance(entry).await?));
        if let Some(cache) = &self.cache {
            cache
                .lock()
                .insert(entry.name.clone(), Arc::clone(&instance));
        }
        Ok(instance)
    }

    fn evict(&self, entry: &EntryPoint) {
        if let Some(cache) = &self.cache {
            cache.lock().remove(&entry.name);
        }
    }
}

#[async_trait]
impl Bundler for RolldownBundler {
    async fn bundle(
        &self,
        entry: &EntryPoint,
        banner: Option<&Banner>,
    ) -> Result<BundleArtifact, BundleError> {
        let instance = self.instance(entry).await?;
        let output = {
            let mut bundler = instance.lock().await;
            bundler.generate().await
        };

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                // A failed build may leave the instance half-initialized.
                self.evict(entry);
                return Err(BundleError::build(entry, &e));
            }
        };

        if !output.warnings.is_empty() {
            warn!(
                entry = %entry.name,
                count = output.warnings.len(),
                "bundler reported warnings"
            );
        }

        let code = output
            .assets
            .iter()
            .find_map(|asset| match asset {
                rolldown_common::Output::Chunk(chunk) if chunk.is_entry => Some(chunk.code.clone()),
                _ => None,
            })
            .ok_or_else(|| BundleError::NoOutput {
                entry: entry.name.clone(),
            })?;

        let code = match banner {
            Some(banner) => banner.prepend_to(&code),
            None => code,
        };

        Ok(BundleArtifact::new(entry.output.clone(), code))
    }
}

/// An ES module whose default export is the default export of `input`.
///
/// For a CommonJS input that is its `module.exports`.
fn shim_source(input: &str) -> Result<String, serde_json::Error> {
    let specifier = serde_json::to_string(input)?;
    Ok(format!(
        "import entry from {specifier};\nexport default entry;\n"
    ))
}

fn chunk_name(entry: &EntryPoint) -> String {
    entry
        .output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| entry.name.clone())
}

fn output_format(format: BundleFormat) -> OutputFormat {
    match format {
        BundleFormat::Esm => OutputFormat::Esm,
        BundleFormat::Cjs => OutputFormat::Cjs,
        BundleFormat::Iife => OutputFormat::Iife,
        BundleFormat::Umd => OutputFormat::Umd,
    }
}

fn platform(platform: TargetPlatform) -> Platform {
    match platform {
        TargetPlatform::Browser => Platform::Browser,
        TargetPlatform::Node => Platform::Node,
        TargetPlatform::Neutral => Platform::Neutral,
    }
}
