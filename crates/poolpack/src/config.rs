//! Pipeline configuration.
//!
//! Settings are layered with `figment`, lowest priority first:
//!
//! 1. Built-in defaults ([`PipelineConfig::default`])
//! 2. `poolpack.toml` in the project root (or the file passed with `--config`)
//! 3. `POOLPACK_*` environment variables for top-level scalar keys
//!    (`POOLPACK_STRICT=true`, `POOLPACK_OUT_DIR=build`)
//! 4. Command-line overrides ([`ConfigOverrides`])
//!
//! Relative paths are resolved against the project root after extraction.

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format as _, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::banner::{DATE_PLACEHOLDER, VERSION_PLACEHOLDER};
use crate::entry::{BundleFormat, EntryPoint, EnvironmentProfile, file_name, resolve};
use crate::error::ConfigError;

/// Default configuration file name.
pub const CONFIG_FILE: &str = "poolpack.toml";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "POOLPACK_";

/// Top-level keys that may be set from the environment.
const ENV_KEYS: &[&str] = &["strict", "cache", "out-dir", "package", "embedded-module"];

/// Complete pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PipelineConfig {
    /// Project root. Not read from configuration sources.
    #[serde(skip)]
    pub root: PathBuf,

    /// Package manifest supplying the version.
    pub package: PathBuf,

    /// Directory holding every generated distributable.
    pub out_dir: PathBuf,

    pub worker: EntryPoint,
    pub main: EntryPoint,
    pub minified: MinifiedConfig,
    pub banner: BannerConfig,

    /// Generated module embedding the minified worker.
    pub embedded_module: PathBuf,

    pub comments: CommentConfig,
    pub watch: WatchConfig,

    /// Treat bundling errors as fatal.
    pub strict: bool,

    /// Reuse bundler state per entry across runs.
    pub cache: bool,
}

/// Minified main bundle and its source map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct MinifiedConfig {
    pub output: PathBuf,
    pub source_map: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct BannerConfig {
    pub template: PathBuf,
    pub date_placeholder: String,
    pub version_placeholder: String,
}

/// Which comments survive minification of the main bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct CommentConfig {
    /// Regular expression marking a license comment.
    pub license_marker: String,
    /// Marker identifying the unrendered template comment. Defaults to the
    /// file name of the main output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename_marker: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct WatchConfig {
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            package: PathBuf::from("package.json"),
            out_dir: PathBuf::from("dist"),
            worker: EntryPoint::new("worker-entry", "lib/worker.js", "dist/worker.js")
                .with_format(BundleFormat::Iife)
                .with_profile(EnvironmentProfile::portable()),
            main: EntryPoint::new("main-entry", "index.js", "dist/workerpool.js")
                .with_format(BundleFormat::Umd)
                .with_global_name("workerpool")
                .with_profile(EnvironmentProfile::portable()),
            minified: MinifiedConfig {
                output: PathBuf::from("dist/workerpool.min.js"),
                source_map: PathBuf::from("dist/workerpool.map"),
            },
            banner: BannerConfig {
                template: PathBuf::from("lib/header.js"),
                date_placeholder: DATE_PLACEHOLDER.to_string(),
                version_placeholder: VERSION_PLACEHOLDER.to_string(),
            },
            embedded_module: PathBuf::from("lib/generated/embeddedWorker.js"),
            comments: CommentConfig {
                license_marker: "@license".to_string(),
                filename_marker: None,
            },
            watch: WatchConfig {
                include: vec!["index.js".to_string(), "lib/**/*.js".to_string()],
                exclude: Vec::new(),
            },
            strict: false,
            cache: true,
        }
    }
}

/// Values supplied on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<bool>,
}

impl ConfigOverrides {
    fn is_empty(&self) -> bool {
        self.strict.is_none() && self.cache.is_none()
    }
}

impl PipelineConfig {
    /// Load configuration for the project at `root`.
    ///
    /// `config_path` replaces the default `poolpack.toml` lookup; relative
    /// paths are taken from `root`. An explicit file that does not exist is an
    /// error, a missing default file is not.
    pub fn load(
        root: impl AsRef<Path>,
        config_path: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let root = root.as_ref();
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        match config_path {
            Some(path) => {
                let path = resolve(root, path);
                if !path.is_file() {
                    return Err(ConfigError::InvalidValue {
                        field: "config".to_string(),
                        value: path.display().to_string(),
                        hint: "The configuration file does not exist".to_string(),
                    });
                }
                figment = figment.merge(Toml::file(path));
            }
            None => {
                let default_path = root.join(CONFIG_FILE);
                if default_path.is_file() {
                    figment = figment.merge(Toml::file(default_path));
                }
            }
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).filter_map(|key| {
            let key = key.as_str().replace('_', "-");
            ENV_KEYS.contains(&key.as_str()).then(|| key.into())
        }));

        if !overrides.is_empty() {
            figment = figment.merge(Serialized::defaults(overrides));
        }

        let mut config: Self = figment
            .extract()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        config.root = root.to_path_buf();
        config.resolve_paths();
        config.validate()?;
        Ok(config)
    }

    /// Defaults rooted at `root`, without reading any configuration source.
    pub fn for_root(root: impl AsRef<Path>) -> Self {
        let mut config = Self {
            root: root.as_ref().to_path_buf(),
            ..Self::default()
        };
        config.resolve_paths();
        config
    }

    /// Make every path absolute relative to `root`.
    pub fn resolve_paths(&mut self) {
        let root = self.root.clone();
        self.package = resolve(&root, &self.package);
        self.out_dir = resolve(&root, &self.out_dir);
        self.worker.resolve_against(&root);
        self.main.resolve_against(&root);
        self.minified.output = resolve(&root, &self.minified.output);
        self.minified.source_map = resolve(&root, &self.minified.source_map);
        self.banner.template = resolve(&root, &self.banner.template);
        self.embedded_module = resolve(&root, &self.embedded_module);
    }

    /// Check invariants that do not need the filesystem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for entry in [&self.worker, &self.main] {
            if entry.input.as_os_str().is_empty() || entry.input == self.root {
                return Err(ConfigError::InvalidValue {
                    field: format!("{}.input", entry.name),
                    value: String::new(),
                    hint: "Entry points need a source file".to_string(),
                });
            }
        }

        if self.main.format.needs_global_name() && self.main.global_name.is_none() {
            return Err(ConfigError::InvalidValue {
                field: "main.global-name".to_string(),
                value: self.main.format.to_string(),
                hint: "UMD and IIFE library bundles need a global name".to_string(),
            });
        }

        let outputs = [
            ("worker.output", &self.worker.output),
            ("main.output", &self.main.output),
            ("minified.output", &self.minified.output),
            ("minified.source-map", &self.minified.source_map),
        ];
        for (i, (field, path)) in outputs.iter().enumerate() {
            if outputs[..i].iter().any(|(_, other)| other == path) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: path.display().to_string(),
                    hint: "Every artifact needs its own output path".to_string(),
                });
            }
        }

        if self.embedded_module.starts_with(&self.out_dir) {
            return Err(ConfigError::InvalidValue {
                field: "embedded-module".to_string(),
                value: self.embedded_module.display().to_string(),
                hint: "The embedded module is a source input of the main bundle and cannot live in the output directory".to_string(),
            });
        }

        regex::Regex::new(&self.comments.license_marker).map_err(|e| {
            ConfigError::InvalidPattern {
                pattern: self.comments.license_marker.clone(),
                reason: e.to_string(),
            }
        })?;

        if self.watch.include.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "watch.include".to_string(),
                value: "[]".to_string(),
                hint: "Watch mode needs at least one include pattern".to_string(),
            });
        }

        Ok(())
    }

    /// Marker identifying the unrendered template comment.
    pub fn filename_marker(&self) -> String {
        self.comments
            .filename_marker
            .clone()
            .unwrap_or_else(|| self.main.output_file_name())
    }

    /// File name of the source map, as referenced from the minified bundle.
    pub fn source_map_file_name(&self) -> String {
        file_name(&self.minified.source_map)
    }

    /// Paths written by the pipeline. None of them may trigger a rebuild.
    pub fn generated_paths(&self) -> Vec<PathBuf> {
        vec![
            self.out_dir.clone(),
            self.embedded_module.clone(),
            self.worker.output.clone(),
            self.main.output.clone(),
            self.minified.output.clone(),
            self.minified.source_map.clone(),
        ]
    }
}
