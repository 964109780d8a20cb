//! Entry points and environment profiles.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Module format of a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BundleFormat {
    Esm,
    Cjs,
    #[default]
    Iife,
    Umd,
}

impl BundleFormat {
    /// Whether the format exposes its exports through a global variable.
    pub fn needs_global_name(self) -> bool {
        matches!(self, Self::Iife | Self::Umd)
    }
}

impl std::fmt::Display for BundleFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Esm => "esm",
            Self::Cjs => "cjs",
            Self::Iife => "iife",
            Self::Umd => "umd",
        };
        f.write_str(s)
    }
}

/// Platform the bundle is resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TargetPlatform {
    Browser,
    Node,
    #[default]
    Neutral,
}

/// Host-provided facility the bundler must not polyfill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostGlobal {
    /// Node built-in modules (`fs`, `path`, `child_process`, ...).
    NodeBuiltins,
    /// The `process` global.
    Process,
    /// The `Buffer` global.
    Buffer,
}

/// Node built-in module names.
const NODE_BUILTINS: &[&str] = &[
    "assert",
    "buffer",
    "child_process",
    "cluster",
    "crypto",
    "dgram",
    "dns",
    "events",
    "fs",
    "http",
    "https",
    "module",
    "net",
    "os",
    "path",
    "process",
    "querystring",
    "readline",
    "stream",
    "string_decoder",
    "timers",
    "tls",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "worker_threads",
    "zlib",
];

impl HostGlobal {
    /// Module specifiers that must stay external so no polyfill is bundled.
    fn module_specifiers(self) -> Vec<String> {
        let names: &[&str] = match self {
            Self::NodeBuiltins => NODE_BUILTINS,
            Self::Process => &["process"],
            Self::Buffer => &["buffer"],
        };
        names
            .iter()
            .flat_map(|name| [name.to_string(), format!("node:{name}")])
            .collect()
    }
}

/// What the bundler may assume about the host environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct EnvironmentProfile {
    #[serde(default)]
    pub platform: TargetPlatform,
    /// Host globals that must not be auto-injected.
    #[serde(default)]
    pub suppress: BTreeSet<HostGlobal>,
}

impl EnvironmentProfile {
    /// Portable profile: neutral platform, nothing polyfilled.
    pub fn portable() -> Self {
        Self {
            platform: TargetPlatform::Neutral,
            suppress: [HostGlobal::NodeBuiltins, HostGlobal::Process, HostGlobal::Buffer]
                .into_iter()
                .collect(),
        }
    }

    /// Module specifiers to mark external, sorted and deduplicated.
    pub fn external_modules(&self) -> Vec<String> {
        let set: BTreeSet<String> = self
            .suppress
            .iter()
            .flat_map(|g| g.module_specifiers())
            .collect();
        set.into_iter().collect()
    }
}

/// A source root handed to the bundler and the artifact it produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct EntryPoint {
    pub name: String,
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(default)]
    pub format: BundleFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_name: Option<String>,
    #[serde(default)]
    pub profile: EnvironmentProfile,
}

impl EntryPoint {
    pub fn new(name: impl Into<String>, input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            input: input.into(),
            output: output.into(),
            format: BundleFormat::default(),
            global_name: None,
            profile: EnvironmentProfile::default(),
        }
    }

    pub fn with_format(mut self, format: BundleFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_global_name(mut self, name: impl Into<String>) -> Self {
        self.global_name = Some(name.into());
        self
    }

    pub fn with_profile(mut self, profile: EnvironmentProfile) -> Self {
        self.profile = profile;
        self
    }

    /// File name of the output artifact.
    pub fn output_file_name(&self) -> String {
        file_name(&self.output)
    }

    /// Resolve relative paths against `root`.
    pub(crate) fn resolve_against(&mut self, root: &Path) {
        self.input = resolve(root, &self.input);
        self.output = resolve(root, &self.output);
    }
}

pub(crate) fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
