use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::config::PipelineConfig;
use crate::error::ConfigError;

/// Decides which changed paths trigger a rebuild.
///
/// A path triggers a rebuild when it lies under the root, is not a generated
/// path (or inside one), matches no exclude glob, and matches an include
/// glob. Globs are matched against the path relative to the root, with `*`
/// not crossing directory separators.
#[derive(Debug, Clone)]
pub struct WatchFilter {
    root: PathBuf,
    include: GlobSet,
    exclude: GlobSet,
    generated: Vec<PathBuf>,
}

impl WatchFilter {
    pub fn new(
        root: impl Into<PathBuf>,
        include: &[String],
        exclude: &[String],
        generated: Vec<PathBuf>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            root: root.into(),
            include: build_globset(include)?,
            exclude: build_globset(exclude)?,
            generated,
        })
    }

    /// Filter for a pipeline configuration.
    ///
    /// Every path the pipeline writes is excluded, whatever the configured
    /// exclude globs say.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, ConfigError> {
        Self::new(
            config.root.clone(),
            &config.watch.include,
            &config.watch.exclude,
            config.generated_paths(),
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn matches(&self, path: &Path) -> bool {
        let Ok(relative) = path.strip_prefix(&self.root) else {
            return false;
        };

        if self.is_generated(path) {
            return false;
        }

        !self.exclude.is_match(relative) && self.include.is_match(relative)
    }

    fn is_generated(&self, path: &Path) -> bool {
        self.generated.iter().any(|generated| path.starts_with(generated))
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| ConfigError::InvalidPattern {
        pattern: patterns.join(", "),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> WatchFilter {
        WatchFilter::from_config(&PipelineConfig::for_root("/project")).unwrap()
    }

    #[test]
    fn test_sources_match() {
        let filter = filter();
        assert!(filter.matches(Path::new("/project/index.js")));
        assert!(filter.matches(Path::new("/project/lib/worker.js")));
        assert!(filter.matches(Path::new("/project/lib/nested/Pool.js")));
    }

    #[test]
    fn test_generated_paths_never_match() {
        let filter = filter();
        assert!(!filter.matches(Path::new("/project/lib/generated/embeddedWorker.js")));
        assert!(!filter.matches(Path::new("/project/dist/workerpool.js")));
    }

    #[test]
    fn test_unrelated_paths_do_not_match() {
        let filter = filter();
        assert!(!filter.matches(Path::new("/project/test/Pool.test.js")));
        assert!(!filter.matches(Path::new("/project/lib/README.md")));
        assert!(!filter.matches(Path::new("/elsewhere/index.js")));
        // `*` does not cross directories
        assert!(!filter.matches(Path::new("/project/src/index.js")));
    }

    #[test]
    fn test_exclude_globs() {
        let filter = WatchFilter::new(
            "/project",
            &["lib/**/*.js".to_string()],
            &["lib/vendor/**".to_string()],
            Vec::new(),
        )
        .unwrap();
        assert!(filter.matches(Path::new("/project/lib/a.js")));
        assert!(!filter.matches(Path::new("/project/lib/vendor/b.js")));
    }

    #[test]
    fn test_invalid_glob() {
        let err = WatchFilter::new("/project", &["lib/[".to_string()], &[], Vec::new())
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
    }
}
