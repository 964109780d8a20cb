use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::warn;

use crate::banner::Banner;
use crate::bundler::BundleArtifact;

/// Whether a run includes the prerequisites of its targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunScope {
    #[default]
    WithPrerequisites,
    /// Run exactly the named tasks.
    Only,
}

/// State of one pipeline run.
///
/// Holds the banner rendered for the run and the artifacts produced so far.
/// A context is created per run and dropped with it, so nothing leaks from
/// one run into the next.
#[derive(Debug)]
pub struct RunContext {
    banner: Banner,
    strict: bool,
    artifacts: Mutex<FxHashMap<String, BundleArtifact>>,
    warnings: Mutex<Vec<String>>,
}

impl RunContext {
    pub fn new(banner: Banner) -> Self {
        Self {
            banner,
            strict: false,
            artifacts: Mutex::new(FxHashMap::default()),
            warnings: Mutex::new(Vec::new()),
        }
    }

    /// Make recoverable errors fatal for this run.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn banner(&self) -> &Banner {
        &self.banner
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Record an artifact produced in this run under `key`.
    pub fn put_artifact(&self, key: impl Into<String>, artifact: BundleArtifact) {
        self.artifacts.lock().insert(key.into(), artifact);
    }

    /// Artifact produced earlier in this run, if any.
    pub fn artifact(&self, key: &str) -> Option<BundleArtifact> {
        self.artifacts.lock().get(key).cloned()
    }

    /// Log a warning and keep it for the run report.
    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        warn!("{message}");
        self.warnings.lock().push(message);
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifacts_are_per_context() {
        let ctx = RunContext::new(Banner::from("/* b */"));
        assert!(ctx.artifact("worker-entry").is_none());

        ctx.put_artifact(
            "worker-entry",
            BundleArtifact::new("dist/worker.js", "self.x=1"),
        );
        assert_eq!(ctx.artifact("worker-entry").unwrap().code, "self.x=1");

        let next = RunContext::new(Banner::from("/* b */"));
        assert!(next.artifact("worker-entry").is_none());
    }

    #[test]
    fn test_warnings_are_collected() {
        let ctx = RunContext::new(Banner::from("")).with_strict(true);
        ctx.warn("first");
        ctx.warn("second");
        assert_eq!(ctx.warnings(), vec!["first", "second"]);
        assert!(ctx.is_strict());
    }
}
