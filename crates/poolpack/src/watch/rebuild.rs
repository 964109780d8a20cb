use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, info, warn};

use super::{FileChange, WatchFilter};
use crate::error::Result;
use crate::task::RunReport;

/// Something the watch loop can rerun.
#[async_trait]
pub trait Rebuild: Send + Sync {
    async fn rebuild(&self) -> Result<RunReport>;
}

/// Serializes rebuilds triggered by file changes.
pub struct RebuildLoop {
    filter: WatchFilter,
}

impl RebuildLoop {
    pub fn new(filter: WatchFilter) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> &WatchFilter {
        &self.filter
    }

    /// Consume `changes` until the channel closes.
    ///
    /// Each relevant change starts a rebuild. The next rebuild starts only
    /// after the current one has finished; any number of relevant changes
    /// received in the meantime yields exactly one follow-up rebuild. Failed
    /// rebuilds are logged and the loop keeps listening.
    ///
    /// Returns the number of rebuilds performed.
    pub async fn run<R>(&self, mut changes: UnboundedReceiver<FileChange>, target: &R) -> usize
    where
        R: Rebuild + ?Sized,
    {
        let mut runs = 0;

        while let Some(change) = changes.recv().await {
            if !self.is_relevant(&change) {
                continue;
            }
            info!(path = %change.path().display(), "change detected, rebuilding");

            loop {
                self.rebuild_once(target).await;
                runs += 1;

                let mut queued = 0usize;
                while let Ok(change) = changes.try_recv() {
                    if self.is_relevant(&change) {
                        queued += 1;
                    }
                }
                if queued == 0 {
                    break;
                }
                info!(changes = queued, "changed during rebuild, rebuilding again");
            }
        }

        runs
    }

    fn is_relevant(&self, change: &FileChange) -> bool {
        let relevant = self.filter.matches(change.path());
        if !relevant {
            debug!(path = %change.path().display(), "ignoring change");
        }
        relevant
    }

    async fn rebuild_once<R>(&self, target: &R)
    where
        R: Rebuild + ?Sized,
    {
        match target.rebuild().await {
            Ok(report) if report.is_success() => {
                if !report.warnings.is_empty() {
                    warn!(warnings = report.warnings.len(), "rebuild finished with warnings");
                }
            }
            Ok(report) => {
                if let Some(failure) = &report.failure {
                    error!(
                        task = %failure.task,
                        error = %failure.error,
                        "rebuild failed, waiting for changes"
                    );
                }
            }
            Err(e) => error!(error = %e, "rebuild failed, waiting for changes"),
        }
    }
}
