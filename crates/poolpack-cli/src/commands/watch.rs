//! Watch command implementation.
//!
//! 1. Load the configuration and assemble the pipeline
//! 2. Start the file watcher, so changes made during the first run count
//! 3. Run the default pipeline once
//! 4. Rebuild on relevant changes until Ctrl+C

use async_trait::async_trait;
use poolpack::{FileWatcher, Pipeline, Rebuild, RebuildLoop, RunReport, WatchFilter};
use tokio::signal;

use crate::cli::ProjectArgs;
use crate::commands::utils;
use crate::error::Result;
use crate::ui;

/// Run the default pipeline, then keep rebuilding on source changes.
///
/// A failed run is reported and watching continues, including the first one,
/// so a missing template or entry can be fixed while the watcher is up. Only
/// loading the configuration and starting the watcher can end the command.
pub async fn execute(project: &ProjectArgs) -> Result<()> {
    let pipeline = utils::load_pipeline(project)?;
    let filter = WatchFilter::from_config(pipeline.config())?;

    let (watcher, changes) = FileWatcher::new(pipeline.config().root.clone())?;
    ui::info(&format!(
        "Watching for changes in: {}",
        watcher.root().display()
    ));

    let session = WatchSession {
        pipeline: &pipeline,
    };
    // Already reported on the terminal.
    let _ = session.rebuild().await;

    ui::info("Press Ctrl+C to stop");
    let rebuild_loop = RebuildLoop::new(filter);

    tokio::select! {
        runs = rebuild_loop.run(changes, &session) => {
            ui::warning(&format!("File watcher stopped after {} rebuilds", runs));
        }
        result = signal::ctrl_c() => {
            result?;
            ui::info("Stopping watch mode...");
        }
    }

    drop(watcher);
    ui::success("Watch mode stopped");
    Ok(())
}

/// Runs the pipeline and reports each outcome on the terminal.
struct WatchSession<'a> {
    pipeline: &'a Pipeline,
}

#[async_trait]
impl<'a> Rebuild for WatchSession<'a> {
    async fn rebuild(&self) -> poolpack::Result<RunReport> {
        let result = self.pipeline.rebuild().await;
        match &result {
            Ok(report) => {
                if let Err(e) = utils::report_run(report) {
                    ui::error(&e.to_string());
                }
            }
            Err(e) => ui::error(&e.to_string()),
        }
        result
    }
}
