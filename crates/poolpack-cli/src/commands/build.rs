//! Build command implementation.

use crate::cli::ProjectArgs;
use crate::commands::utils;
use crate::error::Result;
use crate::ui;

/// Run the default pipeline once.
pub async fn execute(project: &ProjectArgs) -> Result<()> {
    let pipeline = utils::load_pipeline(project)?;
    ui::info(&format!("Building {}", pipeline.config().root.display()));

    let report = pipeline.run_default().await?;
    utils::report_run(&report)?;

    ui::print_artifact_summary(&utils::artifacts(pipeline.config()));
    Ok(())
}
