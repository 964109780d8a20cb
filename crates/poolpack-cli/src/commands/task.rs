//! Task command implementation.

use poolpack::RunScope;

use crate::cli::{ProjectArgs, TaskArgs};
use crate::commands::utils;
use crate::error::Result;

/// Run the named tasks.
///
/// With `--no-deps` prerequisites are skipped and tasks that need their
/// outputs read them from disk.
pub async fn execute(args: TaskArgs, project: &ProjectArgs) -> Result<()> {
    let pipeline = utils::load_pipeline(project)?;

    let scope = if args.no_deps {
        RunScope::Only
    } else {
        RunScope::WithPrerequisites
    };
    let targets: Vec<&str> = args.names.iter().map(String::as_str).collect();

    let report = pipeline.run(&targets, scope).await?;
    utils::report_run(&report)
}
