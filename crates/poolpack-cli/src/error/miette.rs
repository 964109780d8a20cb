//! Miette diagnostic conversion for CLI errors.

use crate::error::CliError;
use miette::Report;
use poolpack::task::GraphError;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Pipeline(poolpack::Error::Graph(e)) => graph_error_to_miette(e),
        CliError::Pipeline(e) => miette::miette!("{}", e),
        CliError::RunFailed { task, message } => miette::miette!(
            "Task '{}' failed: {}\n\nHint: Fix the error and rerun 'poolpack task {}'",
            task,
            message,
            task
        ),
        _ => miette::miette!("{}", err),
    }
}

/// Convert GraphError to miette Report
pub fn graph_error_to_miette(err: GraphError) -> Report {
    match err {
        GraphError::UnknownTask(name) => miette::miette!(
            "Unknown task: {}\n\nHint: Run 'poolpack tasks' to list the available tasks",
            name
        ),
        _ => miette::miette!("Task graph error: {}", err),
    }
}
