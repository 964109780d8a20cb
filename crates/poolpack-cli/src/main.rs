//! poolpack CLI entry point.
//!
//! Parses arguments, sets up logging and dispatches to the command
//! implementations.

use clap::Parser;
use miette::Result;
use poolpack_cli::{cli, commands, error, logger, ui};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = match args.command {
        cli::Command::Build => commands::build_execute(&args.project).await,
        cli::Command::Watch => commands::watch_execute(&args.project).await,
        cli::Command::Task(task_args) => commands::task_execute(task_args, &args.project).await,
        cli::Command::Tasks => commands::tasks_execute(&args.project),
    };

    result.map_err(error::cli_error_to_miette)
}
