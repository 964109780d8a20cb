//! Command-line interface definition for poolpack.
//!
//! # Command Structure
//!
//! - `poolpack build` - run the default pipeline once
//! - `poolpack watch` - run the default pipeline, then rebuild on changes
//! - `poolpack task <NAME>...` - run named tasks
//! - `poolpack tasks` - list the task graph

mod commands;

use clap::{Args, Parser};
use std::path::PathBuf;

pub use commands::{Command, TaskArgs};

/// poolpack - build libraries that embed a minified worker
#[derive(Parser, Debug)]
#[command(
    name = "poolpack",
    version,
    about = "Build pipeline for libraries that embed a minified worker",
    long_about = "poolpack bundles a worker script, embeds its minified code as a string\n\
                  module, bundles the main library around it with a license banner and\n\
                  produces a minified build with a source map."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Options that locate and adjust the project configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Project root (defaults to the current directory)
    #[arg(short = 'C', long, global = true, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Configuration file to use instead of poolpack.toml
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Fail the run when bundling fails
    ///
    /// Bundling errors are normally logged and the run continues with
    /// whatever artifact is on disk.
    #[arg(long, global = true)]
    pub strict: bool,

    /// Create a fresh bundler for every run instead of reusing one
    #[arg(long, global = true)]
    pub no_cache: bool,
}
