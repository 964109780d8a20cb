use clap::{Args, Subcommand};

/// Available poolpack subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the default pipeline once
    ///
    /// Bundles the worker, embeds it, bundles the main library and writes
    /// the minified build with its source map. Exits non-zero when a fatal
    /// task fails.
    Build,

    /// Run the default pipeline, then rebuild whenever a source file changes
    ///
    /// Generated files never trigger a rebuild. Failed rebuilds are reported
    /// and watching continues until Ctrl+C.
    Watch,

    /// Run one or more named tasks
    ///
    /// Examples:
    ///   poolpack task embed-worker
    ///   poolpack task minify-main --no-deps
    Task(TaskArgs),

    /// List the tasks and their prerequisites
    Tasks,
}

/// Arguments for the task command
#[derive(Args, Debug)]
pub struct TaskArgs {
    /// Tasks to run, in order
    #[arg(required = true, value_name = "NAME")]
    pub names: Vec<String>,

    /// Skip prerequisites and read their outputs from disk
    #[arg(long)]
    pub no_deps: bool,
}
