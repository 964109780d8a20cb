//! Command implementations for the poolpack CLI.
//!
//! - [`build`] - run the default pipeline once
//! - [`watch`] - run, then rebuild on source changes
//! - [`task`] - run named tasks
//! - [`tasks`] - list the task graph

pub mod build;
pub mod task;
pub mod tasks;
pub(crate) mod utils;
pub mod watch;

pub use build::execute as build_execute;
pub use task::execute as task_execute;
pub use tasks::execute as tasks_execute;
pub use watch::execute as watch_execute;
