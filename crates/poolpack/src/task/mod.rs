//! Task graph and orchestration.
//!
//! A pipeline is a DAG of named [`TaskNode`]s. The [`Orchestrator`] runs a
//! linearization of that graph one node at a time and reports the outcome in
//! a [`RunReport`].
//!
//! # State machine
//!
//! Every node in a run starts `Pending`, becomes `Running` when its
//! prerequisites are `Done`, and ends `Done` or `Failed`. Only fatal errors
//! lead to `Failed`: a node whose [`FailurePolicy`] is `BestEffort` and whose
//! error is recoverable is logged and marked `Done`. After a failure the
//! remaining nodes stay `Pending`.

mod context;
mod graph;
mod orchestrator;

pub use context::{RunContext, RunScope};
pub use graph::{GraphError, TaskGraph};
pub use orchestrator::{Orchestrator, RunReport, TaskFailure};

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::bundler::BundleError;
use crate::embed::EmbedError;
use crate::minify::MinifyError;

/// Lifecycle of one node within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    Pending,
    Running,
    Done,
    Failed,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Done | TaskState::Failed)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskState::Pending => "pending",
            TaskState::Running => "running",
            TaskState::Done => "done",
            TaskState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// How a task's errors affect the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Any error fails the task and stops the run.
    #[default]
    Fatal,
    /// Recoverable errors are logged and the task still completes, unless
    /// the run is strict.
    BestEffort,
}

/// Errors raised by task actions.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Bundle(#[from] BundleError),

    #[error(transparent)]
    Embed(#[from] EmbedError),

    #[error(transparent)]
    Minify(#[from] MinifyError),

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TaskError {
    /// Bundling errors are the only recoverable ones: a later run may
    /// produce a corrected artifact. Filesystem and minification errors
    /// always stop the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TaskError::Bundle(_))
    }
}

/// Action of a task node.
#[async_trait]
pub trait Task: Send + Sync {
    fn policy(&self) -> FailurePolicy {
        FailurePolicy::Fatal
    }

    async fn run(&self, ctx: &RunContext) -> Result<(), TaskError>;
}

/// A named node of the task graph.
#[derive(Clone)]
pub struct TaskNode {
    pub name: String,
    pub prerequisites: Vec<String>,
    pub description: String,
    /// `None` for aggregate nodes that only group their prerequisites.
    pub action: Option<Arc<dyn Task>>,
}

impl TaskNode {
    pub fn new(name: impl Into<String>, action: Arc<dyn Task>) -> Self {
        Self {
            name: name.into(),
            prerequisites: Vec::new(),
            description: String::new(),
            action: Some(action),
        }
    }

    /// A node without an action.
    pub fn aggregate(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prerequisites: Vec::new(),
            description: String::new(),
            action: None,
        }
    }

    /// Declare prerequisites, in the order they should run.
    pub fn after<I, S>(mut self, prerequisites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prerequisites
            .extend(prerequisites.into_iter().map(Into::into));
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn policy(&self) -> FailurePolicy {
        self.action
            .as_ref()
            .map(|action| action.policy())
            .unwrap_or_default()
    }
}

impl fmt::Debug for TaskNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskNode")
            .field("name", &self.name)
            .field("prerequisites", &self.prerequisites)
            .field("aggregate", &self.action.is_none())
            .finish()
    }
}
