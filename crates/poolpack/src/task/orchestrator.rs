use std::sync::Arc;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use tracing::{debug, error, info};

use super::{FailurePolicy, GraphError, RunContext, RunScope, TaskError, TaskGraph, TaskState};

/// The fatal error that stopped a run.
#[derive(Debug)]
pub struct TaskFailure {
    pub task: String,
    pub error: TaskError,
}

/// Outcome of one run.
#[derive(Debug)]
pub struct RunReport {
    /// Final state of every planned node, in execution order.
    pub states: IndexMap<String, TaskState>,
    /// Non-fatal problems logged during the run.
    pub warnings: Vec<String>,
    pub failure: Option<TaskFailure>,
    pub duration: Duration,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Process exit code: non-zero only after a fatal failure.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }

    pub fn state(&self, task: &str) -> Option<TaskState> {
        self.states.get(task).copied()
    }

    pub fn completed(&self) -> impl Iterator<Item = &str> {
        self.states
            .iter()
            .filter(|(_, state)| **state == TaskState::Done)
            .map(|(name, _)| name.as_str())
    }
}

/// Runs a task graph sequentially.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    graph: Arc<TaskGraph>,
}

impl Orchestrator {
    /// Validate `graph` and wrap it.
    pub fn new(graph: TaskGraph) -> Result<Self, GraphError> {
        graph.validate()?;
        Ok(Self {
            graph: Arc::new(graph),
        })
    }

    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    /// Plan the run without executing it.
    pub fn plan(&self, targets: &[&str], scope: RunScope) -> Result<Vec<String>, GraphError> {
        match scope {
            RunScope::WithPrerequisites => self.graph.plan(targets),
            RunScope::Only => self.graph.plan_only(targets),
        }
    }

    /// Run `targets`.
    ///
    /// Nodes run one after the other; a node's action is awaited to
    /// completion, writes included, before the next node starts. A fatal
    /// error stops the run and leaves the remaining nodes `Pending`. Already
    /// written artifacts are not rolled back.
    pub async fn run(
        &self,
        targets: &[&str],
        scope: RunScope,
        ctx: &RunContext,
    ) -> Result<RunReport, GraphError> {
        let plan = self.plan(targets, scope)?;
        let started = Instant::now();

        let mut states: IndexMap<String, TaskState> = plan
            .iter()
            .map(|name| (name.clone(), TaskState::Pending))
            .collect();
        let mut failure = None;

        for name in &plan {
            let Some(node) = self.graph.get(name) else {
                return Err(GraphError::UnknownTask(name.clone()));
            };

            // Prerequisites outside a partial run's plan are not tracked.
            let blocked = node.prerequisites.iter().any(|p| {
                states
                    .get(p)
                    .is_some_and(|state| *state != TaskState::Done)
            });
            if blocked {
                debug!(task = %name, "prerequisites not done, stopping");
                break;
            }

            states.insert(name.clone(), TaskState::Running);
            debug!(task = %name, "running task");

            let Some(action) = &node.action else {
                states.insert(name.clone(), TaskState::Done);
                continue;
            };

            let task_started = Instant::now();
            match action.run(ctx).await {
                Ok(()) => {
                    debug!(task = %name, elapsed = ?task_started.elapsed(), "task done");
                    states.insert(name.clone(), TaskState::Done);
                }
                Err(err)
                    if err.is_recoverable()
                        && node.policy() == FailurePolicy::BestEffort
                        && !ctx.is_strict() =>
                {
                    error!(task = %name, error = %err, "task failed, continuing");
                    ctx.warn(format!("{name}: {err}"));
                    states.insert(name.clone(), TaskState::Done);
                }
                Err(err) => {
                    error!(task = %name, error = %err, "task failed");
                    states.insert(name.clone(), TaskState::Failed);
                    failure = Some(TaskFailure {
                        task: name.clone(),
                        error: err,
                    });
                    break;
                }
            }
        }

        let report = RunReport {
            states,
            warnings: ctx.warnings(),
            failure,
            duration: started.elapsed(),
        };

        if report.is_success() {
            info!(duration = ?report.duration, "run finished");
        }
        Ok(report)
    }
}
