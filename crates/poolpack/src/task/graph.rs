use indexmap::{IndexMap, IndexSet};
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use thiserror::Error;

use super::TaskNode;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("Task '{0}' is declared twice")]
    DuplicateTask(String),

    #[error("Task '{task}' depends on unknown task '{prerequisite}'")]
    UnknownPrerequisite { task: String, prerequisite: String },

    #[error("Unknown task '{0}'")]
    UnknownTask(String),

    #[error("Task graph has a cycle through '{0}'")]
    Cycle(String),
}

/// Declared task nodes, kept in declaration order.
#[derive(Debug, Default, Clone)]
pub struct TaskGraph {
    nodes: IndexMap<String, TaskNode>,
}

impl TaskGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: TaskNode) -> Result<(), GraphError> {
        if self.nodes.contains_key(&node.name) {
            return Err(GraphError::DuplicateTask(node.name));
        }
        self.nodes.insert(node.name.clone(), node);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TaskNode> {
        self.nodes.get(name)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &TaskNode> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check that every prerequisite exists and the graph is acyclic.
    pub fn validate(&self) -> Result<(), GraphError> {
        let mut graph = DiGraph::<&str, ()>::new();
        let indices: IndexMap<&str, _> = self
            .nodes
            .keys()
            .map(|name| (name.as_str(), graph.add_node(name.as_str())))
            .collect();

        for node in self.nodes.values() {
            for prerequisite in &node.prerequisites {
                let Some(&from) = indices.get(prerequisite.as_str()) else {
                    return Err(GraphError::UnknownPrerequisite {
                        task: node.name.clone(),
                        prerequisite: prerequisite.clone(),
                    });
                };
                graph.add_edge(from, indices[node.name.as_str()], ());
            }
        }

        toposort(&graph, None)
            .map(|_| ())
            .map_err(|cycle| GraphError::Cycle(graph[cycle.node_id()].to_string()))
    }

    /// Linearize `targets` and everything they depend on.
    ///
    /// The order is a depth-first walk in declaration order: prerequisites
    /// come before their dependents, listed the way the node declares them,
    /// and each node appears once. The graph must be valid.
    pub fn plan(&self, targets: &[&str]) -> Result<Vec<String>, GraphError> {
        let mut order = IndexSet::new();
        for target in targets {
            self.visit(target, &mut order)?;
        }
        Ok(order.into_iter().collect())
    }

    /// The named tasks only, without prerequisites, deduplicated.
    pub fn plan_only(&self, targets: &[&str]) -> Result<Vec<String>, GraphError> {
        let mut order = IndexSet::new();
        for target in targets {
            if !self.nodes.contains_key(*target) {
                return Err(GraphError::UnknownTask(target.to_string()));
            }
            order.insert(target.to_string());
        }
        Ok(order.into_iter().collect())
    }

    fn visit(&self, name: &str, order: &mut IndexSet<String>) -> Result<(), GraphError> {
        if order.contains(name) {
            return Ok(());
        }
        let node = self
            .nodes
            .get(name)
            .ok_or_else(|| GraphError::UnknownTask(name.to_string()))?;
        for prerequisite in &node.prerequisites {
            self.visit(prerequisite, order)?;
        }
        order.insert(name.to_string());
        Ok(())
    }
}
