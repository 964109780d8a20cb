//! Tasks command implementation.

use poolpack::TaskGraph;

use crate::cli::ProjectArgs;
use crate::commands::utils;
use crate::error::Result;

/// Print every task with its description and prerequisites to stdout.
pub fn execute(project: &ProjectArgs) -> Result<()> {
    let pipeline = utils::load_pipeline(project)?;
    print!("{}", render(pipeline.graph()));
    Ok(())
}

fn render(graph: &TaskGraph) -> String {
    let width = graph.nodes().map(|node| node.name.len()).max().unwrap_or(0) + 2;

    let mut out = String::new();
    for node in graph.nodes() {
        out.push_str(&format!("{:<width$}{}\n", node.name, node.description));
        if !node.prerequisites.is_empty() {
            out.push_str(&format!(
                "{:<width$}after: {}\n",
                "",
                node.prerequisites.join(", ")
            ));
        }
    }
    out
}
