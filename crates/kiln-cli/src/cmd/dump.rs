//! Dump command

use anyhow::Result;
use kiln_core::Project;
use tracing::info;

/// Log the whole dependency graph
pub fn dump(project: &Project) -> Result<()> {
    let graph = crate::load_graph(project)?;
    info!(
        "{} package(s) in {}",
        graph.len(),
        project.packages_dir().display()
    );
    graph.dump();
    Ok(())
}
