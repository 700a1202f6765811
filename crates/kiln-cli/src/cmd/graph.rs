//! Graph command

use anyhow::Result;
use kiln_core::{Direction, DrawOptions, PackageName, Project};
use tracing::warn;

/// Print the project graph, or part of it, as a DOT document
pub fn graph(project: &Project, external: bool, dependencies: bool, packages: &[String]) -> Result<()> {
    let graph = crate::load_graph(project)?;

    for name in packages {
        if graph.node(name).is_none() {
            warn!("Package {name} not found in project");
        }
    }

    let options = DrawOptions {
        external,
        packages: packages.iter().map(|p| PackageName::new(p)).collect(),
        direction: if dependencies {
            Direction::Dependencies
        } else {
            Direction::Dependents
        },
    };
    print!("{}", graph.draw_with(&options));
    Ok(())
}
