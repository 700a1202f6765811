//! Plan command

use anyhow::{Context, Result};
use crossterm::style::Stylize;
use kiln_core::Project;
use tracing::warn;

/// Print what to rebuild, in order, after `packages` changed
pub fn plan(project: &Project, packages: &[String], json: bool) -> Result<()> {
    let graph = crate::load_graph(project)?;

    for name in packages {
        if graph.node(name).is_none() {
            warn!("Package {name} not found in project");
        }
    }

    let plan = graph.solve_many(packages);

    if json {
        let output = serde_json::to_string_pretty(&plan).context("Failed to serialize plan")?;
        println!("{output}");
        return Ok(());
    }

    if plan.is_empty() {
        println!("{}", "Nothing to rebuild".dark_grey());
        return Ok(());
    }

    let width = plan.len().to_string().len();
    for (i, requirement) in plan.iter().enumerate() {
        println!(
            "{:>width$}. {}",
            i + 1,
            requirement.name().as_str().white().bold()
        );
        for reason in &requirement.reasons {
            println!("{:>width$}  {}", "", reason.as_str().dark_grey());
        }
    }
    Ok(())
}
