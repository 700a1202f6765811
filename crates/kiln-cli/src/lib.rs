//! kiln - rebuild planner
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
//!
//! Tells which packages of a project must be rebuilt, and in which order,
//! after some of them changed.
//!
//! # Project Layout
//!
//! ```text
//! project/
//! ├── kiln.toml          # optional settings (packages_dir)
//! └── packages/
//!     ├── libone/
//!     │   └── package.toml
//!     └── libtwo/
//!         └── package.toml
//! ```

pub mod cmd;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};

use kiln_core::{DependencyGraph, Project, ProjectPackage};

#[derive(Debug, Parser)]
#[command(name = "kiln")]
#[command(author, version, about = "kiln - rebuild planner for package projects")]
pub struct Cli {
    /// Project root (default: first parent directory holding kiln.toml)
    #[arg(long, global = true, env = "KILN_PROJECT")]
    pub project: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the packages to rebuild after the given ones changed
    Plan {
        /// Changed package(s)
        #[arg(required = true)]
        packages: Vec<String>,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the dependency graph in Graphviz DOT format
    Graph {
        /// Also draw build requirements no project package provides
        #[arg(long)]
        external: bool,
        /// Follow dependencies of the given packages instead of dependents
        #[arg(long)]
        dependencies: bool,
        /// Restrict the graph to these packages and their neighbours
        packages: Vec<String>,
    },
    /// Log every package with its artifacts and reverse dependencies
    Dump,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

impl Cli {
    /// Open the selected project, or discover it from the working directory.
    pub fn open_project(&self) -> Result<Project> {
        match &self.project {
            Some(root) => Project::open(root)
                .with_context(|| format!("Failed to open project {}", root.display())),
            None => {
                let cwd = std::env::current_dir().context("Failed to read current directory")?;
                Project::discover(&cwd).context("Not inside a kiln project (use --project)")
            }
        }
    }
}

/// Load every package of `project` into a graph.
pub fn load_graph(project: &Project) -> Result<DependencyGraph<ProjectPackage>> {
    DependencyGraph::from_project(project).with_context(|| {
        format!(
            "Failed to list packages in {}",
            project.packages_dir().display()
        )
    })
}
