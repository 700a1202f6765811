//! kiln - rebuild planner CLI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use kiln_cli::cmd;
use kiln_cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // dump reports through the log, so it needs at least info.
    let verbosity = match cli.command {
        Commands::Dump => cli.verbose.max(1),
        _ => cli.verbose,
    };
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match &cli.command {
        Commands::Plan { packages, json } => cmd::plan::plan(&cli.open_project()?, packages, *json),
        Commands::Graph {
            external,
            dependencies,
            packages,
        } => cmd::graph::graph(&cli.open_project()?, *external, *dependencies, packages),
        Commands::Dump => cmd::dump::dump(&cli.open_project()?),
        Commands::Completions { shell } => {
            cmd::completions::completions(*shell);
            Ok(())
        }
    }
}
