//! Build-order resolution for kiln projects.
//!
//! A [`DependencyGraph`] is built once per project snapshot from a set of
//! [`PackageSource`]s. Each call to [`DependencyGraph::solve`] then answers
//! "what must be rebuilt, in which order, and why" for one changed package.

pub mod graph;
pub mod project;
pub mod source;

pub use graph::{BuildRequirement, DependencyGraph, DependencyNode, Direction, DrawOptions};
pub use project::{CONFIG_FILE, Project, ProjectConfig, ProjectError, ProjectPackage};
pub use source::PackageSource;

pub use kiln_schema::{PackageError, PackageName};
