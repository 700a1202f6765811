//! Package dependency graph and rebuild-order solver.
//!
//! Edges point from a package to its reverse dependencies: `A` is in
//! `B.rdeps` when `A` must be rebuilt after `B` is. Solving a package walks
//! those edges depth-first, keeps the chain of ancestors to cut dependency
//! loops, and merges every branch into a single ordered plan where each
//! package comes before anything that was pulled in because of it.

mod draw;
mod node;
mod plan;

use std::time::Instant;

use serde::ser::{Serialize, SerializeStruct, Serializer};
use tracing::{debug, info, warn};

use kiln_schema::PackageName;

use crate::source::PackageSource;
use plan::RebuildPlan;

pub use draw::{Direction, DrawOptions};
pub use node::DependencyNode;

/// Reason attached to the package a plan was requested for.
pub const USER_REQUEST: &str = "User request";

/// One package to rebuild, with every cause of its inclusion.
#[derive(Debug)]
pub struct BuildRequirement<'g, P> {
    /// The package to rebuild.
    pub package: &'g P,
    /// Why it is rebuilt, in the order the causes were found. Not
    /// deduplicated: two paths to the same cause give two entries.
    pub reasons: Vec<String>,
}

impl<P: PackageSource> BuildRequirement<'_, P> {
    /// Name of the package to rebuild.
    pub fn name(&self) -> &PackageName {
        self.package.name()
    }
}

impl<P: PackageSource> Serialize for BuildRequirement<'_, P> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("BuildRequirement", 2)?;
        state.serialize_field("package", self.name())?;
        state.serialize_field("reasons", &self.reasons)?;
        state.end()
    }
}

/// Graph of dependencies between the packages of a project.
#[derive(Debug)]
pub struct DependencyGraph<P> {
    nodes: Vec<DependencyNode<P>>,
}

impl<P> Default for DependencyGraph<P> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<P: PackageSource> DependencyGraph<P> {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and insert every package.
    ///
    /// Packages that fail to load, or that reuse the name of a package
    /// already in the graph, are skipped with a warning. Never fails.
    pub fn build<I>(&mut self, packages: I)
    where
        I: IntoIterator<Item = P>,
    {
        let started = Instant::now();
        for mut package in packages {
            if let Err(err) = package.load() {
                warn!("Skipping package {} unable to load: {err}", package.name());
                continue;
            }
            if self.position(package.name()).is_some() {
                warn!("Skipping duplicate package {}", package.name());
                continue;
            }
            self.insert(package);
        }
        debug!(
            "Graph built in {:.4} seconds",
            started.elapsed().as_secs_f64()
        );
        debug!("Graph size: {}", self.nodes.len());
    }

    fn insert(&mut self, package: P) {
        let id = self.nodes.len();
        let mut node = DependencyNode::new(package);
        for (existing_id, existing) in self.nodes.iter_mut().enumerate() {
            if existing.depends_on(&node) {
                node.rdeps.push(existing_id);
            }
            if node.depends_on(existing) {
                existing.rdeps.push(id);
            }
        }
        self.nodes.push(node);
    }

    /// Number of packages in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph holds no package.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[DependencyNode<P>] {
        &self.nodes
    }

    /// Look up a node by package name.
    pub fn node(&self, name: &str) -> Option<&DependencyNode<P>> {
        self.position(name).map(|id| &self.nodes[id])
    }

    /// Reverse dependencies of `node`, in the order they were recorded.
    pub fn rdeps<'a>(
        &'a self,
        node: &'a DependencyNode<P>,
    ) -> impl Iterator<Item = &'a DependencyNode<P>> {
        node.rdeps.iter().map(|&id| &self.nodes[id])
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|node| node.name() == name)
    }

    /// Log every node with its artifacts, requirements and reverse
    /// dependencies.
    pub fn dump(&self) {
        for node in &self.nodes {
            let rdeps: Vec<&str> = self.rdeps(node).map(|rdep| rdep.name().as_str()).collect();
            info!("→ {}", node.name());
            info!("  requires: {:?}", node.build_requirements());
            info!("  produces: {:?}", node.produced_artifacts());
            info!("  rdeps: {rdeps:?}");
        }
    }

    /// Every package to rebuild when `target` changes, ordered so that each
    /// package comes before the ones included because of it.
    ///
    /// `target` comes first with reason [`USER_REQUEST`]. An unknown target
    /// yields an empty plan.
    pub fn solve(&self, target: &str) -> Vec<BuildRequirement<'_, P>> {
        let Some(root) = self.position(target) else {
            debug!("Package {target} not found in graph");
            return Vec::new();
        };
        let mut path = Vec::new();
        let plan = self.visit(root, USER_REQUEST.to_string(), 0, &mut path);
        debug!("{} package(s) to rebuild for {target}", plan.len());
        self.requirements(plan)
    }

    /// One plan covering several changed packages at once.
    ///
    /// Each target's plan is merged into the previous ones with the same
    /// ordering rule as within a single plan. Unknown targets are ignored.
    pub fn solve_many<S: AsRef<str>>(&self, targets: &[S]) -> Vec<BuildRequirement<'_, P>> {
        let mut plan = RebuildPlan::new();
        for target in targets {
            let target = target.as_ref();
            let Some(root) = self.position(target) else {
                debug!("Package {target} not found in graph");
                continue;
            };
            let mut path = Vec::new();
            plan.merge(self.visit(root, USER_REQUEST.to_string(), 0, &mut path), 0);
        }
        self.requirements(plan)
    }

    /// Plan for `id` and everything downstream of it.
    ///
    /// `path` holds the ancestors of the current call: it is cut back to
    /// `depth` entries on entry, so leftovers from a sibling branch never
    /// count as ancestors.
    fn visit(&self, id: usize, reason: String, depth: usize, path: &mut Vec<usize>) -> RebuildPlan {
        let node = &self.nodes[id];
        let indent = "  ".repeat(depth);
        debug!("{indent}→ Source package {} must be rebuilt", node.name());

        let mut plan = RebuildPlan::new();
        plan.record(id, reason);

        path.truncate(depth);
        path.push(id);

        for &rdep_id in &node.rdeps {
            let rdep = &self.nodes[rdep_id];
            let reason = node.reason_for(rdep);

            if path[..depth].contains(&rdep_id) {
                warn!(
                    "Dependency loop detected on {} at depth {depth}: {} → {}",
                    rdep.name(),
                    self.chain(&path[..=depth]),
                    rdep.name()
                );
                plan.record(rdep_id, reason);
                continue;
            }

            debug!("{indent}  Exploring reverse dependency {}", rdep.name());
            let sub = self.visit(rdep_id, reason, depth + 1, path);
            plan.merge(sub, 1);
        }

        plan
    }

    fn chain(&self, path: &[usize]) -> String {
        path.iter()
            .map(|&id| self.nodes[id].name().as_str())
            .collect::<Vec<_>>()
            .join(" → ")
    }

    fn requirements(&self, plan: RebuildPlan) -> Vec<BuildRequirement<'_, P>> {
        plan.into_entries()
            .into_iter()
            .map(|entry| BuildRequirement {
                package: self.nodes[entry.node].package(),
                reasons: entry.reasons,
            })
            .collect()
    }
}
