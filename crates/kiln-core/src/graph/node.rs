use std::collections::BTreeSet;

use kiln_schema::PackageName;

use crate::source::PackageSource;

/// A package in the [`DependencyGraph`](super::DependencyGraph).
///
/// Produced artifacts and build requirements are captured once when the
/// node is created and never refreshed. Only reverse dependencies are
/// stored; forward dependencies are derived with [`depends_on`](Self::depends_on).
#[derive(Debug)]
pub struct DependencyNode<P> {
    package: P,
    produced: BTreeSet<String>,
    requires: BTreeSet<String>,
    /// Indices of nodes that must be rebuilt when this one is, in the order
    /// the edges were discovered.
    pub(super) rdeps: Vec<usize>,
}

impl<P: PackageSource> DependencyNode<P> {
    pub(super) fn new(package: P) -> Self {
        let produced = package.produced_artifacts();
        let requires = package.build_requirements();
        Self {
            package,
            produced,
            requires,
            rdeps: Vec::new(),
        }
    }

    /// The wrapped package.
    pub fn package(&self) -> &P {
        &self.package
    }

    /// Package name.
    pub fn name(&self) -> &PackageName {
        self.package.name()
    }

    /// Artifacts captured at insertion.
    pub fn produced_artifacts(&self) -> &BTreeSet<String> {
        &self.produced
    }

    /// Build requirements captured at insertion.
    pub fn build_requirements(&self) -> &BTreeSet<String> {
        &self.requires
    }

    /// Whether this package must be rebuilt whenever `other` changes.
    ///
    /// Explicit dependencies, when declared, are the only thing consulted.
    /// Otherwise the package depends on `other` if any of its build
    /// requirements is an artifact `other` produces.
    pub fn depends_on(&self, other: &Self) -> bool {
        match self.package.declared_dependencies() {
            Some(depends) => depends.contains(other.name()),
            None => !self.requires.is_disjoint(&other.produced),
        }
    }

    /// This node's artifacts that `rdep` needs to build.
    pub fn required_artifacts<'a>(&'a self, rdep: &Self) -> Vec<&'a str> {
        self.produced
            .iter()
            .filter(|artifact| rdep.requires.contains(*artifact))
            .map(String::as_str)
            .collect()
    }

    /// Human-readable explanation of why `rdep` is rebuilt after this node.
    pub fn reason_for(&self, rdep: &Self) -> String {
        if rdep.package.declared_dependencies().is_some() {
            format!("depends on {}", self.name())
        } else {
            format!("build depends on {}", self.required_artifacts(rdep).join(", "))
        }
    }
}
