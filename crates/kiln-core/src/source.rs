//! Package adapter trait
//!
//! The graph never reads package metadata itself. Anything that can name a
//! package, list what it produces and what its build consumes can take part
//! in resolution by implementing [`PackageSource`].

use std::collections::BTreeSet;

use kiln_schema::{PackageError, PackageName};

/// One buildable unit as seen by the dependency graph.
pub trait PackageSource {
    /// Read the package metadata.
    ///
    /// Called exactly once by [`DependencyGraph::build`](crate::DependencyGraph::build)
    /// before any other accessor except [`name`](Self::name).
    ///
    /// # Errors
    ///
    /// Returns a [`PackageError`] when the metadata is missing or malformed.
    /// The graph skips such packages with a warning.
    fn load(&mut self) -> Result<(), PackageError>;

    /// Unique package name.
    fn name(&self) -> &PackageName;

    /// Explicitly declared dependencies.
    ///
    /// `None` means "infer from build requirements"; `Some` (even empty)
    /// replaces inference entirely.
    fn declared_dependencies(&self) -> Option<&[PackageName]>;

    /// Artifact names this package's build yields. Always contains the
    /// package's own name.
    fn produced_artifacts(&self) -> BTreeSet<String>;

    /// Artifact names this package's build consumes.
    fn build_requirements(&self) -> BTreeSet<String>;
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::path::PathBuf;

    /// In-memory package for graph tests.
    #[derive(Debug, Clone)]
    pub(crate) struct MockPackage {
        name: PackageName,
        depends: Option<Vec<PackageName>>,
        produces: Vec<String>,
        requires: Vec<String>,
        broken: bool,
        loaded: bool,
    }

    impl MockPackage {
        pub(crate) fn new(name: &str) -> Self {
            Self {
                name: PackageName::new(name),
                depends: None,
                produces: Vec::new(),
                requires: Vec::new(),
                broken: false,
                loaded: false,
            }
        }

        pub(crate) fn depends(mut self, names: &[&str]) -> Self {
            self.depends = Some(names.iter().copied().map(PackageName::new).collect());
            self
        }

        pub(crate) fn produces(mut self, artifacts: &[&str]) -> Self {
            self.produces = artifacts.iter().map(ToString::to_string).collect();
            self
        }

        pub(crate) fn requires(mut self, artifacts: &[&str]) -> Self {
            self.requires = artifacts.iter().map(ToString::to_string).collect();
            self
        }

        pub(crate) fn broken(mut self) -> Self {
            self.broken = true;
            self
        }

        pub(crate) fn is_loaded(&self) -> bool {
            self.loaded
        }
    }

    impl PackageSource for MockPackage {
        fn load(&mut self) -> Result<(), PackageError> {
            if self.broken {
                return Err(PackageError::MissingDirectory(PathBuf::from(
                    self.name.as_str(),
                )));
            }
            self.loaded = true;
            Ok(())
        }

        fn name(&self) -> &PackageName {
            &self.name
        }

        fn declared_dependencies(&self) -> Option<&[PackageName]> {
            self.depends.as_deref()
        }

        fn produced_artifacts(&self) -> BTreeSet<String> {
            std::iter::once(self.name.to_string())
                .chain(self.produces.iter().cloned())
                .collect()
        }

        fn build_requirements(&self) -> BTreeSet<String> {
            self.requires.iter().cloned().collect()
        }
    }
}
