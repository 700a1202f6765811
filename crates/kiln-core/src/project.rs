//! Project layout and on-disk packages
//!
//! A project is a directory holding `kiln.toml` and a packages directory with
//! one sub-directory per package, each described by a `package.toml`.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use kiln_schema::{PACKAGE_FILE, PackageDefinition, PackageError, PackageName};

use crate::graph::DependencyGraph;
use crate::source::PackageSource;

/// Project configuration file name.
pub const CONFIG_FILE: &str = "kiln.toml";

/// Errors raised while locating or reading a project.
#[derive(Error, Debug)]
pub enum ProjectError {
    /// No `kiln.toml` in the start directory or any of its parents.
    #[error("no kiln.toml found in {} or any parent directory", .0.display())]
    NotFound(PathBuf),

    /// A project file or directory could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// `kiln.toml` is not valid.
    #[error("invalid {}: {source}", .path.display())]
    Config {
        /// Configuration file.
        path: PathBuf,
        /// Parse error.
        #[source]
        source: toml::de::Error,
    },
}

/// Contents of `kiln.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Directory holding one sub-directory per package, relative to the
    /// project root.
    pub packages_dir: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            packages_dir: PathBuf::from("packages"),
        }
    }
}

impl ProjectConfig {
    /// Read `kiln.toml` from `root`, falling back to defaults when the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::Io` when the file exists but cannot be read and
    /// `ProjectError::Config` when it cannot be parsed.
    pub fn load(root: &Path) -> Result<Self, ProjectError> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path).map_err(|source| ProjectError::Io {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ProjectError::Config { path, source })
    }
}

/// A project on disk.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    config: ProjectConfig,
}

impl Project {
    /// Find the project containing `start` by walking up to the first
    /// directory holding `kiln.toml`.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::NotFound` when no ancestor holds a config file,
    /// or any error from [`Project::open`].
    pub fn discover(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start;
        loop {
            if current.join(CONFIG_FILE).is_file() {
                debug!("Found project root {}", current.display());
                return Self::open(current);
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => return Err(ProjectError::NotFound(start.to_path_buf())),
            }
        }
    }

    /// Open the project rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error when `kiln.toml` exists but is unreadable or invalid.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, ProjectError> {
        let root = root.into();
        let config = ProjectConfig::load(&root)?;
        Ok(Self { root, config })
    }

    /// Project root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loaded configuration.
    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Absolute packages directory.
    pub fn packages_dir(&self) -> PathBuf {
        self.root.join(&self.config.packages_dir)
    }

    /// Every package directory of the project, sorted by name, unloaded.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::Io` when the packages directory cannot be read.
    pub fn packages(&self) -> Result<Vec<ProjectPackage>, ProjectError> {
        let dir = self.packages_dir();
        let io_error = |source| ProjectError::Io {
            path: dir.clone(),
            source,
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(&dir).map_err(io_error)? {
            let entry = entry.map_err(io_error)?;
            if entry.path().is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();

        let packages: Vec<ProjectPackage> = names.iter().map(|name| self.package(name)).collect();
        debug!("Found {} package(s) in {}", packages.len(), dir.display());
        Ok(packages)
    }

    /// The package named `name`, whether or not its directory exists.
    pub fn package(&self, name: &str) -> ProjectPackage {
        let name = PackageName::new(name);
        let dir = self.packages_dir().join(&name);
        ProjectPackage::new(name, dir)
    }
}

/// A package directory holding a `package.toml`.
#[derive(Debug, Clone)]
pub struct ProjectPackage {
    name: PackageName,
    dir: PathBuf,
    definition: Option<PackageDefinition>,
}

impl ProjectPackage {
    /// Package `name` stored in `dir`. Nothing is read until
    /// [`load`](PackageSource::load).
    pub fn new(name: PackageName, dir: PathBuf) -> Self {
        Self {
            name,
            dir,
            definition: None,
        }
    }

    /// Package directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Parsed definition, once loaded.
    pub fn definition(&self) -> Option<&PackageDefinition> {
        self.definition.as_ref()
    }
}

impl PackageSource for ProjectPackage {
    fn load(&mut self) -> Result<(), PackageError> {
        if !self.dir.is_dir() {
            return Err(PackageError::MissingDirectory(self.dir.clone()));
        }
        let definition = PackageDefinition::from_file(&self.dir.join(PACKAGE_FILE))?;
        if let Some(found) = definition
            .package
            .name
            .as_ref()
            .filter(|found| **found != self.name)
        {
            return Err(PackageError::NameMismatch {
                expected: self.name.clone(),
                found: found.clone(),
            });
        }
        self.definition = Some(definition);
        Ok(())
    }

    fn name(&self) -> &PackageName {
        &self.name
    }

    fn declared_dependencies(&self) -> Option<&[PackageName]> {
        self.definition.as_ref()?.package.depends.as_deref()
    }

    fn produced_artifacts(&self) -> BTreeSet<String> {
        match &self.definition {
            Some(definition) => definition.produced_artifacts(&self.name),
            None => BTreeSet::from([self.name.to_string()]),
        }
    }

    fn build_requirements(&self) -> BTreeSet<String> {
        self.definition
            .as_ref()
            .map(PackageDefinition::build_requirements)
            .unwrap_or_default()
    }
}

impl DependencyGraph<ProjectPackage> {
    /// Graph of every package of `project`.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::Io` when the packages directory cannot be
    /// listed. Individual packages that fail to load are skipped.
    pub fn from_project(project: &Project) -> Result<Self, ProjectError> {
        let mut graph = Self::new();
        graph.build(project.packages()?);
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "").unwrap();
        fs::create_dir(dir.path().join("packages")).unwrap();
        dir
    }

    fn make_pkg(root: &Path, name: &str, content: &str) {
        let dir = root.join("packages").join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(PACKAGE_FILE), content).unwrap();
    }

    fn names(plan: &[crate::BuildRequirement<'_, ProjectPackage>]) -> Vec<String> {
        plan.iter().map(|r| r.name().to_string()).collect()
    }

    #[test]
    fn test_default_config_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let project = Project::open(dir.path()).unwrap();
        assert_eq!(project.config(), &ProjectConfig::default());
        assert_eq!(project.packages_dir(), dir.path().join("packages"));
    }

    #[test]
    fn test_custom_packages_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "packages_dir = \"pkgs\"\n").unwrap();
        let project = Project::open(dir.path()).unwrap();
        assert_eq!(project.packages_dir(), dir.path().join("pkgs"));
    }

    #[test]
    fn test_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "packages_dir = [").unwrap();
        let err = Project::open(dir.path()).unwrap_err();
        assert!(matches!(err, ProjectError::Config { .. }));
    }

    #[test]
    fn test_discover_from_nested_directory() {
        let dir = project();
        let nested = dir.path().join("packages").join("deep").join("er");
        fs::create_dir_all(&nested).unwrap();

        let project = Project::discover(&nested).unwrap();
        assert_eq!(project.root(), dir.path());
    }

    #[test]
    fn test_discover_without_config() {
        let dir = tempfile::tempdir().unwrap();
        match Project::discover(dir.path()) {
            Err(err) => assert!(matches!(err, ProjectError::NotFound(_))),
            // A kiln.toml above the temp directory.
            Ok(project) => assert_ne!(project.root(), dir.path()),
        }
    }

    #[test]
    fn test_packages_sorted_and_directories_only() {
        let dir = project();
        make_pkg(dir.path(), "zeta", "");
        make_pkg(dir.path(), "alpha", "");
        fs::write(dir.path().join("packages").join("README"), "not a package").unwrap();

        let project = Project::open(dir.path()).unwrap();
        let packages = project.packages().unwrap();
        let names: Vec<&str> = packages.iter().map(|p| p.name().as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert!(packages.iter().all(|p| p.definition().is_none()));
    }

    #[test]
    fn test_missing_packages_dir() {
        let dir = tempfile::tempdir().unwrap();
        let project = Project::open(dir.path()).unwrap();
        assert!(matches!(project.packages(), Err(ProjectError::Io { .. })));
    }

    #[test]
    fn test_load_package() {
        let dir = project();
        make_pkg(
            dir.path(),
            "libone",
            "[package]\nname = \"libone\"\ndepends = \"libtwo\"\n\n[build]\nproduces = [\"libone-devel\"]\n",
        );
        let project = Project::open(dir.path()).unwrap();
        let mut package = project.package("libone");

        assert!(package.declared_dependencies().is_none());
        package.load().unwrap();
        assert_eq!(
            package.declared_dependencies(),
            Some(&[PackageName::new("libtwo")][..])
        );
        assert_eq!(
            package.produced_artifacts(),
            BTreeSet::from(["libone".to_string(), "libone-devel".to_string()])
        );
        assert_eq!(package.dir(), dir.path().join("packages").join("libone"));
    }

    #[test]
    fn test_load_missing_directory() {
        let dir = project();
        let project = Project::open(dir.path()).unwrap();
        let err = project.package("ghost").load().unwrap_err();
        assert!(matches!(err, PackageError::MissingDirectory(_)));
    }

    #[test]
    fn test_load_name_mismatch() {
        let dir = project();
        make_pkg(dir.path(), "libone", "[package]\nname = \"other\"\n");
        let project = Project::open(dir.path()).unwrap();
        let err = project.package("libone").load().unwrap_err();
        assert!(matches!(err, PackageError::NameMismatch { .. }));
    }

    #[test]
    fn test_graph_skips_broken_packages() {
        let dir = project();
        make_pkg(dir.path(), "success", "[package]\ndepends = [\"failed\"]\n");
        make_pkg(dir.path(), "failed", "this is not toml {{{");
        // Directory without package.toml.
        fs::create_dir(dir.path().join("packages").join("empty")).unwrap();

        let project = Project::open(dir.path()).unwrap();
        let graph = DependencyGraph::from_project(&project).unwrap();
        assert_eq!(graph.len(), 1);
        assert_eq!(names(&graph.solve("success")), vec!["success"]);
        assert!(graph.solve("failed").is_empty());
    }

    #[test]
    fn test_graph_from_build_requirements() {
        let dir = project();
        make_pkg(
            dir.path(),
            "libone",
            "[build]\nproduces = [\"libone-bin\", \"libone-devel\"]\nrequires = [\"libtwo-devel\"]\n",
        );
        make_pkg(
            dir.path(),
            "libtwo",
            "[build]\nproduces = [\"libtwo-bin\", \"libtwo-devel\"]\n",
        );
        make_pkg(
            dir.path(),
            "my-software",
            "[build]\nrequires = [\"libone-devel = 3, libtwo-devel\"]\n",
        );

        let project = Project::open(dir.path()).unwrap();
        let graph = DependencyGraph::from_project(&project).unwrap();
        assert_eq!(graph.len(), 3);

        let plan = graph.solve("libtwo");
        assert_eq!(names(&plan), vec!["libtwo", "libone", "my-software"]);
        assert_eq!(plan[1].reasons, vec!["build depends on libtwo-devel"]);
        assert_eq!(
            plan[2].reasons,
            vec!["build depends on libone-devel", "build depends on libtwo-devel"]
        );

        let plan = graph.solve("libone");
        assert_eq!(names(&plan), vec!["libone", "my-software"]);
    }
}
