//! TOML package definition parsing
//!
//! Every package directory carries a `package.toml` describing what the
//! package builds and what its build consumes.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::requirement::parse_requirements;
use crate::types::PackageName;

/// Errors that can occur when loading or parsing a package definition.
#[derive(Error, Debug)]
pub enum PackageError {
    /// The package directory is missing.
    #[error("package directory {} does not exist", .0.display())]
    MissingDirectory(PathBuf),

    /// The definition file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be deserialized into a valid definition.
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The `name` field disagrees with the package directory name.
    #[error("package name '{found}' does not match its directory '{expected}'")]
    NameMismatch {
        /// Name implied by the package directory.
        expected: PackageName,
        /// Name written in the definition.
        found: PackageName,
    },
}

/// The `[package]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageInfo {
    /// Package name; defaults to the directory name when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<PackageName>,
    /// Short human-readable summary of the package.
    #[serde(default)]
    pub description: String,
    /// Explicit dependencies. When present, even empty, they replace
    /// build-requirement inference for this package.
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Option::is_none"
    )]
    pub depends: Option<Vec<PackageName>>,
}

/// The `[build]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildInfo {
    /// Artifacts produced besides the one named after the package.
    #[serde(default)]
    pub produces: Vec<String>,
    /// Build requirements, possibly with version constraints.
    #[serde(default)]
    pub requires: Vec<String>,
}

/// Complete package definition as stored in `package.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageDefinition {
    /// Identity and explicit dependencies.
    #[serde(default)]
    pub package: PackageInfo,
    /// Produced artifacts and build requirements.
    #[serde(default)]
    pub build: BuildInfo,
}

impl PackageDefinition {
    /// Parse a package definition from a TOML file on disk.
    ///
    /// # Errors
    ///
    /// Returns `PackageError::Io` if the file cannot be read, or
    /// `PackageError::Parse` if the TOML content is invalid.
    pub fn from_file(path: &Path) -> Result<Self, PackageError> {
        let content = fs::read_to_string(path).map_err(|source| PackageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse a package definition from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `PackageError::Parse` if the TOML content is invalid or does
    /// not match the expected schema.
    pub fn parse(content: &str) -> Result<Self, PackageError> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize this definition to a pretty-printed TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `toml::ser::Error` if serialization fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Artifact names this package yields: its own name plus `produces`.
    pub fn produced_artifacts(&self, name: &PackageName) -> BTreeSet<String> {
        std::iter::once(name.to_string())
            .chain(self.build.produces.iter().map(|p| p.trim().to_string()))
            .filter(|p| !p.is_empty())
            .collect()
    }

    /// Artifact names this package's build consumes, constraints stripped.
    pub fn build_requirements(&self) -> BTreeSet<String> {
        self.build
            .requires
            .iter()
            .flat_map(|r| parse_requirements(r))
            .collect()
    }
}

impl std::str::FromStr for PackageDefinition {
    type Err = PackageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Accept either `depends = "a"` or `depends = ["a", "b"]`.
fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<PackageName>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(PackageName),
        Many(Vec<PackageName>),
    }

    Ok(Some(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(name) => vec![name],
        OneOrMany::Many(names) => names,
    }))
}
