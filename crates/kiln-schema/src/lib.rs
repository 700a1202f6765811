//! Shared types for the kiln build-order engine.
//!
//! Holds the package name newtype, the on-disk `package.toml` format and the
//! build-requirement string parser. Nothing here knows about the dependency
//! graph itself; that lives in `kiln-core`.

pub mod package;
pub mod requirement;
pub mod types;

// Re-exports
pub use package::{PackageDefinition, PackageError};
pub use requirement::parse_requirements;
pub use types::*;

/// File name of a package definition inside its package directory.
pub const PACKAGE_FILE: &str = "package.toml";
