//! tyre_driver: Workspace loading and multi-unit checking.
//!
//! A workspace is an environment (traits, types, members) plus the
//! constraint systems of many independent units. Units share the
//! environment read-only and are solved in parallel.

mod error;
mod format;
mod workspace;

pub use error::DriverError;
pub use format::{
    ConstraintFile, DeclFile, EnvironmentFile, GenericFile, KindFile, MintermFile, TraitFile, TypeFile, UnitFile,
    WorkspaceFile, MAX_UNIT_VARIABLES,
};
pub use workspace::{Unit, UnitReport, Workspace};

use std::path::Path;

/// Load a workspace from JSON text.
pub fn load_workspace(content: &str) -> Result<Workspace, DriverError> {
    let file: WorkspaceFile = serde_json::from_str(content)?;
    file.lower()
}

/// Load a workspace file.
pub fn load_workspace_file(path: impl AsRef<Path>) -> Result<Workspace, DriverError> {
    let content = std::fs::read_to_string(path)?;
    load_workspace(&content)
}
