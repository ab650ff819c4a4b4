/*
 * mod.rs
 *
 * Command implementations for ayaml.
 */

//! Command implementations for ayaml
//!
//! Each command module handles the CLI interface and delegates to
//! annotated-yaml for the actual work.

pub mod add;
pub mod dump;
pub mod get;
pub mod set;
pub mod spans;

use anyhow::{Context, Result};
use annotated_yaml::{Document, NodePath};
use std::path::Path;

/// Parse `file`, attaching the file name to any error.
pub(crate) fn load(file: &Path) -> Result<Document> {
    annotated_yaml::parse(file).with_context(|| format!("Failed to parse {}", file.display()))
}

pub(crate) fn node_path(path: &str) -> Result<NodePath> {
    NodePath::parse(path).with_context(|| format!("Invalid path '{path}'"))
}
