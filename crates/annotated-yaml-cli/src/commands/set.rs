/*
 * set.rs
 *
 * In-place scalar edits.
 */

//! `ayaml set`: rewrite one or more string scalars in place.
//!
//! Edits are applied one after another against the same parsed tree, so
//! later edits see the offsets produced by earlier ones. The rest of the
//! file, comments included, is left as it is.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing::info;

/// Arguments for the set command
#[derive(Debug)]
pub struct SetArgs {
    pub file: PathBuf,
    pub path: String,
    pub value: String,
    /// Extra `PATH=VALUE` edits
    pub edits: Vec<String>,
}

pub fn execute(args: SetArgs) -> Result<()> {
    let mut edits = vec![(args.path, args.value)];
    for edit in &args.edits {
        let (path, value) = edit
            .split_once('=')
            .with_context(|| format!("Expected PATH=VALUE, got '{edit}'"))?;
        edits.push((path.to_string(), value.to_string()));
    }

    let mut doc = super::load(&args.file)?;
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(&args.file)
        .with_context(|| format!("Failed to open {} for writing", args.file.display()))?;

    for (path, value) in &edits {
        let target = doc.scalar_ref(&super::node_path(path)?)?;
        doc.modify(target, &mut file, value)
            .with_context(|| format!("Failed to set {path}"))?;
        info!(path = %path, value = %value, "Updated scalar");
    }
    Ok(())
}
