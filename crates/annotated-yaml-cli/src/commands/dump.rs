/*
 * dump.rs
 *
 * Dump command implementation.
 */

//! `ayaml dump`: print the re-serialized document.

use anyhow::Result;
use std::io::Write;
use std::path::Path;

pub fn execute(file: &Path, out: &mut dyn Write) -> Result<()> {
    let doc = super::load(file)?;
    out.write_all(doc.dump().as_bytes())?;
    Ok(())
}
