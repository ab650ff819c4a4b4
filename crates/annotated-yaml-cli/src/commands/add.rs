/*
 * add.rs
 *
 * Add command implementation.
 */

//! `ayaml add`: insert a key and rewrite the whole file.
//!
//! New keys have no place in the original bytes, so the file is
//! regenerated through the serializer. Quote styles of existing string
//! scalars survive; comments do not.

use anyhow::{Context, Result, bail};
use annotated_yaml::{Node, PathSegment};
use std::fs;
use std::path::Path;
use tracing::info;

pub fn execute(file: &Path, path: &str, value: &str) -> Result<()> {
    let mut doc = super::load(file)?;
    let path = super::node_path(path)?;

    let Some((parent, last)) = path.split_last() else {
        bail!("Cannot add a key at the document root");
    };
    let PathSegment::Key(key) = last else {
        bail!("'{last}' is not a mapping key");
    };
    if doc.lookup(&path).is_ok() {
        bail!("'{path}' already exists; use `ayaml set` to change it");
    }

    doc.insert(&parent, key.as_str(), Node::string(value))?;
    fs::write(file, doc.dump()).with_context(|| format!("Failed to write {}", file.display()))?;
    info!(path = %path, "Added key");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_add_nested_key() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("in.yaml");
        fs::write(&file, "repos:\n  poky:\n    protocol: \"git\"\n").unwrap();

        execute(&file, "repos.my-new-one", "value").unwrap();

        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "repos:\n  poky:\n    protocol: \"git\"\n  my-new-one: value\n"
        );
    }

    #[test]
    fn test_add_existing_key_fails() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("in.yaml");
        fs::write(&file, "a: x\n").unwrap();

        assert!(execute(&file, "a", "y").is_err());
        assert!(execute(&file, "a.b", "y").is_err());
    }
}
