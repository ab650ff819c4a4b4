/*
 * get.rs
 *
 * Get command implementation.
 */

//! `ayaml get`: print the value at a path.

use anyhow::Result;
use std::io::Write;
use std::path::Path;

/// Scalars print as their text; collections print as block YAML.
pub fn execute(file: &Path, path: &str, out: &mut dyn Write) -> Result<()> {
    let doc = super::load(file)?;
    let node = doc.lookup(&super::node_path(path)?)?;

    match node.scalar_text() {
        Some(text) => writeln!(out, "{text}")?,
        None => write!(out, "{}", annotated_yaml::dump(node))?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn run(content: &str, path: &str) -> Result<String> {
        let temp = TempDir::new()?;
        let file = temp.path().join("in.yaml");
        fs::write(&file, content)?;
        let mut out = Vec::new();
        execute(&file, path, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn test_get_scalar_and_collection() {
        let content = "repos:\n  poky:\n    protocol: 'git'\n    depth: 1\n";
        assert_eq!(run(content, "repos.poky.protocol").unwrap(), "git\n");
        assert_eq!(run(content, "repos.poky.depth").unwrap(), "1\n");
        assert_eq!(
            run(content, "repos.poky").unwrap(),
            "protocol: 'git'\ndepth: 1\n"
        );
    }

    #[test]
    fn test_get_missing_path() {
        assert!(run("a: 1\n", "b").is_err());
    }
}
