/*
 * spans.rs
 *
 * Spans command implementation.
 */

//! `ayaml spans`: list spanned scalars.

use anyhow::Result;
use annotated_yaml::{QuoteStyle, SpannedScalar};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// One spanned scalar as reported to the user.
#[derive(Debug, Serialize)]
pub struct ScalarInfo<'a> {
    pub id: usize,
    pub start: usize,
    pub end: usize,
    pub style: QuoteStyle,
    pub value: &'a str,
    pub raw: &'a str,
}

impl<'a> From<&'a SpannedScalar> for ScalarInfo<'a> {
    fn from(scalar: &'a SpannedScalar) -> Self {
        Self {
            id: scalar.id().0,
            start: scalar.span().start,
            end: scalar.span().end,
            style: scalar.style(),
            value: scalar.value(),
            raw: scalar.raw(),
        }
    }
}

pub fn execute(file: &Path, json: bool, out: &mut dyn Write) -> Result<()> {
    let doc = super::load(file)?;
    let scalars: Vec<ScalarInfo<'_>> = doc
        .spanned_scalars()
        .into_iter()
        .map(ScalarInfo::from)
        .collect();

    if json {
        serde_json::to_writer_pretty(&mut *out, &scalars)?;
        writeln!(out)?;
    } else {
        for info in &scalars {
            writeln!(
                out,
                "{:>4}:{:<4} {:<13} {}",
                info.start,
                info.end,
                info.style.as_str(),
                info.raw
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_spans_json() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("in.yaml");
        fs::write(&file, "key: \"old\"\n").unwrap();

        let mut out = Vec::new();
        execute(&file, true, &mut out).unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed[1]["start"], 6);
        assert_eq!(parsed[1]["end"], 9);
        assert_eq!(parsed[1]["style"], "double-quoted");
        assert_eq!(parsed[0]["style"], "plain");
    }
}
