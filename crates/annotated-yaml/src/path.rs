/*
 * path.rs
 *
 * Dotted node paths.
 */

//! Dotted node paths such as `repos.poky.protocol` or `items.0`.

use crate::{Error, Result};
use std::fmt;

/// One step of a [`NodePath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Mapping key
    Key(String),
    /// Sequence index; also matches a mapping key with the same digits
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => f.write_str(key),
            PathSegment::Index(index) => write!(f, "{index}"),
        }
    }
}

/// A parsed lookup path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePath {
    source: String,
    segments: Vec<PathSegment>,
}

impl NodePath {
    /// Parse a dot separated path. The empty string addresses the root.
    pub fn parse(path: &str) -> Result<Self> {
        let mut segments = Vec::new();
        if !path.is_empty() {
            for part in path.split('.') {
                if part.is_empty() {
                    return Err(Error::InvalidPath {
                        path: path.to_string(),
                        reason: "empty path segment".into(),
                    });
                }
                let segment = match part.parse::<usize>() {
                    Ok(index) => PathSegment::Index(index),
                    Err(_) => PathSegment::Key(part.to_string()),
                };
                segments.push(segment);
            }
        }
        Ok(Self {
            source: path.to_string(),
            segments,
        })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Split into the parent path and the last segment.
    pub fn split_last(&self) -> Option<(NodePath, &PathSegment)> {
        let (last, parent) = self.segments.split_last()?;
        let source = parent
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".");
        Some((
            NodePath {
                source,
                segments: parent.to_vec(),
            },
            last,
        ))
    }

    pub(crate) fn not_found(&self, depth: usize) -> Error {
        let resolved = self.segments[..depth]
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".");
        let reason = match self.segments.get(depth) {
            Some(segment) if resolved.is_empty() => format!("'{segment}' not found at root"),
            Some(segment) => format!("'{segment}' not found under '{resolved}'"),
            None => "path ends early".to_string(),
        };
        Error::InvalidPath {
            path: self.source.clone(),
            reason,
        }
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for NodePath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        NodePath::parse(s)
    }
}
