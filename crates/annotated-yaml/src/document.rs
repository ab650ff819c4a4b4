/*
 * document.rs
 *
 * The parsed document and its editing entry points.
 */

//! A parsed document: the root node plus its identity.

use crate::emit;
use crate::mutation::{self, SourceFile};
use crate::node::{Mapping, Node};
use crate::observer::{EditObserver, TracingObserver};
use crate::path::{NodePath, PathSegment};
use crate::span::{DocumentId, ScalarRef, SpannedScalar};
use crate::walk;
use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// The tree produced by one parse call.
///
/// The document owns its nodes. Spanned scalars refer back to it through
/// [`DocumentId`], which is how the mutation engine rejects scalar
/// references coming from another parse of the same file.
#[derive(Debug)]
pub struct Document {
    id: DocumentId,
    root: Node,
    path: Option<PathBuf>,
    scalar_count: usize,
}

/// A clone is a separate tree with its own [`DocumentId`]; scalar
/// references taken from the original are rejected by the copy.
impl Clone for Document {
    fn clone(&self) -> Self {
        let id = DocumentId::next();
        let mut root = self.root.clone();
        walk::walk_mut(&mut root, &mut |node: &mut Node| {
            if let Node::Spanned(scalar) = node {
                scalar.document = Some(id);
            }
        });
        Self {
            id,
            root,
            path: self.path.clone(),
            scalar_count: self.scalar_count,
        }
    }
}

impl Document {
    pub(crate) fn new(id: DocumentId, root: Node, scalar_count: usize) -> Self {
        Self {
            id,
            root,
            path: None,
            scalar_count,
        }
    }

    pub(crate) fn set_path(&mut self, path: PathBuf) {
        self.path = Some(path);
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// The file this document was parsed from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Mutable access to the tree for structural changes.
    ///
    /// Nodes added this way have no span; persist them with [`dump`](Self::dump).
    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    /// Number of spanned scalars created by the parser.
    pub fn scalar_count(&self) -> usize {
        self.scalar_count
    }

    /// Look up a top-level mapping value.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.root.get(key)
    }

    /// Resolve a path from the root.
    pub fn lookup(&self, path: &NodePath) -> Result<&Node> {
        self.root.lookup(path)
    }

    /// Resolve a path to a spanned scalar and return its handle.
    pub fn scalar_ref(&self, path: &NodePath) -> Result<ScalarRef> {
        let node = self.root.lookup(path)?;
        let scalar = node.as_spanned().ok_or_else(|| Error::InvalidPath {
            path: path.to_string(),
            reason: "node is not a spanned string scalar".into(),
        })?;
        scalar.handle().ok_or(Error::ForeignScalar)
    }

    /// All spanned scalars in document order.
    pub fn spanned_scalars(&self) -> Vec<&SpannedScalar> {
        walk::spanned_scalars(&self.root)
    }

    /// Insert a plain key/value pair into the mapping at `parent`.
    ///
    /// Returns the replaced value when the key already existed.
    pub fn insert(
        &mut self,
        parent: &NodePath,
        key: impl Into<String>,
        value: impl Into<Node>,
    ) -> Result<Option<Node>> {
        let target = self.root.lookup_mut(parent)?;
        let mapping: &mut Mapping = target.as_mapping_mut().ok_or_else(|| Error::InvalidPath {
            path: parent.to_string(),
            reason: "node is not a mapping".into(),
        })?;
        Ok(mapping.insert(key, value))
    }

    /// Set the value at `path`, creating the last key if needed.
    ///
    /// The parent must exist. A numeric last segment replaces a sequence
    /// item in place.
    pub fn set(&mut self, path: &NodePath, value: impl Into<Node>) -> Result<Option<Node>> {
        let Some((parent, last)) = path.split_last() else {
            return Ok(Some(std::mem::replace(&mut self.root, value.into())));
        };
        let target = self.root.lookup_mut(&parent)?;
        match (target, last) {
            (Node::Sequence(items), PathSegment::Index(index)) => {
                let slot = items.get_mut(*index).ok_or_else(|| path.not_found(parent.segments().len()))?;
                Ok(Some(std::mem::replace(slot, value.into())))
            }
            (Node::Mapping(mapping), segment) => Ok(mapping.insert(segment.to_string(), value)),
            _ => Err(Error::InvalidPath {
                path: path.to_string(),
                reason: format!("'{parent}' is not a container"),
            }),
        }
    }

    /// Rewrite one scalar in `file`. See [`crate::modify`].
    pub fn modify<F: SourceFile + ?Sized>(
        &mut self,
        scalar: ScalarRef,
        file: &mut F,
        new_value: &str,
    ) -> Result<()> {
        mutation::modify_observed(self, scalar, file, new_value, &TracingObserver)
    }

    /// Like [`modify`](Self::modify), reporting to the given observer.
    pub fn modify_observed<F: SourceFile + ?Sized>(
        &mut self,
        scalar: ScalarRef,
        file: &mut F,
        new_value: &str,
        observer: &dyn EditObserver,
    ) -> Result<()> {
        mutation::modify_observed(self, scalar, file, new_value, observer)
    }

    /// Serialize the whole tree.
    pub fn dump(&self) -> String {
        emit::dump(&self.root)
    }
}
