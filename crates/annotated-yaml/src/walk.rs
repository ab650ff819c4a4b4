/*
 * walk.rs
 *
 * Pre-order tree walker and built-in visitors.
 */

//! Pre-order traversal over a document tree.
//!
//! The walker visits a node before its children. Mapping entries are visited
//! key first, then value, in insertion order; sequence items in order. Every
//! node is reached regardless of depth.

use crate::node::Node;
use crate::span::{DocumentId, ScalarId, SpannedScalar};

/// Read-only node visitor.
pub trait Visitor {
    fn visit(&mut self, node: &Node);
}

/// Node visitor that may change nodes in place.
///
/// Visitors must not restructure the children of the node they are given;
/// the walker descends into whatever children the node has after the visit.
pub trait VisitorMut {
    fn visit(&mut self, node: &mut Node);
}

impl<F: FnMut(&Node)> Visitor for F {
    fn visit(&mut self, node: &Node) {
        self(node)
    }
}

impl<F: FnMut(&mut Node)> VisitorMut for F {
    fn visit(&mut self, node: &mut Node) {
        self(node)
    }
}

pub fn walk<V: Visitor + ?Sized>(node: &Node, visitor: &mut V) {
    visitor.visit(node);
    match node {
        Node::Mapping(mapping) => {
            for entry in mapping {
                walk(&entry.key, visitor);
                walk(&entry.value, visitor);
            }
        }
        Node::Sequence(items) => {
            for item in items {
                walk(item, visitor);
            }
        }
        Node::Plain(_) | Node::Spanned(_) => {}
    }
}

pub fn walk_mut<V: VisitorMut + ?Sized>(node: &mut Node, visitor: &mut V) {
    visitor.visit(node);
    match node {
        Node::Mapping(mapping) => {
            for entry in mapping.iter_mut() {
                walk_mut(&mut entry.key, visitor);
                walk_mut(&mut entry.value, visitor);
            }
        }
        Node::Sequence(items) => {
            for item in items {
                walk_mut(item, visitor);
            }
        }
        Node::Plain(_) | Node::Spanned(_) => {}
    }
}

/// Installs the document back-reference on every spanned scalar.
pub(crate) struct AttachDocument {
    pub document: DocumentId,
    pub attached: usize,
}

impl VisitorMut for AttachDocument {
    fn visit(&mut self, node: &mut Node) {
        if let Node::Spanned(scalar) = node {
            if scalar.attach(self.document) {
                self.attached += 1;
            } else {
                tracing::warn!(
                    scalar = scalar.id().0,
                    "Scalar already attached to a document, keeping the first"
                );
            }
        }
    }
}

/// Shifts the span of every spanned scalar starting at or after `from`.
///
/// The edited scalar is skipped by id; its own span is updated by the
/// mutation engine.
pub(crate) struct ShiftSpans {
    pub from: usize,
    pub delta: isize,
    pub skip: ScalarId,
    pub shifted: usize,
}

impl VisitorMut for ShiftSpans {
    fn visit(&mut self, node: &mut Node) {
        if let Node::Spanned(scalar) = node {
            if scalar.id != self.skip && scalar.span.start >= self.from {
                scalar.span.shift(self.delta);
                self.shifted += 1;
            }
        }
    }
}

/// Finds a spanned scalar by id.
pub(crate) fn find_scalar_mut(node: &mut Node, id: ScalarId) -> Option<&mut SpannedScalar> {
    match node {
        Node::Spanned(scalar) if scalar.id == id => Some(scalar),
        Node::Mapping(mapping) => mapping.iter_mut().find_map(|entry| {
            find_scalar_mut(&mut entry.key, id).or_else(|| find_scalar_mut(&mut entry.value, id))
        }),
        Node::Sequence(items) => items.iter_mut().find_map(|item| find_scalar_mut(item, id)),
        Node::Plain(_) | Node::Spanned(_) => None,
    }
}

/// All spanned scalars in pre-order.
pub fn spanned_scalars(node: &Node) -> Vec<&SpannedScalar> {
    fn collect<'a>(node: &'a Node, out: &mut Vec<&'a SpannedScalar>) {
        match node {
            Node::Spanned(scalar) => out.push(scalar),
            Node::Mapping(mapping) => {
                for entry in mapping {
                    collect(&entry.key, out);
                    collect(&entry.value, out);
                }
            }
            Node::Sequence(items) => items.iter().for_each(|item| collect(item, out)),
            Node::Plain(_) => {}
        }
    }

    let mut out = Vec::new();
    collect(node, &mut out);
    out
}
