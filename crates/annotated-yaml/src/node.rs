/*
 * node.rs
 *
 * Document tree node types.
 */

//! The document tree.

use crate::path::{NodePath, PathSegment};
use crate::span::SpannedScalar;
use crate::{Error, Result};

/// A node of a parsed (or caller-built) YAML tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Ordered key/value entries
    Mapping(Mapping),
    /// Ordered items
    Sequence(Vec<Node>),
    /// A scalar without span tracking
    Plain(PlainScalar),
    /// A string scalar with a recorded source span
    Spanned(SpannedScalar),
}

/// Scalars that carry no source position.
#[derive(Debug, Clone, PartialEq)]
pub enum PlainScalar {
    Null,
    Boolean(bool),
    Integer(i64),
    /// Floating point number, kept as written
    Real(String),
    /// A string with no span: block scalars, folded plain scalars, alias
    /// copies and strings inserted after parsing
    String(String),
}

/// An ordered mapping. Keys are unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    entries: Vec<MappingEntry>,
}

/// A key/value pair of a [`Mapping`].
#[derive(Debug, Clone, PartialEq)]
pub struct MappingEntry {
    pub key: Node,
    pub value: Node,
}

impl Node {
    /// A plain string node with no span.
    pub fn string(value: impl Into<String>) -> Self {
        Node::Plain(PlainScalar::String(value.into()))
    }

    pub fn null() -> Self {
        Node::Plain(PlainScalar::Null)
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, Node::Mapping(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, Node::Sequence(_))
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Node::Plain(_) | Node::Spanned(_))
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Node::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            Node::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Node::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_spanned(&self) -> Option<&SpannedScalar> {
        match self {
            Node::Spanned(scalar) => Some(scalar),
            _ => None,
        }
    }

    /// The string value of a string node, spanned or not.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Spanned(scalar) => Some(scalar.value()),
            Node::Plain(PlainScalar::String(value)) => Some(value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Node::Plain(PlainScalar::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Plain(PlainScalar::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Plain(PlainScalar::Null))
    }

    /// Textual form of a scalar node, used for key comparison and display.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Node::Spanned(scalar) => Some(scalar.value().to_string()),
            Node::Plain(PlainScalar::String(value)) => Some(value.clone()),
            Node::Plain(PlainScalar::Integer(i)) => Some(i.to_string()),
            Node::Plain(PlainScalar::Real(r)) => Some(r.clone()),
            Node::Plain(PlainScalar::Boolean(b)) => Some(b.to_string()),
            Node::Plain(PlainScalar::Null) => Some("null".to_string()),
            Node::Mapping(_) | Node::Sequence(_) => None,
        }
    }

    /// Look up a mapping value by key.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_mapping().and_then(|mapping| mapping.get(key))
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.as_mapping_mut().and_then(|mapping| mapping.get_mut(key))
    }

    /// Look up a sequence item by index.
    pub fn index(&self, index: usize) -> Option<&Node> {
        match self {
            Node::Sequence(items) => items.get(index),
            _ => None,
        }
    }

    pub fn index_mut(&mut self, index: usize) -> Option<&mut Node> {
        match self {
            Node::Sequence(items) => items.get_mut(index),
            _ => None,
        }
    }

    /// Number of entries or items; zero for scalars.
    pub fn len(&self) -> usize {
        match self {
            Node::Mapping(mapping) => mapping.len(),
            Node::Sequence(items) => items.len(),
            Node::Plain(_) | Node::Spanned(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append an item to a sequence node.
    pub fn push(&mut self, node: Node) -> Result<()> {
        match self {
            Node::Sequence(items) => {
                items.push(node);
                Ok(())
            }
            _ => Err(Error::InvalidPath {
                path: String::new(),
                reason: "push target is not a sequence".into(),
            }),
        }
    }

    fn step(&self, segment: &PathSegment) -> Option<&Node> {
        match (self, segment) {
            (Node::Sequence(items), PathSegment::Index(i)) => items.get(*i),
            (Node::Mapping(mapping), segment) => mapping.get(&segment.to_string()),
            _ => None,
        }
    }

    fn step_mut(&mut self, segment: &PathSegment) -> Option<&mut Node> {
        match (self, segment) {
            (Node::Sequence(items), PathSegment::Index(i)) => items.get_mut(*i),
            (Node::Mapping(mapping), segment) => mapping.get_mut(&segment.to_string()),
            _ => None,
        }
    }

    /// Resolve a path from this node.
    pub fn lookup(&self, path: &NodePath) -> Result<&Node> {
        let mut current = self;
        for (depth, segment) in path.segments().iter().enumerate() {
            current = current
                .step(segment)
                .ok_or_else(|| path.not_found(depth))?;
        }
        Ok(current)
    }

    pub fn lookup_mut(&mut self, path: &NodePath) -> Result<&mut Node> {
        let mut current = self;
        for (depth, segment) in path.segments().iter().enumerate() {
            current = current
                .step_mut(segment)
                .ok_or_else(|| path.not_found(depth))?;
        }
        Ok(current)
    }

    /// Deep copy with every spanned scalar turned into a plain string.
    ///
    /// Used for alias expansion: the copy does not own any source bytes.
    pub fn unspanned(&self) -> Node {
        match self {
            Node::Mapping(mapping) => Node::Mapping(Mapping {
                entries: mapping
                    .iter()
                    .map(|entry| MappingEntry {
                        key: entry.key.unspanned(),
                        value: entry.value.unspanned(),
                    })
                    .collect(),
            }),
            Node::Sequence(items) => Node::Sequence(items.iter().map(Node::unspanned).collect()),
            Node::Plain(plain) => Node::Plain(plain.clone()),
            Node::Spanned(scalar) => Node::string(scalar.value()),
        }
    }

    fn key_matches(&self, key: &str) -> bool {
        match self {
            Node::Spanned(scalar) => scalar.value() == key,
            Node::Plain(PlainScalar::String(value)) => value == key,
            Node::Plain(PlainScalar::Null) => key == "null" || key == "~",
            Node::Plain(_) => self.scalar_text().is_some_and(|text| text == key),
            Node::Mapping(_) | Node::Sequence(_) => false,
        }
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::string(value)
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::string(value)
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::Plain(PlainScalar::Integer(value))
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Plain(PlainScalar::Boolean(value))
    }
}

impl From<Mapping> for Node {
    fn from(value: Mapping) -> Self {
        Node::Mapping(value)
    }
}

impl From<Vec<Node>> for Node {
    fn from(value: Vec<Node>) -> Self {
        Node::Sequence(value)
    }
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_entries(entries: Vec<MappingEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MappingEntry> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, MappingEntry> {
        self.entries.iter_mut()
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries
            .iter()
            .find(|entry| entry.key.key_matches(key))
            .map(|entry| &entry.value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.entries
            .iter_mut()
            .find(|entry| entry.key.key_matches(key))
            .map(|entry| &mut entry.value)
    }

    /// Insert a plain key/value pair.
    ///
    /// An existing entry keeps its key node (and position) and gets the new
    /// value; the previous value is returned. New entries are appended.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Node>) -> Option<Node> {
        let key = key.into();
        let value = value.into();
        match self.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push(MappingEntry {
                    key: Node::string(key),
                    value,
                });
                None
            }
        }
    }

    /// Remove an entry by key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Node> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.key.key_matches(key))?;
        Some(self.entries.remove(index).value)
    }
}

impl<'a> IntoIterator for &'a Mapping {
    type Item = &'a MappingEntry;
    type IntoIter = std::slice::Iter<'a, MappingEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<K: Into<String>, V: Into<Node>> FromIterator<(K, V)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut mapping = Mapping::new();
        for (key, value) in iter {
            mapping.insert(key, value);
        }
        mapping
    }
}
