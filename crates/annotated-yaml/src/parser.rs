/*
 * parser.rs
 *
 * Span-recording YAML parser built on yaml-rust2 events.
 */

//! YAML parser that builds span-annotated document trees.

use crate::document::Document;
use crate::node::{Mapping, MappingEntry, Node, PlainScalar};
use crate::span::{DocumentId, QuoteStyle, ScalarId, Span, SpannedScalar};
use crate::walk::{AttachDocument, walk_mut};
use crate::{Error, Result};
use std::collections::HashMap;
use std::path::Path;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser, Tag};
use yaml_rust2::scanner::{Marker, TScalarStyle};

/// Parse the YAML file at `path`.
///
/// The file is read once and closed before the tree is built. Only the
/// first document of a stream is loaded.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the YAML is invalid, a
/// mapping repeats a key, or the grammar engine reports a position that
/// does not line up with a quoted scalar in the source.
pub fn parse(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let mut document = parse_impl(&content)?;
    document.set_path(path.to_path_buf());
    Ok(document)
}

/// Parse YAML from a string.
///
/// # Example
///
/// ```rust
/// use annotated_yaml::parse_str;
///
/// let doc = parse_str("key: \"old\"\n").unwrap();
/// let scalar = doc.get("key").unwrap().as_spanned().unwrap();
/// assert_eq!(scalar.span().start, 6);
/// assert_eq!(scalar.span().end, 9);
/// ```
///
/// # Errors
///
/// Same as [`parse`], minus the I/O failures.
pub fn parse_str(content: &str) -> Result<Document> {
    parse_impl(content)
}

fn parse_impl(content: &str) -> Result<Document> {
    let mut parser = Parser::new_from_str(content);
    let mut builder = DocumentBuilder::new(content);

    parser
        .load(&mut builder, false) // false = single document only
        .map_err(Error::from)?;

    let (mut root, scalar_count) = builder.result()?;

    let id = DocumentId::next();
    let mut attach = AttachDocument {
        document: id,
        attached: 0,
    };
    walk_mut(&mut root, &mut attach);
    tracing::debug!(
        document = id.0,
        scalars = scalar_count,
        attached = attach.attached,
        "Parsed annotated document"
    );

    Ok(Document::new(id, root, scalar_count))
}

/// Receives marked events and assembles the tree bottom-up.
struct DocumentBuilder<'a> {
    source: &'a str,

    /// Byte offset of every character, only needed for non-ASCII sources
    /// because the scanner counts characters.
    char_offsets: Option<Vec<usize>>,

    stack: Vec<BuildNode>,

    root: Option<Node>,

    /// Anchored nodes, stored without spans for alias expansion.
    anchors: HashMap<usize, Node>,

    next_scalar: usize,

    /// First error seen; later events are ignored.
    error: Option<Error>,
}

enum BuildNode {
    Sequence {
        anchor: usize,
        items: Vec<Node>,
    },
    Mapping {
        anchor: usize,
        entries: Vec<MappingEntry>,
        pending_key: Option<Node>,
    },
}

impl<'a> DocumentBuilder<'a> {
    fn new(source: &'a str) -> Self {
        let char_offsets = if source.is_ascii() {
            None
        } else {
            Some(source.char_indices().map(|(offset, _)| offset).collect())
        };
        Self {
            source,
            char_offsets,
            stack: Vec::new(),
            root: None,
            anchors: HashMap::new(),
            next_scalar: 0,
            error: None,
        }
    }

    fn result(self) -> Result<(Node, usize)> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let root = self.root.unwrap_or_else(Node::null);
        Ok((root, self.next_scalar))
    }

    fn fail(&mut self, error: Error) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn byte_offset(&self, marker: &Marker) -> usize {
        let index = marker.index();
        match &self.char_offsets {
            None => index,
            Some(offsets) => offsets.get(index).copied().unwrap_or(self.source.len()),
        }
    }

    fn push_complete(&mut self, node: Node, offset: usize) {
        let Some(parent) = self.stack.last_mut() else {
            if self.root.is_none() {
                self.root = Some(node);
            }
            return;
        };

        let failure = match parent {
            BuildNode::Sequence { items, .. } => {
                items.push(node);
                None
            }
            BuildNode::Mapping {
                entries,
                pending_key,
                ..
            } => match pending_key.take() {
                Some(key) => {
                    entries.push(MappingEntry { key, value: node });
                    None
                }
                None => {
                    let duplicate = node.scalar_text().filter(|text| {
                        entries
                            .iter()
                            .any(|entry| entry.key.scalar_text().as_deref() == Some(text.as_str()))
                    });
                    match duplicate {
                        Some(key) => Some(Error::DuplicateKey { key, offset }),
                        None => {
                            *pending_key = Some(node);
                            None
                        }
                    }
                }
            },
        };

        if let Some(error) = failure {
            self.fail(error);
        }
    }

    fn register_anchor(&mut self, anchor: usize, node: &Node) {
        if anchor > 0 {
            self.anchors.insert(anchor, node.unspanned());
        }
    }

    fn next_id(&mut self) -> ScalarId {
        let id = ScalarId(self.next_scalar);
        self.next_scalar += 1;
        id
    }

    fn scalar_node(
        &mut self,
        value: String,
        style: TScalarStyle,
        tag: Option<&Tag>,
        offset: usize,
    ) -> Result<Node> {
        match style {
            TScalarStyle::SingleQuoted => self
                .quoted_scalar(value, QuoteStyle::SingleQuoted, offset)
                .map(Node::Spanned),
            TScalarStyle::DoubleQuoted => self
                .quoted_scalar(value, QuoteStyle::DoubleQuoted, offset)
                .map(Node::Spanned),
            TScalarStyle::Plain => {
                let forced_string = tag.is_some_and(|tag| tag.suffix == "str");
                if !forced_string {
                    let resolved = resolve_plain(&value);
                    if !matches!(resolved, PlainScalar::String(_)) {
                        return Ok(Node::Plain(resolved));
                    }
                }
                Ok(self.plain_scalar(value, offset))
            }
            // Literal and folded block scalars have no single contiguous
            // span for their value.
            _ => Ok(Node::string(value)),
        }
    }

    fn quoted_scalar(
        &mut self,
        value: String,
        style: QuoteStyle,
        offset: usize,
    ) -> Result<SpannedScalar> {
        let source = self.source;
        let bytes = source.as_bytes();
        let malformed = |value: String, reason| Error::MalformedSpan {
            value,
            style,
            offset,
            reason,
        };

        let Some(delimiter) = style.delimiter() else {
            return Err(malformed(value, "plain scalar has no delimiters"));
        };
        if bytes.get(offset).copied() != u8::try_from(delimiter).ok() {
            return Err(malformed(value, "missing opening quote"));
        }

        let start = offset + 1;
        let end = match style {
            QuoteStyle::SingleQuoted => find_single_quote_end(bytes, start),
            _ => find_double_quote_end(bytes, start),
        };
        let Some(end) = end else {
            return Err(malformed(value, "unterminated quote"));
        };

        let raw = &source[start..end];
        // Without escapes or line folding the quoted span must hold exactly
        // the value plus its two delimiters.
        if !has_escapes(raw, style) && raw != value {
            let reason = if raw.len() == value.len() {
                "quoted span content does not match value"
            } else {
                "quoted span length does not match value"
            };
            return Err(malformed(value, reason));
        }

        let raw = raw.to_string();
        let id = self.next_id();
        Ok(SpannedScalar::new(
            value,
            raw,
            Span::new(start, end),
            style,
            id,
        ))
    }

    fn plain_scalar(&mut self, value: String, offset: usize) -> Node {
        // An empty plain scalar has no text of its own; the engine reports
        // it at whatever token follows.
        if value.is_empty() {
            return Node::string(value);
        }
        let verbatim = self
            .source
            .get(offset..)
            .is_some_and(|rest| rest.starts_with(value.as_str()));
        if !verbatim {
            // Folded over several lines; the value is not a substring of
            // the source.
            tracing::debug!(offset, "Plain scalar is not contiguous in source, keeping it unspanned");
            return Node::string(value);
        }

        let span = Span::new(offset, offset + value.len());
        let raw = value.clone();
        let id = self.next_id();
        Node::Spanned(SpannedScalar::new(value, raw, span, QuoteStyle::Plain, id))
    }
}

impl MarkedEventReceiver for DocumentBuilder<'_> {
    fn on_event(&mut self, ev: Event, marker: Marker) {
        if self.error.is_some() {
            return;
        }

        match ev {
            Event::Nothing => {}

            Event::StreamStart => {}
            Event::StreamEnd => {}
            Event::DocumentStart => {}
            Event::DocumentEnd => {}

            Event::Scalar(value, style, anchor, tag) => {
                let offset = self.byte_offset(&marker);
                match self.scalar_node(value, style, tag.as_ref(), offset) {
                    Ok(node) => {
                        self.register_anchor(anchor, &node);
                        self.push_complete(node, offset);
                    }
                    Err(error) => self.fail(error),
                }
            }

            Event::SequenceStart(anchor, _tag) => {
                self.stack.push(BuildNode::Sequence {
                    anchor,
                    items: Vec::new(),
                });
            }

            Event::SequenceEnd => {
                let offset = self.byte_offset(&marker);
                if let Some(BuildNode::Sequence { anchor, items }) = self.stack.pop() {
                    let node = Node::Sequence(items);
                    self.register_anchor(anchor, &node);
                    self.push_complete(node, offset);
                }
            }

            Event::MappingStart(anchor, _tag) => {
                self.stack.push(BuildNode::Mapping {
                    anchor,
                    entries: Vec::new(),
                    pending_key: None,
                });
            }

            Event::MappingEnd => {
                let offset = self.byte_offset(&marker);
                if let Some(BuildNode::Mapping {
                    anchor,
                    mut entries,
                    pending_key,
                }) = self.stack.pop()
                {
                    if let Some(key) = pending_key {
                        entries.push(MappingEntry {
                            key,
                            value: Node::null(),
                        });
                    }
                    let node = Node::Mapping(Mapping::from_entries(entries));
                    self.register_anchor(anchor, &node);
                    self.push_complete(node, offset);
                }
            }

            Event::Alias(anchor) => {
                let offset = self.byte_offset(&marker);
                let node = self.anchors.get(&anchor).cloned().unwrap_or_else(Node::null);
                self.push_complete(node, offset);
            }
        }
    }
}

fn find_single_quote_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut i = from;
    while i < bytes.len() {
        if bytes[i] == b'\'' {
            if bytes.get(i + 1) == Some(&b'\'') {
                i += 2;
                continue;
            }
            return Some(i);
        }
        i += 1;
    }
    None
}

fn find_double_quote_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Whether the raw text of a quoted scalar differs from its value by
/// escaping or line folding.
fn has_escapes(raw: &str, style: QuoteStyle) -> bool {
    raw.contains('\n')
        || match style {
            QuoteStyle::SingleQuoted => raw.contains("''"),
            QuoteStyle::DoubleQuoted => raw.contains('\\'),
            QuoteStyle::Plain => false,
        }
}

/// Resolve an untagged plain scalar with the YAML 1.2 core schema.
pub(crate) fn resolve_plain(value: &str) -> PlainScalar {
    match value {
        "" | "~" | "null" | "Null" | "NULL" => return PlainScalar::Null,
        "true" | "True" | "TRUE" => return PlainScalar::Boolean(true),
        "false" | "False" | "FALSE" => return PlainScalar::Boolean(false),
        _ => {}
    }

    if let Some(i) = parse_integer(value) {
        return PlainScalar::Integer(i);
    }

    if is_float(value) {
        return PlainScalar::Real(value.to_string());
    }

    PlainScalar::String(value.to_string())
}

fn parse_integer(value: &str) -> Option<i64> {
    if let Some(hex) = value.strip_prefix("0x") {
        return i64::from_str_radix(hex, 16).ok();
    }
    if let Some(octal) = value.strip_prefix("0o") {
        return i64::from_str_radix(octal, 8).ok();
    }
    let digits = value.strip_prefix(['-', '+']).unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse::<i64>().ok()
}

fn is_float(value: &str) -> bool {
    let unsigned = value.strip_prefix(['-', '+']).unwrap_or(value);
    if matches!(unsigned, ".inf" | ".Inf" | ".INF") {
        return true;
    }
    if matches!(value, ".nan" | ".NaN" | ".NAN") {
        return true;
    }
    unsigned.bytes().any(|b| b.is_ascii_digit())
        && unsigned
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'-' | b'+'))
        && value.parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walk::spanned_scalars;

    fn span_text<'a>(source: &'a str, scalar: &SpannedScalar) -> &'a str {
        &source[scalar.span().start..scalar.span().end]
    }

    #[test]
    fn test_parse_plain_scalar() {
        let doc = parse_str("hello").unwrap();
        let scalar = doc.root().as_spanned().unwrap();
        assert_eq!(scalar.value(), "hello");
        assert_eq!(scalar.span(), Span::new(0, 5));
        assert_eq!(scalar.style(), QuoteStyle::Plain);
    }

    #[test]
    fn test_parse_typed_scalars() {
        let doc = parse_str("a: 42\nb: true\nc: ~\nd: 1.5\ne: 0x1F\nf: yes\n").unwrap();
        assert_eq!(doc.get("a").unwrap().as_i64(), Some(42));
        assert_eq!(doc.get("b").unwrap().as_bool(), Some(true));
        assert!(doc.get("c").unwrap().is_null());
        assert_eq!(
            doc.get("d").unwrap(),
            &Node::Plain(PlainScalar::Real("1.5".into()))
        );
        assert_eq!(doc.get("e").unwrap().as_i64(), Some(31));
        // YAML 1.2: only true/false are booleans
        assert_eq!(doc.get("f").unwrap().as_str(), Some("yes"));
    }

    #[test]
    fn test_quoted_span_excludes_quotes() {
        let source = "key: \"old\"\nother: 'it''s'\n";
        let doc = parse_str(source).unwrap();

        let key = doc.get("key").unwrap().as_spanned().unwrap();
        assert_eq!(key.span(), Span::new(6, 9));
        assert_eq!(key.style(), QuoteStyle::DoubleQuoted);
        assert_eq!(span_text(source, key), "old");

        let other = doc.get("other").unwrap().as_spanned().unwrap();
        assert_eq!(other.value(), "it's");
        assert_eq!(other.raw(), "it''s");
        assert_eq!(span_text(source, other), "it''s");
        assert_eq!(other.style(), QuoteStyle::SingleQuoted);
    }

    #[test]
    fn test_double_quoted_escapes_keep_raw_text() {
        let source = "msg: \"a\\\"b\\n\"\n";
        let doc = parse_str(source).unwrap();
        let msg = doc.get("msg").unwrap().as_spanned().unwrap();
        assert_eq!(msg.value(), "a\"b\n");
        assert_eq!(msg.raw(), "a\\\"b\\n");
        assert_eq!(span_text(source, msg), msg.raw());
    }

    #[test]
    fn test_quoted_scalars_are_always_strings() {
        let doc = parse_str("a: '42'\nb: \"true\"\nc: !!str 7\n").unwrap();
        assert_eq!(doc.get("a").unwrap().as_str(), Some("42"));
        assert_eq!(doc.get("b").unwrap().as_str(), Some("true"));
        assert_eq!(doc.get("c").unwrap().as_str(), Some("7"));
    }

    #[test]
    fn test_keys_are_spanned() {
        let source = "name: value\n";
        let doc = parse_str(source).unwrap();
        let entry = &doc.root().as_mapping().unwrap().entries()[0];
        let key = entry.key.as_spanned().unwrap();
        assert_eq!(key.span(), Span::new(0, 4));
        assert_eq!(span_text(source, key), "name");
    }

    #[test]
    fn test_nested_structure_spans() {
        let source = "repos:\n  poky:\n    protocol: git\n    paths:\n      - 'meta'\n      - \"meta-poky\"\n";
        let doc = parse_str(source).unwrap();
        let scalars = spanned_scalars(doc.root());
        for scalar in &scalars {
            assert_eq!(span_text(source, scalar), scalar.raw());
        }
        let values: Vec<_> = scalars.iter().map(|s| s.value()).collect();
        assert_eq!(
            values,
            vec!["repos", "poky", "protocol", "git", "paths", "meta", "meta-poky"]
        );
    }

    #[test]
    fn test_ids_follow_source_order() {
        let doc = parse_str("a: x\nb: [y, z]\n").unwrap();
        let ids: Vec<_> = spanned_scalars(doc.root()).iter().map(|s| s.id().0).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        assert_eq!(doc.scalar_count(), 5);
    }

    #[test]
    fn test_every_scalar_attached_to_document() {
        let doc = parse_str("a: [x, {b: y}]\n").unwrap();
        for scalar in spanned_scalars(doc.root()) {
            assert_eq!(scalar.document(), Some(doc.id()));
        }
    }

    #[test]
    fn test_non_ascii_offsets_are_bytes() {
        let source = "title: \"Grüße\"\nnext: 'ok'\n";
        let doc = parse_str(source).unwrap();
        let title = doc.get("title").unwrap().as_spanned().unwrap();
        assert_eq!(span_text(source, title), "Grüße");
        let next = doc.get("next").unwrap().as_spanned().unwrap();
        assert_eq!(span_text(source, next), "ok");
        assert_eq!(next.span().start, source.find("ok").unwrap());
    }

    #[test]
    fn test_block_scalar_is_unspanned() {
        let doc = parse_str("text: |\n  line one\n  line two\n").unwrap();
        let text = doc.get("text").unwrap();
        assert!(text.as_spanned().is_none());
        assert_eq!(text.as_str(), Some("line one\nline two\n"));
    }

    #[test]
    fn test_alias_is_unspanned_copy() {
        let doc = parse_str("base: &b\n  url: x\ncopy: *b\n").unwrap();
        let copy = doc.get("copy").unwrap();
        assert_eq!(copy.get("url").and_then(Node::as_str), Some("x"));
        assert!(copy.get("url").unwrap().as_spanned().is_none());
        assert!(doc.get("base").unwrap().get("url").unwrap().as_spanned().is_some());
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let err = parse_str("a: 1\na: 2\n").unwrap_err();
        assert!(matches!(err, Error::DuplicateKey { ref key, offset: 5 } if key == "a"));
    }

    #[test]
    fn test_syntax_error() {
        let err = parse_str("a: [1, 2\n").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_empty_input_is_null() {
        let doc = parse_str("").unwrap();
        assert!(doc.root().is_null());
    }

    #[test]
    fn test_only_first_document_loaded() {
        let doc = parse_str("a: 1\n---\nb: 2\n").unwrap();
        assert!(doc.get("a").is_some());
        assert!(doc.get("b").is_none());
    }

    #[test]
    fn test_resolve_plain() {
        assert_eq!(resolve_plain("-17"), PlainScalar::Integer(-17));
        assert_eq!(resolve_plain("0o17"), PlainScalar::Integer(15));
        assert_eq!(resolve_plain("1e3"), PlainScalar::Real("1e3".into()));
        assert_eq!(resolve_plain("-.inf"), PlainScalar::Real("-.inf".into()));
        assert_eq!(resolve_plain("inf"), PlainScalar::String("inf".into()));
        assert_eq!(resolve_plain("1.2.3"), PlainScalar::String("1.2.3".into()));
        assert_eq!(resolve_plain("Null"), PlainScalar::Null);
    }

    #[test]
    fn test_find_quote_ends() {
        assert_eq!(find_single_quote_end(b"'a''b'", 1), Some(5));
        assert_eq!(find_double_quote_end(b"\"a\\\"b\"", 1), Some(5));
        assert_eq!(find_double_quote_end(b"\"abc", 1), None);
    }

    #[test]
    fn test_empty_tagged_string_is_unspanned() {
        let doc = parse_str("a: !!str\nb: x\n").unwrap();

        let a = doc.get("a").unwrap();
        assert_eq!(a.as_str(), Some(""));
        assert!(a.as_spanned().is_none());

        let spans: Vec<_> = spanned_scalars(doc.root()).iter().map(|s| s.span()).collect();
        assert_eq!(spans, vec![Span::new(0, 1), Span::new(9, 10), Span::new(12, 13)]);
    }

    #[test]
    fn test_misaligned_quoted_scalar_is_malformed() {
        let mut builder = DocumentBuilder::new("a: \"xy\"\n");

        let err = builder
            .quoted_scalar("xy".into(), QuoteStyle::DoubleQuoted, 2)
            .unwrap_err();
        assert!(matches!(err, Error::MalformedSpan { reason: "missing opening quote", .. }));

        let err = builder
            .quoted_scalar("xyz".into(), QuoteStyle::DoubleQuoted, 3)
            .unwrap_err();
        assert!(matches!(err, Error::MalformedSpan { offset: 3, .. }));

        let mut unterminated = DocumentBuilder::new("'abc");
        let err = unterminated
            .quoted_scalar("abc".into(), QuoteStyle::SingleQuoted, 0)
            .unwrap_err();
        assert!(matches!(err, Error::MalformedSpan { reason: "unterminated quote", .. }));
    }
}
