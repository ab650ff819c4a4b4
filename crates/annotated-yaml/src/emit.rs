/*
 * emit.rs
 *
 * Block-style YAML serializer.
 */

//! Block-style serialization of document trees.
//!
//! Used for whole-document regeneration after structural changes. Targeted
//! edits go through the mutation engine instead so that untouched bytes of
//! the file stay as they are.

use crate::node::{Mapping, Node, PlainScalar};
use crate::parser::resolve_plain;
use crate::span::QuoteStyle;

const INDENT: usize = 2;

/// Render a tree as block-style YAML.
///
/// Spanned scalars keep their quote style. Plain strings that would be read
/// back as something else are single-quoted, or double-quoted when they
/// contain control characters.
pub fn dump(node: &Node) -> String {
    let mut emitter = Emitter { out: String::new() };
    match node {
        Node::Mapping(mapping) if !mapping.is_empty() => emitter.write_mapping(mapping, 0, false),
        Node::Sequence(items) if !items.is_empty() => emitter.write_sequence(items, 0, false),
        _ => {
            emitter.write_inline(node);
            emitter.out.push('\n');
        }
    }
    emitter.out
}

struct Emitter {
    out: String,
}

impl Emitter {
    fn pad(&mut self, indent: usize) {
        self.out.extend(std::iter::repeat_n(' ', indent));
    }

    fn write_mapping(&mut self, mapping: &Mapping, indent: usize, first_inline: bool) {
        for (i, entry) in mapping.iter().enumerate() {
            if i > 0 || !first_inline {
                self.pad(indent);
            }
            if entry.key.is_scalar() {
                self.write_scalar(&entry.key, false);
            } else {
                self.write_flow(&entry.key);
            }
            self.out.push(':');
            self.write_value(&entry.value, indent);
        }
    }

    /// Writes what follows `key:`.
    fn write_value(&mut self, node: &Node, indent: usize) {
        match node {
            Node::Mapping(mapping) if !mapping.is_empty() => {
                self.out.push('\n');
                self.write_mapping(mapping, indent + INDENT, false);
            }
            Node::Sequence(items) if !items.is_empty() => {
                self.out.push('\n');
                self.write_sequence(items, indent + INDENT, false);
            }
            _ => {
                self.out.push(' ');
                self.write_inline(node);
                self.out.push('\n');
            }
        }
    }

    fn write_sequence(&mut self, items: &[Node], indent: usize, first_inline: bool) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 || !first_inline {
                self.pad(indent);
            }
            self.out.push_str("- ");
            match item {
                Node::Mapping(mapping) if !mapping.is_empty() => {
                    self.write_mapping(mapping, indent + INDENT, true);
                }
                Node::Sequence(nested) if !nested.is_empty() => {
                    self.write_sequence(nested, indent + INDENT, true);
                }
                _ => {
                    self.write_inline(item);
                    self.out.push('\n');
                }
            }
        }
    }

    /// A scalar or empty collection in block context.
    fn write_inline(&mut self, node: &Node) {
        if node.is_scalar() {
            self.write_scalar(node, false);
        } else {
            self.write_flow(node);
        }
    }

    /// Single-line rendering: scalars, empty collections and complex keys.
    fn write_flow(&mut self, node: &Node) {
        match node {
            Node::Mapping(mapping) => {
                self.out.push('{');
                for (i, entry) in mapping.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.write_flow(&entry.key);
                    self.out.push_str(": ");
                    self.write_flow(&entry.value);
                }
                self.out.push('}');
            }
            Node::Sequence(items) => {
                self.out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.write_flow(item);
                }
                self.out.push(']');
            }
            Node::Plain(_) | Node::Spanned(_) => self.write_scalar(node, true),
        }
    }

    fn write_scalar(&mut self, node: &Node, flow: bool) {
        match node {
            Node::Spanned(scalar) => {
                let style = match scalar.style() {
                    QuoteStyle::Plain => preferred_style(scalar.value(), flow, false),
                    QuoteStyle::SingleQuoted if has_control(scalar.value()) => {
                        QuoteStyle::DoubleQuoted
                    }
                    quoted => quoted,
                };
                self.out.push_str(&quote(scalar.value(), style));
            }
            Node::Plain(PlainScalar::String(value)) => {
                let style = preferred_style(value, flow, true);
                self.out.push_str(&quote(value, style));
            }
            Node::Plain(PlainScalar::Null) => self.out.push_str("null"),
            Node::Plain(PlainScalar::Boolean(b)) => self.out.push_str(if *b { "true" } else { "false" }),
            Node::Plain(PlainScalar::Integer(i)) => self.out.push_str(&i.to_string()),
            Node::Plain(PlainScalar::Real(r)) => self.out.push_str(r),
            Node::Mapping(_) | Node::Sequence(_) => self.write_flow(node),
        }
    }
}

/// Style used for a string written without quotes.
///
/// Plain scalars read from the source stay plain whenever the parser would
/// read them back as the same string. Strings created in memory are also
/// quoted when a YAML 1.1 reader would take them for a boolean.
fn preferred_style(value: &str, flow: bool, legacy_bools: bool) -> QuoteStyle {
    if has_control(value) {
        QuoteStyle::DoubleQuoted
    } else if needs_quotes(value, flow) || (legacy_bools && is_yaml11_bool(value)) {
        QuoteStyle::SingleQuoted
    } else {
        QuoteStyle::Plain
    }
}

fn has_control(value: &str) -> bool {
    value.chars().any(char::is_control)
}

/// Whether `value` would not be read back as the same string if written
/// unquoted. Resolution follows the core schema used by the parser.
pub(crate) fn needs_quotes(value: &str, flow: bool) -> bool {
    let Some(first) = value.chars().next() else {
        return true;
    };

    if !matches!(resolve_plain(value), PlainScalar::String(_)) {
        return true;
    }

    if matches!(
        first,
        '-' | '?' | ':' | ',' | '[' | ']' | '{' | '}' | '#' | '&' | '*' | '!' | '|' | '>' | '\''
            | '"' | '%' | '@' | '`'
    ) {
        return true;
    }
    if value.starts_with(char::is_whitespace) || value.ends_with(char::is_whitespace) {
        return true;
    }
    if value.contains(": ") || value.contains(" #") || value.ends_with(':') {
        return true;
    }
    if flow && value.contains([',', '[', ']', '{', '}']) {
        return true;
    }
    has_control(value)
}

fn is_yaml11_bool(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "yes" | "no" | "on" | "off" | "y" | "n"
    )
}

/// Render `value` with the given delimiters, escaping as needed.
pub(crate) fn quote(value: &str, style: QuoteStyle) -> String {
    match style {
        QuoteStyle::Plain => value.to_string(),
        QuoteStyle::SingleQuoted => format!("'{}'", escape_single(value)),
        QuoteStyle::DoubleQuoted => format!("\"{}\"", escape_double(value)),
    }
}

/// Text to place between the delimiters of a scalar of `style`, or `None`
/// when the value cannot be written in that style on a single line.
pub(crate) fn encode_in_style(value: &str, style: QuoteStyle) -> Option<String> {
    match style {
        QuoteStyle::Plain => (!needs_quotes(value, true)).then(|| value.to_string()),
        QuoteStyle::SingleQuoted => (!has_control(value)).then(|| escape_single(value)),
        QuoteStyle::DoubleQuoted => Some(escape_double(value)),
    }
}

fn escape_single(value: &str) -> String {
    value.replace('\'', "''")
}

fn escape_double(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", u32::from(c))),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_str;

    #[test]
    fn test_round_trip_canonical_document() {
        let source = "\
repos:
  poky:
    url: git://git.yoctoproject.org/poky
    protocol: 'https'
    revision: \"master\"
    depth: 1
  meta-oe:
    paths:
      - meta-oe
      - 'meta-python'
jobs: 4
shallow: false
";
        let doc = parse_str(source).unwrap();
        assert_eq!(dump(doc.root()), source);
    }

    #[test]
    fn test_sequence_of_mappings() {
        let source = "- name: a\n  url: x\n- name: b\n  url: y\n";
        let doc = parse_str(source).unwrap();
        assert_eq!(dump(doc.root()), source);
    }

    #[test]
    fn test_nested_sequences_and_empty_collections() {
        let doc = parse_str("a: [[1, 2], []]\nb: {}\n").unwrap();
        assert_eq!(dump(doc.root()), "a:\n  - - 1\n    - 2\n  - []\nb: {}\n");
    }

    #[test]
    fn test_plain_strings_quoted_when_ambiguous() {
        let mut mapping = Mapping::new();
        mapping.insert("a", "true");
        mapping.insert("b", "12");
        mapping.insert("c", "key: value");
        mapping.insert("d", "");
        mapping.insert("e", "line\nbreak");
        mapping.insert("f", "it's");
        mapping.insert("g", "plain text");
        let out = dump(&Node::Mapping(mapping));
        assert_eq!(
            out,
            "a: 'true'\nb: '12'\nc: 'key: value'\nd: ''\ne: \"line\\nbreak\"\nf: it's\ng: plain text\n"
        );
    }

    #[test]
    fn test_spanned_scalars_keep_style() {
        let doc = parse_str("a: 'x'\nb: \"y\"\nc: z\n").unwrap();
        assert_eq!(dump(doc.root()), "a: 'x'\nb: \"y\"\nc: z\n");
    }

    #[test]
    fn test_core_schema_strings_stay_plain() {
        let source = "a: yes\nb: on\nc: y\nd: ~x\ne: 1.2.3\nf: Off\n";
        let doc = parse_str(source).unwrap();
        assert_eq!(doc.get("a").and_then(Node::as_str), Some("yes"));
        assert_eq!(doc.get("d").and_then(Node::as_str), Some("~x"));
        assert_eq!(dump(doc.root()), source);

        let reparsed = parse_str(&dump(doc.root())).unwrap();
        assert_eq!(reparsed.get("c").and_then(Node::as_str), Some("y"));
        assert_eq!(reparsed.get("e").and_then(Node::as_str), Some("1.2.3"));
    }

    #[test]
    fn test_created_strings_quote_legacy_booleans() {
        let mut mapping = Mapping::new();
        mapping.insert("a", "yes");
        mapping.insert("b", "N");
        mapping.insert("c", "1.2.3");
        assert_eq!(
            dump(&Node::Mapping(mapping)),
            "a: 'yes'\nb: 'N'\nc: 1.2.3\n"
        );
    }

    #[test]
    fn test_scalar_root() {
        assert_eq!(dump(&Node::from("hello")), "hello\n");
        assert_eq!(dump(&Node::null()), "null\n");
    }

    #[test]
    fn test_encode_in_style() {
        assert_eq!(
            encode_in_style("it's", QuoteStyle::SingleQuoted).as_deref(),
            Some("it''s")
        );
        assert_eq!(
            encode_in_style("say \"hi\"", QuoteStyle::DoubleQuoted).as_deref(),
            Some("say \\\"hi\\\"")
        );
        assert_eq!(encode_in_style("a\nb", QuoteStyle::SingleQuoted), None);
        assert_eq!(encode_in_style("a, b", QuoteStyle::Plain), None);
        assert_eq!(encode_in_style("ssh", QuoteStyle::Plain).as_deref(), Some("ssh"));
        assert_eq!(encode_in_style("yes", QuoteStyle::Plain).as_deref(), Some("yes"));
        assert_eq!(encode_in_style("~", QuoteStyle::Plain), None);
    }

    #[test]
    fn test_needs_quotes() {
        assert!(needs_quotes("", false));
        assert!(needs_quotes("null", false));
        assert!(!needs_quotes("Yes", false));
        assert!(needs_quotes("- item", false));
        assert!(needs_quotes("trailing ", false));
        assert!(needs_quotes("a: b", false));
        assert!(!needs_quotes("a,b", false));
        assert!(needs_quotes("a,b", true));
        assert!(!needs_quotes("git://host/repo.git", false));
    }
}
