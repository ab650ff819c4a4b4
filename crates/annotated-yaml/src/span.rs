/*
 * span.rs
 *
 * Spans, quote styles and spanned scalars.
 */

//! Span-annotated string scalars.
//!
//! A [`SpannedScalar`] is a string value together with the byte range its
//! content occupies in the source buffer, the raw text found there and the
//! quoting style it was written in. The span always excludes the quote
//! characters, so `raw` is exactly the text between `span.start` and
//! `span.end`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Half-open byte range `[start, end)` in a source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length in bytes, or `None` when the span is inverted.
    pub fn len(&self) -> Option<usize> {
        self.end.checked_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether the two spans share at least one byte.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Shift both ends by a signed byte delta.
    pub(crate) fn shift(&mut self, delta: isize) {
        self.start = self.start.saturating_add_signed(delta);
        self.end = self.end.saturating_add_signed(delta);
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// How a string scalar was written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuoteStyle {
    /// Unquoted
    Plain,
    /// `'...'`
    SingleQuoted,
    /// `"..."`
    DoubleQuoted,
}

impl QuoteStyle {
    /// The delimiter character, if the style has one.
    pub fn delimiter(&self) -> Option<char> {
        match self {
            QuoteStyle::Plain => None,
            QuoteStyle::SingleQuoted => Some('\''),
            QuoteStyle::DoubleQuoted => Some('"'),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStyle::Plain => "plain",
            QuoteStyle::SingleQuoted => "single-quoted",
            QuoteStyle::DoubleQuoted => "double-quoted",
        }
    }
}

impl fmt::Display for QuoteStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static NEXT_DOCUMENT_ID: AtomicUsize = AtomicUsize::new(1);

/// Process-unique identifier of a parsed document.
///
/// Spanned scalars refer back to their document through this handle instead
/// of holding a reference to the tree that owns them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub usize);

impl DocumentId {
    pub(crate) fn next() -> Self {
        DocumentId(NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Ordinal of a spanned scalar within its document (pre-order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScalarId(pub usize);

/// Copyable handle naming one spanned scalar of one document.
///
/// Obtained from [`SpannedScalar::handle`] or
/// [`Document::scalar_ref`](crate::Document::scalar_ref) and passed to the
/// mutation engine once the borrow of the tree has ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScalarRef {
    pub document: DocumentId,
    pub scalar: ScalarId,
}

/// A string scalar annotated with its location in the source buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedScalar {
    pub(crate) value: String,
    pub(crate) raw: String,
    pub(crate) span: Span,
    pub(crate) style: QuoteStyle,
    pub(crate) id: ScalarId,
    pub(crate) document: Option<DocumentId>,
}

impl SpannedScalar {
    pub(crate) fn new(
        value: String,
        raw: String,
        span: Span,
        style: QuoteStyle,
        id: ScalarId,
    ) -> Self {
        Self {
            value,
            raw,
            span,
            style,
            id,
            document: None,
        }
    }

    /// The logical (unescaped) value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The source text expected at [`span`](Self::span).
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn style(&self) -> QuoteStyle {
        self.style
    }

    pub fn id(&self) -> ScalarId {
        self.id
    }

    /// The owning document, once the parser has attached it.
    pub fn document(&self) -> Option<DocumentId> {
        self.document
    }

    /// Handle for the mutation engine. `None` until the scalar is attached
    /// to a document.
    pub fn handle(&self) -> Option<ScalarRef> {
        self.document.map(|document| ScalarRef {
            document,
            scalar: self.id,
        })
    }

    /// Attach the document back-reference. Only the first call has an
    /// effect; returns whether this call attached it.
    pub(crate) fn attach(&mut self, document: DocumentId) -> bool {
        if self.document.is_some() {
            return false;
        }
        self.document = Some(document);
        true
    }
}

impl fmt::Display for SpannedScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.value, self.span)
    }
}
