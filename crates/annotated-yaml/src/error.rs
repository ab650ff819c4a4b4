/*
 * error.rs
 *
 * Error types for annotated-yaml.
 */

//! Error types for parsing and editing annotated YAML documents.

use crate::span::QuoteStyle;
use thiserror::Error;

/// Result type alias for annotated-yaml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing, editing or addressing a document.
#[derive(Debug, Error)]
pub enum Error {
    /// YAML syntax error reported by the grammar engine.
    #[error("Parse error: {message}")]
    Parse {
        /// Message from the scanner, including its position
        message: String,
    },

    /// A mapping contains the same string key twice.
    #[error("Duplicate mapping key '{key}' at offset {offset}")]
    DuplicateKey {
        /// The repeated key
        key: String,
        /// Byte offset of the second occurrence
        offset: usize,
    },

    /// The grammar engine reported a position that does not match the
    /// source text for a quoted scalar.
    #[error("Malformed span for {style} scalar '{value}' at offset {offset}: {reason}")]
    MalformedSpan {
        /// Logical value reported by the engine
        value: String,
        /// Quote style reported by the engine
        style: QuoteStyle,
        /// Byte offset where the scalar was expected to start
        offset: usize,
        /// What did not line up
        reason: &'static str,
    },

    /// A scalar span with `end < start` reached the mutation engine.
    #[error("Node[{start}:{end}] is illegal")]
    InvalidSpan {
        /// Recorded start offset
        start: usize,
        /// Recorded end offset
        end: usize,
    },

    /// The file content at a recorded span no longer matches the parsed text.
    #[error("Node has been modified: expected='{expected}', actual='{actual}' ({start}:{end})")]
    Modified {
        /// Text recorded at parse time
        expected: String,
        /// Text currently found in the file
        actual: String,
        /// Start of the checked span
        start: usize,
        /// End of the checked span
        end: usize,
    },

    /// The replacement cannot be written in the scalar's quote style.
    #[error("Value '{value}' cannot be written as a {style} scalar")]
    Unrepresentable {
        /// The rejected replacement
        value: String,
        /// Quote style of the target scalar
        style: QuoteStyle,
    },

    /// A scalar reference issued by another document was used.
    #[error("Scalar reference belongs to a different document")]
    ForeignScalar,

    /// A scalar reference did not resolve to a spanned scalar.
    #[error("No spanned scalar with id {0}")]
    UnknownScalar(usize),

    /// A node path could not be resolved.
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath {
        /// The path as written
        path: String,
        /// Why resolution failed
        reason: String,
    },

    /// I/O failure on the backing file.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<yaml_rust2::ScanError> for Error {
    fn from(err: yaml_rust2::ScanError) -> Self {
        Error::Parse {
            message: err.to_string(),
        }
    }
}
