/*
 * lib.rs
 *
 * Crate root for annotated-yaml.
 */

//! # annotated-yaml
//!
//! YAML documents that remember where their string scalars live.
//!
//! Every quoted or plain string scalar produced by the parser records the
//! byte span of its content in the source and the quote style it was written
//! with. The mutation engine uses those spans to rewrite a single scalar
//! directly in the file, leaving comments, ordering and formatting of the
//! rest of the file untouched, and shifts the spans of later scalars so that
//! further edits against the same tree stay accurate.
//!
//! ## Design
//!
//! A [`Document`] owns its tree. Spanned scalars point back to their
//! document through a [`DocumentId`] handle rather than a reference, and
//! callers name a scalar to edit through a copyable [`ScalarRef`]. This lets
//! [`Document::modify`] take the document mutably, so mutations against one
//! tree are sequential by construction.
//!
//! Before writing, the engine compares the bytes at the recorded span with
//! the text seen at parse time and fails with [`Error::Modified`] if another
//! writer changed them.
//!
//! ## Example
//!
//! ```rust,no_run
//! use annotated_yaml::{parse, NodePath};
//! use std::fs::OpenOptions;
//!
//! let mut doc = parse("config.yaml").unwrap();
//! let mut file = OpenOptions::new()
//!     .read(true)
//!     .write(true)
//!     .open("config.yaml")
//!     .unwrap();
//!
//! let target = doc
//!     .scalar_ref(&NodePath::parse("repos.poky.protocol").unwrap())
//!     .unwrap();
//! doc.modify(target, &mut file, "https").unwrap();
//! ```

mod document;
mod emit;
mod error;
mod mutation;
mod node;
mod observer;
mod parser;
mod path;
mod span;
mod walk;

pub use document::Document;
pub use emit::dump;
pub use error::{Error, Result};
pub use mutation::{SourceFile, modify, modify_observed};
pub use node::{Mapping, MappingEntry, Node, PlainScalar};
pub use observer::{EditObserver, NoopObserver, TracingObserver};
pub use parser::{parse, parse_str};
pub use path::{NodePath, PathSegment};
pub use span::{DocumentId, QuoteStyle, ScalarId, ScalarRef, Span, SpannedScalar};
pub use walk::{Visitor, VisitorMut, spanned_scalars, walk, walk_mut};
