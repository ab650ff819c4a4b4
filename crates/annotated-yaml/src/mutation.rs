/*
 * mutation.rs
 *
 * In-place rewriting of single scalars in the backing file.
 */

//! The mutation engine.
//!
//! [`modify`] replaces the content of one spanned scalar directly in the
//! file it was parsed from. Before writing it checks that the bytes at the
//! recorded span are still the ones seen at parse time, so edits made by
//! someone else in between are reported instead of overwritten. When the
//! length changes, every later scalar of the same document is shifted so
//! that further edits against the same tree keep working.
//!
//! Mutations against one tree must happen one after another; `modify`
//! takes the document mutably, which enforces that.

use crate::document::Document;
use crate::emit::encode_in_style;
use crate::observer::{EditObserver, TracingObserver};
use crate::span::{ScalarRef, Span};
use crate::walk::{ShiftSpans, find_scalar_mut, walk_mut};
use crate::{Error, Result};
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

/// A random-access handle to the bytes a document was parsed from.
pub trait SourceFile: Read + Write + Seek {
    /// Truncate or extend the underlying storage to `len` bytes.
    fn set_len(&mut self, len: u64) -> io::Result<()>;
}

impl SourceFile for File {
    fn set_len(&mut self, len: u64) -> io::Result<()> {
        File::set_len(self, len)
    }
}

impl SourceFile for Cursor<Vec<u8>> {
    fn set_len(&mut self, len: u64) -> io::Result<()> {
        let len = usize::try_from(len).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        self.get_mut().resize(len, 0);
        Ok(())
    }
}

/// Replace the value of the scalar named by `scalar` inside `file`.
///
/// `file` must hold the bytes the document was parsed from, as left by
/// previous calls to this function. The new value is escaped for the
/// scalar's quote style. Writing the current value is a no-op.
///
/// # Errors
///
/// - [`Error::ForeignScalar`] / [`Error::UnknownScalar`] if `scalar` does
///   not name a scalar of `document`.
/// - [`Error::InvalidSpan`] if the recorded span ends before it starts.
/// - [`Error::Modified`] if the file no longer holds the recorded text.
/// - [`Error::Unrepresentable`] if the value cannot be written in the
///   scalar's quote style.
/// - [`Error::Io`] on read, write or truncate failures.
///
/// # Example
///
/// ```rust
/// use annotated_yaml::{parse_str, NodePath};
/// use std::io::Cursor;
///
/// let source = "a: \"x\"\nb: \"y\"\n";
/// let mut doc = parse_str(source).unwrap();
/// let mut file = Cursor::new(source.as_bytes().to_vec());
///
/// let a = doc.scalar_ref(&NodePath::parse("a").unwrap()).unwrap();
/// annotated_yaml::modify(&mut doc, a, &mut file, "longer").unwrap();
///
/// assert_eq!(file.get_ref().as_slice(), b"a: \"longer\"\nb: \"y\"\n");
/// assert_eq!(doc.get("b").unwrap().as_spanned().unwrap().span().start, 16);
/// ```
pub fn modify<F: SourceFile + ?Sized>(
    document: &mut Document,
    scalar: ScalarRef,
    file: &mut F,
    new_value: &str,
) -> Result<()> {
    modify_observed(document, scalar, file, new_value, &TracingObserver)
}

/// [`modify`] with an explicit observer.
///
/// # Errors
///
/// Same as [`modify`].
pub fn modify_observed<F: SourceFile + ?Sized>(
    document: &mut Document,
    scalar: ScalarRef,
    file: &mut F,
    new_value: &str,
    observer: &dyn EditObserver,
) -> Result<()> {
    let result = apply(document, scalar, file, new_value, observer);
    if let Err(error) = &result {
        observer.on_rejected(scalar.scalar, error);
    }
    result
}

fn apply<F: SourceFile + ?Sized>(
    document: &mut Document,
    scalar: ScalarRef,
    file: &mut F,
    new_value: &str,
    observer: &dyn EditObserver,
) -> Result<()> {
    if scalar.document != document.id() {
        return Err(Error::ForeignScalar);
    }
    let target = find_scalar_mut(document.root_mut(), scalar.scalar)
        .ok_or(Error::UnknownScalar(scalar.scalar.0))?;

    let Span { start, end } = target.span;
    let Some(len) = target.span.len() else {
        return Err(Error::InvalidSpan { start, end });
    };

    let actual = read_span(file, start, len)?;
    if actual != target.raw.as_bytes() {
        return Err(Error::Modified {
            expected: target.raw.clone(),
            actual: String::from_utf8_lossy(&actual).into_owned(),
            start,
            end,
        });
    }

    let encoded = encode_in_style(new_value, target.style).ok_or_else(|| Error::Unrepresentable {
        value: new_value.to_string(),
        style: target.style,
    })?;

    if encoded == target.raw {
        observer.on_unchanged(target.id, target.span);
        file.seek(SeekFrom::Start(0))?;
        return Ok(());
    }

    let delta = signed_delta(encoded.len(), target.raw.len());
    if delta == 0 {
        file.seek(SeekFrom::Start(offset(start)))?;
        file.write_all(encoded.as_bytes())?;
        file.flush()?;
    } else {
        // The tail has to be read before the write moves over it.
        file.seek(SeekFrom::Start(offset(end)))?;
        let mut tail = Vec::new();
        file.read_to_end(&mut tail)?;

        file.seek(SeekFrom::Start(offset(start)))?;
        file.write_all(encoded.as_bytes())?;
        file.write_all(&tail)?;
        file.set_len(offset(start + encoded.len() + tail.len()))?;
        file.flush()?;
    }

    let old_span = target.span;
    let id = target.id;
    target.span = Span::new(start, start + encoded.len());
    target.value = new_value.to_string();
    target.raw = encoded;
    observer.on_rewrite(id, old_span, target.span, delta);

    if delta != 0 {
        let mut shift = ShiftSpans {
            from: end,
            delta,
            skip: id,
            shifted: 0,
        };
        walk_mut(document.root_mut(), &mut shift);
        observer.on_propagated(end, delta, shift.shifted);
    }

    file.seek(SeekFrom::Start(0))?;
    Ok(())
}

/// Read up to `len` bytes at `start`. Fewer bytes come back when the file
/// ends early, which the caller treats as a mismatch.
fn read_span<F: SourceFile + ?Sized>(file: &mut F, start: usize, len: usize) -> io::Result<Vec<u8>> {
    file.seek(SeekFrom::Start(offset(start)))?;
    let mut buf = Vec::with_capacity(len);
    (&mut *file).take(offset(len)).read_to_end(&mut buf)?;
    Ok(buf)
}

fn offset(value: usize) -> u64 {
    value as u64
}

fn signed_delta(new_len: usize, old_len: usize) -> isize {
    if new_len >= old_len {
        (new_len - old_len) as isize
    } else {
        -((old_len - new_len) as isize)
    }
}
