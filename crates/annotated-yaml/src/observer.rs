/*
 * observer.rs
 *
 * Diagnostics hooks for the mutation engine.
 */

//! Observer abstraction for scalar edits.
//!
//! The mutation engine reports what it did through [`EditObserver`] instead
//! of logging directly, so callers can route events to `tracing`, collect
//! them in tests, or ignore them.

use crate::span::{ScalarId, Span};
use crate::Error;

/// Receives notifications about scalar edits.
///
/// All methods have empty default implementations.
pub trait EditObserver {
    /// The replacement encodes to the text already in the file.
    fn on_unchanged(&self, _scalar: ScalarId, _span: Span) {}

    /// The scalar was rewritten. `delta` is the change in byte length.
    fn on_rewrite(&self, _scalar: ScalarId, _old: Span, _new: Span, _delta: isize) {}

    /// Later scalars were shifted after a length-changing rewrite.
    fn on_propagated(&self, _from: usize, _delta: isize, _shifted: usize) {}

    /// The edit was refused.
    fn on_rejected(&self, _scalar: ScalarId, _error: &Error) {}
}

/// Observer that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl EditObserver for NoopObserver {}

/// Observer that emits `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl EditObserver for TracingObserver {
    fn on_unchanged(&self, scalar: ScalarId, span: Span) {
        tracing::debug!(scalar = scalar.0, span = %span, "Scalar already has the requested value");
    }

    fn on_rewrite(&self, scalar: ScalarId, old: Span, new: Span, delta: isize) {
        tracing::debug!(
            scalar = scalar.0,
            old = %old,
            new = %new,
            delta,
            "Rewrote scalar in place"
        );
    }

    fn on_propagated(&self, from: usize, delta: isize, shifted: usize) {
        tracing::debug!(from, delta, shifted, "Shifted spans after edit");
    }

    fn on_rejected(&self, scalar: ScalarId, error: &Error) {
        tracing::warn!(scalar = scalar.0, error = %error, "Scalar edit refused");
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;

    /// Records events as strings for assertions.
    #[derive(Debug, Default)]
    pub struct RecordingObserver {
        pub events: RefCell<Vec<String>>,
    }

    impl EditObserver for RecordingObserver {
        fn on_unchanged(&self, scalar: ScalarId, _span: Span) {
            self.events.borrow_mut().push(format!("unchanged {}", scalar.0));
        }

        fn on_rewrite(&self, scalar: ScalarId, old: Span, new: Span, delta: isize) {
            self.events
                .borrow_mut()
                .push(format!("rewrite {} {old} -> {new} ({delta})", scalar.0));
        }

        fn on_propagated(&self, from: usize, delta: isize, shifted: usize) {
            self.events
                .borrow_mut()
                .push(format!("propagated from {from} by {delta}: {shifted}"));
        }

        fn on_rejected(&self, scalar: ScalarId, _error: &Error) {
            self.events.borrow_mut().push(format!("rejected {}", scalar.0));
        }
    }
}
