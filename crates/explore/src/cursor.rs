//! Owned wrapper around a native result source with idempotent exhaustion.

use crate::engine::{ExploreError, ResultSource};

/// Lifecycle of a [`Cursor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Created, never advanced.
    Fresh,
    /// Produced at least one item and may produce more.
    Active,
    /// Signalled the end (or failed). Terminal.
    Exhausted,
}

/// Single-owner handle over one engine result source.
///
/// `advance` takes `&mut self`, so exactly one caller can drive the cursor
/// at a time. The type is deliberately neither `Clone` nor `Copy`. Once
/// `advance` has returned `Ok(None)` or an error, the source is never
/// touched again and every later call returns `Ok(None)`.
///
/// Dropping the cursor drops the source, which releases the engine-side
/// resources.
#[derive(Debug)]
pub struct Cursor<S> {
    source: S,
    state: CursorState,
}

impl<S: ResultSource> Cursor<S> {
    /// Take ownership of a freshly started source.
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: CursorState::Fresh,
        }
    }

    /// Pull the next item from the engine.
    ///
    /// An engine failure is returned once and leaves the cursor exhausted.
    pub fn advance(&mut self) -> Result<Option<S::Item>, ExploreError> {
        if self.state == CursorState::Exhausted {
            return Ok(None);
        }

        match self.source.advance() {
            Ok(Some(item)) => {
                self.state = CursorState::Active;
                Ok(Some(item))
            }
            Ok(None) => {
                self.state = CursorState::Exhausted;
                tracing::debug!(rewrites = self.source.rewrite_count(), "Cursor exhausted");
                Ok(None)
            }
            Err(e) => {
                self.state = CursorState::Exhausted;
                tracing::debug!(error = %e, "Cursor failed");
                Err(e)
            }
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Whether the cursor will never produce another item.
    pub fn is_exhausted(&self) -> bool {
        self.state == CursorState::Exhausted
    }

    /// Cumulative rewrite count reported by the engine.
    pub fn rewrite_count(&self) -> u64 {
        self.source.rewrite_count()
    }

    /// Read-only access to the wrapped source.
    pub fn source(&self) -> &S {
        &self.source
    }
}
