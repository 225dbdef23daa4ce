//! Lazy sequences over engine cursors.
//!
//! [`RewriteIter`] and [`SearchIter`] implement [`Iterator`], so rewrite and
//! search results can be consumed by generic iteration code. Each call to
//! `next` performs exactly one `advance` on the underlying cursor: there is
//! no look-ahead and nothing is cached. Both sequences are finite and
//! single-pass; iterating again requires starting a new operation on the
//! engine.

use std::iter::FusedIterator;

use crate::cursor::{Cursor, CursorState};
use crate::engine::{ExploreError, ResultSource, SearchGraph, SearchSource, StateId};
use crate::path::PathThunk;

/// One strategy-rewriting solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteStep<T> {
    /// Solution term.
    pub term: T,
    /// Rewrites performed up to and including this solution.
    pub rewrites: u64,
}

/// One search solution.
pub struct SearchSolution<S: SearchSource> {
    /// Solution term.
    pub term: S::Item,
    /// Bindings matching the term against the search pattern.
    pub substitution: S::Substitution,
    /// Deferred reconstruction of the path that reached this solution.
    pub path: PathThunk<S::Graph>,
    /// Rewrites performed up to and including this solution.
    pub rewrites: u64,
}

impl<S: SearchSource> SearchSolution<S> {
    /// State id of the solution within its search session.
    pub fn state(&self) -> StateId {
        self.path.state()
    }
}

impl<S> std::fmt::Debug for SearchSolution<S>
where
    S: SearchSource,
    S::Item: std::fmt::Debug,
    S::Substitution: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchSolution")
            .field("term", &self.term)
            .field("substitution", &self.substitution)
            .field("path", &self.path)
            .field("rewrites", &self.rewrites)
            .finish()
    }
}

/// Path type produced by forcing a solution's thunk.
pub type SolutionPath<S> = crate::path::Path<
    <<S as SearchSource>::Graph as SearchGraph>::Term,
    <<S as SearchSource>::Graph as SearchGraph>::Label,
>;

// ---------------------------------------------------------------------------
// RewriteIter
// ---------------------------------------------------------------------------

/// Lazy sequence of `(term, rewrites)` over a rewrite cursor.
#[derive(Debug)]
pub struct RewriteIter<S> {
    cursor: Cursor<S>,
}

impl<S: ResultSource> RewriteIter<S> {
    /// Wrap a freshly started source.
    pub fn new(source: S) -> Self {
        Self::from_cursor(Cursor::new(source))
    }

    /// Adapt an existing cursor.
    pub fn from_cursor(cursor: Cursor<S>) -> Self {
        Self { cursor }
    }

    /// Lifecycle state of the underlying cursor.
    pub fn cursor_state(&self) -> CursorState {
        self.cursor.state()
    }

    /// Cumulative rewrite count reported by the engine.
    pub fn rewrite_count(&self) -> u64 {
        self.cursor.rewrite_count()
    }
}

impl<S: ResultSource> Iterator for RewriteIter<S> {
    type Item = Result<RewriteStep<S::Item>, ExploreError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.cursor.advance() {
            Ok(Some(term)) => Some(Ok(RewriteStep {
                term,
                rewrites: self.cursor.rewrite_count(),
            })),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

impl<S: ResultSource> FusedIterator for RewriteIter<S> {}

// ---------------------------------------------------------------------------
// SearchIter
// ---------------------------------------------------------------------------

/// Lazy sequence of search solutions over a search cursor.
///
/// Path thunks hold a weak handle to the search session. The session lives
/// as long as the cursor, so thunks must be forced before this iterator is
/// dropped.
#[derive(Debug)]
pub struct SearchIter<S> {
    cursor: Cursor<S>,
}

impl<S: SearchSource> SearchIter<S> {
    /// Wrap a freshly started search source.
    pub fn new(source: S) -> Self {
        Self::from_cursor(Cursor::new(source))
    }

    /// Adapt an existing cursor.
    pub fn from_cursor(cursor: Cursor<S>) -> Self {
        Self { cursor }
    }

    /// Lifecycle state of the underlying cursor.
    pub fn cursor_state(&self) -> CursorState {
        self.cursor.state()
    }

    /// Cumulative rewrite count reported by the engine.
    pub fn rewrite_count(&self) -> u64 {
        self.cursor.rewrite_count()
    }

    /// Build the solution for the item just returned by `advance`.
    fn solution(&self, term: S::Item) -> Result<SearchSolution<S>, ExploreError> {
        let source = self.cursor.source();
        let state = source.state_nr()?;
        let substitution = source.substitution()?;
        Ok(SearchSolution {
            term,
            substitution,
            path: PathThunk::new(source.graph(), state),
            rewrites: source.rewrite_count(),
        })
    }
}

impl<S: SearchSource> Iterator for SearchIter<S> {
    type Item = Result<SearchSolution<S>, ExploreError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.cursor.advance() {
            Ok(Some(term)) => Some(self.solution(term)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

impl<S: SearchSource> FusedIterator for SearchIter<S> {}
