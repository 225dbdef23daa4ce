//! Engine boundary: the accessor traits a rewriting engine implements,
//! the error taxonomy, and the [`Explorer`] facade that starts operations.

use std::fmt;
use std::sync::Arc;

use crate::adapters::{RewriteIter, SearchIter};
use crate::config::{ExploreConfig, SearchType};

/// Identifier of a discovered search state, unique within one search session.
///
/// The engine assigns ids in discovery order, so the root is always `0`
/// and every parent id is smaller than the id of its child.
pub type StateId = usize;

/// Errors surfaced by cursors, adapters and path reconstruction.
#[derive(Debug, thiserror::Error)]
pub enum ExploreError {
    /// An accessor was queried with an id the search session does not know,
    /// or the session was torn down before a path was forced.
    #[error("Invalid state reference: {state}")]
    InvalidStateReference { state: StateId },

    /// The parent walk from `start` took more than `bound` steps.
    #[error("Cycle detected walking parents of state {start} (bound {bound})")]
    CycleDetected { start: StateId, bound: usize },

    /// Error raised by the engine itself, passed through unmodified.
    #[error(transparent)]
    Engine(#[from] anyhow::Error),
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Native single-pass result source held by the engine.
///
/// Implementations make no promise about what `advance` does after it has
/// once returned `Ok(None)`; wrap sources in a [`Cursor`](crate::Cursor)
/// to get idempotent exhaustion.
pub trait ResultSource {
    /// Result produced by one successful advance.
    type Item;

    /// Pull the next result, or `None` when the exploration is finished.
    fn advance(&mut self) -> Result<Option<Self::Item>, ExploreError>;

    /// Cumulative number of rewrites performed so far.
    fn rewrite_count(&self) -> u64;
}

/// Result source over search solutions.
///
/// The per-solution accessors refer to the item returned by the most
/// recent successful `advance`.
pub trait SearchSource: ResultSource {
    /// Variable bindings accompanying a solution.
    type Substitution;
    /// The search session the discovered states live in.
    type Graph: SearchGraph;

    /// State id of the current solution.
    fn state_nr(&self) -> Result<StateId, ExploreError>;

    /// Substitution matching the current solution against the pattern.
    fn substitution(&self) -> Result<Self::Substitution, ExploreError>;

    /// Shared handle to the search session.
    fn graph(&self) -> &Arc<Self::Graph>;
}

/// Read-only view of the states a search has discovered.
///
/// Populated by the engine while the search runs and queried one state at
/// a time; nothing is materialised up front.
pub trait SearchGraph {
    /// Term snapshot stored for each state.
    type Term: Clone;
    /// Label of the rule (or strategy transition) on an incoming edge.
    type Label: Clone;

    /// Parent of `state`, `None` for the root.
    fn state_parent(&self, state: StateId) -> Result<Option<StateId>, ExploreError>;

    /// Term snapshot of `state`.
    fn state_term(&self, state: StateId) -> Result<Self::Term, ExploreError>;

    /// Label of the edge that discovered `state`. Not defined for the root.
    fn rule(&self, state: StateId) -> Result<Self::Label, ExploreError>;
}

/// Exploration operations offered by a rewriting engine.
pub trait RewriteEngine {
    /// Engine term handle.
    type Term: Clone;
    /// Parsed strategy expression.
    type Strategy;
    /// Cursor returned by strategy rewriting.
    type Rewrites: ResultSource<Item = Self::Term>;
    /// Cursor returned by search.
    type Search: SearchSource<Item = Self::Term>;

    /// Rewrite `term` along a single path (`erewrite` semantics).
    ///
    /// `limit` bounds the total number of rule rewrites, `gas` the number of
    /// rewrites per position. The input term is left untouched.
    fn erewrite(
        &self,
        term: &Self::Term,
        limit: Option<u64>,
        gas: Option<u64>,
    ) -> Result<RewriteOutcome<Self::Term>, ExploreError>;

    /// Start rewriting `term` under `strategy`.
    ///
    /// `depth_first` selects depth-first exploration instead of the fair
    /// default.
    fn srewrite(
        &self,
        term: &Self::Term,
        strategy: &Self::Strategy,
        depth_first: bool,
    ) -> Result<Self::Rewrites, ExploreError>;

    /// Start a breadth-first search from `term` for states matching `pattern`.
    fn search(
        &self,
        term: &Self::Term,
        pattern: &Self::Term,
        request: &SearchRequest,
    ) -> Result<Self::Search, ExploreError>;
}

/// Result of single-path rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome<T> {
    /// The rewritten term.
    pub term: T,
    /// Total number of rewrites performed.
    pub rewrites: u64,
}

/// Parameters forwarded to the engine when a search starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchRequest {
    /// Which reachable states count as solutions.
    pub search_type: SearchType,
    /// Maximum number of steps from the initial term, `None` for unbounded.
    pub depth_bound: Option<u32>,
}

impl fmt::Display for SearchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.depth_bound {
            Some(depth) => write!(f, "{} (depth {depth})", self.search_type),
            None => write!(f, "{}", self.search_type),
        }
    }
}

// ---------------------------------------------------------------------------
// Explorer
// ---------------------------------------------------------------------------

/// Starts exploration operations on an engine and wraps their cursors.
#[derive(Debug, Clone)]
pub struct Explorer {
    config: ExploreConfig,
}

impl Explorer {
    /// Create a new explorer with the given configuration.
    pub fn new(config: ExploreConfig) -> Self {
        config.validate();
        Self { config }
    }

    /// The configuration this explorer was built with.
    pub fn config(&self) -> &ExploreConfig {
        &self.config
    }

    /// Rewrite `term` along a single path using the configured limits.
    pub fn rewrite<E: RewriteEngine>(
        &self,
        engine: &E,
        term: &E::Term,
    ) -> Result<RewriteOutcome<E::Term>, ExploreError> {
        let outcome = engine.erewrite(term, self.config.rewrite_limit, self.config.gas)?;
        tracing::debug!(rewrites = outcome.rewrites, "Rewrite finished");
        Ok(outcome)
    }

    /// Rewrite `term` under `strategy`, yielding every solution lazily.
    pub fn srewrite<E: RewriteEngine>(
        &self,
        engine: &E,
        term: &E::Term,
        strategy: &E::Strategy,
    ) -> Result<RewriteIter<E::Rewrites>, ExploreError> {
        let source = engine.srewrite(term, strategy, self.config.depth_first)?;
        tracing::debug!(depth_first = self.config.depth_first, "Started strategy rewriting");
        Ok(RewriteIter::new(source))
    }

    /// Search from `term` for states matching `pattern`.
    pub fn search<E: RewriteEngine>(
        &self,
        engine: &E,
        term: &E::Term,
        pattern: &E::Term,
    ) -> Result<SearchIter<E::Search>, ExploreError> {
        let request = self.config.search_request();
        let source = engine.search(term, pattern, &request)?;
        tracing::debug!(request = %request, "Started search");
        Ok(SearchIter::new(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{MockEngine, MockSearchGraph};

    #[test]
    fn test_error_messages() {
        let err = ExploreError::InvalidStateReference { state: 7 };
        assert_eq!(err.to_string(), "Invalid state reference: 7");

        let err = ExploreError::CycleDetected { start: 3, bound: 4 };
        assert!(err.to_string().contains("state 3"));
    }

    #[test]
    fn test_engine_error_is_transparent() {
        let err: ExploreError = anyhow::anyhow!("module not loaded").into();
        assert_eq!(err.to_string(), "module not loaded");
        assert!(matches!(err, ExploreError::Engine(_)));
    }

    #[test]
    fn test_search_request_display() {
        let request = SearchRequest {
            search_type: SearchType::AnySteps,
            depth_bound: None,
        };
        assert_eq!(request.to_string(), "=>*");

        let request = SearchRequest {
            search_type: SearchType::NormalForm,
            depth_bound: Some(3),
        };
        assert_eq!(request.to_string(), "=>! (depth 3)");
    }

    #[test]
    fn test_explorer_forwards_search_request() {
        let engine = MockEngine::new().with_search(MockSearchGraph::new("f(a, a)"), vec![]);
        let config = ExploreConfig {
            search_type: SearchType::OneStep,
            depth_bound: Some(1),
            ..ExploreConfig::default()
        };
        let explorer = Explorer::new(config);
        let solutions: Vec<_> = explorer
            .search(&engine, &"f(a, a)".to_string(), &"f(c, X)".to_string())
            .unwrap()
            .collect();

        assert!(solutions.is_empty());
        let request = engine.last_request().unwrap();
        assert_eq!(request.search_type, SearchType::OneStep);
        assert_eq!(request.depth_bound, Some(1));
    }

    #[test]
    fn test_explorer_forwards_rewrite_limits() {
        let mut engine = MockEngine::new();
        engine.add_erewrite("f(b, b)", "f(c, c)", 2);
        let config = ExploreConfig {
            rewrite_limit: Some(10),
            gas: Some(1),
            ..ExploreConfig::default()
        };
        let explorer = Explorer::new(config);
        let outcome = explorer.rewrite(&engine, &"f(b, b)".to_string()).unwrap();

        assert_eq!(outcome.term, "f(c, c)");
        assert_eq!(outcome.rewrites, 2);
        assert_eq!(engine.last_limits(), Some((Some(10), Some(1))));
    }
}
