//! Lazy sequences over term-rewriting engine cursors.
//!
//! A rewriting engine hands out opaque, stateful, single-pass cursors for
//! its exploration operations (strategy rewriting and search). This crate
//! wraps them in owned [`Cursor`]s with idempotent exhaustion and adapts
//! them to standard [`Iterator`]s. Search solutions carry a [`PathThunk`]
//! that rebuilds the discovery path from the search root on demand, by
//! walking the engine's parent-pointer index.
//!
//! The engine itself sits behind small accessor traits, so everything here
//! can be tested with the mocks in [`mocks`].
//!
//! # Key types
//!
//! - [`Explorer`]: starts operations on a [`RewriteEngine`] using an [`ExploreConfig`]
//! - [`RewriteIter`] / [`RewriteStep`]: strategy rewriting results
//! - [`SearchIter`] / [`SearchSolution`]: search results with deferred paths
//! - [`SearchGraph`] / [`reconstruct`] / [`Path`]: discovery paths
//! - [`StateGraph`] / [`explore_graph`]: full rewrite graph walks and DOT export

pub mod adapters;
pub mod config;
pub mod cursor;
pub mod engine;
pub mod graph;
pub mod mocks;
pub mod path;

pub use adapters::{RewriteIter, RewriteStep, SearchIter, SearchSolution, SolutionPath};
pub use config::{ExploreConfig, SearchType};
pub use cursor::{Cursor, CursorState};
pub use engine::{
    ExploreError, Explorer, ResultSource, RewriteEngine, RewriteOutcome, SearchGraph,
    SearchRequest, SearchSource, StateId,
};
pub use graph::{explore_graph, GraphDump, StateGraph};
pub use path::{reconstruct, Path, PathElement, PathStep, PathThunk};
