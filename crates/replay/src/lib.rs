//! Recorded rewriting-engine sessions.
//!
//! A [`Recording`] is a JSON snapshot of what an engine produced for one
//! initial term: strategy rewriting solutions, the states and solutions of
//! a search, and the full rewrite graph. [`RecordedEngine`] replays it
//! through the `explore` accessor traits, so recorded sessions can be
//! explored, searched and graphed without the engine.

pub mod engine;
pub mod types;

pub use engine::{RecordedEngine, RecordedGraph, RecordedRewrites, RecordedSearch, RecordedStateGraph};
pub use types::{
    GraphState, RecordedRewrite, RecordedSolution, RecordedState, Recording, SearchLog,
    Substitution,
};
