//! Engine that answers exploration operations from a [`Recording`].

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use explore::{
    reconstruct, ExploreError, ResultSource, RewriteEngine, RewriteOutcome, SearchGraph,
    SearchRequest, SearchSource, SearchType, StateGraph, StateId,
};

use crate::types::{
    GraphState, RecordedRewrite, RecordedSolution, RecordedState, Recording, Substitution,
};

/// Search session rebuilt from recorded states.
#[derive(Debug)]
pub struct RecordedGraph {
    states: HashMap<StateId, RecordedState>,
}

impl RecordedGraph {
    /// Index `states` by id. Later duplicates replace earlier ones.
    pub fn new(states: &[RecordedState]) -> Self {
        Self {
            states: states.iter().map(|s| (s.id, s.clone())).collect(),
        }
    }

    /// Number of recorded states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether no state was recorded.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    fn get(&self, state: StateId) -> Result<&RecordedState, ExploreError> {
        self.states
            .get(&state)
            .ok_or(ExploreError::InvalidStateReference { state })
    }
}

impl SearchGraph for RecordedGraph {
    type Term = String;
    type Label = String;

    fn state_parent(&self, state: StateId) -> Result<Option<StateId>, ExploreError> {
        Ok(self.get(state)?.parent)
    }

    fn state_term(&self, state: StateId) -> Result<String, ExploreError> {
        Ok(self.get(state)?.term.clone())
    }

    fn rule(&self, state: StateId) -> Result<String, ExploreError> {
        self.get(state)?
            .rule
            .clone()
            .ok_or(ExploreError::InvalidStateReference { state })
    }
}

/// Replays recorded strategy rewriting solutions.
#[derive(Debug)]
pub struct RecordedRewrites {
    pending: VecDeque<RecordedRewrite>,
    rewrites: u64,
}

impl ResultSource for RecordedRewrites {
    type Item = String;

    fn advance(&mut self) -> Result<Option<String>, ExploreError> {
        Ok(self.pending.pop_front().map(|step| {
            self.rewrites = step.rewrites;
            step.term
        }))
    }

    fn rewrite_count(&self) -> u64 {
        self.rewrites
    }
}

/// Replays recorded search solutions that satisfy a [`SearchRequest`].
#[derive(Debug)]
pub struct RecordedSearch {
    graph: Arc<RecordedGraph>,
    pending: VecDeque<RecordedSolution>,
    current: Option<RecordedSolution>,
    request: SearchRequest,
    rewrites: u64,
}

impl RecordedSearch {
    /// Whether `solution` would have been reported by a search with this request.
    ///
    /// The parent chain is only walked when the request filters on depth.
    fn admits(&self, solution: &RecordedSolution) -> Result<bool, ExploreError> {
        let filters_depth = self.request.depth_bound.is_some()
            || matches!(
                self.request.search_type,
                SearchType::OneStep | SearchType::AtLeastOneStep
            );
        if filters_depth {
            let depth = reconstruct(self.graph.as_ref(), solution.state)?.len();
            if self.request.depth_bound.is_some_and(|bound| depth > bound as usize) {
                return Ok(false);
            }
            match self.request.search_type {
                SearchType::OneStep if depth != 1 => return Ok(false),
                SearchType::AtLeastOneStep if depth == 0 => return Ok(false),
                _ => {}
            }
        }
        Ok(match self.request.search_type {
            SearchType::NormalForm => solution.terminal,
            _ => true,
        })
    }
}

impl ResultSource for RecordedSearch {
    type Item = String;

    /// Broken recorded solutions are skipped with a warning; they never end
    /// the replay.
    fn advance(&mut self) -> Result<Option<String>, ExploreError> {
        self.current = None;
        while let Some(solution) = self.pending.pop_front() {
            match self.admits(&solution) {
                Ok(true) => {}
                Ok(false) => {
                    tracing::trace!(state = solution.state, "Skipping recorded solution");
                    continue;
                }
                Err(e) => {
                    tracing::warn!(state = solution.state, error = %e, "Cannot place recorded solution, skipping");
                    continue;
                }
            }
            let term = match self.graph.state_term(solution.state) {
                Ok(term) => term,
                Err(e) => {
                    tracing::warn!(state = solution.state, error = %e, "Recorded solution has no state, skipping");
                    continue;
                }
            };
            self.rewrites = solution.rewrites;
            self.current = Some(solution);
            return Ok(Some(term));
        }
        Ok(None)
    }

    fn rewrite_count(&self) -> u64 {
        self.rewrites
    }
}

impl SearchSource for RecordedSearch {
    type Substitution = Substitution;
    type Graph = RecordedGraph;

    fn state_nr(&self) -> Result<StateId, ExploreError> {
        self.current
            .as_ref()
            .map(|s| s.state)
            .ok_or_else(|| anyhow::anyhow!("no current search solution").into())
    }

    fn substitution(&self) -> Result<Substitution, ExploreError> {
        self.current
            .as_ref()
            .map(|s| s.substitution.clone())
            .ok_or_else(|| anyhow::anyhow!("no current search solution").into())
    }

    fn graph(&self) -> &Arc<RecordedGraph> {
        &self.graph
    }
}

/// Full rewrite graph rebuilt from the recording's `graph` section.
#[derive(Debug)]
pub struct RecordedStateGraph {
    states: HashMap<StateId, GraphState>,
}

impl RecordedStateGraph {
    fn get(&self, state: StateId) -> Result<&GraphState, ExploreError> {
        self.states
            .get(&state)
            .ok_or(ExploreError::InvalidStateReference { state })
    }
}

impl StateGraph for RecordedStateGraph {
    type Term = String;

    fn state_term(&self, state: StateId) -> Result<String, ExploreError> {
        Ok(self.get(state)?.term.clone())
    }

    fn next_state(&self, state: StateId, index: usize) -> Result<Option<StateId>, ExploreError> {
        Ok(self.get(state)?.next.get(index).copied())
    }
}

/// Rewriting engine backed by a recorded session.
///
/// Operations ignore their term, strategy and pattern arguments and replay
/// what was recorded. Search honours the request's search type and depth
/// bound by filtering the recorded solutions.
#[derive(Debug, Clone)]
pub struct RecordedEngine {
    recording: Recording,
}

impl RecordedEngine {
    /// Wrap a loaded recording.
    pub fn new(recording: Recording) -> Self {
        Self { recording }
    }

    /// The underlying recording.
    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    /// The recorded initial term, or the root search state's term.
    pub fn initial_term(&self) -> Option<String> {
        self.recording.initial.clone().or_else(|| {
            self.recording
                .search
                .states
                .iter()
                .find(|s| s.parent.is_none())
                .map(|s| s.term.clone())
        })
    }

    /// The full rewrite graph.
    pub fn state_graph(&self) -> RecordedStateGraph {
        RecordedStateGraph {
            states: self
                .recording
                .graph
                .iter()
                .map(|s| (s.id, s.clone()))
                .collect(),
        }
    }
}

impl RewriteEngine for RecordedEngine {
    type Term = String;
    type Strategy = String;
    type Rewrites = RecordedRewrites;
    type Search = RecordedSearch;

    /// Returns the last recorded rewrite within `limit`, or the input term
    /// unchanged when there is none. `gas` has no recorded counterpart.
    fn erewrite(
        &self,
        term: &String,
        limit: Option<u64>,
        _gas: Option<u64>,
    ) -> Result<RewriteOutcome<String>, ExploreError> {
        let last = self
            .recording
            .rewrites
            .iter()
            .filter(|step| limit.map_or(true, |limit| step.rewrites <= limit))
            .last();
        Ok(match last {
            Some(step) => RewriteOutcome {
                term: step.term.clone(),
                rewrites: step.rewrites,
            },
            None => RewriteOutcome {
                term: term.clone(),
                rewrites: 0,
            },
        })
    }

    fn srewrite(
        &self,
        _term: &String,
        _strategy: &String,
        depth_first: bool,
    ) -> Result<RecordedRewrites, ExploreError> {
        if depth_first {
            tracing::debug!("Replaying strategy solutions in recorded order");
        }
        Ok(RecordedRewrites {
            pending: self.recording.rewrites.iter().cloned().collect(),
            rewrites: 0,
        })
    }

    fn search(
        &self,
        _term: &String,
        _pattern: &String,
        request: &SearchRequest,
    ) -> Result<RecordedSearch, ExploreError> {
        let graph = RecordedGraph::new(&self.recording.search.states);
        if graph.is_empty() {
            return Err(anyhow::anyhow!("recording has no search states").into());
        }
        tracing::debug!(
            states = graph.len(),
            solutions = self.recording.search.solutions.len(),
            request = %request,
            "Replaying search"
        );
        Ok(RecordedSearch {
            graph: Arc::new(graph),
            pending: self.recording.search.solutions.iter().cloned().collect(),
            current: None,
            request: *request,
            rewrites: 0,
        })
    }
}
