//! Mock implementations of the engine traits for testing without an engine.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::engine::{
    ExploreError, ResultSource, RewriteEngine, RewriteOutcome, SearchGraph, SearchRequest,
    SearchSource, StateId,
};
use crate::graph::StateGraph;

// ---------------------------------------------------------------------------
// ScriptedSource
// ---------------------------------------------------------------------------

/// Result source that replays a fixed list of items.
#[derive(Debug)]
pub struct ScriptedSource<T> {
    items: VecDeque<T>,
    rewrites: Vec<u64>,
    yielded: usize,
    advance_calls: usize,
    fail_at: Option<usize>,
    resurrect: Option<T>,
}

impl<T> ScriptedSource<T> {
    /// Yield `items` in order, counting one rewrite per item.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: items.into(),
            rewrites: Vec::new(),
            yielded: 0,
            advance_calls: 0,
            fail_at: None,
            resurrect: None,
        }
    }

    /// Report `rewrites[i]` as the cumulative count after the `i`-th item.
    pub fn with_rewrites(mut self, rewrites: Vec<u64>) -> Self {
        self.rewrites = rewrites;
        self
    }

    /// Fail with an engine error instead of producing item number `index`.
    pub fn fail_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    /// Keep yielding `item` when advanced past the end, like a native
    /// cursor that does not guard its own exhaustion.
    pub fn resurrect_after_end(mut self, item: T) -> Self {
        self.resurrect = Some(item);
        self
    }

    /// Number of times `advance` has been called on the source.
    pub fn advance_calls(&self) -> usize {
        self.advance_calls
    }
}

impl<T: Clone> ResultSource for ScriptedSource<T> {
    type Item = T;

    fn advance(&mut self) -> Result<Option<T>, ExploreError> {
        self.advance_calls += 1;
        if self.fail_at == Some(self.yielded) {
            return Err(anyhow::anyhow!("scripted failure at item {}", self.yielded).into());
        }
        match self.items.pop_front() {
            Some(item) => {
                self.yielded += 1;
                Ok(Some(item))
            }
            None => Ok(self.resurrect.clone()),
        }
    }

    fn rewrite_count(&self) -> u64 {
        match self.yielded {
            0 => 0,
            n => self.rewrites.get(n - 1).copied().unwrap_or(n as u64),
        }
    }
}

// ---------------------------------------------------------------------------
// MockSearchGraph + MockSearchSource
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct MockState {
    parent: Option<StateId>,
    rule: Option<String>,
    term: String,
}

/// In-memory search index that counts every accessor call.
#[derive(Debug)]
pub struct MockSearchGraph {
    states: HashMap<StateId, MockState>,
    calls: AtomicUsize,
}

impl MockSearchGraph {
    /// Create an index holding only the root state `0`.
    pub fn new(root_term: &str) -> Self {
        let mut states = HashMap::new();
        states.insert(
            0,
            MockState {
                parent: None,
                rule: None,
                term: root_term.to_string(),
            },
        );
        Self {
            states,
            calls: AtomicUsize::new(0),
        }
    }

    /// Record state `id`, discovered from `parent` by `rule`.
    ///
    /// No consistency checks: tests use this to build broken indexes too.
    pub fn add_state(&mut self, id: StateId, parent: StateId, rule: &str, term: &str) {
        self.states.insert(
            id,
            MockState {
                parent: Some(parent),
                rule: Some(rule.to_string()),
                term: term.to_string(),
            },
        );
    }

    /// Total number of accessor calls made through [`SearchGraph`].
    pub fn accessor_calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Term of `state` without counting an accessor call.
    pub fn term_of(&self, state: StateId) -> Option<&str> {
        self.states.get(&state).map(|s| s.term.as_str())
    }

    fn lookup(&self, state: StateId) -> Result<&MockState, ExploreError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.states
            .get(&state)
            .ok_or(ExploreError::InvalidStateReference { state })
    }
}

impl Clone for MockSearchGraph {
    /// Clones the states; the copy starts with a fresh call counter.
    fn clone(&self) -> Self {
        Self {
            states: self.states.clone(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl SearchGraph for MockSearchGraph {
    type Term = String;
    type Label = String;

    fn state_parent(&self, state: StateId) -> Result<Option<StateId>, ExploreError> {
        Ok(self.lookup(state)?.parent)
    }

    fn state_term(&self, state: StateId) -> Result<String, ExploreError> {
        Ok(self.lookup(state)?.term.clone())
    }

    fn rule(&self, state: StateId) -> Result<String, ExploreError> {
        self.lookup(state)?
            .rule
            .clone()
            .ok_or(ExploreError::InvalidStateReference { state })
    }
}

/// Search source that reports canned solutions over a [`MockSearchGraph`].
///
/// Each solution adds `state + 1` to the rewrite count, so counts grow
/// strictly and deeper ids cost more.
#[derive(Debug)]
pub struct MockSearchSource {
    graph: Arc<MockSearchGraph>,
    solutions: VecDeque<(StateId, String)>,
    current: Option<(StateId, String)>,
    rewrites: u64,
}

impl MockSearchSource {
    /// Report `(state, substitution)` pairs in order.
    pub fn new(graph: MockSearchGraph, solutions: Vec<(StateId, &str)>) -> Self {
        Self {
            graph: Arc::new(graph),
            solutions: solutions
                .into_iter()
                .map(|(state, subst)| (state, subst.to_string()))
                .collect(),
            current: None,
            rewrites: 0,
        }
    }
}

impl ResultSource for MockSearchSource {
    type Item = String;

    fn advance(&mut self) -> Result<Option<String>, ExploreError> {
        let Some((state, subst)) = self.solutions.pop_front() else {
            self.current = None;
            return Ok(None);
        };
        let term = self
            .graph
            .term_of(state)
            .ok_or(ExploreError::InvalidStateReference { state })?
            .to_string();
        self.rewrites += state as u64 + 1;
        self.current = Some((state, subst));
        Ok(Some(term))
    }

    fn rewrite_count(&self) -> u64 {
        self.rewrites
    }
}

impl SearchSource for MockSearchSource {
    type Substitution = String;
    type Graph = MockSearchGraph;

    fn state_nr(&self) -> Result<StateId, ExploreError> {
        self.current
            .as_ref()
            .map(|(state, _)| *state)
            .ok_or_else(|| anyhow::anyhow!("no current solution").into())
    }

    fn substitution(&self) -> Result<String, ExploreError> {
        self.current
            .as_ref()
            .map(|(_, subst)| subst.clone())
            .ok_or_else(|| anyhow::anyhow!("no current solution").into())
    }

    fn graph(&self) -> &Arc<MockSearchGraph> {
        &self.graph
    }
}

// ---------------------------------------------------------------------------
// MockStateGraph
// ---------------------------------------------------------------------------

/// In-memory rewrite graph with explicit successor lists.
#[derive(Debug, Default)]
pub struct MockStateGraph {
    states: HashMap<StateId, (String, Vec<StateId>)>,
    expansions: RefCell<HashMap<StateId, usize>>,
}

impl MockStateGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `state` with its term and successor list.
    pub fn add_state(&mut self, state: StateId, term: &str, next: Vec<StateId>) {
        self.states.insert(state, (term.to_string(), next));
    }

    /// How many times the successors of `state` were enumerated from the start.
    pub fn expansions(&self, state: StateId) -> usize {
        self.expansions.borrow().get(&state).copied().unwrap_or(0)
    }
}

impl StateGraph for MockStateGraph {
    type Term = String;

    fn state_term(&self, state: StateId) -> Result<String, ExploreError> {
        self.states
            .get(&state)
            .map(|(term, _)| term.clone())
            .ok_or(ExploreError::InvalidStateReference { state })
    }

    fn next_state(&self, state: StateId, index: usize) -> Result<Option<StateId>, ExploreError> {
        let (_, next) = self
            .states
            .get(&state)
            .ok_or(ExploreError::InvalidStateReference { state })?;
        if index == 0 {
            *self.expansions.borrow_mut().entry(state).or_insert(0) += 1;
        }
        Ok(next.get(index).copied())
    }
}

// ---------------------------------------------------------------------------
// MockEngine
// ---------------------------------------------------------------------------

/// Mock engine with canned results for each exploration operation.
///
/// Terms, strategies and labels are plain strings. Strategies are ignored:
/// `srewrite` answers by input term only.
#[derive(Debug, Default)]
pub struct MockEngine {
    srewrites: HashMap<String, Vec<(String, u64)>>,
    erewrites: HashMap<String, (String, u64)>,
    search: Option<(MockSearchGraph, Vec<(StateId, String)>)>,
    last_request: Cell<Option<SearchRequest>>,
    last_limits: Cell<Option<(Option<u64>, Option<u64>)>>,
    last_depth_first: Cell<Option<bool>>,
}

impl MockEngine {
    /// Create an engine with no canned results.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every search with `solutions` over a fresh copy of `graph`.
    pub fn with_search(mut self, graph: MockSearchGraph, solutions: Vec<(StateId, &str)>) -> Self {
        let solutions = solutions
            .into_iter()
            .map(|(state, subst)| (state, subst.to_string()))
            .collect();
        self.search = Some((graph, solutions));
        self
    }

    /// Add the strategy solutions (term, cumulative rewrites) for `term`.
    pub fn add_srewrite(&mut self, term: &str, solutions: Vec<(&str, u64)>) {
        self.srewrites.insert(
            term.to_string(),
            solutions
                .into_iter()
                .map(|(t, n)| (t.to_string(), n))
                .collect(),
        );
    }

    /// Add the single-path rewriting result for `term`.
    pub fn add_erewrite(&mut self, term: &str, result: &str, rewrites: u64) {
        self.erewrites
            .insert(term.to_string(), (result.to_string(), rewrites));
    }

    /// Request passed to the most recent `search`.
    pub fn last_request(&self) -> Option<SearchRequest> {
        self.last_request.get()
    }

    /// `(limit, gas)` passed to the most recent `erewrite`.
    pub fn last_limits(&self) -> Option<(Option<u64>, Option<u64>)> {
        self.last_limits.get()
    }

    /// `depth_first` flag passed to the most recent `srewrite`.
    pub fn last_depth_first(&self) -> Option<bool> {
        self.last_depth_first.get()
    }
}

impl RewriteEngine for MockEngine {
    type Term = String;
    type Strategy = String;
    type Rewrites = ScriptedSource<String>;
    type Search = MockSearchSource;

    fn erewrite(
        &self,
        term: &String,
        limit: Option<u64>,
        gas: Option<u64>,
    ) -> Result<RewriteOutcome<String>, ExploreError> {
        self.last_limits.set(Some((limit, gas)));
        let (result, rewrites) = self
            .erewrites
            .get(term)
            .cloned()
            .unwrap_or_else(|| (term.clone(), 0));
        Ok(RewriteOutcome {
            term: result,
            rewrites,
        })
    }

    fn srewrite(
        &self,
        term: &String,
        _strategy: &String,
        depth_first: bool,
    ) -> Result<ScriptedSource<String>, ExploreError> {
        self.last_depth_first.set(Some(depth_first));
        let solutions = self.srewrites.get(term).cloned().unwrap_or_default();
        let (terms, rewrites): (Vec<_>, Vec<_>) = solutions.into_iter().unzip();
        Ok(ScriptedSource::new(terms).with_rewrites(rewrites))
    }

    fn search(
        &self,
        _term: &String,
        _pattern: &String,
        request: &SearchRequest,
    ) -> Result<MockSearchSource, ExploreError> {
        self.last_request.set(Some(*request));
        let (graph, solutions) = self
            .search
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("no search scripted"))?;
        let solutions = solutions
            .iter()
            .map(|(state, subst)| (*state, subst.as_str()))
            .collect();
        Ok(MockSearchSource::new(graph.clone(), solutions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_source_default_rewrites() {
        let mut source = ScriptedSource::new(vec!["a", "b"]);
        source.advance().unwrap();
        source.advance().unwrap();
        assert_eq!(source.rewrite_count(), 2);
        assert_eq!(source.advance().unwrap(), None);
        assert_eq!(source.advance_calls(), 3);
    }

    #[test]
    fn test_scripted_source_resurrects_without_cursor() {
        let mut source = ScriptedSource::new(vec![]).resurrect_after_end("ghost");
        assert_eq!(source.advance().unwrap(), Some("ghost"));
    }

    #[test]
    fn test_mock_graph_counts_calls() {
        let mut graph = MockSearchGraph::new("r");
        graph.add_state(1, 0, "step", "s");
        assert_eq!(graph.state_parent(1).unwrap(), Some(0));
        assert_eq!(graph.rule(1).unwrap(), "step");
        assert_eq!(graph.state_term(0).unwrap(), "r");
        assert_eq!(graph.accessor_calls(), 3);
        assert_eq!(graph.clone().accessor_calls(), 0);
    }

    #[test]
    fn test_mock_graph_root_has_no_rule() {
        let graph = MockSearchGraph::new("r");
        assert!(matches!(
            graph.rule(0),
            Err(ExploreError::InvalidStateReference { state: 0 })
        ));
    }

    #[test]
    fn test_mock_search_source_without_current() {
        let source = MockSearchSource::new(MockSearchGraph::new("r"), vec![]);
        assert!(matches!(source.state_nr(), Err(ExploreError::Engine(_))));
    }

    #[test]
    fn test_mock_engine_srewrite_unknown_term() {
        let engine = MockEngine::new();
        let mut source = engine
            .srewrite(&"x".to_string(), &"all".to_string(), true)
            .unwrap();
        assert_eq!(source.advance().unwrap(), None);
        assert_eq!(engine.last_depth_first(), Some(true));
    }

    #[test]
    fn test_mock_engine_search_not_scripted() {
        let engine = MockEngine::new();
        let request = SearchRequest {
            search_type: crate::SearchType::AnySteps,
            depth_bound: None,
        };
        let result = engine.search(&"a".to_string(), &"b".to_string(), &request);
        assert!(matches!(result, Err(ExploreError::Engine(_))));
    }
}
