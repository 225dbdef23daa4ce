use std::fmt;
use std::sync::{Arc, Weak};

use crate::engine::{ExploreError, SearchGraph, StateId};

/// One rewrite step along a path: the rule applied and the term it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep<T, L> {
    /// Label of the rule on the incoming edge.
    pub rule: L,
    /// Term snapshot of the state the rule led to.
    pub term: T,
}

/// Element of the flattened, alternating form of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathElement<T, L> {
    Term(T),
    Rule(L),
}

/// Discovery path from the search root to a state.
///
/// Starts and ends with a term, with exactly one rule label between each
/// pair of adjacent terms. The root's path is the single root term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path<T, L> {
    root: T,
    steps: Vec<PathStep<T, L>>,
}

impl<T, L> Path<T, L> {
    /// The initial term of the search.
    pub fn root(&self) -> &T {
        &self.root
    }

    /// Rewrite steps in root-to-target order.
    pub fn steps(&self) -> &[PathStep<T, L>] {
        &self.steps
    }

    /// Number of rewrite steps (zero for the root).
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether this is the root's path.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The last term on the path.
    pub fn target(&self) -> &T {
        self.steps.last().map_or(&self.root, |step| &step.term)
    }

    /// Rule labels in application order.
    pub fn rules(&self) -> impl Iterator<Item = &L> {
        self.steps.iter().map(|step| &step.rule)
    }

    /// Flatten into the alternating `term, rule, term, ..., term` sequence.
    pub fn into_elements(self) -> Vec<PathElement<T, L>> {
        let mut elements = Vec::with_capacity(2 * self.steps.len() + 1);
        elements.push(PathElement::Term(self.root));
        for step in self.steps {
            elements.push(PathElement::Rule(step.rule));
            elements.push(PathElement::Term(step.term));
        }
        elements
    }
}

impl<T: Clone, L: Clone> Path<T, L> {
    /// The alternating `term, rule, term, ..., term` sequence.
    pub fn elements(&self) -> Vec<PathElement<T, L>> {
        self.clone().into_elements()
    }
}

impl<T: fmt::Display, L: fmt::Display> fmt::Display for Path<T, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}", self.root)?;
        for step in &self.steps {
            write!(f, ", {}, {}", step.rule, step.term)?;
        }
        write!(f, "]")
    }
}

/// Rebuild the discovery path of `state` by walking parent pointers.
///
/// Ids strictly decrease towards the root, so a consistent index never
/// needs more than `state` steps. The walk is cut off after `state + 1`
/// steps and reported as [`ExploreError::CycleDetected`].
pub fn reconstruct<G>(graph: &G, state: StateId) -> Result<Path<G::Term, G::Label>, ExploreError>
where
    G: SearchGraph + ?Sized,
{
    let bound = state.saturating_add(1);
    let mut steps = Vec::new();
    let mut current = state;

    while let Some(parent) = graph.state_parent(current)? {
        if steps.len() >= bound {
            tracing::warn!(start = state, bound, "Parent walk exceeded bound");
            return Err(ExploreError::CycleDetected { start: state, bound });
        }
        steps.push(PathStep {
            rule: graph.rule(current)?,
            term: graph.state_term(current)?,
        });
        current = parent;
    }

    let root = graph.state_term(current)?;
    steps.reverse();
    Ok(Path { root, steps })
}

/// Deferred path reconstruction for one search solution.
///
/// Captures only a weak handle to the search session and the target state
/// id. No accessor is called until [`force`](Self::force); each call
/// re-walks the index and returns an equal path. Forcing after the session
/// has been dropped fails with [`ExploreError::InvalidStateReference`].
pub struct PathThunk<G> {
    graph: Weak<G>,
    state: StateId,
}

impl<G: SearchGraph> PathThunk<G> {
    /// Defer reconstruction of `state`'s path in `graph`.
    pub fn new(graph: &Arc<G>, state: StateId) -> Self {
        Self {
            graph: Arc::downgrade(graph),
            state,
        }
    }

    /// The state whose path this thunk reconstructs.
    pub fn state(&self) -> StateId {
        self.state
    }

    /// Walk the search index and return the path.
    pub fn force(&self) -> Result<Path<G::Term, G::Label>, ExploreError> {
        let graph = self
            .graph
            .upgrade()
            .ok_or(ExploreError::InvalidStateReference { state: self.state })?;
        reconstruct(graph.as_ref(), self.state)
    }
}

impl<G> Clone for PathThunk<G> {
    fn clone(&self) -> Self {
        Self {
            graph: Weak::clone(&self.graph),
            state: self.state,
        }
    }
}

impl<G> fmt::Debug for PathThunk<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathThunk")
            .field("state", &self.state)
            .field("live", &(self.graph.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockSearchGraph;

    fn term(s: &str) -> PathElement<String, String> {
        PathElement::Term(s.to_string())
    }

    fn rule(s: &str) -> PathElement<String, String> {
        PathElement::Rule(s.to_string())
    }

    /// f(a,a) -R1-> f(c,a) -R2-> f(c,c)
    fn example_graph() -> MockSearchGraph {
        let mut graph = MockSearchGraph::new("f(a,a)");
        graph.add_state(1, 0, "R1", "f(c,a)");
        graph.add_state(2, 1, "R2", "f(c,c)");
        graph
    }

    #[test]
    fn test_reconstruct_linear() {
        let graph = example_graph();
        let path = reconstruct(&graph, 2).unwrap();
        assert_eq!(
            path.elements(),
            vec![term("f(a,a)"), rule("R1"), term("f(c,a)"), rule("R2"), term("f(c,c)")]
        );
        assert_eq!(path.len(), 2);
        assert_eq!(path.target(), "f(c,c)");
    }

    #[test]
    fn test_reconstruct_root() {
        let graph = example_graph();
        let path = reconstruct(&graph, 0).unwrap();
        assert_eq!(path.elements(), vec![term("f(a,a)")]);
        assert!(path.is_empty());
        assert_eq!(path.target(), "f(a,a)");
        assert_eq!(path.rules().count(), 0);
    }

    #[test]
    fn test_reconstruct_branching() {
        // Tree: 0 -> 1, 0 -> 2, 1 -> 3, 2 -> 4
        let mut graph = MockSearchGraph::new("s0");
        graph.add_state(1, 0, "a", "s1");
        graph.add_state(2, 0, "b", "s2");
        graph.add_state(3, 1, "c", "s3");
        graph.add_state(4, 2, "d", "s4");

        let path = reconstruct(&graph, 4).unwrap();
        assert_eq!(path.elements(), vec![term("s0"), rule("b"), term("s2"), rule("d"), term("s4")]);
        let rules: Vec<_> = reconstruct(&graph, 3).unwrap().rules().cloned().collect();
        assert_eq!(rules, vec!["a", "c"]);
    }

    #[test]
    fn test_reconstruct_extends_parent_path() {
        // Binary tree of depth 4: state n has parent (n - 1) / 2
        let mut graph = MockSearchGraph::new("t0");
        for id in 1..31 {
            graph.add_state(id, (id - 1) / 2, &format!("r{id}"), &format!("t{id}"));
        }

        for id in 1..31 {
            let parent = (id - 1) / 2;
            let mut expected = reconstruct(&graph, parent).unwrap().into_elements();
            expected.push(rule(&format!("r{id}")));
            expected.push(term(&format!("t{id}")));
            assert_eq!(reconstruct(&graph, id).unwrap().into_elements(), expected);
        }
        assert_eq!(reconstruct(&graph, 30).unwrap().len(), 4);
    }

    #[test]
    fn test_reconstruct_unknown_state() {
        let graph = example_graph();
        let err = reconstruct(&graph, 9).unwrap_err();
        assert!(matches!(err, ExploreError::InvalidStateReference { state: 9 }));
    }

    #[test]
    fn test_reconstruct_dangling_parent() {
        let mut graph = example_graph();
        graph.add_state(3, 7, "R3", "f(d,d)");
        let err = reconstruct(&graph, 3).unwrap_err();
        assert!(matches!(err, ExploreError::InvalidStateReference { state: 7 }));
    }

    #[test]
    fn test_reconstruct_cycle_detected() {
        // Inconsistent index: 1 and 2 point at each other
        let mut graph = MockSearchGraph::new("r");
        graph.add_state(1, 2, "x", "a");
        graph.add_state(2, 1, "y", "b");

        let err = reconstruct(&graph, 2).unwrap_err();
        assert!(matches!(err, ExploreError::CycleDetected { start: 2, bound: 3 }));
    }

    #[test]
    fn test_reconstruct_self_parent_detected() {
        let mut graph = MockSearchGraph::new("r");
        graph.add_state(1, 1, "loop", "a");
        let err = reconstruct(&graph, 1).unwrap_err();
        assert!(matches!(err, ExploreError::CycleDetected { start: 1, .. }));
    }

    #[test]
    fn test_path_display() {
        let path = reconstruct(&example_graph(), 2).unwrap();
        assert_eq!(path.to_string(), "[f(a,a), R1, f(c,a), R2, f(c,c)]");
        let root = reconstruct(&example_graph(), 0).unwrap();
        assert_eq!(root.to_string(), "[f(a,a)]");
    }

    #[test]
    fn test_thunk_is_lazy_and_repeatable() {
        let graph = Arc::new(example_graph());
        let thunk = PathThunk::new(&graph, 2);
        assert_eq!(graph.accessor_calls(), 0);

        let first = thunk.force().unwrap();
        let calls_after_first = graph.accessor_calls();
        assert!(calls_after_first > 0);

        let second = thunk.force().unwrap();
        assert_eq!(first, second);
        assert_eq!(graph.accessor_calls(), 2 * calls_after_first);
    }

    #[test]
    fn test_thunk_after_teardown() {
        let graph = Arc::new(example_graph());
        let thunk = PathThunk::new(&graph, 1);
        let copy = thunk.clone();
        drop(graph);

        let err = thunk.force().unwrap_err();
        assert!(matches!(err, ExploreError::InvalidStateReference { state: 1 }));
        assert!(copy.force().is_err());
        assert!(format!("{copy:?}").contains("live: false"));
    }
}
