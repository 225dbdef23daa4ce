//! Exhaustive exploration of a rewrite graph and Graphviz export.

use std::collections::HashSet;
use std::fmt;

use crate::engine::{ExploreError, StateId};

/// Engine view of the full graph of terms reachable by rewriting.
///
/// Unlike [`SearchGraph`](crate::SearchGraph), which only records the
/// discovering edge of each state, this exposes every successor.
pub trait StateGraph {
    /// Term snapshot stored for each state.
    type Term;

    /// Term snapshot of `state`.
    fn state_term(&self, state: StateId) -> Result<Self::Term, ExploreError>;

    /// The `index`-th successor of `state`, `None` past the last one.
    ///
    /// The engine may generate successors lazily on first request.
    fn next_state(&self, state: StateId, index: usize) -> Result<Option<StateId>, ExploreError>;
}

/// States and transitions collected by [`explore_graph`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphDump<T> {
    /// Visited states in first-visit order.
    pub states: Vec<(StateId, T)>,
    /// Every transition out of a visited state, in enumeration order.
    pub edges: Vec<(StateId, StateId)>,
    /// True if `max_states` stopped the walk before the graph was exhausted.
    pub truncated: bool,
}

/// Walk every state reachable from `root` depth-first.
///
/// Each state is expanded once, however many edges lead to it. With
/// `max_states`, the walk stops expanding after that many states; edges
/// already enumerated are kept.
pub fn explore_graph<G>(
    graph: &G,
    root: StateId,
    max_states: Option<usize>,
) -> Result<GraphDump<G::Term>, ExploreError>
where
    G: StateGraph + ?Sized,
{
    let mut dump = GraphDump {
        states: Vec::new(),
        edges: Vec::new(),
        truncated: false,
    };
    let mut visited = HashSet::new();
    let mut stack = vec![root];

    while let Some(state) = stack.pop() {
        if !visited.insert(state) {
            continue;
        }
        if max_states.is_some_and(|max| dump.states.len() >= max) {
            dump.truncated = true;
            break;
        }
        dump.states.push((state, graph.state_term(state)?));

        let mut successors = Vec::new();
        let mut index = 0;
        while let Some(next) = graph.next_state(state, index)? {
            dump.edges.push((state, next));
            if !visited.contains(&next) {
                successors.push(next);
            }
            index += 1;
        }
        // Reverse so the first successor is expanded first
        stack.extend(successors.into_iter().rev());
    }

    tracing::debug!(
        states = dump.states.len(),
        edges = dump.edges.len(),
        truncated = dump.truncated,
        "Explored rewrite graph"
    );
    Ok(dump)
}

impl<T: fmt::Display> GraphDump<T> {
    /// Render as a Graphviz `digraph`.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph {\n");
        for (state, term) in &self.states {
            let label = escape_label(&term.to_string());
            out.push_str(&format!("\t{state} [label=\"{label}\"];\n"));
        }
        for (from, to) in &self.edges {
            out.push_str(&format!("\t{from} -> {to};\n"));
        }
        out.push_str("}\n");
        out
    }
}

fn escape_label(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}
