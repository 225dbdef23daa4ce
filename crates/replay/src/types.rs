//! Data types for recorded engine sessions.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;

use explore::StateId;
use serde::{Deserialize, Serialize};

/// Variable bindings of a search solution, ordered by variable name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Substitution(pub BTreeMap<String, String>);

impl Substitution {
    /// Binding of `var`, if any.
    pub fn get(&self, var: &str) -> Option<&str> {
        self.0.get(var).map(String::as_str)
    }

    /// Whether no variable is bound.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "empty substitution");
        }
        let mut first = true;
        for (var, value) in &self.0 {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{var} --> {value}")?;
            first = false;
        }
        Ok(())
    }
}

/// One strategy rewriting solution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedRewrite {
    /// Solution term.
    pub term: String,
    /// Cumulative rewrite count when the solution was produced.
    pub rewrites: u64,
}

/// One state discovered by a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedState {
    /// State id (discovery order).
    pub id: StateId,
    /// Parent state id. None for the root.
    #[serde(default)]
    pub parent: Option<StateId>,
    /// Rule on the incoming edge. None for the root.
    #[serde(default)]
    pub rule: Option<String>,
    /// Term snapshot.
    pub term: String,
}

/// One search solution, in the order the engine reported it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedSolution {
    /// State id of the solution.
    pub state: StateId,
    /// Bindings against the search pattern.
    #[serde(default)]
    pub substitution: Substitution,
    /// Cumulative rewrite count when the solution was produced.
    pub rewrites: u64,
    /// Whether the state cannot be rewritten further.
    #[serde(default)]
    pub terminal: bool,
}

/// Discovered states and solutions of one search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchLog {
    #[serde(default)]
    pub states: Vec<RecordedState>,
    #[serde(default)]
    pub solutions: Vec<RecordedSolution>,
}

/// A state of the full rewrite graph with all its successors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphState {
    pub id: StateId,
    pub term: String,
    #[serde(default)]
    pub next: Vec<StateId>,
}

/// A recorded engine session. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recording {
    /// Initial term the operations started from (informational).
    #[serde(default)]
    pub initial: Option<String>,
    /// Strategy rewriting solutions in order.
    #[serde(default)]
    pub rewrites: Vec<RecordedRewrite>,
    /// Search states and solutions.
    #[serde(default)]
    pub search: SearchLog,
    /// Full rewrite graph.
    #[serde(default)]
    pub graph: Vec<GraphState>,
}

impl Recording {
    /// Load a recording from a JSON file.
    pub fn from_json(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let recording = Self::parse(&contents)?;
        tracing::info!(
            rewrites = recording.rewrites.len(),
            states = recording.search.states.len(),
            solutions = recording.search.solutions.len(),
            graph_states = recording.graph.len(),
            path = %path.display(),
            "Loaded recording"
        );
        Ok(recording)
    }

    /// Parse a recording from JSON text, logging any inconsistencies.
    pub fn parse(json: &str) -> anyhow::Result<Self> {
        let recording: Self = serde_json::from_str(json)?;
        for problem in recording.inconsistencies() {
            tracing::warn!(problem = %problem, "Inconsistent recording");
        }
        Ok(recording)
    }

    /// Describe search states that break the discovery-order invariants.
    ///
    /// Such recordings still load; path reconstruction reports the problem
    /// when it reaches the affected states.
    pub fn inconsistencies(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let mut seen = HashSet::new();
        for state in &self.search.states {
            if !seen.insert(state.id) {
                problems.push(format!("state {} recorded twice", state.id));
            }
            match (state.parent, &state.rule) {
                (Some(parent), _) if parent >= state.id => problems.push(format!(
                    "state {} has parent {parent}, which was not discovered before it",
                    state.id
                )),
                (Some(_), None) => problems.push(format!("state {} has no incoming rule", state.id)),
                (None, Some(_)) if state.id != 0 => {
                    problems.push(format!("state {} has a rule but no parent", state.id))
                }
                _ => {}
            }
        }
        problems
    }
}
