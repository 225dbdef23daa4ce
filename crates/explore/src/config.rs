use std::fmt;

use crate::engine::SearchRequest;

/// Which reachable states a search reports as solutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    /// States reachable in exactly one step (`=>1`).
    OneStep,
    /// States reachable in one or more steps (`=>+`).
    AtLeastOneStep,
    /// States reachable in zero or more steps (`=>*`).
    #[default]
    AnySteps,
    /// Reachable states that cannot be rewritten further (`=>!`).
    NormalForm,
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OneStep => write!(f, "=>1"),
            Self::AtLeastOneStep => write!(f, "=>+"),
            Self::AnySteps => write!(f, "=>*"),
            Self::NormalForm => write!(f, "=>!"),
        }
    }
}

impl SearchType {
    /// Parse from the snake_case or kebab-case name used in configs and flags.
    pub fn from_name(s: &str) -> Option<Self> {
        match s.replace('-', "_").as_str() {
            "one_step" => Some(Self::OneStep),
            "at_least_one_step" => Some(Self::AtLeastOneStep),
            "any_steps" => Some(Self::AnySteps),
            "normal_form" => Some(Self::NormalForm),
            _ => None,
        }
    }
}

/// Exploration configuration loaded from TOML.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ExploreConfig {
    /// Which reachable states a search reports.
    #[serde(default)]
    pub search_type: SearchType,

    /// Maximum number of steps a search explores from the initial term.
    #[serde(default)]
    pub depth_bound: Option<u32>,

    /// Explore strategy solutions depth-first instead of fairly.
    #[serde(default)]
    pub depth_first: bool,

    /// Bound on the total number of rule rewrites for single-path rewriting.
    #[serde(default)]
    pub rewrite_limit: Option<u64>,

    /// Bound on the number of rewrites per position for single-path rewriting.
    #[serde(default)]
    pub gas: Option<u64>,
}

impl ExploreConfig {
    /// Log a warning for settings the engine will ignore.
    pub fn validate(&self) {
        if self.search_type == SearchType::OneStep && self.depth_bound.is_some() {
            tracing::warn!(
                depth_bound = self.depth_bound,
                "depth_bound has no effect on one_step searches"
            );
        }
        if self.gas == Some(0) || self.rewrite_limit == Some(0) {
            tracing::warn!(
                rewrite_limit = self.rewrite_limit,
                gas = self.gas,
                "zero rewrite bound, single-path rewriting will not change the term"
            );
        }
    }

    /// The request forwarded to the engine when a search starts.
    pub fn search_request(&self) -> SearchRequest {
        SearchRequest {
            search_type: self.search_type,
            depth_bound: self.depth_bound,
        }
    }
}
