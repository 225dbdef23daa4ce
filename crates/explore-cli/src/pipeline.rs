//! Subcommand implementations.
//!
//! Each `run_*` function loads a recorded session, drives it through the
//! explore adapters and writes its report to `out`.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

use explore::{explore_graph, ExploreError, Explorer, PathElement, SolutionPath};
use replay::{RecordedEngine, RecordedSearch, Recording};
use serde::Serialize;

use crate::config::{build_explore_config, ExploreOverrides};

/// Arguments for `explore rewrite`.
#[derive(Debug)]
pub struct RewriteArgs {
    pub session: PathBuf,
    pub config: Option<PathBuf>,
    pub strategy: Option<String>,
    pub limit: Option<u64>,
    pub depth_first: bool,
}

/// Arguments for `explore search`.
#[derive(Debug)]
pub struct SearchArgs {
    pub session: PathBuf,
    pub config: Option<PathBuf>,
    pub pattern: String,
    pub overrides: ExploreOverrides,
    pub max_solutions: Option<usize>,
    pub paths: bool,
    pub json: bool,
}

/// Arguments for `explore graph`.
#[derive(Debug)]
pub struct GraphArgs {
    pub session: PathBuf,
    pub root: usize,
    pub max_states: Option<usize>,
}

/// One search solution as emitted by `--json`.
#[derive(Debug, Serialize)]
struct SolutionReport {
    state: usize,
    term: String,
    substitution: BTreeMap<String, String>,
    rewrites: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path_error: Option<String>,
}

fn load_engine(session: &std::path::Path) -> anyhow::Result<RecordedEngine> {
    Ok(RecordedEngine::new(Recording::from_json(session)?))
}

fn initial_term(engine: &RecordedEngine) -> String {
    engine.initial_term().unwrap_or_default()
}

/// Strategy rewriting (or single-path rewriting with `--limit`).
pub fn run_rewrite(args: RewriteArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let overrides = ExploreOverrides {
        depth_first: args.depth_first,
        rewrite_limit: args.limit,
        ..Default::default()
    };
    let config = build_explore_config(args.config.as_deref(), &overrides)?;
    let engine = load_engine(&args.session)?;
    let explorer = Explorer::new(config);
    let initial = initial_term(&engine);

    match args.strategy {
        Some(strategy) => {
            for step in explorer.srewrite(&engine, &initial, &strategy)? {
                let step = step?;
                writeln!(out, "{} in {} rewrites", step.term, step.rewrites)?;
            }
        }
        None => {
            let outcome = explorer.rewrite(&engine, &initial)?;
            writeln!(out, "{} -> {} in {} rewrites", initial, outcome.term, outcome.rewrites)?;
        }
    }
    Ok(())
}

/// Search, printing each solution and optionally its path.
pub fn run_search(args: SearchArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let config = build_explore_config(args.config.as_deref(), &args.overrides)?;
    let engine = load_engine(&args.session)?;
    let explorer = Explorer::new(config);
    let initial = initial_term(&engine);

    let iter = explorer.search(&engine, &initial, &args.pattern)?;
    let limit = args.max_solutions.unwrap_or(usize::MAX);
    let mut found = 0usize;

    for solution in iter.take(limit) {
        let solution = solution?;
        found += 1;
        // A path that cannot be rebuilt is reported with its solution only
        let path: Option<Result<SolutionPath<RecordedSearch>, ExploreError>> =
            args.paths.then(|| solution.path.force());
        if let Some(Err(e)) = &path {
            tracing::warn!(state = solution.state(), error = %e, "Path reconstruction failed");
        }

        if args.json {
            let (path, path_error) = match path {
                Some(Ok(path)) => (Some(path_strings(path)), None),
                Some(Err(e)) => (None, Some(e.to_string())),
                None => (None, None),
            };
            let report = SolutionReport {
                state: solution.state(),
                term: solution.term,
                substitution: solution.substitution.0,
                rewrites: solution.rewrites,
                path,
                path_error,
            };
            writeln!(out, "{}", serde_json::to_string(&report)?)?;
        } else {
            match path {
                Some(Ok(path)) => writeln!(
                    out,
                    "{} with {} by {}",
                    solution.term, solution.substitution, path
                )?,
                Some(Err(e)) => writeln!(
                    out,
                    "{} with {} by {}",
                    solution.term, solution.substitution, e
                )?,
                None => writeln!(
                    out,
                    "{} with {} in {} rewrites",
                    solution.term, solution.substitution, solution.rewrites
                )?,
            }
        }
    }

    tracing::info!(solutions = found, "Search finished");
    if found == 0 && !args.json {
        writeln!(out, "No solution.")?;
    }
    Ok(())
}

fn path_strings(path: SolutionPath<RecordedSearch>) -> Vec<String> {
    path.into_elements()
        .into_iter()
        .map(|element| match element {
            PathElement::Term(t) | PathElement::Rule(t) => t,
        })
        .collect()
}

/// Walk the recorded rewrite graph and print it as Graphviz DOT.
pub fn run_graph(args: GraphArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let engine = load_engine(&args.session)?;
    let dump = explore_graph(&engine.state_graph(), args.root, args.max_states)?;
    if dump.truncated {
        tracing::warn!(max_states = args.max_states, "Graph output truncated");
    }
    write!(out, "{}", dump.to_dot())?;
    Ok(())
}
