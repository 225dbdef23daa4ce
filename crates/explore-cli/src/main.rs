mod config;
mod pipeline;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use explore::SearchType;
use tracing_subscriber::EnvFilter;

use config::{parse_search_type, ExploreOverrides};
use pipeline::{GraphArgs, RewriteArgs, SearchArgs};

/// explore: replay recorded rewriting sessions as lazy sequences.
#[derive(Parser)]
#[command(name = "explore", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// CLI subcommands for rewriting, search and graph export.
#[derive(Subcommand)]
enum Command {
    /// Rewrite the initial term: strategy solutions with --strategy, otherwise a single path.
    Rewrite {
        /// Path to the recorded session JSON file.
        #[arg(long)]
        session: PathBuf,
        /// Path to explore config TOML file.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Strategy expression; lists every strategy solution.
        #[arg(long)]
        strategy: Option<String>,
        /// Bound on the number of rewrites for single-path rewriting.
        #[arg(long)]
        limit: Option<u64>,
        /// Explore strategy solutions depth-first.
        #[arg(long)]
        depth_first: bool,
    },
    /// Search from the initial term and list solutions.
    Search {
        /// Path to the recorded session JSON file.
        #[arg(long)]
        session: PathBuf,
        /// Path to explore config TOML file.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Pattern solutions must match.
        #[arg(long, default_value = "X")]
        pattern: String,
        /// Search type: one-step, at-least-one-step, any-steps or normal-form.
        #[arg(long, value_parser = parse_search_type)]
        search_type: Option<SearchType>,
        /// Maximum search depth.
        #[arg(long)]
        depth: Option<u32>,
        /// Stop after this many solutions.
        #[arg(long)]
        limit: Option<usize>,
        /// Print the rewrite path to each solution.
        #[arg(long)]
        paths: bool,
        /// Output one JSON object per solution.
        #[arg(long)]
        json: bool,
    },
    /// Print the recorded rewrite graph as Graphviz DOT.
    Graph {
        /// Path to the recorded session JSON file.
        #[arg(long)]
        session: PathBuf,
        /// State to start from.
        #[arg(long, default_value_t = 0)]
        root: usize,
        /// Stop after this many states.
        #[arg(long)]
        max_states: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut out = std::io::stdout().lock();

    match cli.command {
        Command::Rewrite {
            session,
            config,
            strategy,
            limit,
            depth_first,
        } => pipeline::run_rewrite(
            RewriteArgs {
                session,
                config,
                strategy,
                limit,
                depth_first,
            },
            &mut out,
        ),
        Command::Search {
            session,
            config,
            pattern,
            search_type,
            depth,
            limit,
            paths,
            json,
        } => pipeline::run_search(
            SearchArgs {
                session,
                config,
                pattern,
                overrides: ExploreOverrides {
                    search_type,
                    depth_bound: depth,
                    ..Default::default()
                },
                max_solutions: limit,
                paths,
                json,
            },
            &mut out,
        ),
        Command::Graph {
            session,
            root,
            max_states,
        } => pipeline::run_graph(
            GraphArgs {
                session,
                root,
                max_states,
            },
            &mut out,
        ),
    }
}
