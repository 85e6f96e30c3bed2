//! Arena CLI - headless driver for the graph-pursuit core.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

/// Arena - a graph-pursuit game core
#[derive(Parser, Debug)]
#[command(name = "arena")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a single headless session
    Run {
        /// Pursuer policy
        #[arg(short, long, value_enum, default_value = "greedy-min")]
        policy: cli::PolicyArg,

        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Scripted runner strategy
        #[arg(short, long, value_enum, default_value = "evade")]
        runner: cli::RunnerStrategy,

        /// Session time limit in seconds
        #[arg(short, long, default_value = "120")]
        limit: u64,

        /// Output format: text or json
        #[arg(short, long, value_enum, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Run many seeded sessions and aggregate outcome statistics
    Batch {
        /// Pursuer policy (default: all seven)
        #[arg(short, long, value_enum)]
        policy: Option<cli::PolicyArg>,

        /// Number of games per policy
        #[arg(short, long, default_value = "200")]
        games: u64,

        /// Starting seed (increments for each game)
        #[arg(short, long, default_value = "0")]
        seed: u64,

        /// Scripted runner strategy
        #[arg(short, long, value_enum, default_value = "evade")]
        runner: cli::RunnerStrategy,

        /// Per-session time limit in seconds
        #[arg(short, long, default_value = "120")]
        limit: u64,

        /// Output format: text, json, or csv
        #[arg(short, long, value_enum, default_value = "text")]
        format: cli::BatchFormat,
    },

    /// Print the balanced graph for a seed as JSON
    Graph {
        /// Policy the landscape is balanced for
        #[arg(short, long, value_enum, default_value = "greedy-min")]
        policy: cli::PolicyArg,

        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    let result = match args.command {
        Commands::Run {
            policy,
            seed,
            runner,
            limit,
            format,
        } => cli::run::execute(policy, seed, runner, limit, format),

        Commands::Batch {
            policy,
            games,
            seed,
            runner,
            limit,
            format,
        } => cli::batch::execute(policy, games, seed, runner, limit, format),

        Commands::Graph { policy, seed } => cli::graph::execute(policy, seed),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
