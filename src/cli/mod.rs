//! CLI command implementations for Arena.

pub(crate) mod batch;
pub(crate) mod graph;
pub(crate) mod run;

mod driver;
mod output;

pub(crate) use driver::RunnerStrategy;

use arena::Policy;
use clap::ValueEnum;
use std::error::Error;
use std::fmt;

/// Pursuer policy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum PolicyArg {
    /// Breadth-first search.
    Bfs,
    /// Depth-first search.
    Dfs,
    /// Uniform-cost search.
    Ucs,
    /// Greedy descent on the heuristic.
    GreedyMin,
    /// Greedy ascent on the heuristic.
    GreedyMax,
    /// A* descent on f = g + h.
    AstarMin,
    /// A* ascent on f = g + h.
    AstarMax,
}

impl From<PolicyArg> for Policy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Bfs => Policy::Bfs,
            PolicyArg::Dfs => Policy::Dfs,
            PolicyArg::Ucs => Policy::Ucs,
            PolicyArg::GreedyMin => Policy::GreedyMin,
            PolicyArg::GreedyMax => Policy::GreedyMax,
            PolicyArg::AstarMin => Policy::AStarMin,
            PolicyArg::AstarMax => Policy::AStarMax,
        }
    }
}

/// Output format for the `run` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Output format for the `batch` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum BatchFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
    /// CSV format.
    Csv,
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<arena::StartError> for CliError {
    fn from(e: arena::StartError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(e.to_string())
    }
}
