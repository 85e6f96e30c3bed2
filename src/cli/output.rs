//! Output formatting utilities for CLI.

use arena::{OutcomePayload, Policy, SessionStats};
use serde::Serialize;

/// Flat summary of one headless game.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct GameSummary {
    /// Seed the session ran under.
    pub(crate) seed: u64,
    /// Stable policy identifier.
    pub(crate) policy: &'static str,
    /// `"victory"`, `"defeat"`, or `"timeout"`.
    pub(crate) outcome: &'static str,
    /// Stuck reason for victories.
    pub(crate) reason: Option<&'static str>,
    /// Session time at the end of the run.
    pub(crate) elapsed_ms: u64,
    /// Pursuer kernel invocations.
    pub(crate) nodes_expanded: u32,
}

impl GameSummary {
    pub(crate) fn from_parts(
        seed: u64,
        policy: Policy,
        payload: Option<&OutcomePayload>,
        stats: SessionStats,
    ) -> Self {
        match payload {
            Some(payload) => Self {
                seed,
                policy: policy.name(),
                outcome: payload.outcome,
                reason: payload.reason,
                elapsed_ms: payload.elapsed_ms,
                nodes_expanded: payload.pursuer.nodes_expanded,
            },
            None => Self {
                seed,
                policy: policy.name(),
                outcome: "timeout",
                reason: None,
                elapsed_ms: stats.elapsed_ms,
                nodes_expanded: stats.nodes_expanded,
            },
        }
    }
}

/// Format a finished (or timed-out) run as human-readable text.
pub(crate) fn format_run_text(summary: &GameSummary, stats: SessionStats) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "Session result ({}, seed {})\n",
        summary.policy, summary.seed
    ));
    match summary.reason {
        Some(reason) => output.push_str(&format!(
            "  Outcome: {} ({reason})\n",
            summary.outcome
        )),
        None => output.push_str(&format!("  Outcome: {}\n", summary.outcome)),
    }
    output.push_str(&format!(
        "  Elapsed: {:.1}s over {} contacts\n",
        summary.elapsed_ms as f64 / 1000.0,
        stats.contacts
    ));
    output.push_str(&format!(
        "  Pursuer expanded {} nodes; runner visited {}\n",
        stats.nodes_expanded, stats.runner_nodes_visited
    ));
    output
}

/// Aggregated outcome counts for one policy.
#[derive(Debug, Default, Clone, Serialize)]
pub(crate) struct BatchStats {
    /// Stable policy identifier.
    pub(crate) policy: String,
    /// Games played.
    pub(crate) games: u64,
    /// Runner victories.
    pub(crate) victories: u64,
    /// Runner defeats.
    pub(crate) defeats: u64,
    /// Sessions that hit the time limit unresolved.
    pub(crate) timeouts: u64,
    /// Victory counts per stuck reason.
    pub(crate) reasons: std::collections::BTreeMap<String, u64>,
    /// Mean session length in milliseconds.
    pub(crate) avg_elapsed_ms: f64,
    /// Mean pursuer expansions.
    pub(crate) avg_nodes_expanded: f64,
}

impl BatchStats {
    pub(crate) fn aggregate(policy: Policy, summaries: &[GameSummary]) -> Self {
        let mut stats = Self {
            policy: policy.name().to_string(),
            ..Self::default()
        };
        let mut elapsed_total = 0u64;
        let mut expanded_total = 0u64;
        for summary in summaries {
            stats.games += 1;
            elapsed_total += summary.elapsed_ms;
            expanded_total += u64::from(summary.nodes_expanded);
            match summary.outcome {
                "victory" => {
                    stats.victories += 1;
                    if let Some(reason) = summary.reason {
                        *stats.reasons.entry(reason.to_string()).or_default() += 1;
                    }
                }
                "defeat" => stats.defeats += 1,
                _ => stats.timeouts += 1,
            }
        }
        if stats.games > 0 {
            stats.avg_elapsed_ms = elapsed_total as f64 / stats.games as f64;
            stats.avg_nodes_expanded = expanded_total as f64 / stats.games as f64;
        }
        stats
    }
}

/// Format batch stats as human-readable text.
pub(crate) fn format_batch_text(all: &[BatchStats]) -> String {
    let mut output = String::new();
    output.push_str("Batch results\n");
    output.push_str("========================================\n\n");

    for stats in all {
        output.push_str(&format!("{} ({} games)\n", stats.policy, stats.games));
        let rate = |n: u64| {
            if stats.games == 0 {
                0.0
            } else {
                n as f64 * 100.0 / stats.games as f64
            }
        };
        output.push_str(&format!(
            "  Victories: {} ({:.1}%)  Defeats: {} ({:.1}%)  Timeouts: {} ({:.1}%)\n",
            stats.victories,
            rate(stats.victories),
            stats.defeats,
            rate(stats.defeats),
            stats.timeouts,
            rate(stats.timeouts),
        ));
        if !stats.reasons.is_empty() {
            let reasons: Vec<String> = stats
                .reasons
                .iter()
                .map(|(reason, count)| format!("{reason}: {count}"))
                .collect();
            output.push_str(&format!("  Victory reasons: {}\n", reasons.join(", ")));
        }
        output.push_str(&format!(
            "  Avg length: {:.1}s  Avg expansions: {:.1}\n\n",
            stats.avg_elapsed_ms / 1000.0,
            stats.avg_nodes_expanded
        ));
    }

    output
}

/// Format batch stats as CSV.
pub(crate) fn format_batch_csv(all: &[BatchStats]) -> String {
    let mut output = String::new();
    output.push_str("policy,games,victories,defeats,timeouts,avg_elapsed_ms,avg_nodes_expanded\n");
    for stats in all {
        output.push_str(&format!(
            "{},{},{},{},{},{:.1},{:.2}\n",
            stats.policy,
            stats.games,
            stats.victories,
            stats.defeats,
            stats.timeouts,
            stats.avg_elapsed_ms,
            stats.avg_nodes_expanded
        ));
    }
    output
}
