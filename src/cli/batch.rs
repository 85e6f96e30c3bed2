//! The `batch` command: many seeded sessions in parallel, aggregated.

use arena::Policy;
use rayon::prelude::*;

use crate::cli::output::{format_batch_csv, format_batch_text, BatchStats, GameSummary};
use crate::cli::{run, BatchFormat, CliError, PolicyArg, RunnerStrategy};

pub(crate) fn execute(
    policy: Option<PolicyArg>,
    games: u64,
    seed_base: u64,
    strategy: RunnerStrategy,
    limit_s: u64,
    format: BatchFormat,
) -> Result<(), CliError> {
    let policies: Vec<Policy> = match policy {
        Some(arg) => vec![Policy::from(arg)],
        None => Policy::ALL.to_vec(),
    };

    let mut all = Vec::with_capacity(policies.len());
    for policy in policies {
        let summaries: Vec<GameSummary> = (0..games)
            .into_par_iter()
            .map(|i| {
                let seed = seed_base.wrapping_add(i);
                run::play(policy, seed, strategy, limit_s)
                    .map(|(summary, _)| summary)
            })
            .collect::<Result<_, _>>()?;
        all.push(BatchStats::aggregate(policy, &summaries));
    }

    match format {
        BatchFormat::Text => print!("{}", format_batch_text(&all)),
        BatchFormat::Json => println!("{}", serde_json::to_string_pretty(&all)?),
        BatchFormat::Csv => print!("{}", format_batch_csv(&all)),
    }
    Ok(())
}
