//! The `run` command: one headless session with a scripted runner.

use arena::{GameConfig, Policy, Session, SessionStats};

use crate::cli::driver::RunnerDriver;
use crate::cli::output::{format_run_text, GameSummary};
use crate::cli::{CliError, OutputFormat, PolicyArg, RunnerStrategy};

/// Logical tick length for headless play.
const TICK_MS: u64 = 50;

pub(crate) fn execute(
    policy: PolicyArg,
    seed: u64,
    strategy: RunnerStrategy,
    limit_s: u64,
    format: OutputFormat,
) -> Result<(), CliError> {
    let policy = Policy::from(policy);
    let (summary, stats) = play(policy, seed, strategy, limit_s)?;

    match format {
        OutputFormat::Text => print!("{}", format_run_text(&summary, stats)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(())
}

/// Play one session to resolution or to the time limit.
pub(crate) fn play(
    policy: Policy,
    seed: u64,
    strategy: RunnerStrategy,
    limit_s: u64,
) -> Result<(GameSummary, SessionStats), CliError> {
    let mut session = Session::start(policy, GameConfig::with_seed(seed))?;
    let mut driver = RunnerDriver::new(strategy, seed);
    let limit_ms = limit_s.saturating_mul(1000);

    while !session.outcome().is_terminal() && session.elapsed_ms() < limit_ms {
        driver.drive(&mut session);
        session.tick(TICK_MS);
    }

    let stats = session.stats();
    let payload = session
        .outcome()
        .is_terminal()
        .then(|| session.outcome_report());
    Ok((
        GameSummary::from_parts(seed, policy, payload.as_ref(), stats),
        stats,
    ))
}
