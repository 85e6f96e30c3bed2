//! The `graph` command: dump the generated graph for a seed.

use arena::{GameConfig, GraphSnapshot, InboundEvent, Policy, Port};

use crate::cli::{CliError, PolicyArg};

pub(crate) fn execute(policy: PolicyArg, seed: u64) -> Result<(), CliError> {
    let mut port = Port::new(GameConfig::default());
    let events = port.handle(InboundEvent::Start {
        policy: Policy::from(policy),
        seed,
    });

    let snapshot: Option<&GraphSnapshot> = events.iter().find_map(|event| match event {
        arena::OutboundEvent::Built { graph } => Some(graph),
        _ => None,
    });
    let Some(snapshot) = snapshot else {
        return Err(CliError::new(format!("no graph produced for seed {seed}")));
    };

    println!("{}", serde_json::to_string_pretty(snapshot)?);
    Ok(())
}
