#![no_main]

//! Session event-stream fuzzer.
//!
//! Feeds an arbitrary inbound event stream through the port and checks
//! the session invariants after every event:
//! - visited sets stay consistent with the pursuer's position
//! - the stuck latch and its reason agree
//! - HP stays within its pool, the queue within its bound
//!
//! This catches ordering bugs the per-module unit tests miss.

use arbitrary::Arbitrary;
use arena::game::check_invariants;
use arena::{GameConfig, InboundEvent, Policy, Port};
use libfuzzer_sys::fuzz_target;

/// A fuzzer-generated inbound event.
#[derive(Arbitrary, Debug, Clone, Copy)]
enum FuzzEvent {
    /// Click a node (wrapped into range).
    Click { node: u8 },
    /// Advance time.
    Tick { dt: u16 },
    /// Freeze the clock.
    Pause,
    /// Unfreeze the clock.
    Resume,
    /// Inspect a node.
    Hover { node: u8 },
}

/// Structured input for session fuzzing.
#[derive(Arbitrary, Debug)]
struct SessionInput {
    /// Selects one of the seven policies.
    policy: u8,
    /// Session seed.
    seed: u16,
    /// The event stream to replay.
    events: Vec<FuzzEvent>,
}

fuzz_target!(|input: SessionInput| {
    let policy = Policy::ALL[usize::from(input.policy) % Policy::ALL.len()];
    let mut port = Port::new(GameConfig::default());
    port.handle(InboundEvent::Start {
        policy,
        seed: u64::from(input.seed),
    });

    let mut now = 0u64;
    for event in input.events.into_iter().take(256) {
        let inbound = match event {
            FuzzEvent::Click { node } => InboundEvent::RunnerClick {
                node_id: u16::from(node % 28),
            },
            FuzzEvent::Tick { dt } => {
                let dt = u64::from(dt % 2000);
                now += dt;
                InboundEvent::Tick { now_ms: now, dt_ms: dt }
            }
            FuzzEvent::Pause => InboundEvent::Pause,
            FuzzEvent::Resume => InboundEvent::Resume,
            FuzzEvent::Hover { node } => InboundEvent::Hover {
                node_id: u16::from(node),
            },
        };
        port.handle(inbound);

        if let Some(session) = port.session() {
            let violations = check_invariants(session);
            assert!(violations.is_empty(), "invariants violated: {violations:?}");
        }
    }
});
