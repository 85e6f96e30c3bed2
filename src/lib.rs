// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Arena: the decision core of a graph-pursuit game.
//!
//! A runner (human-controlled) and a pursuer (autonomous) share a finite
//! weighted undirected graph. The pursuer navigates under one of seven
//! named search policies; the runner tries to strand it. This crate owns:
//! - Graph construction with balance invariants
//! - Per-policy next-move selection with persistent visitation state
//! - Plateau/exhaustion detection and the terminal-outcome taxonomy
//! - The tick-driven session machine and its typed event port
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │     Shell / Presenter (external)    │
//! ├─────────────────────────────────────┤
//! │   Event Port (inbound / outbound)   │
//! ├─────────────────────────────────────┤
//! │  Session (runner, pursuer, combat)  │
//! ├─────────────────────────────────────┤
//! │  Graph (builder, balance planner)   │
//! └─────────────────────────────────────┘
//! ```
//!
//! Everything advances inside `Tick`; the core is single-threaded and
//! replay-deterministic for a given seed.

pub mod config;
pub mod events;
pub mod game;
pub mod graph;

pub use config::{CadenceMs, GameConfig};
pub use events::{GraphSnapshot, HoverPayload, InboundEvent, OutboundEvent, OutcomePayload, Port};
pub use game::{
    next_move, Combat, Decision, Outcome, Policy, Pursuer, PursuerAction, Runner, Session,
    SessionStats, StartError, StuckReason, VisitedSets,
};
pub use graph::{BuildError, Graph, Node, NodeId, Rng, SpawnPair};
