//! Session tunables.
//!
//! The configuration block is consumed once at session start; nothing in
//! it is re-read mid-game.

use serde::{Deserialize, Serialize};

use crate::game::Policy;

/// Minimum interval between pursuer decisions, per policy, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CadenceMs {
    /// BFS decision interval.
    pub bfs: u64,
    /// DFS decision interval.
    pub dfs: u64,
    /// UCS decision interval.
    pub ucs: u64,
    /// Greedy (Local Min) decision interval.
    pub greedy_min: u64,
    /// Greedy (Local Max) decision interval.
    pub greedy_max: u64,
    /// A* (Local Min) decision interval.
    pub astar_min: u64,
    /// A* (Local Max) decision interval.
    pub astar_max: u64,
}

impl Default for CadenceMs {
    fn default() -> Self {
        Self {
            bfs: 800,
            dfs: 800,
            ucs: 700,
            greedy_min: 600,
            greedy_max: 600,
            astar_min: 700,
            astar_max: 700,
        }
    }
}

impl CadenceMs {
    /// Get the decision interval for a policy.
    #[must_use]
    pub const fn for_policy(&self, policy: Policy) -> u64 {
        match policy {
            Policy::Bfs => self.bfs,
            Policy::Dfs => self.dfs,
            Policy::Ucs => self.ucs,
            Policy::GreedyMin => self.greedy_min,
            Policy::GreedyMax => self.greedy_max,
            Policy::AStarMin => self.astar_min,
            Policy::AStarMax => self.astar_max,
        }
    }
}

/// Complete configuration for one game session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of nodes to generate.
    pub node_count: usize,
    /// Acceptable leaf count `(min, max)` after construction.
    pub leaf_range: (usize, usize),
    /// Edge weights are drawn uniformly from this range.
    pub edge_weight_range: (f64, f64),
    /// Wiring targets `(min, max)` neighbours per node before leaf carving.
    pub neighbour_range: (usize, usize),
    /// Per-policy decision cadence.
    pub cadence_ms: CadenceMs,
    /// HP subtracted from both agents on contact.
    pub contact_damage: i32,
    /// Minimum interval between contact damage applications.
    pub contact_cooldown_ms: u64,
    /// Runner starting HP.
    pub runner_hp: i32,
    /// Pursuer starting HP.
    pub pursuer_hp: i32,
    /// Minimum world distance between the two spawn nodes.
    pub min_spawn_distance: f64,
    /// Maximum queued runner hops.
    pub queue_depth: usize,
    /// Time for one runner hop to complete.
    pub runner_step_ms: u64,
    /// Seed for the session PRNG (builder and balance planner).
    pub rng_seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            node_count: 28,
            leaf_range: (8, 12),
            edge_weight_range: (1.0, 10.0),
            neighbour_range: (3, 6),
            cadence_ms: CadenceMs::default(),
            contact_damage: 10,
            contact_cooldown_ms: 1000,
            runner_hp: 100,
            pursuer_hp: 150,
            min_spawn_distance: 400.0,
            queue_depth: 3,
            runner_step_ms: 500,
            rng_seed: 42,
        }
    }
}

impl GameConfig {
    /// Create the default configuration with a specific seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng_seed: seed,
            ..Self::default()
        }
    }
}
