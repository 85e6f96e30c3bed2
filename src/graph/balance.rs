//! Balance planning: spawn placement and the heuristic landscape.
//!
//! Runs exactly once per session, after graph construction. The planner
//! picks two far-apart spawn nodes, traces the unweighted shortest path
//! between them, and writes per-policy gradients along that path so no
//! policy finds itself on a plateau at tick zero.

#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::config::GameConfig;
use crate::game::Policy;
use crate::graph::builder::Rng;
use crate::graph::node::{Graph, NodeId};

/// Off-path heuristic range for the Min variants.
const OFF_PATH_MIN: (f64, f64) = (50.0, 350.0);
/// Off-path heuristic range for the Max variants.
const OFF_PATH_MAX: (f64, f64) = (10.0, 300.0);
/// On-path path-cost range for UCS.
const UCS_ON_PATH: (f64, f64) = (10.0, 80.0);
/// Off-path path-cost range for UCS.
const UCS_OFF_PATH: (f64, f64) = (100.0, 300.0);
/// Default off-path path-cost range (A* variants).
const DEFAULT_PATH_COST: (f64, f64) = (10.0, 300.0);
/// Largest per-hop gradient step.
const MAX_GAP: f64 = 50.0;
/// Total gradient span available between the endpoints.
const GRADIENT_SPAN: f64 = 280.0;
/// Gradient ceiling and floor.
const H_HIGH: f64 = 300.0;
const H_LOW: f64 = 20.0;

/// The two spawn nodes chosen by the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnPair {
    /// Where the pursuer starts.
    pub pursuer: NodeId,
    /// Where the runner starts.
    pub runner: NodeId,
}

/// Error type for balance planning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceError {
    /// Fewer than two nodes: no spawn pair exists.
    TooFewNodes,
    /// No path between the chosen spawns (the graph is not connected).
    NoSeedPath {
        /// The offending spawn pair.
        pursuer: NodeId,
        /// Runner side of the pair.
        runner: NodeId,
    },
}

impl std::fmt::Display for BalanceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BalanceError::TooFewNodes => write!(f, "balance planning needs at least two nodes"),
            BalanceError::NoSeedPath { pursuer, runner } => {
                write!(f, "no seed path from node {pursuer} to node {runner}")
            }
        }
    }
}

impl std::error::Error for BalanceError {}

/// Unweighted shortest path between two nodes via breadth-first traversal.
///
/// Returns the node sequence including both endpoints, `[from]` when the
/// endpoints coincide, or an empty vector when no path exists. Scratch
/// state is local to the call; nodes carry no per-search metadata.
#[must_use]
pub fn shortest_hop_path(graph: &Graph, from: NodeId, to: NodeId) -> Vec<NodeId> {
    if graph.node(from).is_none() || graph.node(to).is_none() {
        return Vec::new();
    }
    if from == to {
        return vec![from];
    }

    let mut parent: Vec<Option<NodeId>> = vec![None; graph.len()];
    let mut seen = vec![false; graph.len()];
    let mut frontier = VecDeque::new();
    frontier.push_back(from);
    seen[usize::from(from)] = true;

    while let Some(current) = frontier.pop_front() {
        if current == to {
            let mut path = vec![to];
            let mut cursor = to;
            while let Some(prev) = parent[usize::from(cursor)] {
                path.push(prev);
                cursor = prev;
            }
            path.reverse();
            return path;
        }
        for &(next, _) in graph.neighbours(current) {
            let idx = usize::from(next);
            if !seen[idx] {
                seen[idx] = true;
                parent[idx] = Some(current);
                frontier.push_back(next);
            }
        }
    }

    Vec::new()
}

/// Pick two distinct spawn nodes at least `min_distance` apart; if no such
/// pair exists, fall back to the maximum-distance pair.
fn pick_spawns(graph: &Graph, min_distance: f64, rng: &mut Rng) -> Result<SpawnPair, BalanceError> {
    let count = graph.len() as NodeId;
    if count < 2 {
        return Err(BalanceError::TooFewNodes);
    }

    let mut eligible = Vec::new();
    let mut farthest = (0, 1, f64::MIN);
    for a in 0..count {
        for b in 0..count {
            if a == b {
                continue;
            }
            let dist = graph.distance(a, b);
            if dist >= min_distance {
                eligible.push((a, b));
            }
            if dist > farthest.2 {
                farthest = (a, b, dist);
            }
        }
    }

    if eligible.is_empty() {
        warn!(
            best = farthest.2,
            required = min_distance,
            "no spawn pair meets the distance floor; using farthest pair"
        );
        return Ok(SpawnPair {
            pursuer: farthest.0,
            runner: farthest.1,
        });
    }

    let (pursuer, runner) = eligible[rng.next_usize(eligible.len())];
    Ok(SpawnPair { pursuer, runner })
}

/// One candidate landscape: heuristic and path-cost vectors, not yet
/// installed on the graph.
struct Candidate {
    heuristic: Vec<f64>,
    path_cost: Vec<f64>,
}

/// Compute the landscape for a policy along the seed path.
fn assign(
    graph: &Graph,
    policy: Policy,
    path: &[NodeId],
    spawns: SpawnPair,
    rng: &mut Rng,
    force_gap: bool,
) -> Candidate {
    let on_path = |id: NodeId| path.iter().position(|&p| p == id);

    // Defaults: Euclidean heuristic toward the runner spawn; path cost is
    // the cumulative seed-path weight on the path and random off it.
    let mut cumulative = vec![0.0; path.len()];
    for i in 1..path.len() {
        let weight = graph.weight(path[i - 1], path[i]).unwrap_or(0.0);
        cumulative[i] = cumulative[i - 1] + weight;
    }

    let mut heuristic = Vec::with_capacity(graph.len());
    let mut path_cost = Vec::with_capacity(graph.len());
    for node in graph.nodes() {
        heuristic.push(graph.distance(node.id, spawns.runner));
        path_cost.push(match on_path(node.id) {
            Some(i) => cumulative[i],
            None => rng.next_range(DEFAULT_PATH_COST.0, DEFAULT_PATH_COST.1),
        });
    }

    let hops = (path.len().saturating_sub(1)).max(1) as f64;
    let gap = if force_gap {
        MAX_GAP
    } else {
        MAX_GAP.min(GRADIENT_SPAN / hops)
    };

    match policy {
        Policy::GreedyMin | Policy::AStarMin => {
            for node in graph.nodes() {
                heuristic[usize::from(node.id)] = match on_path(node.id) {
                    Some(i) => (H_HIGH - i as f64 * gap).max(H_LOW),
                    None => rng.next_range(OFF_PATH_MIN.0, OFF_PATH_MIN.1),
                };
            }
        }
        Policy::GreedyMax | Policy::AStarMax => {
            for node in graph.nodes() {
                heuristic[usize::from(node.id)] = match on_path(node.id) {
                    Some(i) => (H_LOW + i as f64 * gap).min(H_HIGH),
                    None => rng.next_range(OFF_PATH_MAX.0, OFF_PATH_MAX.1),
                };
            }
        }
        Policy::Ucs => {
            for node in graph.nodes() {
                path_cost[usize::from(node.id)] = match on_path(node.id) {
                    Some(_) => rng.next_range(UCS_ON_PATH.0, UCS_ON_PATH.1),
                    None => rng.next_range(UCS_OFF_PATH.0, UCS_OFF_PATH.1),
                };
            }
        }
        Policy::Bfs | Policy::Dfs => {}
    }

    Candidate {
        heuristic,
        path_cost,
    }
}

/// Objective value the policy's plateau test uses at a node.
fn objective(policy: Policy, candidate: &Candidate, id: NodeId) -> f64 {
    let idx = usize::from(id);
    match policy {
        Policy::GreedyMin | Policy::GreedyMax => candidate.heuristic[idx],
        Policy::AStarMin | Policy::AStarMax => {
            candidate.path_cost[idx] + candidate.heuristic[idx]
        }
        Policy::Bfs | Policy::Dfs | Policy::Ucs => 0.0,
    }
}

/// The spawn must not sit on a plateau: at least one neighbour strictly
/// improves the policy's objective.
fn spawn_can_improve(graph: &Graph, policy: Policy, candidate: &Candidate, spawn: NodeId) -> bool {
    let here = objective(policy, candidate, spawn);
    graph.neighbours(spawn).iter().any(|&(n, _)| {
        let there = objective(policy, candidate, n);
        match policy {
            Policy::GreedyMin | Policy::AStarMin => there < here,
            Policy::GreedyMax | Policy::AStarMax => there > here,
            Policy::Bfs | Policy::Dfs | Policy::Ucs => true,
        }
    })
}

/// Place spawns and install the per-policy landscape on the graph.
///
/// The spawn post-condition is checked before installation; a failure
/// retries the spawn choice, then the landscape, and finally forces the
/// maximum gradient step and proceeds.
///
/// # Errors
///
/// Returns `BalanceError` when the graph has fewer than two nodes or the
/// chosen spawns are unreachable from one another.
pub fn balance_landscape(
    graph: &mut Graph,
    policy: Policy,
    config: &GameConfig,
    rng: &mut Rng,
) -> Result<SpawnPair, BalanceError> {
    let mut spawns = pick_spawns(graph, config.min_spawn_distance, rng)?;

    for attempt in 0..3 {
        let path = shortest_hop_path(graph, spawns.pursuer, spawns.runner);
        if path.is_empty() {
            return Err(BalanceError::NoSeedPath {
                pursuer: spawns.pursuer,
                runner: spawns.runner,
            });
        }

        let force_gap = attempt == 2;
        let candidate = assign(graph, policy, &path, spawns, rng, force_gap);

        if !policy.is_gradient() || spawn_can_improve(graph, policy, &candidate, spawns.pursuer) {
            debug!(
                policy = policy.name(),
                hops = path.len() - 1,
                attempt,
                "landscape installed"
            );
            graph.set_landscape(candidate.heuristic, candidate.path_cost);
            return Ok(spawns);
        }

        warn!(
            policy = policy.name(),
            attempt, "spawn post-condition failed; regenerating"
        );
        if attempt == 0 {
            spawns = pick_spawns(graph, config.min_spawn_distance, rng)?;
        } else if force_gap {
            // Last resort: install anyway rather than spin.
            graph.set_landscape(candidate.heuristic, candidate.path_cost);
            return Ok(spawns);
        }
    }

    unreachable!("balance retry ladder always installs a landscape")
}
