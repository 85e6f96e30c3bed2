//! Deterministic graph construction.
//!
//! Lays out nodes on a jittered ring, designates the dead-ends, wires
//! everything else to its nearest neighbours, then repairs connectivity
//! and verifies the leaf count. The layout's only semantic role is to
//! define the default Euclidean heuristic.

// Construction uses intentional casts for coordinate/RNG operations
#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]

use tracing::warn;

use crate::config::GameConfig;
use crate::graph::node::{Graph, Node, NodeId};

/// Centre of the world layout.
const CENTRE: (f64, f64) = (480.0, 360.0);
/// Ring radius range.
const RADIUS_RANGE: (f64, f64) = (180.0, 330.0);
/// Per-axis jitter applied after ring placement.
const JITTER: f64 = 28.0;
/// Hard cap on neighbours per node.
const MAX_DEGREE: usize = 6;
/// Attempt cap for the leaf-carving loop.
const CARVE_ATTEMPTS: usize = 256;

/// Deterministic PRNG using xorshift64.
#[derive(Debug, Clone, Copy)]
pub struct Rng {
    state: u64,
}

impl Rng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        // Ensure non-zero state
        let state = if seed == 0 { 0x5555_5555_5555_5555 } else { seed };
        Self { state }
    }

    /// Generate next random u64.
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Generate random usize in [0, max).
    pub fn next_usize(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        (self.next_u64() % max as u64) as usize
    }

    /// Generate random f64 in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Generate random f64 in [lo, hi).
    pub fn next_range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.next_f64() * (hi - lo)
    }
}

/// Error type for graph construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Configuration cannot produce a valid graph.
    InvalidConfig {
        /// Description of the offending setting.
        reason: String,
    },
    /// Connectivity enforcement ran out of attempts.
    Disconnected {
        /// Number of repair attempts made.
        attempts: usize,
    },
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::InvalidConfig { reason } => {
                write!(f, "invalid graph configuration: {reason}")
            }
            BuildError::Disconnected { attempts } => {
                write!(f, "graph still disconnected after {attempts} repair attempts")
            }
        }
    }
}

impl std::error::Error for BuildError {}

/// Build a graph satisfying the construction invariants:
/// mirrored edges, full connectivity, leaf count within `config.leaf_range`,
/// non-leaf degree within `[2, 6]`.
///
/// If the leaf range cannot be met without disconnecting the graph, the
/// nearest feasible count is accepted and a warning is logged.
///
/// # Errors
///
/// Returns `BuildError::InvalidConfig` for a zero node count and
/// `BuildError::Disconnected` if connectivity repair fails.
pub fn build_graph(config: &GameConfig, rng: &mut Rng) -> Result<Graph, BuildError> {
    if config.node_count == 0 {
        return Err(BuildError::InvalidConfig {
            reason: "node_count must be positive".to_string(),
        });
    }
    if config.node_count > usize::from(NodeId::MAX) {
        return Err(BuildError::InvalidConfig {
            reason: format!("node_count {} exceeds id space", config.node_count),
        });
    }

    let mut nodes = place_nodes(config.node_count, rng);
    let leaves = designate_leaves(nodes.len(), config, rng);
    wire_nearest(&mut nodes, &leaves, config, rng);
    attach_leaves(&mut nodes, &leaves, config, rng);
    repair_connectivity(&mut nodes, config, rng)?;
    carve_leaves(&mut nodes, config, rng);

    Ok(Graph::from_nodes(nodes))
}

/// Place node centres on a jittered ring around `CENTRE`.
fn place_nodes(count: usize, rng: &mut Rng) -> Vec<Node> {
    let mut nodes = Vec::with_capacity(count);
    for i in 0..count {
        let angle = std::f64::consts::TAU * i as f64 / count as f64;
        let radius = rng.next_range(RADIUS_RANGE.0, RADIUS_RANGE.1);
        let x = CENTRE.0 + radius * angle.cos() + rng.next_range(-JITTER, JITTER);
        let y = CENTRE.1 + radius * angle.sin() + rng.next_range(-JITTER, JITTER);
        nodes.push(Node::new(i as NodeId, (x, y)));
    }
    nodes
}

/// Pick which nodes become dead-ends. Marking them before wiring keeps
/// the count inside the configured range instead of hoping edge removal
/// converges there.
fn designate_leaves(count: usize, config: &GameConfig, rng: &mut Rng) -> Vec<bool> {
    let (leaf_min, leaf_max) = config.leaf_range;
    let span = leaf_max.saturating_sub(leaf_min) + 1;
    let wanted = (leaf_min + rng.next_usize(span)).min(count.saturating_sub(2));

    let mut order: Vec<usize> = (0..count).collect();
    for i in (1..order.len()).rev() {
        order.swap(i, rng.next_usize(i + 1));
    }

    let mut is_leaf = vec![false; count];
    for &index in order.iter().take(wanted) {
        is_leaf[index] = true;
    }
    is_leaf
}

/// Wire every non-leaf node to its nearest non-leaf neighbours, mirroring
/// each edge with a single random weight.
fn wire_nearest(nodes: &mut [Node], leaves: &[bool], config: &GameConfig, rng: &mut Rng) {
    let (k_min, k_max) = config.neighbour_range;
    let count = nodes.len();

    for i in 0..count {
        if leaves[i] {
            continue;
        }
        let span = k_max.saturating_sub(k_min) + 1;
        let target = (k_min + rng.next_usize(span)).min(MAX_DEGREE);

        let mut order: Vec<usize> = (0..count).filter(|&j| j != i && !leaves[j]).collect();
        order.sort_by(|&a, &b| {
            nodes[i]
                .distance_to(&nodes[a])
                .total_cmp(&nodes[i].distance_to(&nodes[b]))
        });

        for j in order {
            if nodes[i].degree() >= target {
                break;
            }
            if nodes[j].degree() >= MAX_DEGREE || nodes[i].is_adjacent_to(j as NodeId) {
                continue;
            }
            let weight = rng.next_range(config.edge_weight_range.0, config.edge_weight_range.1);
            add_edge(nodes, i, j, weight);
        }
    }
}

/// Give each designated leaf its single edge, to the nearest non-leaf
/// with capacity.
fn attach_leaves(nodes: &mut [Node], leaves: &[bool], config: &GameConfig, rng: &mut Rng) {
    let count = nodes.len();
    for i in 0..count {
        if !leaves[i] || nodes[i].degree() > 0 {
            continue;
        }
        let mut order: Vec<usize> = (0..count)
            .filter(|&j| j != i && !leaves[j] && nodes[j].degree() < MAX_DEGREE)
            .collect();
        order.sort_by(|&a, &b| {
            nodes[i]
                .distance_to(&nodes[a])
                .total_cmp(&nodes[i].distance_to(&nodes[b]))
        });
        if let Some(&anchor) = order.first() {
            let weight = rng.next_range(config.edge_weight_range.0, config.edge_weight_range.1);
            add_edge(nodes, i, anchor, weight);
        }
    }
}

fn add_edge(nodes: &mut [Node], a: usize, b: usize, weight: f64) {
    let (a_id, b_id) = (a as NodeId, b as NodeId);
    nodes[a].push_neighbour(b_id, weight);
    nodes[b].push_neighbour(a_id, weight);
}

fn remove_edge(nodes: &mut [Node], a: usize, b: usize) {
    let (a_id, b_id) = (a as NodeId, b as NodeId);
    nodes[a].remove_neighbour(b_id);
    nodes[b].remove_neighbour(a_id);
}

/// Visit every node reachable from node 0, optionally pretending one edge
/// does not exist.
fn reachable_from_zero(nodes: &[Node], skip: Option<(usize, usize)>) -> Vec<bool> {
    let mut seen = vec![false; nodes.len()];
    if nodes.is_empty() {
        return seen;
    }
    let mut frontier = vec![0usize];
    seen[0] = true;
    while let Some(current) = frontier.pop() {
        for &(next, _) in nodes[current].neighbours() {
            let next = usize::from(next);
            let blocked = skip
                .is_some_and(|(a, b)| (current, next) == (a, b) || (current, next) == (b, a));
            if !blocked && !seen[next] {
                seen[next] = true;
                frontier.push(next);
            }
        }
    }
    seen
}

fn is_connected(nodes: &[Node], skip: Option<(usize, usize)>) -> bool {
    reachable_from_zero(nodes, skip).iter().all(|&v| v)
}

/// The closest (inside, outside) pair across the reachability frontier.
/// With `spare_leaves`, nodes of degree 1 are not considered.
fn closest_cross_pair(nodes: &[Node], seen: &[bool], spare_leaves: bool) -> Option<(usize, usize)> {
    let eligible =
        |x: usize| !spare_leaves || nodes[x].degree() != 1;

    let mut best: Option<(usize, usize, f64)> = None;
    for inside in 0..nodes.len() {
        if !seen[inside] || !eligible(inside) {
            continue;
        }
        for outside in 0..nodes.len() {
            if seen[outside] || !eligible(outside) {
                continue;
            }
            let dist = nodes[inside].distance_to(&nodes[outside]);
            if best.map_or(true, |(_, _, d)| dist < d) {
                best = Some((inside, outside, dist));
            }
        }
    }
    best.map(|(a, b, _)| (a, b))
}

/// Connect stranded components by the shortest cross-component edge until
/// everything is reachable from node 0.
fn repair_connectivity(
    nodes: &mut [Node],
    config: &GameConfig,
    rng: &mut Rng,
) -> Result<(), BuildError> {
    let max_attempts = nodes.len() + 1;
    for attempt in 0..=max_attempts {
        let seen = reachable_from_zero(nodes, None);
        if seen.iter().all(|&v| v) {
            return Ok(());
        }
        if attempt == max_attempts {
            break;
        }

        // Prefer endpoints that are not dead-ends so repair does not
        // disturb the leaf count; fall back to any pair.
        let pair = closest_cross_pair(nodes, &seen, true)
            .or_else(|| closest_cross_pair(nodes, &seen, false));
        if let Some((a, b)) = pair {
            let weight = rng.next_range(config.edge_weight_range.0, config.edge_weight_range.1);
            add_edge(nodes, a, b, weight);
        }
    }

    Err(BuildError::Disconnected {
        attempts: max_attempts,
    })
}

fn leaf_count(nodes: &[Node]) -> usize {
    nodes.iter().filter(|n| n.is_leaf()).count()
}

/// Adjust the leaf count into the configured range.
///
/// Designation keeps this a no-op in the common case; it corrects drift
/// from connectivity repair. Too few leaves: repeatedly remove the
/// heaviest edge incident to the highest-degree node whose removal keeps
/// the graph connected. Too many: wire excess leaves to their nearest
/// non-leaf. If the range cannot be reached, the nearest feasible count
/// is accepted and logged.
fn carve_leaves(nodes: &mut [Node], config: &GameConfig, rng: &mut Rng) {
    let (min_leaves, max_leaves) = config.leaf_range;

    let mut attempts = 0;
    while leaf_count(nodes) < min_leaves && attempts < CARVE_ATTEMPTS {
        attempts += 1;
        if !remove_one_edge(nodes) {
            warn!(
                wanted = min_leaves,
                actual = leaf_count(nodes),
                "leaf range unmet; accepting nearest feasible count"
            );
            break;
        }
    }

    while leaf_count(nodes) > max_leaves {
        let Some(leaf) = nodes.iter().position(Node::is_leaf) else {
            break;
        };
        let mut order: Vec<usize> = (0..nodes.len())
            .filter(|&j| {
                j != leaf
                    && !nodes[j].is_leaf()
                    && nodes[j].degree() < MAX_DEGREE
                    && !nodes[leaf].is_adjacent_to(j as NodeId)
            })
            .collect();
        order.sort_by(|&a, &b| {
            nodes[leaf]
                .distance_to(&nodes[a])
                .total_cmp(&nodes[leaf].distance_to(&nodes[b]))
        });
        let Some(&target) = order.first() else {
            warn!(
                wanted = max_leaves,
                actual = leaf_count(nodes),
                "leaf range unmet; accepting nearest feasible count"
            );
            break;
        };
        let weight = rng.next_range(config.edge_weight_range.0, config.edge_weight_range.1);
        add_edge(nodes, leaf, target, weight);
    }
}

/// Remove one edge from the highest-degree node without disconnecting the
/// graph or stranding an endpoint. Returns false when no edge qualifies.
fn remove_one_edge(nodes: &mut [Node]) -> bool {
    let mut by_degree: Vec<usize> = (0..nodes.len()).collect();
    by_degree.sort_by_key(|&i| std::cmp::Reverse(nodes[i].degree()));

    for &i in &by_degree {
        if nodes[i].degree() < 2 {
            continue;
        }
        let mut edges: Vec<(NodeId, f64)> = nodes[i].neighbours().to_vec();
        edges.sort_by(|a, b| b.1.total_cmp(&a.1));

        for (other, _) in edges {
            let j = usize::from(other);
            if nodes[j].degree() < 2 {
                continue;
            }
            if is_connected(nodes, Some((i, j))) {
                remove_edge(nodes, i, j);
                return true;
            }
        }
    }
    false
}
