//! The policy kernel: seven next-move functions behind one signature.
//!
//! Kernels are pure apart from the visitation sets the pursuer owns. They
//! never hold global state and never propose a non-neighbour; scratch
//! space for a single invocation is stack-local.

use std::collections::HashSet;

use crate::graph::{Graph, NodeId};

/// The closed set of pursuer search policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    /// Breadth-first traversal: first unvisited neighbour, FIFO discipline.
    Bfs,
    /// Depth-first traversal: most recent unvisited neighbour, LIFO discipline.
    Dfs,
    /// Uniform-cost traversal: cheapest outgoing edge first.
    Ucs,
    /// Descend the heuristic landscape; stops at a local minimum.
    GreedyMin,
    /// Ascend the heuristic landscape; stops at a local maximum.
    GreedyMax,
    /// Descend `f = path_cost + heuristic`; stops at a local minimum.
    AStarMin,
    /// Ascend `f = path_cost + heuristic`; stops at a local maximum.
    AStarMax,
}

impl Policy {
    /// Every policy, in presentation order.
    pub const ALL: [Policy; 7] = [
        Policy::Bfs,
        Policy::Dfs,
        Policy::Ucs,
        Policy::GreedyMin,
        Policy::GreedyMax,
        Policy::AStarMin,
        Policy::AStarMax,
    ];

    /// Stable identifier used in events and telemetry.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Policy::Bfs => "BFS",
            Policy::Dfs => "DFS",
            Policy::Ucs => "UCS",
            Policy::GreedyMin => "Greedy (Local Min)",
            Policy::GreedyMax => "Greedy (Local Max)",
            Policy::AStarMin => "A* (Local Min)",
            Policy::AStarMax => "A* (Local Max)",
        }
    }

    /// Parse a stable identifier back into a policy.
    #[must_use]
    pub fn parse(name: &str) -> Option<Policy> {
        Policy::ALL.into_iter().find(|p| p.name() == name)
    }

    /// The traversal family: BFS/DFS/UCS. May backtrack through visited
    /// non-leaf nodes.
    #[must_use]
    pub const fn is_traversal(self) -> bool {
        matches!(self, Policy::Bfs | Policy::Dfs | Policy::Ucs)
    }

    /// The no-backtrack family: Greedy/A* variants driven by the landscape.
    #[must_use]
    pub const fn is_gradient(self) -> bool {
        matches!(
            self,
            Policy::GreedyMin | Policy::GreedyMax | Policy::AStarMin | Policy::AStarMax
        )
    }

    /// Whether hover inspection should expose the heuristic.
    #[must_use]
    pub const fn shows_heuristic(self) -> bool {
        self.is_gradient()
    }

    /// Whether hover inspection should expose the static path cost.
    #[must_use]
    pub const fn shows_path_cost(self) -> bool {
        matches!(self, Policy::AStarMin | Policy::AStarMax)
    }

    /// The scalar this policy optimises at a node; 0 for the traversal
    /// family, which does not use the landscape.
    #[must_use]
    pub fn objective(self, graph: &Graph, id: NodeId) -> f64 {
        match self {
            Policy::GreedyMin | Policy::GreedyMax => graph.heuristic(id),
            Policy::AStarMin | Policy::AStarMax => graph.f_cost(id),
            Policy::Bfs | Policy::Dfs | Policy::Ucs => 0.0,
        }
    }
}

impl std::fmt::Display for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a pursuer halted for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StuckReason {
    /// Every unvisited neighbour has an equal or higher objective.
    LocalMin,
    /// Every unvisited neighbour has an equal or lower objective.
    LocalMax,
    /// The traversal has nowhere left to go.
    GraphExplored,
    /// All neighbours already visited; no backtracking allowed.
    DeadEnd,
    /// Knocked out in contact combat.
    CombatKo,
}

impl StuckReason {
    /// Stable identifier used in the outcome payload.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            StuckReason::LocalMin => "local_min",
            StuckReason::LocalMax => "local_max",
            StuckReason::GraphExplored => "graph_explored",
            StuckReason::DeadEnd => "dead_end",
            StuckReason::CombatKo => "combat",
        }
    }
}

/// A kernel's verdict for one decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Move to this neighbour of the current node.
    Step(NodeId),
    /// Halt for good with the given reason.
    Stuck(StuckReason),
}

/// Persistent visitation state, owned by the pursuer and threaded through
/// every kernel invocation. All three sets grow monotonically within a
/// session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitedSets {
    /// Every node the pursuer has occupied.
    pub visited_nodes: HashSet<NodeId>,
    /// Visited nodes that are leaves. Only the traversal family reads this.
    pub visited_leaves: HashSet<NodeId>,
    /// Nodes the pursuer has backed out of. Only the traversal family
    /// reads this; it prevents oscillation between exhausted corridors.
    pub backtracked_from: HashSet<NodeId>,
}

impl VisitedSets {
    /// Record that the pursuer now occupies `id`.
    pub fn record_entry(&mut self, graph: &Graph, id: NodeId) {
        self.visited_nodes.insert(id);
        if graph.is_leaf(id) {
            self.visited_leaves.insert(id);
        }
    }
}

/// Decide the pursuer's next move from `current` under `policy`.
///
/// Mutates `visited` only to record backtracking; the caller applies the
/// visitation update for an executed `Step`.
#[must_use]
pub fn next_move(
    graph: &Graph,
    policy: Policy,
    current: NodeId,
    visited: &mut VisitedSets,
) -> Decision {
    if policy.is_traversal() {
        traversal_move(graph, policy, current, visited)
    } else {
        gradient_move(graph, policy, current, visited)
    }
}

/// BFS / DFS / UCS: prefer unvisited neighbours under the policy's
/// discipline; otherwise backtrack through visited non-leaves, never
/// re-entering a node already backed out of.
fn traversal_move(
    graph: &Graph,
    policy: Policy,
    current: NodeId,
    visited: &mut VisitedSets,
) -> Decision {
    let admissible: Vec<(NodeId, f64)> = graph
        .neighbours(current)
        .iter()
        .copied()
        .filter(|&(n, _)| !(graph.is_leaf(n) && visited.visited_leaves.contains(&n)))
        .collect();

    let unvisited: Vec<(NodeId, f64)> = admissible
        .iter()
        .copied()
        .filter(|&(n, _)| !visited.visited_nodes.contains(&n))
        .collect();

    if !unvisited.is_empty() {
        let chosen = match policy {
            Policy::Bfs => unvisited[0].0,
            Policy::Dfs => unvisited[unvisited.len() - 1].0,
            Policy::Ucs => {
                unvisited
                    .iter()
                    .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
                    .map(|&(n, _)| n)
                    .unwrap_or(unvisited[0].0)
            }
            _ => unreachable!("traversal_move called for a gradient policy"),
        };
        return Decision::Step(chosen);
    }

    // Nothing new here: back out of this node. Exhausted corridors stay
    // closed, so the traversal cannot oscillate between them.
    visited.backtracked_from.insert(current);
    admissible
        .iter()
        .map(|&(n, _)| n)
        .filter(|n| !visited.backtracked_from.contains(n))
        .min()
        .map_or(Decision::Stuck(StuckReason::GraphExplored), Decision::Step)
}

/// Greedy / A*: no revisits at all; stop on a plateau of the objective.
fn gradient_move(
    graph: &Graph,
    policy: Policy,
    current: NodeId,
    visited: &mut VisitedSets,
) -> Decision {
    let admissible: Vec<NodeId> = graph
        .neighbours(current)
        .iter()
        .map(|&(n, _)| n)
        .filter(|n| !visited.visited_nodes.contains(n))
        .collect();

    if admissible.is_empty() {
        return Decision::Stuck(StuckReason::DeadEnd);
    }

    let minimising = matches!(policy, Policy::GreedyMin | Policy::AStarMin);
    let best = admissible
        .iter()
        .copied()
        .min_by(|&a, &b| {
            let (va, vb) = (policy.objective(graph, a), policy.objective(graph, b));
            let ordering = if minimising {
                va.total_cmp(&vb)
            } else {
                vb.total_cmp(&va)
            };
            ordering.then(a.cmp(&b))
        })
        .unwrap_or(admissible[0]);

    let here = policy.objective(graph, current);
    let there = policy.objective(graph, best);
    if minimising && there >= here {
        return Decision::Stuck(StuckReason::LocalMin);
    }
    if !minimising && there <= here {
        return Decision::Stuck(StuckReason::LocalMax);
    }

    Decision::Step(best)
}
