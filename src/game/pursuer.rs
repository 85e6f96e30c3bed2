//! The pursuer controller.
//!
//! Owns the persistent visitation sets, paces decisions on a per-policy
//! cadence, and latches the stuck state. For the no-backtrack family it
//! also implements conditional tracking: a fresh decision is taken on a
//! runner hop only when that hop improved the policy's objective.

use crate::game::policy::{next_move, Decision, Policy, StuckReason, VisitedSets};
use crate::graph::{Graph, NodeId};

/// Outcome of one controller activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PursuerAction {
    /// The pursuer stepped to this node.
    Moved(NodeId),
    /// The pursuer halted for good.
    Stuck(StuckReason),
    /// A kernel proposed a non-neighbour. Programmer error; the session
    /// aborts.
    Fault,
}

/// The autonomous agent chasing the runner.
#[derive(Debug, Clone, PartialEq)]
pub struct Pursuer {
    current: NodeId,
    policy: Policy,
    visited: VisitedSets,
    stuck: bool,
    stuck_reason: Option<StuckReason>,
    last_move_ms: u64,
    cadence_ms: u64,
    nodes_expanded: u32,
    runner_moved: bool,
    decided: Option<Decision>,
}

impl Pursuer {
    /// Create a pursuer at its spawn node. The spawn counts as visited.
    #[must_use]
    pub fn new(graph: &Graph, spawn: NodeId, policy: Policy, cadence_ms: u64) -> Self {
        let mut visited = VisitedSets::default();
        visited.record_entry(graph, spawn);
        Self {
            current: spawn,
            policy,
            visited,
            stuck: false,
            stuck_reason: None,
            last_move_ms: 0,
            cadence_ms,
            nodes_expanded: 0,
            runner_moved: false,
            decided: None,
        }
    }

    /// The node the pursuer occupies.
    #[must_use]
    pub const fn current(&self) -> NodeId {
        self.current
    }

    /// The policy this pursuer runs.
    #[must_use]
    pub const fn policy(&self) -> Policy {
        self.policy
    }

    /// Whether the pursuer has halted for good.
    #[must_use]
    pub const fn is_stuck(&self) -> bool {
        self.stuck
    }

    /// Why the pursuer halted, once it has.
    #[must_use]
    pub const fn stuck_reason(&self) -> Option<StuckReason> {
        self.stuck_reason
    }

    /// The persistent visitation sets.
    #[must_use]
    pub const fn visited(&self) -> &VisitedSets {
        &self.visited
    }

    /// Kernel invocations so far.
    #[must_use]
    pub const fn nodes_expanded(&self) -> u32 {
        self.nodes_expanded
    }

    /// A deterministic sample of visited node ids, capped at `cap`.
    #[must_use]
    pub fn visited_sample(&self, cap: usize) -> Vec<NodeId> {
        let mut sample: Vec<NodeId> = self.visited.visited_nodes.iter().copied().collect();
        sample.sort_unstable();
        sample.truncate(cap);
        sample
    }

    fn decide(&mut self, graph: &Graph) -> Decision {
        self.nodes_expanded += 1;
        next_move(graph, self.policy, self.current, &mut self.visited)
    }

    /// Tell the controller the runner hopped `from -> to`.
    ///
    /// For the no-backtrack family a fresh decision replaces the standing
    /// one only when the hop strictly improved the objective; a lateral or
    /// worsening hop leaves the previous decision in force.
    pub fn notify_runner_moved(&mut self, graph: &Graph, from: NodeId, to: NodeId) {
        self.runner_moved = true;
        if self.stuck {
            return;
        }
        if self.policy.is_gradient() && hop_improves(graph, self.policy, from, to) {
            let fresh = self.decide(graph);
            self.decided = Some(fresh);
        }
    }

    /// Activate the controller. A decision is taken only when the cadence
    /// has elapsed and either the runner has moved since the last decision
    /// or the pursuer is not already on the runner's node.
    pub fn maybe_act(&mut self, graph: &Graph, now_ms: u64, runner: NodeId) -> Option<PursuerAction> {
        if self.stuck {
            return None;
        }
        if now_ms.saturating_sub(self.last_move_ms) < self.cadence_ms {
            return None;
        }
        if !self.runner_moved && self.current == runner {
            return None;
        }

        let decision = match self.decided.take() {
            Some(decision) => decision,
            None => self.decide(graph),
        };
        self.runner_moved = false;

        match decision {
            Decision::Step(next) => {
                if graph.weight(self.current, next).is_none() {
                    debug_assert!(false, "kernel proposed non-neighbour {next}");
                    return Some(PursuerAction::Fault);
                }
                self.current = next;
                self.visited.record_entry(graph, next);
                self.last_move_ms = now_ms;
                Some(PursuerAction::Moved(next))
            }
            Decision::Stuck(reason) => {
                self.stuck = true;
                self.stuck_reason = Some(reason);
                Some(PursuerAction::Stuck(reason))
            }
        }
    }

    /// Force the stuck latch from outside the kernel (combat KO).
    pub(crate) fn force_stuck(&mut self, reason: StuckReason) {
        self.stuck = true;
        self.stuck_reason = Some(reason);
    }
}

/// The conditional-tracking predicate: did the runner's hop strictly
/// improve this policy's objective?
#[must_use]
pub(crate) fn hop_improves(graph: &Graph, policy: Policy, from: NodeId, to: NodeId) -> bool {
    let before = policy.objective(graph, from);
    let after = policy.objective(graph, to);
    match policy {
        Policy::GreedyMin | Policy::AStarMin => after < before,
        Policy::GreedyMax | Policy::AStarMax => after > before,
        Policy::Bfs | Policy::Dfs | Policy::Ucs => false,
    }
}
