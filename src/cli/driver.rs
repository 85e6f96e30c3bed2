//! Scripted runner stand-ins for headless sessions.

use arena::graph::shortest_hop_path;
use arena::{InboundEvent, NodeId, Rng, Session};
use clap::ValueEnum;

/// How the scripted runner behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum RunnerStrategy {
    /// Never click; stand on the spawn node.
    Still,
    /// Hop toward the neighbour farthest (in hops) from the pursuer.
    Evade,
    /// Hop to a random adjacent node.
    Random,
}

/// Drives the runner with one of the scripted strategies.
#[derive(Debug)]
pub(crate) struct RunnerDriver {
    strategy: RunnerStrategy,
    rng: Rng,
}

impl RunnerDriver {
    pub(crate) fn new(strategy: RunnerStrategy, seed: u64) -> Self {
        Self {
            strategy,
            // Decorrelate from the session's own stream.
            rng: Rng::new(seed ^ 0x9e37_79b9_7f4a_7c15),
        }
    }

    /// Queue the next hop when the runner is idle.
    pub(crate) fn drive(&mut self, session: &mut Session) {
        if session.runner().queue_len() > 0 {
            return;
        }
        let Some(target) = self.pick(session) else {
            return;
        };
        session.handle(InboundEvent::RunnerClick { node_id: target });
    }

    fn pick(&mut self, session: &Session) -> Option<NodeId> {
        let graph = session.graph();
        let here = session.runner().current();
        let neighbours: Vec<NodeId> = graph.neighbours(here).iter().map(|&(n, _)| n).collect();
        if neighbours.is_empty() {
            return None;
        }

        match self.strategy {
            RunnerStrategy::Still => None,
            RunnerStrategy::Random => {
                let index = self.rng.next_usize(neighbours.len());
                Some(neighbours[index])
            }
            RunnerStrategy::Evade => {
                let pursuer = session.pursuer().current();
                neighbours
                    .into_iter()
                    .max_by_key(|&n| {
                        let hops = shortest_hop_path(graph, pursuer, n).len();
                        // Prefer distance; break ties toward smaller ids.
                        (hops, std::cmp::Reverse(n))
                    })
            }
        }
    }
}
