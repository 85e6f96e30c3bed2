//! The external port: typed events in, typed facts out.
//!
//! The shell feeds `InboundEvent`s through a `Port`; the session emits
//! `OutboundEvent`s the presenter renders. Inbound events carry no
//! ordering guarantee within a tick; the session serialises them in its
//! documented order (intent, runner, pursuer, combat, resolution).

use serde::Serialize;

use crate::config::GameConfig;
use crate::game::{Policy, Session};
use crate::graph::{Graph, NodeId};

/// Events the shell sends into the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundEvent {
    /// Begin a session under the given policy and seed.
    Start {
        /// The pursuer's policy for this session.
        policy: Policy,
        /// PRNG seed for builder and balance planner.
        seed: u64,
    },
    /// Freeze the session clock.
    Pause,
    /// Resume; paused time never happened as far as cadences go.
    Resume,
    /// The runner clicked a node.
    RunnerClick {
        /// The clicked node.
        node_id: NodeId,
    },
    /// Advance the session.
    Tick {
        /// Host wall time. Informational; the session integrates `dt_ms`.
        now_ms: u64,
        /// Time since the previous tick.
        dt_ms: u64,
    },
    /// The cursor is over a node; answer with its inspection payload.
    Hover {
        /// The hovered node.
        node_id: NodeId,
    },
    /// Drop the session immediately.
    Quit,
}

/// One edge in a graph snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgeSnapshot {
    /// Neighbour id.
    pub to: NodeId,
    /// Edge weight.
    pub weight: f64,
}

/// One node in a graph snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    /// Node id.
    pub id: NodeId,
    /// Display label.
    pub label: String,
    /// World x coordinate.
    pub x: f64,
    /// World y coordinate.
    pub y: f64,
    /// Whether the node is a dead-end.
    pub is_leaf: bool,
    /// Outgoing edges in neighbour order.
    pub neighbours: Vec<EdgeSnapshot>,
}

/// A read-only copy of the graph for the presenter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphSnapshot {
    /// All nodes in id order.
    pub nodes: Vec<NodeSnapshot>,
}

impl GraphSnapshot {
    /// Capture the current graph.
    #[must_use]
    pub fn capture(graph: &Graph) -> Self {
        let nodes = graph
            .nodes()
            .iter()
            .map(|node| NodeSnapshot {
                id: node.id,
                label: node.label.clone(),
                x: node.pos.0,
                y: node.pos.1,
                is_leaf: node.is_leaf(),
                neighbours: node
                    .neighbours()
                    .iter()
                    .map(|&(to, weight)| EdgeSnapshot { to, weight })
                    .collect(),
            })
            .collect();
        Self { nodes }
    }
}

/// Inspection payload for a hovered node. The landscape fields appear
/// only when the active policy reads them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverPayload {
    /// Node id.
    pub id: NodeId,
    /// Display label.
    pub label: String,
    /// Neighbour count.
    pub neighbours: usize,
    /// Whether the pursuer has visited the node.
    pub visited: bool,
    /// Heuristic value; present for Greedy and A* policies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h: Option<f64>,
    /// Static path cost; present for A* policies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_cost: Option<f64>,
}

/// Runner half of the outcome payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunnerReport {
    /// Final node.
    pub node_id: NodeId,
    /// Final HP.
    pub hp: i32,
    /// Distinct nodes occupied.
    pub nodes_visited: u32,
}

/// Pursuer half of the outcome payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PursuerReport {
    /// Final node.
    pub node_id: NodeId,
    /// Final HP.
    pub hp: i32,
    /// Kernel invocations over the session.
    pub nodes_expanded: u32,
    /// Stable policy identifier.
    pub policy: &'static str,
}

/// Terminal outcome of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutcomePayload {
    /// `"victory"` or `"defeat"`.
    pub outcome: &'static str,
    /// Stuck reason for victories; `None` for defeats.
    pub reason: Option<&'static str>,
    /// Session time at resolution.
    pub elapsed_ms: u64,
    /// Runner summary.
    pub runner: RunnerReport,
    /// Pursuer summary.
    pub pursuer: PursuerReport,
}

/// Facts the core emits for the presenter and shell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum OutboundEvent {
    /// A session started; here is its graph.
    Built {
        /// Snapshot of the generated graph.
        graph: GraphSnapshot,
    },
    /// The runner completed a hop.
    RunnerMoved {
        /// New runner node.
        to: NodeId,
        /// Remaining queued hops, head first.
        queue: Vec<NodeId>,
    },
    /// The pursuer stepped.
    PursuerMoved {
        /// New pursuer node.
        to: NodeId,
        /// Bounded, sorted sample of the pursuer's visited set.
        visited_sample: Vec<NodeId>,
    },
    /// Answer to a hover.
    HeuristicForNode(HoverPayload),
    /// The session resolved.
    Outcome(OutcomePayload),
}

/// The embeddable boundary object: owns at most one session and routes
/// events to it.
#[derive(Debug)]
pub struct Port {
    config: GameConfig,
    session: Option<Session>,
}

impl Port {
    /// Create a port with the configuration every session will use.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    /// The live session, if any.
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Route one inbound event.
    pub fn handle(&mut self, event: InboundEvent) -> Vec<OutboundEvent> {
        match event {
            InboundEvent::Start { policy, seed } => {
                let mut config = self.config.clone();
                config.rng_seed = seed;
                match Session::start(policy, config) {
                    Ok(session) => {
                        let snapshot = GraphSnapshot::capture(session.graph());
                        self.session = Some(session);
                        vec![OutboundEvent::Built { graph: snapshot }]
                    }
                    Err(error) => {
                        tracing::error!(%error, "session start failed");
                        self.session = None;
                        Vec::new()
                    }
                }
            }
            InboundEvent::Quit => {
                self.session = None;
                Vec::new()
            }
            other => self
                .session
                .as_mut()
                .map(|session| session.handle(other))
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_start_emits_built() {
        let mut port = Port::new(GameConfig::default());
        let events = port.handle(InboundEvent::Start {
            policy: Policy::Bfs,
            seed: 42,
        });
        assert_eq!(events.len(), 1);
        match &events[0] {
            OutboundEvent::Built { graph } => assert_eq!(graph.nodes.len(), 28),
            other => panic!("expected Built, got {other:?}"),
        }
        assert!(port.session().is_some());
    }

    #[test]
    fn test_port_quit_drops_session() {
        let mut port = Port::new(GameConfig::default());
        port.handle(InboundEvent::Start {
            policy: Policy::Bfs,
            seed: 42,
        });
        port.handle(InboundEvent::Quit);
        assert!(port.session().is_none());
        // Events after quit fall on the floor.
        assert!(port
            .handle(InboundEvent::Tick {
                now_ms: 16,
                dt_ms: 16
            })
            .is_empty());
    }

    #[test]
    fn test_hover_payload_serialises_without_absent_fields() {
        let payload = HoverPayload {
            id: 3,
            label: "N4".to_string(),
            neighbours: 2,
            visited: false,
            h: None,
            path_cost: None,
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert!(!json.contains("\"h\""));
        assert!(!json.contains("path_cost"));
    }

    #[test]
    fn test_outcome_payload_shape() {
        let payload = OutcomePayload {
            outcome: "victory",
            reason: Some("local_min"),
            elapsed_ms: 1234,
            runner: RunnerReport {
                node_id: 1,
                hp: 80,
                nodes_visited: 5,
            },
            pursuer: PursuerReport {
                node_id: 2,
                hp: 150,
                nodes_expanded: 9,
                policy: "Greedy (Local Min)",
            },
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["outcome"], "victory");
        assert_eq!(json["reason"], "local_min");
        assert_eq!(json["pursuer"]["policy"], "Greedy (Local Min)");
    }
}
