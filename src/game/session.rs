//! The session machine.
//!
//! One session couples the graph, the runner, the pursuer, and combat,
//! and advances strictly inside `Tick`. Within a tick the order is fixed:
//! runner intent, runner movement, pursuer decision, combat, resolution.

use tracing::error;

use crate::config::GameConfig;
use crate::events::{
    HoverPayload, InboundEvent, OutboundEvent, OutcomePayload, PursuerReport, RunnerReport,
};
use crate::game::combat::Combat;
use crate::game::policy::{Policy, StuckReason};
use crate::game::pursuer::{Pursuer, PursuerAction};
use crate::game::runner::Runner;
use crate::graph::{
    balance_landscape, build_graph, BalanceError, BuildError, Graph, NodeId, Rng, SpawnPair,
};

/// Upper bound on ids in a `PursuerMoved` visited sample.
const VISITED_SAMPLE_CAP: usize = 8;

/// How a session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Still being played.
    InProgress,
    /// The pursuer halted; the reason is carried verbatim.
    Victory(StuckReason),
    /// The runner ran out of HP (or the core aborted).
    Defeat,
}

impl Outcome {
    /// Whether the session has resolved.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Outcome::InProgress)
    }
}

/// Error type for session startup.
#[derive(Debug, Clone, PartialEq)]
pub enum StartError {
    /// Graph construction failed.
    Build(BuildError),
    /// Balance planning failed.
    Balance(BalanceError),
}

impl std::fmt::Display for StartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartError::Build(e) => write!(f, "graph construction failed: {e}"),
            StartError::Balance(e) => write!(f, "balance planning failed: {e}"),
        }
    }
}

impl std::error::Error for StartError {}

impl From<BuildError> for StartError {
    fn from(e: BuildError) -> Self {
        StartError::Build(e)
    }
}

impl From<BalanceError> for StartError {
    fn from(e: BalanceError) -> Self {
        StartError::Balance(e)
    }
}

/// Aggregate counters for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct SessionStats {
    /// Session time so far.
    pub elapsed_ms: u64,
    /// Damaging contacts so far.
    pub contacts: u32,
    /// Pursuer kernel invocations.
    pub nodes_expanded: u32,
    /// Distinct nodes the runner has occupied.
    pub runner_nodes_visited: u32,
}

/// One game: graph, agents, combat, clock, outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    config: GameConfig,
    policy: Policy,
    graph: Graph,
    spawns: SpawnPair,
    runner: Runner,
    pursuer: Pursuer,
    combat: Combat,
    clock_ms: u64,
    paused: bool,
    outcome: Outcome,
    pending_clicks: Vec<NodeId>,
}

impl Session {
    /// Build the graph, plan the balance, and place both agents.
    ///
    /// # Errors
    ///
    /// Returns `StartError` when construction or balance planning fails;
    /// the shell should retry with a fresh seed.
    pub fn start(policy: Policy, config: GameConfig) -> Result<Self, StartError> {
        let mut rng = Rng::new(config.rng_seed);
        let mut graph = build_graph(&config, &mut rng)?;
        let spawns = balance_landscape(&mut graph, policy, &config, &mut rng)?;

        let pursuer = Pursuer::new(
            &graph,
            spawns.pursuer,
            policy,
            config.cadence_ms.for_policy(policy),
        );
        let runner = Runner::new(spawns.runner);
        let combat = Combat::new(
            config.runner_hp,
            config.pursuer_hp,
            config.contact_damage,
            config.contact_cooldown_ms,
        );

        Ok(Self {
            config,
            policy,
            graph,
            spawns,
            runner,
            pursuer,
            combat,
            clock_ms: 0,
            paused: false,
            outcome: Outcome::InProgress,
            pending_clicks: Vec::new(),
        })
    }

    /// The session's graph.
    #[must_use]
    pub const fn graph(&self) -> &Graph {
        &self.graph
    }

    /// The configuration the session was started with.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The policy in play.
    #[must_use]
    pub const fn policy(&self) -> Policy {
        self.policy
    }

    /// The runner.
    #[must_use]
    pub const fn runner(&self) -> &Runner {
        &self.runner
    }

    /// The pursuer.
    #[must_use]
    pub const fn pursuer(&self) -> &Pursuer {
        &self.pursuer
    }

    /// Combat state.
    #[must_use]
    pub const fn combat(&self) -> &Combat {
        &self.combat
    }

    /// Where the agents spawned.
    #[must_use]
    pub const fn spawns(&self) -> SpawnPair {
        self.spawns
    }

    /// Session time. Paused spans contribute nothing.
    #[must_use]
    pub const fn elapsed_ms(&self) -> u64 {
        self.clock_ms
    }

    /// Whether the clock is frozen.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Current outcome.
    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Route one inbound event. `Start` and `Quit` belong to the port and
    /// are ignored here.
    pub fn handle(&mut self, event: InboundEvent) -> Vec<OutboundEvent> {
        match event {
            InboundEvent::Pause => {
                if !self.outcome.is_terminal() {
                    self.paused = true;
                }
                Vec::new()
            }
            InboundEvent::Resume => {
                self.paused = false;
                Vec::new()
            }
            InboundEvent::RunnerClick { node_id } => {
                self.pending_clicks.push(node_id);
                Vec::new()
            }
            InboundEvent::Hover { node_id } => self
                .hover(node_id)
                .map(OutboundEvent::HeuristicForNode)
                .into_iter()
                .collect(),
            InboundEvent::Tick { dt_ms, .. } => self.tick(dt_ms),
            InboundEvent::Start { .. } | InboundEvent::Quit => Vec::new(),
        }
    }

    /// Advance the session by `dt_ms`. Hover reads aside, this is the only
    /// place state changes.
    pub fn tick(&mut self, dt_ms: u64) -> Vec<OutboundEvent> {
        if self.outcome.is_terminal() {
            self.pending_clicks.clear();
            return Vec::new();
        }
        if self.paused {
            return Vec::new();
        }
        self.clock_ms += dt_ms;
        let mut out = Vec::new();

        // 1. Runner intent. Clicks that fit no rule change nothing.
        for node in std::mem::take(&mut self.pending_clicks) {
            let _ = self.runner.click(&self.graph, node, self.config.queue_depth);
        }

        // 2. Runner movement, then pursuer notification.
        let from = self.runner.current();
        if let Some(to) = self.runner.advance(self.clock_ms, self.config.runner_step_ms) {
            out.push(OutboundEvent::RunnerMoved {
                to,
                queue: self.runner.queue().collect(),
            });
            self.pursuer.notify_runner_moved(&self.graph, from, to);
        }

        // 3. Pursuer decision.
        match self
            .pursuer
            .maybe_act(&self.graph, self.clock_ms, self.runner.current())
        {
            Some(PursuerAction::Moved(to)) => out.push(OutboundEvent::PursuerMoved {
                to,
                visited_sample: self.pursuer.visited_sample(VISITED_SAMPLE_CAP),
            }),
            Some(PursuerAction::Stuck(_)) | None => {}
            Some(PursuerAction::Fault) => {
                error!("pursuer kernel proposed a non-neighbour; aborting session");
                self.outcome = Outcome::Defeat;
                out.push(OutboundEvent::Outcome(self.outcome_report()));
                return out;
            }
        }

        // 4. Combat.
        let in_contact = self.pursuer.current() == self.runner.current();
        self.combat.tick_contact(in_contact, self.clock_ms);

        // 5. Resolution.
        if !self.combat.runner.is_alive() {
            self.outcome = Outcome::Defeat;
        } else if !self.combat.pursuer.is_alive() {
            self.pursuer.force_stuck(StuckReason::CombatKo);
            self.outcome = Outcome::Victory(StuckReason::CombatKo);
        } else if self.pursuer.is_stuck() {
            let reason = self
                .pursuer
                .stuck_reason()
                .unwrap_or(StuckReason::GraphExplored);
            self.outcome = Outcome::Victory(reason);
        }

        if self.outcome.is_terminal() {
            out.push(OutboundEvent::Outcome(self.outcome_report()));
        }
        out
    }

    /// Inspection payload for a node. Landscape fields follow the policy.
    #[must_use]
    pub fn hover(&self, id: NodeId) -> Option<HoverPayload> {
        let node = self.graph.node(id)?;
        Some(HoverPayload {
            id,
            label: node.label.clone(),
            neighbours: node.degree(),
            visited: self.pursuer.visited().visited_nodes.contains(&id),
            h: self
                .policy
                .shows_heuristic()
                .then(|| self.graph.heuristic(id)),
            path_cost: self
                .policy
                .shows_path_cost()
                .then(|| self.graph.path_cost(id)),
        })
    }

    /// Aggregate counters.
    #[must_use]
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            elapsed_ms: self.clock_ms,
            contacts: self.combat.contacts(),
            nodes_expanded: self.pursuer.nodes_expanded(),
            runner_nodes_visited: self.runner.nodes_visited(),
        }
    }

    /// The outcome payload in its external shape.
    #[must_use]
    pub fn outcome_report(&self) -> OutcomePayload {
        let (outcome, reason) = match self.outcome {
            Outcome::Victory(r) => ("victory", Some(r.as_str())),
            Outcome::Defeat | Outcome::InProgress => ("defeat", None),
        };
        OutcomePayload {
            outcome,
            reason,
            elapsed_ms: self.clock_ms,
            runner: RunnerReport {
                node_id: self.runner.current(),
                hp: self.combat.runner.hp,
                nodes_visited: self.runner.nodes_visited(),
            },
            pursuer: PursuerReport {
                node_id: self.pursuer.current(),
                hp: self.combat.pursuer.hp,
                nodes_expanded: self.pursuer.nodes_expanded(),
                policy: self.policy.name(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(policy: Policy, seed: u64) -> Session {
        Session::start(policy, GameConfig::with_seed(seed)).unwrap()
    }

    #[test]
    fn test_start_all_policies() {
        for policy in Policy::ALL {
            let s = session(policy, 42);
            assert_eq!(s.outcome(), Outcome::InProgress);
            assert_eq!(s.graph().len(), 28);
            assert_ne!(s.runner().current(), s.pursuer().current());
        }
    }

    #[test]
    fn test_start_is_deterministic() {
        let a = session(Policy::AStarMin, 42);
        let b = session(Policy::AStarMin, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn test_tick_advances_clock() {
        let mut s = session(Policy::Bfs, 42);
        s.tick(16);
        s.tick(16);
        assert_eq!(s.elapsed_ms(), 32);
    }

    #[test]
    fn test_pause_freezes_everything() {
        let mut s = session(Policy::Bfs, 42);
        s.handle(InboundEvent::Pause);
        let before = s.clone();
        for _ in 0..100 {
            assert!(s
                .handle(InboundEvent::Tick {
                    now_ms: 0,
                    dt_ms: 100
                })
                .is_empty());
        }
        assert_eq!(s, before);
    }

    #[test]
    fn test_pause_resume_round_trip_is_identity() {
        let mut s = session(Policy::GreedyMin, 42);
        s.tick(100);
        let before = s.clone();
        s.handle(InboundEvent::Pause);
        s.handle(InboundEvent::Resume);
        assert_eq!(s, before);
    }

    #[test]
    fn test_hover_while_paused_still_answers() {
        let mut s = session(Policy::GreedyMin, 42);
        s.handle(InboundEvent::Pause);
        let events = s.handle(InboundEvent::Hover { node_id: 0 });
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_non_adjacent_click_leaves_session_unchanged() {
        let mut s = session(Policy::Bfs, 42);
        // Find a node that is neither the runner's current nor adjacent.
        let runner = s.runner().current();
        let bad = (0..s.graph().len() as u16)
            .find(|&id| id != runner && s.graph().weight(runner, id).is_none())
            .unwrap();

        let mut twin = s.clone();
        s.handle(InboundEvent::RunnerClick { node_id: bad });
        s.tick(16);
        twin.tick(16);
        assert_eq!(s, twin);
    }

    #[test]
    fn test_hover_fields_follow_policy() {
        let bfs = session(Policy::Bfs, 42);
        let payload = bfs.hover(0).unwrap();
        assert!(payload.h.is_none());
        assert!(payload.path_cost.is_none());

        let greedy = session(Policy::GreedyMin, 42);
        let payload = greedy.hover(0).unwrap();
        assert!(payload.h.is_some());
        assert!(payload.path_cost.is_none());

        let astar = session(Policy::AStarMax, 42);
        let payload = astar.hover(0).unwrap();
        assert!(payload.h.is_some());
        assert!(payload.path_cost.is_some());
    }

    #[test]
    fn test_hover_unknown_node_is_none() {
        let s = session(Policy::Bfs, 42);
        assert!(s.hover(999).is_none());
    }

    #[test]
    fn test_first_pursuer_move_emits_event() {
        let mut s = session(Policy::GreedyMin, 42);
        let mut moved = false;
        for _ in 0..50 {
            for event in s.tick(100) {
                if let OutboundEvent::PursuerMoved { to, .. } = event {
                    moved = true;
                    assert!(s.pursuer().visited().visited_nodes.contains(&to));
                }
            }
            if moved {
                break;
            }
        }
        assert!(moved, "pursuer never moved");
    }

    #[test]
    fn test_greedy_does_not_stall_at_spawn() {
        // The balance post-condition guarantees a descending first step.
        let mut s = session(Policy::GreedyMin, 42);
        s.tick(600);
        assert_eq!(s.outcome(), Outcome::InProgress);
        assert_ne!(s.pursuer().current(), s.spawns().pursuer);
    }

    #[test]
    fn test_outcome_report_in_progress_reads_as_defeat_shape() {
        // The report only goes out on terminal ticks, but its shape is
        // total: no reason unless there is a victory.
        let s = session(Policy::Bfs, 42);
        let report = s.outcome_report();
        assert_eq!(report.reason, None);
        assert_eq!(report.pursuer.policy, "BFS");
    }

    #[test]
    fn test_terminal_session_ignores_further_ticks() {
        let mut s = session(Policy::GreedyMin, 42);
        // Run until resolution; the runner stands still so the pursuer
        // walks its gradient and eventually grinds the runner down or
        // halts.
        let mut guard = 0;
        while !s.outcome().is_terminal() {
            s.tick(100);
            guard += 1;
            assert!(guard < 10_000, "session never resolved");
        }
        let frozen = s.clone();
        s.tick(100);
        assert_eq!(s, frozen);
    }
}
