//! End-to-end scenarios for the pursuit core.
//!
//! Each test pins one user-visible behaviour: fair starts, evasion into a
//! local minimum, full traversal exploration, cheapest-first stepping,
//! combat attrition, and deterministic replay.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use arena::graph::shortest_hop_path;
use arena::{
    next_move, Decision, GameConfig, Graph, InboundEvent, OutboundEvent, Outcome, Policy, Pursuer,
    PursuerAction, Session, StuckReason, VisitedSets,
};

/// Scenario 1: a Greedy (Local Min) session must not start on a plateau.
/// With the runner standing still, the first cadence produces a step, and
/// that step descends the heuristic.
#[test]
fn greedy_min_first_decision_descends() {
    let mut session = Session::start(Policy::GreedyMin, GameConfig::with_seed(42)).unwrap();
    let spawn = session.spawns().pursuer;
    let spawn_h = session.graph().heuristic(spawn);

    let events = session.tick(600);
    assert_eq!(session.outcome(), Outcome::InProgress);
    let moved = events.iter().find_map(|e| match e {
        OutboundEvent::PursuerMoved { to, .. } => Some(*to),
        _ => None,
    });
    let to = moved.expect("pursuer should step at the first cadence, not stall");
    assert!(session.graph().heuristic(to) < spawn_h);
}

/// Scenario 1 holds for every gradient policy and a spread of seeds.
#[test]
fn gradient_policies_never_stall_at_tick_zero() {
    for policy in [
        Policy::GreedyMin,
        Policy::GreedyMax,
        Policy::AStarMin,
        Policy::AStarMax,
    ] {
        for seed in [1, 7, 42, 99, 1234] {
            let mut session = Session::start(policy, GameConfig::with_seed(seed)).unwrap();
            session.tick(1000);
            assert_eq!(
                session.outcome(),
                Outcome::InProgress,
                "{policy:?} seed {seed} resolved on its first decision"
            );
        }
    }
}

/// Scenario 2: lateral evasion strands Greedy (Local Min) in a local
/// minimum. The pursuer descends into node 1; everything it could still
/// reach from there sits higher.
#[test]
fn greedy_min_stranded_by_lateral_runner() {
    // 0 is the spawn ridge; 1 the valley; 3 and 4 the far slopes the
    // runner dances on.
    let graph = Graph::from_edges(
        5,
        &[
            (0, 1, 5.0),
            (0, 2, 5.0),
            (1, 3, 5.0),
            (1, 4, 5.0),
            (3, 4, 2.0),
        ],
    )
    .with_landscape(vec![300.0, 100.0, 200.0, 150.0, 180.0], vec![0.0; 5]);

    let mut pursuer = Pursuer::new(&graph, 0, Policy::GreedyMin, 600);

    // First cadence: descend into the valley.
    assert_eq!(
        pursuer.maybe_act(&graph, 600, 3),
        Some(PursuerAction::Moved(1))
    );
    // The runner hops 3 -> 4, non-decreasing heuristic: no re-engagement.
    pursuer.notify_runner_moved(&graph, 3, 4);
    // Second cadence: both remaining neighbours (150, 180) sit above 100.
    assert_eq!(
        pursuer.maybe_act(&graph, 1200, 4),
        Some(PursuerAction::Stuck(StuckReason::LocalMin))
    );
    assert!(pursuer.is_stuck());

    // The terminal position is a genuine local minimum over unvisited
    // neighbours.
    let here = graph.heuristic(pursuer.current());
    for &(n, _) in graph.neighbours(pursuer.current()) {
        if !pursuer.visited().visited_nodes.contains(&n) {
            assert!(graph.heuristic(n) >= here);
        }
    }
}

/// Scenario 3: BFS explores the whole component and halts with
/// GraphExplored once the runner hides on a leaf the pursuer has already
/// spent.
#[test]
fn bfs_full_exploration_ends_graph_explored() {
    // Chain 0 - 1 - 2 - 3; leaves at both ends.
    let graph = Graph::from_edges(4, &[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0)]);
    let mut pursuer = Pursuer::new(&graph, 1, Policy::Bfs, 800);

    // The runner keeps one step ahead, ending on leaf 0 after the pursuer
    // has burned it.
    let mut runner = 3;
    let mut now = 0;
    let mut guard = 0;
    while !pursuer.is_stuck() {
        now += 800;
        guard += 1;
        assert!(guard < 32, "exploration did not terminate");
        match pursuer.maybe_act(&graph, now, runner) {
            Some(PursuerAction::Moved(to)) if to == runner => {
                // Caught: the runner flees one hop toward the visited end.
                let fled = runner.saturating_sub(1);
                pursuer.notify_runner_moved(&graph, runner, fled);
                runner = fled;
            }
            Some(PursuerAction::Moved(_) | PursuerAction::Stuck(_)) | None => {}
            Some(PursuerAction::Fault) => panic!("kernel fault during exploration"),
        }
    }

    assert_eq!(pursuer.stuck_reason(), Some(StuckReason::GraphExplored));
    // The runner ended on a visited leaf and the sweep covered every node.
    assert!(graph.is_leaf(runner));
    assert!(pursuer.visited().visited_nodes.contains(&runner));
    assert_eq!(pursuer.visited().visited_nodes.len(), graph.len());
    assert!(pursuer.nodes_expanded() >= graph.len() as u32);
}

/// Scenario 4: UCS steps along the cheapest edge first, and backtracks by
/// smallest id once nothing new remains.
#[test]
fn ucs_cheapest_edge_first_then_ordered_backtrack() {
    // Node 0 fans out to 1/2/3 with weights 5/1/2; node 3 continues to 4.
    let graph = Graph::from_edges(
        5,
        &[(0, 1, 5.0), (0, 2, 1.0), (0, 3, 2.0), (3, 4, 7.0)],
    );

    let mut visited = VisitedSets::default();
    visited.record_entry(&graph, 0);
    assert_eq!(next_move(&graph, Policy::Ucs, 0, &mut visited), Decision::Step(2));
    visited.record_entry(&graph, 2);

    // Back at 0 with 2 spent (a leaf): weight 2 beats weight 5.
    assert_eq!(next_move(&graph, Policy::Ucs, 0, &mut visited), Decision::Step(3));
    visited.record_entry(&graph, 3);
    assert_eq!(next_move(&graph, Policy::Ucs, 3, &mut visited), Decision::Step(4));
    visited.record_entry(&graph, 4);

    // Leaf 4 spent: the only admissible way out of 4's corridor is back
    // through 3, then 0, by the smallest-id rule.
    assert_eq!(next_move(&graph, Policy::Ucs, 4, &mut visited), Decision::Step(3));
    assert_eq!(next_move(&graph, Policy::Ucs, 3, &mut visited), Decision::Step(0));
}

/// Scenario 5: pinned contact grinds the runner down first. The pursuer's
/// larger pool decides the asymmetry; outcome is a defeat with the
/// pursuer still standing.
#[test]
fn combat_attrition_defeats_runner_first() {
    // Freeze the pursuer by pushing its cadence out of reach, then walk
    // the runner onto it.
    let mut config = GameConfig::with_seed(42);
    config.cadence_ms.greedy_min = u64::MAX;
    let mut session = Session::start(Policy::GreedyMin, config).unwrap();

    let target = session.spawns().pursuer;
    let path = shortest_hop_path(session.graph(), session.spawns().runner, target);
    assert!(path.len() > 1);

    let mut next_hop = 1;
    let mut guard = 0;
    while session.outcome() == Outcome::InProgress {
        guard += 1;
        assert!(guard < 10_000, "attrition scenario did not resolve");
        if session.runner().queue_len() == 0 && next_hop < path.len() {
            session.handle(InboundEvent::RunnerClick {
                node_id: path[next_hop],
            });
            next_hop += 1;
        }
        session.tick(100);
    }

    assert_eq!(session.outcome(), Outcome::Defeat);
    assert_eq!(session.combat().runner.hp, 0);
    assert!(session.combat().pursuer.is_alive());
    assert_eq!(session.combat().contacts(), 10);
    // Ten damaging contacts a second apart need at least ten seconds.
    assert!(session.elapsed_ms() >= 10_000);
}

/// Scenario 6a: equal f-cost ties break toward the smaller id.
#[test]
fn astar_tiebreak_prefers_smaller_id() {
    let graph = Graph::from_edges(3, &[(0, 1, 1.0), (0, 2, 1.0)])
        .with_landscape(vec![40.0, 10.0, 15.0], vec![0.0, 5.0, 0.0]);
    let mut visited = VisitedSets::default();
    visited.record_entry(&graph, 0);
    // f(1) = f(2) = 15, both below f(0) = 40.
    assert_eq!(
        next_move(&graph, Policy::AStarMin, 0, &mut visited),
        Decision::Step(1)
    );
}

/// Scenario 6b: a seeded replay is identical state-for-state.
#[test]
fn seeded_replay_is_identical() {
    let script = [3u16, 9, 14, 2, 21];
    let play = || {
        let mut session = Session::start(Policy::AStarMin, GameConfig::with_seed(42)).unwrap();
        for (i, &click) in script.iter().enumerate() {
            session.handle(InboundEvent::RunnerClick { node_id: click });
            for _ in 0..(i + 3) {
                session.tick(137);
            }
        }
        session
    };

    assert_eq!(play(), play());
}

/// The outcome payload of a resolved session carries the reason verbatim
/// and the stable policy string.
#[test]
fn outcome_payload_carries_reason_and_policy() {
    let graph = Graph::from_edges(2, &[(0, 1, 1.0)])
        .with_landscape(vec![50.0, 100.0], vec![0.0, 0.0]);
    let mut pursuer = Pursuer::new(&graph, 0, Policy::GreedyMin, 600);
    assert_eq!(
        pursuer.maybe_act(&graph, 600, 1),
        Some(PursuerAction::Stuck(StuckReason::LocalMin))
    );
    assert_eq!(pursuer.stuck_reason().unwrap().as_str(), "local_min");
    assert_eq!(Policy::GreedyMin.name(), "Greedy (Local Min)");
}
