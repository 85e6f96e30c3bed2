//! Session invariants - sanity checks that detect bugs.
//!
//! These should NEVER trigger in a correctly implemented session. If one
//! does, it indicates a bug, not a gameplay situation; violations are not
//! recovered from.

use crate::game::session::Session;

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all session invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(session: &Session) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let graph = session.graph();

    // Every edge is mirrored with an identical weight.
    for node in graph.nodes() {
        for &(other, weight) in node.neighbours() {
            if graph.weight(other, node.id) != Some(weight) {
                violations.push(InvariantViolation {
                    message: format!("edge {}-{} is not mirrored with equal weight", node.id, other),
                });
            }
        }
    }

    // The pursuer stands on ground it has visited.
    let pursuer = session.pursuer();
    if !pursuer.visited().visited_nodes.contains(&pursuer.current()) {
        violations.push(InvariantViolation {
            message: format!("pursuer at {} which is not in visited_nodes", pursuer.current()),
        });
    }

    // Visited leaves are visited nodes, and actually leaves.
    for &leaf in &pursuer.visited().visited_leaves {
        if !pursuer.visited().visited_nodes.contains(&leaf) {
            violations.push(InvariantViolation {
                message: format!("visited leaf {leaf} missing from visited_nodes"),
            });
        }
        if !graph.is_leaf(leaf) {
            violations.push(InvariantViolation {
                message: format!("node {leaf} in visited_leaves is not a leaf"),
            });
        }
    }

    // The stuck latch and its reason move together.
    if pursuer.is_stuck() != pursuer.stuck_reason().is_some() {
        violations.push(InvariantViolation {
            message: format!(
                "stuck flag {} disagrees with reason {:?}",
                pursuer.is_stuck(),
                pursuer.stuck_reason()
            ),
        });
    }

    // HP stays within its pool.
    let combat = session.combat();
    for (name, entity) in [("runner", combat.runner), ("pursuer", combat.pursuer)] {
        if entity.hp < 0 || entity.hp > entity.max_hp {
            violations.push(InvariantViolation {
                message: format!("{name} hp {} outside [0, {}]", entity.hp, entity.max_hp),
            });
        }
    }

    // The click queue respects its bound.
    let depth = session.config().queue_depth;
    if session.runner().queue_len() > depth {
        violations.push(InvariantViolation {
            message: format!(
                "runner queue holds {} hops, limit {depth}",
                session.runner().queue_len()
            ),
        });
    }

    violations
}

/// Assert all session invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with a detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(session: &Session) {
    let violations = check_invariants(session);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Session invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_session: &Session) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::policy::Policy;
    use crate::game::session::Session;

    #[test]
    fn test_fresh_session_passes() {
        for policy in Policy::ALL {
            let session = Session::start(policy, GameConfig::with_seed(42)).unwrap();
            let violations = check_invariants(&session);
            assert!(violations.is_empty(), "{policy:?}: {violations:?}");
        }
    }

    #[test]
    fn test_running_session_passes() {
        let mut session = Session::start(Policy::GreedyMin, GameConfig::with_seed(42)).unwrap();
        for _ in 0..200 {
            session.tick(100);
            let violations = check_invariants(&session);
            assert!(violations.is_empty(), "{violations:?}");
            if session.outcome().is_terminal() {
                break;
            }
        }
    }

    #[test]
    fn test_assert_invariants_accepts_valid_session() {
        let session = Session::start(Policy::Bfs, GameConfig::with_seed(7)).unwrap();
        assert_invariants(&session);
    }
}
