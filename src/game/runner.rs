//! The runner: the human-controlled agent and its bounded hop queue.

use std::collections::{HashSet, VecDeque};

use crate::graph::{Graph, NodeId};

/// The agent the pursuer chases. Holds up to `queue_depth` pending
/// adjacent hops; clicks that fit no rule are ignored without any state
/// change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Runner {
    current: NodeId,
    queue: VecDeque<NodeId>,
    last_move_ms: u64,
    visited: HashSet<NodeId>,
}

impl Runner {
    /// Create a runner at its spawn node.
    #[must_use]
    pub fn new(spawn: NodeId) -> Self {
        let mut visited = HashSet::new();
        visited.insert(spawn);
        Self {
            current: spawn,
            queue: VecDeque::new(),
            last_move_ms: 0,
            visited,
        }
    }

    /// The node the runner occupies.
    #[must_use]
    pub const fn current(&self) -> NodeId {
        self.current
    }

    /// The pending hops, head first.
    #[must_use]
    pub fn queue(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.queue.iter().copied()
    }

    /// Number of pending hops.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Count of distinct nodes the runner has occupied.
    #[must_use]
    pub fn nodes_visited(&self) -> u32 {
        self.visited.len() as u32
    }

    /// Apply a click. Returns whether the click changed anything.
    ///
    /// Clicking the current node clears the queue. A click adjacent to the
    /// current node or to the queue's tail extends the queue while there
    /// is room; otherwise a click adjacent to the current node replaces
    /// the queue outright. Anything else is ignored.
    pub fn click(&mut self, graph: &Graph, node: NodeId, queue_depth: usize) -> bool {
        if graph.node(node).is_none() {
            return false;
        }
        if node == self.current {
            let had_queue = !self.queue.is_empty();
            self.queue.clear();
            return had_queue;
        }

        let tail = self.queue.back().copied().unwrap_or(self.current);
        let extends = graph.weight(tail, node).is_some() || graph.weight(self.current, node).is_some();
        if self.queue.len() < queue_depth && extends {
            self.queue.push_back(node);
            return true;
        }
        if graph.weight(self.current, node).is_some() {
            self.queue.clear();
            self.queue.push_back(node);
            return true;
        }
        false
    }

    /// Complete one pending hop if its step time has elapsed. Returns the
    /// node moved to.
    pub fn advance(&mut self, now_ms: u64, step_ms: u64) -> Option<NodeId> {
        if self.queue.is_empty() {
            return None;
        }
        if now_ms.saturating_sub(self.last_move_ms) < step_ms {
            return None;
        }
        let next = self.queue.pop_front()?;
        self.current = next;
        self.visited.insert(next);
        self.last_move_ms = now_ms;
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node;

    /// Chain 0 - 1 - 2 - 3 plus a stray node 4 off to the side.
    fn track() -> Graph {
        let mut nodes: Vec<Node> = (0..5)
            .map(|i| Node::new(i, (100.0 * f64::from(i), 0.0)))
            .collect();
        for i in 1..4usize {
            nodes[i - 1].push_neighbour(i as NodeId, 1.0);
            nodes[i].push_neighbour((i - 1) as NodeId, 1.0);
        }
        Graph::from_nodes(nodes)
    }

    #[test]
    fn test_click_adjacent_queues_hop() {
        let graph = track();
        let mut runner = Runner::new(0);
        assert!(runner.click(&graph, 1, 3));
        assert_eq!(runner.queue().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_click_extends_from_queue_tail() {
        let graph = track();
        let mut runner = Runner::new(0);
        assert!(runner.click(&graph, 1, 3));
        assert!(runner.click(&graph, 2, 3));
        assert!(runner.click(&graph, 3, 3));
        assert_eq!(runner.queue().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_queue_depth_is_bounded() {
        let graph = track();
        let mut runner = Runner::new(0);
        runner.click(&graph, 1, 2);
        runner.click(&graph, 2, 2);
        // Full queue and node 3 is not adjacent to the current node:
        // nothing changes.
        assert!(!runner.click(&graph, 3, 2));
        assert_eq!(runner.queue_len(), 2);
    }

    #[test]
    fn test_full_queue_adjacent_click_replaces() {
        let graph = track();
        let mut runner = Runner::new(1);
        runner.click(&graph, 2, 1);
        // Queue is full; clicking a neighbour of the current node restarts
        // the plan from scratch.
        assert!(runner.click(&graph, 0, 1));
        assert_eq!(runner.queue().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_click_current_clears_queue() {
        let graph = track();
        let mut runner = Runner::new(0);
        runner.click(&graph, 1, 3);
        assert!(runner.click(&graph, 0, 3));
        assert_eq!(runner.queue_len(), 0);
    }

    #[test]
    fn test_non_adjacent_click_ignored() {
        let graph = track();
        let mut runner = Runner::new(0);
        assert!(!runner.click(&graph, 3, 3));
        assert!(!runner.click(&graph, 4, 3));
        assert_eq!(runner.queue_len(), 0);
        assert_eq!(runner.current(), 0);
    }

    #[test]
    fn test_unknown_node_ignored() {
        let graph = track();
        let mut runner = Runner::new(0);
        assert!(!runner.click(&graph, 42, 3));
    }

    #[test]
    fn test_advance_respects_step_time() {
        let graph = track();
        let mut runner = Runner::new(0);
        runner.click(&graph, 1, 3);
        assert_eq!(runner.advance(499, 500), None);
        assert_eq!(runner.advance(500, 500), Some(1));
        assert_eq!(runner.current(), 1);
    }

    #[test]
    fn test_advance_drains_queue_in_order() {
        let graph = track();
        let mut runner = Runner::new(0);
        runner.click(&graph, 1, 3);
        runner.click(&graph, 2, 3);
        assert_eq!(runner.advance(500, 500), Some(1));
        assert_eq!(runner.advance(999, 500), None);
        assert_eq!(runner.advance(1000, 500), Some(2));
        assert_eq!(runner.queue_len(), 0);
    }

    #[test]
    fn test_nodes_visited_counts_distinct() {
        let graph = track();
        let mut runner = Runner::new(0);
        runner.click(&graph, 1, 3);
        runner.advance(500, 500);
        runner.click(&graph, 0, 3);
        runner.click(&graph, 1, 3);
        runner.advance(1000, 500);
        runner.advance(1500, 500);
        // Occupied 0, 1, 0 again: two distinct nodes.
        assert_eq!(runner.nodes_visited(), 2);
    }
}
