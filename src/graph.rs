//! Graph layer for Arena.
//!
//! Provides the immutable game graph and its two construction stages:
//! - Builder: node placement, wiring, connectivity, leaf carving
//! - Balance planner: spawn placement and the heuristic landscape

mod balance;
mod builder;
mod node;

pub use balance::{balance_landscape, shortest_hop_path, BalanceError, SpawnPair};
pub use builder::{build_graph, BuildError, Rng};
pub use node::{Graph, Node, NodeId};
