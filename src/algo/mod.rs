//! Graph algorithms module
//!
//! Shortest-path search over a [`GraphEngine`](crate::graph::GraphEngine).

pub mod pathfinding;

pub use pathfinding::{
    DijkstraVariant, DistanceEntry, DistanceTable, SearchStatus, ShortestPathSolver,
};
