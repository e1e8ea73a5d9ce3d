//! Roadgraph
//!
//! An in-memory directed, weighted graph for road networks, with Dijkstra
//! shortest paths, a GeoJSON line importer and flat JSON snapshots.
//!
//! # Layout
//!
//! - [`graph`]: node/edge ownership, sorted identifier lookup, cascading removal
//! - [`algo`]: naive and binary-heap Dijkstra, path reconstruction
//! - [`geo`]: haversine distance, coordinate identifiers, GeoJSON import
//! - [`persistence`]: JSON snapshot save/load
//!
//! ## Example Usage
//!
//! ```rust
//! use roadgraph::{DijkstraVariant, GraphEngine, ShortestPathSolver};
//!
//! let mut graph = GraphEngine::new();
//! let hamburg = graph.create_node_at("Hamburg", 9.9937, 53.5511);
//! let berlin = graph.create_node_at("Berlin", 13.405, 52.52);
//! let munich = graph.create_node_at("Munich", 11.582, 48.1351);
//!
//! graph.create_bidirectional_edge(hamburg, berlin, 300.0, "ROAD").unwrap();
//! graph.create_bidirectional_edge(berlin, munich, 800.0, "ROAD").unwrap();
//! graph.create_edge(hamburg, munich, 1200.0, "ROAD").unwrap();
//!
//! let solver = ShortestPathSolver::new(&graph);
//! let path = solver
//!     .find_shortest_path(hamburg, munich, DijkstraVariant::Heap)
//!     .unwrap();
//!
//! assert_eq!(path.len(), 2);
//! assert_eq!(graph.path_weight(&path), 1100.0);
//! ```

pub mod algo;
pub mod geo;
pub mod graph;
pub mod persistence;

// Re-export main types for convenience
pub use algo::{DijkstraVariant, DistanceEntry, DistanceTable, SearchStatus, ShortestPathSolver};
pub use geo::{GeoJsonImporter, ImportError, ImportOptions, ImportResult, ImportSummary};
pub use graph::{
    Direction, Edge, EdgeId, EdgeType, GraphEngine, GraphError, GraphId, GraphResult, Label, Node,
    NodeId, PropertyMap,
};
pub use persistence::{load_snapshot, save_snapshot, Snapshot, SnapshotError, SnapshotResult};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
