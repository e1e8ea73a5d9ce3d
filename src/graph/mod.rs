//! Core graph engine
//!
//! This module implements the directed, weighted graph model with:
//! - Named, optionally geo-located nodes kept sorted by identifier
//! - Directed edges with weights, kinds and display labels
//! - Multiple edges between the same nodes
//! - Arena ownership with generational handles instead of references

mod arena;
pub mod edge;
pub mod node;
pub mod store;
pub mod types;

// Re-export main types
pub use edge::Edge;
pub use node::Node;
pub use store::{GraphEngine, GraphError, GraphResult};
pub use types::{Direction, EdgeId, EdgeType, GraphId, Label, NodeId, PropertyMap};
