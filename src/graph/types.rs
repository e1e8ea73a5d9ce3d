//! Core type definitions for the graph engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Free-form attributes attached to a node or edge.
pub type PropertyMap = serde_json::Map<String, serde_json::Value>;

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`GraphEngine`](super::GraphEngine).
///
/// Every handle carries the id of the engine that issued it, so a handle
/// from another engine is never mistaken for one of ours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphId(u64);

impl GraphId {
    pub(crate) fn next() -> Self {
        GraphId(NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GraphId({})", self.0)
    }
}

/// Handle to a node owned by a graph engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    graph: GraphId,
    index: u32,
    generation: u32,
}

impl NodeId {
    pub(crate) fn new(graph: GraphId, index: u32, generation: u32) -> Self {
        NodeId { graph, index, generation }
    }

    pub fn graph(&self) -> GraphId {
        self.graph
    }

    pub(crate) fn slot(&self) -> (u32, u32) {
        (self.index, self.generation)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}:{}v{})", self.graph.0, self.index, self.generation)
    }
}

/// Handle to an edge owned by a graph engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId {
    graph: GraphId,
    index: u32,
    generation: u32,
}

impl EdgeId {
    pub(crate) fn new(graph: GraphId, index: u32, generation: u32) -> Self {
        EdgeId { graph, index, generation }
    }

    pub fn graph(&self) -> GraphId {
        self.graph
    }

    pub(crate) fn slot(&self) -> (u32, u32) {
        (self.index, self.generation)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EdgeId({}:{}v{})", self.graph.0, self.index, self.generation)
    }
}

/// Node kind (e.g., "Node", "Junction", "Station")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Label(String);

impl Label {
    pub fn new(label: impl Into<String>) -> Self {
        Label(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Label {
    fn default() -> Self {
        Label::new("Node")
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Label(s)
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label(s.to_string())
    }
}

/// Edge kind (e.g., "SIMPLE", "ROAD", "FERRY")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct EdgeType(String);

impl EdgeType {
    pub fn new(edge_type: impl Into<String>) -> Self {
        EdgeType(edge_type.into())
    }

    /// Plain weighted edge with no extra semantics.
    pub fn simple() -> Self {
        EdgeType::new("SIMPLE")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EdgeType {
    fn from(s: String) -> Self {
        EdgeType(s)
    }
}

impl From<&str> for EdgeType {
    fn from(s: &str) -> Self {
        EdgeType(s.to_string())
    }
}

/// Which incident edges of a node to follow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Incoming,
    Outgoing,
    #[default]
    Both,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_ids_are_unique() {
        let a = GraphId::next();
        let b = GraphId::next();
        assert_ne!(a, b);
        assert!(a < b);
    }

    #[test]
    fn test_handles_compare_by_graph_and_slot() {
        let g1 = GraphId::next();
        let g2 = GraphId::next();

        let n1 = NodeId::new(g1, 0, 0);
        let n2 = NodeId::new(g2, 0, 0);
        let n3 = NodeId::new(g1, 0, 1);

        assert_ne!(n1, n2); // same slot, different graph
        assert_ne!(n1, n3); // same slot, reused generation
        assert_eq!(n1, NodeId::new(g1, 0, 0));
        assert_eq!(n1.graph(), g1);
    }

    #[test]
    fn test_label() {
        let label = Label::new("Junction");
        assert_eq!(label.as_str(), "Junction");
        assert_eq!(format!("{}", label), "Junction");
        assert_eq!(Label::default().as_str(), "Node");

        let label2: Label = "Station".into();
        assert_eq!(label2.as_str(), "Station");
    }

    #[test]
    fn test_edge_type() {
        let edge_type = EdgeType::new("ROAD");
        assert_eq!(edge_type.as_str(), "ROAD");
        assert_eq!(format!("{}", edge_type), "ROAD");
        assert_eq!(EdgeType::simple().as_str(), "SIMPLE");
    }
}
