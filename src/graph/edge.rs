//! Edge implementation for the road graph
//!
//! Edges are directed and weighted. A two-way road is two independent edges,
//! one per direction.

use super::types::{EdgeId, EdgeType, NodeId, PropertyMap};
use serde_json::Value;
use std::fmt;

/// A directed, weighted edge
///
/// Endpoints, handle and weight are fixed at creation; the engine's
/// adjacency lists depend on them.
///
/// ```compile_fail
/// use roadgraph::GraphEngine;
///
/// let mut graph = GraphEngine::new();
/// let a = graph.create_node("A");
/// let b = graph.create_node("B");
/// let c = graph.create_node("C");
/// let e = graph.create_edge(a, b, 1.0, "ROAD").unwrap();
/// graph.edge_mut(e).unwrap().target = c;
/// ```
#[derive(Debug, Clone)]
pub struct Edge {
    id: EdgeId,
    source: NodeId,
    target: NodeId,
    weight: f64,

    /// Edge kind
    pub edge_type: EdgeType,

    /// Human-readable label
    pub label: String,

    pub properties: PropertyMap,
}

impl Edge {
    pub(crate) fn new(
        id: EdgeId,
        source: NodeId,
        target: NodeId,
        weight: f64,
        edge_type: EdgeType,
        label: String,
        properties: PropertyMap,
    ) -> Self {
        Edge {
            id,
            source,
            target,
            weight,
            edge_type,
            label,
            properties,
        }
    }

    /// Handle of this edge inside its engine
    pub fn id(&self) -> EdgeId {
        self.id
    }

    /// Source node (edge goes FROM this node)
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// Target node (edge goes TO this node)
    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Check if this edge touches a node as source or target
    pub fn is_connected_to(&self, node: NodeId) -> bool {
        self.source == node || self.target == node
    }

    pub fn starts_from(&self, node: NodeId) -> bool {
        self.source == node
    }

    pub fn ends_at(&self, node: NodeId) -> bool {
        self.target == node
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn get_property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.weight)
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Edge {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::GraphId;

    fn edge(index: u32, source: NodeId, target: NodeId) -> Edge {
        Edge::new(
            EdgeId::new(source.graph(), index, 0),
            source,
            target,
            450.0,
            EdgeType::simple(),
            "Berlin -> Hamburg".to_string(),
            PropertyMap::new(),
        )
    }

    #[test]
    fn test_edge_direction() {
        let g = GraphId::next();
        let berlin = NodeId::new(g, 0, 0);
        let hamburg = NodeId::new(g, 1, 0);
        let munich = NodeId::new(g, 2, 0);
        let e = edge(0, berlin, hamburg);

        assert!(e.starts_from(berlin));
        assert!(e.ends_at(hamburg));
        assert!(!e.starts_from(hamburg));
        assert!(e.is_connected_to(berlin));
        assert!(e.is_connected_to(hamburg));
        assert!(!e.is_connected_to(munich));
        assert_eq!(e.weight(), 450.0);
    }

    #[test]
    fn test_display_uses_label_and_weight() {
        let g = GraphId::next();
        let e = edge(0, NodeId::new(g, 0, 0), NodeId::new(g, 1, 0));
        assert_eq!(e.to_string(), "Berlin -> Hamburg (450)");
    }

    #[test]
    fn test_parallel_edges_are_distinct() {
        let g = GraphId::next();
        let a = NodeId::new(g, 0, 0);
        let b = NodeId::new(g, 1, 0);
        let e1 = edge(0, a, b);
        let e2 = edge(1, a, b);
        assert_ne!(e1, e2);
    }
}
