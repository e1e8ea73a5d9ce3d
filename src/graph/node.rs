//! Node implementation for the road graph
//!
//! A node is a named, optionally geo-located vertex. It keeps handles to its
//! incident edges but never owns them; the engine does.

use super::types::{EdgeId, Label, NodeId, PropertyMap};
use serde_json::Value;
use std::cmp::Ordering;

/// A vertex of the graph
///
/// Nodes have:
/// - An engine-issued handle
/// - A string identifier (`name`); importers and snapshots keep it unique
/// - Longitude/latitude (0.0 when not located)
/// - A kind label and optional properties
/// - Ordered lists of outgoing and incoming edge handles
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    name: String,
    lon: f64,
    lat: f64,

    /// Node kind
    pub label: Label,

    /// Extra attributes carried by specialised node kinds
    pub properties: PropertyMap,

    pub(crate) out_edges: Vec<EdgeId>,
    pub(crate) in_edges: Vec<EdgeId>,
}

impl Node {
    pub(crate) fn new(
        id: NodeId,
        name: String,
        lon: f64,
        lat: f64,
        label: Label,
        properties: PropertyMap,
    ) -> Self {
        Node {
            id,
            name,
            lon,
            lat,
            label,
            properties,
            out_edges: Vec::new(),
            in_edges: Vec::new(),
        }
    }

    /// Handle of this node inside its engine
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The node's identifier
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Outgoing edges in creation order
    pub fn out_edges(&self) -> &[EdgeId] {
        &self.out_edges
    }

    /// Incoming edges in creation order
    pub fn in_edges(&self) -> &[EdgeId] {
        &self.in_edges
    }

    /// Number of incident edges; a self loop counts once per direction.
    pub fn degree(&self) -> usize {
        self.out_edges.len() + self.in_edges.len()
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.properties.insert(key.into(), value.into())
    }

    pub fn get_property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn remove_property(&mut self, key: &str) -> Option<Value> {
        self.properties.remove(key)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Node {}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}
