//! In-memory graph engine
//!
//! Owns every node and edge in generational arenas and keeps:
//! - the node collection sorted ascending by identifier
//! - the edge collection in creation order
//! - per-node outgoing/incoming edge handle lists

use super::arena::Arena;
use super::edge::Edge;
use super::node::Node;
use super::types::{Direction, EdgeId, EdgeType, GraphId, Label, NodeId, PropertyMap};
use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during graph operations
///
/// Lookups that find nothing are not errors; they return `None` or `false`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("invalid node: {role} node {node} is not in the graph")]
    InvalidNode { role: &'static str, node: NodeId },

    #[error("Invalid edge: source node {0} is not in the graph")]
    InvalidEdgeSource(NodeId),

    #[error("Invalid edge: target node {0} is not in the graph")]
    InvalidEdgeTarget(NodeId),

    #[error("Invalid edge weight {0}: weights must be finite and non-negative")]
    InvalidWeight(f64),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// In-memory directed graph
///
/// Nodes and edges live in arenas indexed by handle. Handles carry the
/// engine's [`GraphId`], so membership checks are by identity: a node from
/// another engine with the same identifier is not a member of this one.
/// Slot indices are `u32`, so creation panics past `u32::MAX` live-or-freed slots.
#[derive(Debug)]
pub struct GraphEngine {
    id: GraphId,

    // Declared before `nodes` so edges are released first on drop.
    edges: Arena<Edge>,

    nodes: Arena<Node>,

    /// Node handles sorted ascending by identifier
    node_order: Vec<NodeId>,

    /// Edge handles in creation order
    edge_order: IndexSet<EdgeId, FxBuildHasher>,
}

impl GraphEngine {
    /// Create a new empty graph
    pub fn new() -> Self {
        GraphEngine {
            id: GraphId::next(),
            edges: Arena::new(),
            nodes: Arena::new(),
            node_order: Vec::new(),
            edge_order: IndexSet::default(),
        }
    }

    /// Pre-allocate for a known graph size.
    pub fn with_capacity(node_count: usize, edge_count: usize) -> Self {
        GraphEngine {
            id: GraphId::next(),
            edges: Arena::with_capacity(edge_count),
            nodes: Arena::with_capacity(node_count),
            node_order: Vec::with_capacity(node_count),
            edge_order: IndexSet::with_capacity_and_hasher(edge_count, FxBuildHasher),
        }
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    /// Create an unlocated node (lon = lat = 0.0)
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeId {
        self.insert_node(name.into(), 0.0, 0.0, Label::default(), PropertyMap::new())
    }

    /// Create a node at the given coordinates
    pub fn create_node_at(&mut self, name: impl Into<String>, lon: f64, lat: f64) -> NodeId {
        self.insert_node(name.into(), lon, lat, Label::default(), PropertyMap::new())
    }

    /// Create a node of a specific kind carrying extra attributes
    pub fn create_node_with_properties(
        &mut self,
        name: impl Into<String>,
        lon: f64,
        lat: f64,
        label: impl Into<Label>,
        properties: PropertyMap,
    ) -> NodeId {
        self.insert_node(name.into(), lon, lat, label.into(), properties)
    }

    /// Identifiers are not deduplicated here; callers that need uniqueness
    /// check `find_node_by_name` first.
    fn insert_node(
        &mut self,
        name: String,
        lon: f64,
        lat: f64,
        label: Label,
        properties: PropertyMap,
    ) -> NodeId {
        // Insert after any equal identifiers so lookups find the oldest one.
        let position = self
            .node_order
            .partition_point(|&n| self.node_name(n) <= name.as_str());

        let (index, generation) = self.nodes.vacant_key();
        let id = NodeId::new(self.id, index, generation);
        self.nodes
            .insert(Node::new(id, name, lon, lat, label, properties));
        self.node_order.insert(position, id);
        id
    }

    fn node_name(&self, id: NodeId) -> &str {
        self.nodes.get(id.slot()).map_or("", |n| n.name())
    }

    /// Create a directed edge between two nodes of this graph
    pub fn create_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        weight: f64,
        edge_type: impl Into<EdgeType>,
    ) -> GraphResult<EdgeId> {
        self.create_edge_with_properties(source, target, weight, edge_type, PropertyMap::new())
    }

    /// Create a directed edge with properties
    pub fn create_edge_with_properties(
        &mut self,
        source: NodeId,
        target: NodeId,
        weight: f64,
        edge_type: impl Into<EdgeType>,
        properties: PropertyMap,
    ) -> GraphResult<EdgeId> {
        let label = self.validate_edge(source, target, weight)?;

        let (index, generation) = self.edges.vacant_key();
        let id = EdgeId::new(self.id, index, generation);
        self.edges.insert(Edge::new(
            id,
            source,
            target,
            weight,
            edge_type.into(),
            label,
            properties,
        ));
        self.edge_order.insert(id);

        // Update adjacency lists
        if let Some(node) = self.nodes.get_mut(source.slot()) {
            node.out_edges.push(id);
        }
        if let Some(node) = self.nodes.get_mut(target.slot()) {
            node.in_edges.push(id);
        }

        Ok(id)
    }

    /// Checks endpoints and weight, returning the default display label.
    fn validate_edge(&self, source: NodeId, target: NodeId, weight: f64) -> GraphResult<String> {
        let src = self.node(source).ok_or(GraphError::InvalidEdgeSource(source))?;
        let dst = self.node(target).ok_or(GraphError::InvalidEdgeTarget(target))?;
        if !weight.is_finite() || weight < 0.0 {
            return Err(GraphError::InvalidWeight(weight));
        }
        Ok(format!("{} -> {}", src.name(), dst.name()))
    }

    /// Create a pair of independent directed edges `a -> b` and `b -> a`
    /// with the same weight. Nothing is created if validation fails.
    pub fn create_bidirectional_edge(
        &mut self,
        a: NodeId,
        b: NodeId,
        weight: f64,
        edge_type: impl Into<EdgeType>,
    ) -> GraphResult<(EdgeId, EdgeId)> {
        self.validate_edge(a, b, weight)?;
        let edge_type = edge_type.into();
        let ab = self.create_edge(a, b, weight, edge_type.clone())?;
        let ba = self.create_edge(b, a, weight, edge_type)?;
        Ok((ab, ba))
    }

    /// Get a node by handle
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        if id.graph() != self.id {
            return None;
        }
        self.nodes.get(id.slot())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id.graph() != self.id {
            return None;
        }
        self.nodes.get_mut(id.slot())
    }

    /// Get an edge by handle
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        if id.graph() != self.id {
            return None;
        }
        self.edges.get(id.slot())
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        if id.graph() != self.id {
            return None;
        }
        self.edges.get_mut(id.slot())
    }

    /// True only for a live node issued by this graph
    pub fn contains_node(&self, id: NodeId) -> bool {
        id.graph() == self.id && self.nodes.contains(id.slot())
    }

    pub fn contains_edge(&self, id: EdgeId) -> bool {
        id.graph() == self.id && self.edges.contains(id.slot())
    }

    /// Find a node by exact identifier (binary search over the sorted order)
    pub fn find_node_by_name(&self, name: &str) -> Option<NodeId> {
        let position = self.node_order.partition_point(|&n| self.node_name(n) < name);
        self.node_order
            .get(position)
            .copied()
            .filter(|&n| self.node_name(n) == name)
    }

    /// All edges going exactly from `source` to `target`, parallel edges included
    pub fn find_edges(&self, source: NodeId, target: NodeId) -> Vec<EdgeId> {
        self.out_edges(source)
            .iter()
            .copied()
            .filter(|&e| self.edge(e).is_some_and(|edge| edge.target() == target))
            .collect()
    }

    /// Identifier-based `find_edges`; empty when either identifier is unknown
    pub fn find_edges_by_name(&self, source: &str, target: &str) -> Vec<EdgeId> {
        match (self.find_node_by_name(source), self.find_node_by_name(target)) {
            (Some(src), Some(dst)) => self.find_edges(src, dst),
            _ => Vec::new(),
        }
    }

    /// Remove an edge and unlink it from both endpoints
    pub fn remove_edge(&mut self, id: EdgeId) -> bool {
        if id.graph() != self.id {
            return false;
        }
        let Some(edge) = self.edges.remove(id.slot()) else {
            return false;
        };
        self.edge_order.shift_remove(&id);

        if let Some(node) = self.nodes.get_mut(edge.source().slot()) {
            node.out_edges.retain(|&e| e != id);
        }
        if let Some(node) = self.nodes.get_mut(edge.target().slot()) {
            node.in_edges.retain(|&e| e != id);
        }
        true
    }

    /// Remove a node and all its connected edges
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };

        let mut incident: Vec<EdgeId> = node
            .out_edges
            .iter()
            .chain(node.in_edges.iter())
            .copied()
            .collect();
        // A self loop shows up in both lists
        incident.sort_unstable();
        incident.dedup();

        for &edge in &incident {
            self.remove_edge(edge);
        }

        let start = self
            .node_order
            .partition_point(|&n| self.node_name(n) < self.node_name(id));
        let offset = self.node_order[start..].iter().position(|&n| n == id);
        if let Some(offset) = offset {
            self.node_order.remove(start + offset);
        }
        self.nodes.remove(id.slot());

        debug!("Removed node {} with {} incident edges", id, incident.len());
        true
    }

    /// Adjacent nodes, derived from the node's edge lists.
    /// `Both` lists out-neighbours first, then in-neighbours.
    pub fn neighbours(&self, id: NodeId, direction: Direction) -> Vec<NodeId> {
        let outgoing = self
            .out_edges(id)
            .iter()
            .filter_map(|&e| self.edge(e))
            .map(|e| e.target());
        let incoming = self
            .in_edges(id)
            .iter()
            .filter_map(|&e| self.edge(e))
            .map(|e| e.source());

        match direction {
            Direction::Outgoing => outgoing.collect(),
            Direction::Incoming => incoming.collect(),
            Direction::Both => outgoing.chain(incoming).collect(),
        }
    }

    /// Outgoing edge handles of a node (empty for unknown nodes)
    pub fn out_edges(&self, id: NodeId) -> &[EdgeId] {
        self.node(id).map(|n| n.out_edges()).unwrap_or(&[])
    }

    /// Incoming edge handles of a node (empty for unknown nodes)
    pub fn in_edges(&self, id: NodeId) -> &[EdgeId] {
        self.node(id).map(|n| n.in_edges()).unwrap_or(&[])
    }

    /// Node handles in ascending identifier order
    pub fn node_ids(&self) -> &[NodeId] {
        &self.node_order
    }

    /// Nodes in ascending identifier order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.node_order
            .iter()
            .filter_map(move |&id| self.nodes.get(id.slot()))
    }

    /// Edges in creation order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edge_order
            .iter()
            .filter_map(move |&id| self.edges.get(id.slot()))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Summed weight of a sequence of edges; unknown handles contribute nothing.
    pub fn path_weight(&self, path: &[EdgeId]) -> f64 {
        path.iter()
            .filter_map(|&e| self.edge(e))
            .map(|e| e.weight())
            .sum()
    }

    /// Clear all data from the graph, edges first.
    ///
    /// Handles issued before the call stay invalid afterwards, even though
    /// arena slots start over.
    pub fn clear(&mut self) {
        self.edge_order.clear();
        self.edges.clear();
        self.node_order.clear();
        self.nodes.clear();
        self.id = GraphId::next();
    }
}

impl Default for GraphEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GraphEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for edge in self.edges() {
            writeln!(f, "{}", edge)?;
        }
        Ok(())
    }
}
