//! Weighted shortest-path search
//!
//! Two Dijkstra variants over non-negative edge weights that report the same
//! distances and differ only in how the next node is selected:
//! - `Naive`: linear scan of the unvisited set, O(V² + E)
//! - `Heap`: binary min-heap with lazy deletion, O((V + E) log V)
//!
//! Both fill a caller-supplied [`DistanceTable`] and return a [`SearchStatus`].

use crate::graph::{EdgeId, GraphEngine, GraphError, GraphResult, NodeId};
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Node selection strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DijkstraVariant {
    /// Linear scan; ties go to the first node in identifier order
    Naive,
    /// Priority queue; ties go to the entry pushed first
    #[default]
    Heap,
}

/// Best known distance to a node and how it was reached
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceEntry {
    pub distance: f64,
    pub prev_node: Option<NodeId>,
    pub prev_edge: Option<EdgeId>,
}

impl DistanceEntry {
    pub const UNREACHED: DistanceEntry = DistanceEntry {
        distance: f64::INFINITY,
        prev_node: None,
        prev_edge: None,
    };

    pub fn is_reached(&self) -> bool {
        self.distance.is_finite()
    }
}

/// Per-node search results, reusable across searches
#[derive(Debug, Clone, Default)]
pub struct DistanceTable {
    entries: FxHashMap<NodeId, DistanceEntry>,
}

impl DistanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every node of the graph unreached, nothing else.
    fn reset(&mut self, graph: &GraphEngine) {
        self.entries.clear();
        self.entries.reserve(graph.node_count());
        for &node in graph.node_ids() {
            self.entries.insert(node, DistanceEntry::UNREACHED);
        }
    }

    fn distance_of(&self, node: NodeId) -> f64 {
        self.entries
            .get(&node)
            .map_or(f64::INFINITY, |entry| entry.distance)
    }

    pub fn get(&self, node: NodeId) -> Option<&DistanceEntry> {
        self.entries.get(&node)
    }

    /// Distance to `node`, if it has been reached
    pub fn distance(&self, node: NodeId) -> Option<f64> {
        self.get(node)
            .filter(|entry| entry.is_reached())
            .map(|entry| entry.distance)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &DistanceEntry)> + '_ {
        self.entries.iter().map(|(&node, entry)| (node, entry))
    }

    /// Entries with a finite distance
    pub fn reached(&self) -> impl Iterator<Item = (NodeId, &DistanceEntry)> + '_ {
        self.iter().filter(|(_, entry)| entry.is_reached())
    }

    /// Walk predecessor edges back from `destination` until a node with no
    /// predecessor (the source), returning the edges in travel order.
    pub fn path_to(&self, destination: NodeId) -> Vec<EdgeId> {
        let mut path = Vec::new();
        let mut current = destination;
        while let Some(DistanceEntry {
            prev_node: Some(prev),
            prev_edge: Some(edge),
            ..
        }) = self.get(current)
        {
            path.push(*edge);
            current = *prev;
        }
        path.reverse();
        path
    }
}

/// Outcome of a distance search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// The destination was selected as the current minimum; search stopped early
    Found(NodeId),
    /// No destination given, or it could not be reached
    Exhausted,
}

impl SearchStatus {
    pub fn found(&self) -> Option<NodeId> {
        match self {
            SearchStatus::Found(node) => Some(*node),
            SearchStatus::Exhausted => None,
        }
    }
}

/// State for the Dijkstra priority queue
#[derive(Copy, Clone, PartialEq)]
struct State {
    cost: f64,
    seq: u64,
    node: NodeId,
}

// BinaryHeap is a max-heap, so order is reversed: lowest cost first,
// then lowest sequence number (earliest push).
impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Dijkstra searches over a single graph
pub struct ShortestPathSolver<'g> {
    graph: &'g GraphEngine,
}

impl<'g> ShortestPathSolver<'g> {
    pub fn new(graph: &'g GraphEngine) -> Self {
        ShortestPathSolver { graph }
    }

    /// Source and destination must be live nodes issued by this graph.
    fn validate(&self, source: NodeId, destination: Option<NodeId>) -> GraphResult<()> {
        if !self.graph.contains_node(source) {
            return Err(GraphError::InvalidNode {
                role: "source",
                node: source,
            });
        }
        if let Some(destination) = destination {
            if !self.graph.contains_node(destination) {
                return Err(GraphError::InvalidNode {
                    role: "destination",
                    node: destination,
                });
            }
        }
        Ok(())
    }

    /// Run the chosen variant
    pub fn distances(
        &self,
        variant: DijkstraVariant,
        source: NodeId,
        destination: Option<NodeId>,
        table: &mut DistanceTable,
    ) -> GraphResult<SearchStatus> {
        match variant {
            DijkstraVariant::Naive => self.distances_naive(source, destination, table),
            DijkstraVariant::Heap => self.distances_heap(source, destination, table),
        }
    }

    /// Dijkstra with a linear scan for the closest unvisited node
    pub fn distances_naive(
        &self,
        source: NodeId,
        destination: Option<NodeId>,
        table: &mut DistanceTable,
    ) -> GraphResult<SearchStatus> {
        self.validate(source, destination)?;
        table.reset(self.graph);
        table.entries.insert(
            source,
            DistanceEntry {
                distance: 0.0,
                ..DistanceEntry::UNREACHED
            },
        );

        // Kept in identifier order so ties resolve to the first node scanned
        let mut unvisited: Vec<NodeId> = self.graph.node_ids().to_vec();

        while !unvisited.is_empty() {
            let mut best = 0;
            let mut best_distance = table.distance_of(unvisited[0]);
            for (i, &node) in unvisited.iter().enumerate().skip(1) {
                let distance = table.distance_of(node);
                if distance < best_distance {
                    best = i;
                    best_distance = distance;
                }
            }

            // Everything left is unreachable
            if best_distance.is_infinite() {
                break;
            }

            let current = unvisited.remove(best);
            if Some(current) == destination {
                return Ok(SearchStatus::Found(current));
            }
            self.relax(current, best_distance, table, |_, _| {});
        }

        Ok(SearchStatus::Exhausted)
    }

    /// Dijkstra with a binary heap; stale heap entries are skipped
    pub fn distances_heap(
        &self,
        source: NodeId,
        destination: Option<NodeId>,
        table: &mut DistanceTable,
    ) -> GraphResult<SearchStatus> {
        self.validate(source, destination)?;
        table.reset(self.graph);
        table.entries.insert(
            source,
            DistanceEntry {
                distance: 0.0,
                ..DistanceEntry::UNREACHED
            },
        );

        let mut heap = BinaryHeap::new();
        let mut visited: FxHashSet<NodeId> = FxHashSet::default();
        let mut seq = 0u64;
        heap.push(State {
            cost: 0.0,
            seq,
            node: source,
        });

        while let Some(State { cost, node, .. }) = heap.pop() {
            if !visited.insert(node) {
                continue;
            }
            if Some(node) == destination {
                return Ok(SearchStatus::Found(node));
            }
            self.relax(node, cost, table, |target, distance| {
                seq += 1;
                heap.push(State {
                    cost: distance,
                    seq,
                    node: target,
                });
            });
        }

        Ok(SearchStatus::Exhausted)
    }

    /// Relax every outgoing edge of `node`, reporting each improved target.
    fn relax(
        &self,
        node: NodeId,
        node_distance: f64,
        table: &mut DistanceTable,
        mut on_improved: impl FnMut(NodeId, f64),
    ) {
        for &edge_id in self.graph.out_edges(node) {
            let Some(edge) = self.graph.edge(edge_id) else {
                continue;
            };
            let candidate = node_distance + edge.weight();
            let entry = table
                .entries
                .entry(edge.target())
                .or_insert(DistanceEntry::UNREACHED);
            if candidate < entry.distance {
                *entry = DistanceEntry {
                    distance: candidate,
                    prev_node: Some(node),
                    prev_edge: Some(edge_id),
                };
                on_improved(edge.target(), candidate);
            }
        }
    }

    /// Shortest path as an ordered edge sequence.
    ///
    /// Unreachable destinations give an empty path, as does `source == destination`.
    pub fn find_shortest_path(
        &self,
        source: NodeId,
        destination: NodeId,
        variant: DijkstraVariant,
    ) -> GraphResult<Vec<EdgeId>> {
        let mut table = DistanceTable::new();
        let status = self.distances(variant, source, Some(destination), &mut table)?;
        Ok(match status {
            SearchStatus::Found(found) => table.path_to(found),
            SearchStatus::Exhausted => Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARIANTS: [DijkstraVariant; 2] = [DijkstraVariant::Naive, DijkstraVariant::Heap];

    struct Cities {
        graph: GraphEngine,
        berlin: NodeId,
        hamburg: NodeId,
        munich: NodeId,
        frankfurt: NodeId,
    }

    fn cities() -> Cities {
        let mut graph = GraphEngine::new();
        let munich = graph.create_node("Munich");
        let hamburg = graph.create_node("Hamburg");
        let berlin = graph.create_node("Berlin");
        let frankfurt = graph.create_node("Frankfurt");

        graph.create_edge(berlin, hamburg, 450.0, "SIMPLE").unwrap();
        graph.create_edge(hamburg, berlin, 450.0, "SIMPLE").unwrap();
        graph
            .create_bidirectional_edge(berlin, munich, 650.0, "SIMPLE")
            .unwrap();
        graph
            .create_bidirectional_edge(berlin, frankfurt, 590.0, "SIMPLE")
            .unwrap();

        Cities {
            graph,
            berlin,
            hamburg,
            munich,
            frankfurt,
        }
    }

    #[test]
    fn test_hamburg_to_munich() {
        let c = cities();
        let solver = ShortestPathSolver::new(&c.graph);

        for variant in VARIANTS {
            let path = solver
                .find_shortest_path(c.hamburg, c.munich, variant)
                .unwrap();
            assert_eq!(path.len(), 2);

            let first = c.graph.edge(path[0]).unwrap();
            let second = c.graph.edge(path[1]).unwrap();
            assert_eq!((first.source(), first.target()), (c.hamburg, c.berlin));
            assert_eq!((second.source(), second.target()), (c.berlin, c.munich));
            assert_eq!(c.graph.path_weight(&path), 1100.0);
        }
    }

    #[test]
    fn test_full_table_without_destination() {
        let c = cities();
        let solver = ShortestPathSolver::new(&c.graph);

        for variant in VARIANTS {
            let mut table = DistanceTable::new();
            let status = solver.distances(variant, c.hamburg, None, &mut table).unwrap();

            assert_eq!(status, SearchStatus::Exhausted);
            assert_eq!(table.len(), 4);
            assert_eq!(table.distance(c.hamburg), Some(0.0));
            assert_eq!(table.distance(c.berlin), Some(450.0));
            assert_eq!(table.distance(c.munich), Some(1100.0));
            assert_eq!(table.distance(c.frankfurt), Some(1040.0));

            let source = table.get(c.hamburg).unwrap();
            assert!(source.prev_node.is_none());
            assert!(source.prev_edge.is_none());
            assert_eq!(table.get(c.munich).unwrap().prev_node, Some(c.berlin));
        }
    }

    #[test]
    fn test_early_exit_reports_found() {
        let c = cities();
        let solver = ShortestPathSolver::new(&c.graph);
        let mut table = DistanceTable::new();

        let status = solver
            .distances_heap(c.hamburg, Some(c.berlin), &mut table)
            .unwrap();
        assert_eq!(status, SearchStatus::Found(c.berlin));
        assert_eq!(status.found(), Some(c.berlin));
        assert_eq!(table.distance(c.berlin), Some(450.0));
    }

    #[test]
    fn test_unreachable_destination_gives_empty_path() {
        let mut graph = GraphEngine::new();
        let a = graph.create_node("A");
        let b = graph.create_node("B");
        let island = graph.create_node("Island");
        graph.create_edge(a, b, 1.0, "SIMPLE").unwrap();
        graph.create_edge(island, a, 1.0, "SIMPLE").unwrap();

        let solver = ShortestPathSolver::new(&graph);
        for variant in VARIANTS {
            assert!(solver.find_shortest_path(a, island, variant).unwrap().is_empty());

            let mut table = DistanceTable::new();
            let status = solver.distances(variant, a, Some(island), &mut table).unwrap();
            assert_eq!(status, SearchStatus::Exhausted);
            assert_eq!(table.distance(island), None);
            assert!(!table.get(island).unwrap().is_reached());
        }
    }

    #[test]
    fn test_source_equals_destination() {
        let c = cities();
        let solver = ShortestPathSolver::new(&c.graph);
        for variant in VARIANTS {
            assert!(solver
                .find_shortest_path(c.berlin, c.berlin, variant)
                .unwrap()
                .is_empty());
        }
    }

    #[test]
    fn test_foreign_node_is_invalid() {
        let c = cities();
        let mut other = GraphEngine::new();
        let foreign_munich = other.create_node("Munich");
        let solver = ShortestPathSolver::new(&c.graph);

        for variant in VARIANTS {
            let err = solver
                .find_shortest_path(c.hamburg, foreign_munich, variant)
                .unwrap_err();
            assert_eq!(
                err,
                GraphError::InvalidNode {
                    role: "destination",
                    node: foreign_munich
                }
            );

            let err = solver
                .find_shortest_path(foreign_munich, c.hamburg, variant)
                .unwrap_err();
            assert!(matches!(err, GraphError::InvalidNode { role: "source", .. }));
        }
    }

    #[test]
    fn test_removed_node_is_invalid() {
        let mut c = cities();
        c.graph.remove_node(c.frankfurt);
        let solver = ShortestPathSolver::new(&c.graph);
        let mut table = DistanceTable::new();

        let result = solver.distances_naive(c.frankfurt, None, &mut table);
        assert!(matches!(result, Err(GraphError::InvalidNode { .. })));
    }

    #[test]
    fn test_prefers_cheaper_multi_hop_route() {
        // a->b (10), b->c (5), a->c (50)
        let mut graph = GraphEngine::new();
        let a = graph.create_node("a");
        let b = graph.create_node("b");
        let c = graph.create_node("c");
        let ab = graph.create_edge(a, b, 10.0, "SIMPLE").unwrap();
        let bc = graph.create_edge(b, c, 5.0, "SIMPLE").unwrap();
        graph.create_edge(a, c, 50.0, "SIMPLE").unwrap();

        let solver = ShortestPathSolver::new(&graph);
        for variant in VARIANTS {
            assert_eq!(solver.find_shortest_path(a, c, variant).unwrap(), vec![ab, bc]);
        }
    }

    #[test]
    fn test_parallel_edges_use_lightest() {
        let mut graph = GraphEngine::new();
        let a = graph.create_node("a");
        let b = graph.create_node("b");
        graph.create_edge(a, b, 7.0, "ROAD").unwrap();
        let cheap = graph.create_edge(a, b, 3.0, "FERRY").unwrap();

        let solver = ShortestPathSolver::new(&graph);
        for variant in VARIANTS {
            assert_eq!(solver.find_shortest_path(a, b, variant).unwrap(), vec![cheap]);
        }
    }

    #[test]
    fn test_table_is_reset_between_runs() {
        let c = cities();
        let solver = ShortestPathSolver::new(&c.graph);
        let mut table = DistanceTable::new();

        solver.distances_naive(c.hamburg, None, &mut table).unwrap();
        solver.distances_naive(c.munich, None, &mut table).unwrap();

        assert_eq!(table.distance(c.munich), Some(0.0));
        assert_eq!(table.distance(c.hamburg), Some(1100.0));
        assert_eq!(table.reached().count(), 4);
    }

    #[test]
    fn test_heap_state_ordering() {
        let mut graph = GraphEngine::new();
        let a = graph.create_node("a");
        let b = graph.create_node("b");

        let mut heap = BinaryHeap::new();
        heap.push(State { cost: 2.0, seq: 0, node: a });
        heap.push(State { cost: 1.0, seq: 2, node: b });
        heap.push(State { cost: 1.0, seq: 1, node: a });

        assert_eq!(heap.pop().map(|s| (s.cost, s.seq)), Some((1.0, 1)));
        assert_eq!(heap.pop().map(|s| (s.cost, s.seq)), Some((1.0, 2)));
        assert_eq!(heap.pop().map(|s| (s.cost, s.seq)), Some((2.0, 0)));
    }
}
