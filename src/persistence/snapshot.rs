//! JSON snapshot codec for [`GraphEngine`]

use crate::graph::{EdgeType, GraphEngine, GraphError};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Snapshot errors
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed JSON or wrong document shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate node id in snapshot: {0}")]
    DuplicateNode(String),

    #[error("Node {id} has non-finite coordinates ({lon}, {lat})")]
    InvalidCoordinate { id: String, lon: f64, lat: f64 },

    #[error("Edge {index} references unknown node: {id}")]
    UnknownNode { index: usize, id: String },

    #[error("Edge {index} has invalid weight: {weight}")]
    InvalidWeight { index: usize, weight: f64 },

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Serialized node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotNode {
    pub id: String,
    pub lon: f64,
    pub lat: f64,
}

/// Serialized directed edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEdge {
    pub src: String,
    pub dst: String,
    pub weight: f64,
}

/// Flat document holding every node and edge of a graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub nodes: Vec<SnapshotNode>,
    #[serde(default)]
    pub edges: Vec<SnapshotEdge>,
}

impl Snapshot {
    /// Read a graph: nodes in sorted order, edges in creation order.
    pub fn capture(graph: &GraphEngine) -> Self {
        let nodes = graph
            .nodes()
            .map(|node| SnapshotNode {
                id: node.name().to_string(),
                lon: node.lon(),
                lat: node.lat(),
            })
            .collect();

        // Every live edge has live endpoints, so the lookups cannot miss
        let edges = graph
            .edges()
            .filter_map(|edge| {
                let src = graph.node(edge.source())?;
                let dst = graph.node(edge.target())?;
                Some(SnapshotEdge {
                    src: src.name().to_string(),
                    dst: dst.name().to_string(),
                    weight: edge.weight(),
                })
            })
            .collect();

        Snapshot { nodes, edges }
    }

    /// Check the document can be rebuilt without touching any graph.
    pub fn validate(&self) -> SnapshotResult<()> {
        let mut ids: FxHashSet<&str> = FxHashSet::default();
        for node in &self.nodes {
            if !ids.insert(node.id.as_str()) {
                return Err(SnapshotError::DuplicateNode(node.id.clone()));
            }
            // JSON has no encoding for NaN or infinities
            if !node.lon.is_finite() || !node.lat.is_finite() {
                return Err(SnapshotError::InvalidCoordinate {
                    id: node.id.clone(),
                    lon: node.lon,
                    lat: node.lat,
                });
            }
        }

        for (index, edge) in self.edges.iter().enumerate() {
            for id in [&edge.src, &edge.dst] {
                if !ids.contains(id.as_str()) {
                    return Err(SnapshotError::UnknownNode {
                        index,
                        id: id.clone(),
                    });
                }
            }
            if !edge.weight.is_finite() || edge.weight < 0.0 {
                return Err(SnapshotError::InvalidWeight {
                    index,
                    weight: edge.weight,
                });
            }
        }
        Ok(())
    }

    /// Replace the contents of `graph` with this snapshot.
    ///
    /// On error the graph is left as it was.
    pub fn restore(&self, graph: &mut GraphEngine) -> SnapshotResult<()> {
        self.validate()?;
        graph.clear();

        for node in &self.nodes {
            graph.create_node_at(node.id.clone(), node.lon, node.lat);
        }

        for (index, edge) in self.edges.iter().enumerate() {
            let (src, dst) = match (
                graph.find_node_by_name(&edge.src),
                graph.find_node_by_name(&edge.dst),
            ) {
                (Some(src), Some(dst)) => (src, dst),
                (None, _) => {
                    return Err(SnapshotError::UnknownNode {
                        index,
                        id: edge.src.clone(),
                    })
                }
                (_, None) => {
                    return Err(SnapshotError::UnknownNode {
                        index,
                        id: edge.dst.clone(),
                    })
                }
            };
            graph.create_edge(src, dst, edge.weight, EdgeType::simple())?;
        }

        debug!(
            "Restored snapshot: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(())
    }

    /// Pretty-printed JSON with two-space indentation.
    ///
    /// Fails on documents that [`restore`](Self::restore) would reject.
    pub fn to_json(&self) -> SnapshotResult<String> {
        self.validate()?;
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> SnapshotResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Write `graph` to `path`.
///
/// The document goes to a sibling temporary file first and is renamed over
/// `path`, so a crash mid-write never truncates an existing snapshot.
/// Graphs that could not be loaded back (duplicate identifiers, non-finite
/// coordinates) are rejected before anything is written.
pub fn save_snapshot(graph: &GraphEngine, path: impl AsRef<Path>) -> SnapshotResult<()> {
    let path = path.as_ref();
    let snapshot = Snapshot::capture(graph);
    snapshot.validate()?;

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let written = write_pretty(&tmp_path, &snapshot)
        .and_then(|()| fs::rename(&tmp_path, path).map_err(SnapshotError::from));
    if let Err(err) = written {
        if let Err(cleanup) = fs::remove_file(&tmp_path) {
            debug!("Could not remove {:?}: {}", tmp_path, cleanup);
        }
        return Err(err);
    }

    info!(
        "Saved snapshot to {:?}: {} nodes, {} edges",
        path,
        snapshot.nodes.len(),
        snapshot.edges.len()
    );
    Ok(())
}

fn write_pretty(path: &Path, snapshot: &Snapshot) -> SnapshotResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, snapshot)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Replace the contents of `graph` with the snapshot stored at `path`.
pub fn load_snapshot(graph: &mut GraphEngine, path: impl AsRef<Path>) -> SnapshotResult<()> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let snapshot: Snapshot = serde_json::from_reader(BufReader::new(file))?;
    snapshot.restore(graph)?;

    info!(
        "Loaded snapshot from {:?}: {} nodes, {} edges",
        path,
        snapshot.nodes.len(),
        snapshot.edges.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_graph() -> GraphEngine {
        let mut graph = GraphEngine::new();
        let a = graph.create_node_at("A", 13.405, 52.52);
        let b = graph.create_node_at("B", 11.582, 48.1351);
        let c = graph.create_node_at("C", 9.9937, 53.5511);
        graph.create_bidirectional_edge(a, b, 504.0, "ROAD").unwrap();
        graph.create_edge(c, a, 255.5, "ROAD").unwrap();
        graph
    }

    #[test]
    fn test_capture_order() {
        let mut graph = GraphEngine::new();
        let z = graph.create_node_at("Z", 1.0, 1.0);
        let a = graph.create_node_at("A", 2.0, 2.0);
        graph.create_edge(z, a, 1.0, "ROAD").unwrap();
        graph.create_edge(a, z, 2.0, "ROAD").unwrap();

        let snapshot = Snapshot::capture(&graph);
        let ids: Vec<_> = snapshot.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "Z"]);
        assert_eq!(snapshot.edges[0].src, "Z");
        assert_eq!(snapshot.edges[1].src, "A");
    }

    #[test]
    fn test_json_shape() {
        let graph = sample_graph();
        let json = Snapshot::capture(&graph).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["nodes"][0]["id"], "A");
        assert_eq!(value["nodes"][0]["lon"], 13.405);
        assert_eq!(value["edges"][0]["src"], "A");
        assert_eq!(value["edges"][0]["dst"], "B");
        assert_eq!(value["edges"][0]["weight"], 504.0);
        assert!(json.contains("\n  \"nodes\""));
    }

    #[test]
    fn test_restore_round_trip() {
        let graph = sample_graph();
        let snapshot = Snapshot::capture(&graph);

        let mut restored = GraphEngine::new();
        snapshot.restore(&mut restored).unwrap();

        assert_eq!(restored.node_count(), 3);
        assert_eq!(restored.edge_count(), 3);
        assert_eq!(Snapshot::capture(&restored), snapshot);
        assert!(restored
            .edges()
            .all(|e| e.edge_type == EdgeType::simple()));
    }

    #[test]
    fn test_restore_replaces_existing_content() {
        let mut graph = GraphEngine::new();
        graph.create_node("stale");

        Snapshot::capture(&sample_graph()).restore(&mut graph).unwrap();
        assert!(graph.find_node_by_name("stale").is_none());
        assert_eq!(graph.node_count(), 3);
    }

    #[test]
    fn test_missing_collections_default_to_empty() {
        let snapshot = Snapshot::from_json(r#"{ "nodes": [ { "id": "A", "lon": 0, "lat": 0 } ] }"#)
            .unwrap();
        assert_eq!(snapshot.nodes.len(), 1);
        assert!(snapshot.edges.is_empty());

        let empty = Snapshot::from_json("{}").unwrap();
        assert_eq!(empty, Snapshot::default());
    }

    #[test]
    fn test_invalid_snapshot_leaves_graph_untouched() {
        let mut graph = sample_graph();

        let unknown = Snapshot::from_json(
            r#"{ "nodes": [ { "id": "A", "lon": 0, "lat": 0 } ],
                 "edges": [ { "src": "A", "dst": "Q", "weight": 1 } ] }"#,
        )
        .unwrap();
        assert!(matches!(
            unknown.restore(&mut graph),
            Err(SnapshotError::UnknownNode { index: 0, ref id }) if id == "Q"
        ));

        let duplicate = Snapshot::from_json(
            r#"{ "nodes": [ { "id": "A", "lon": 0, "lat": 0 }, { "id": "A", "lon": 1, "lat": 1 } ] }"#,
        )
        .unwrap();
        assert!(matches!(
            duplicate.restore(&mut graph),
            Err(SnapshotError::DuplicateNode(_))
        ));

        let negative = Snapshot::from_json(
            r#"{ "nodes": [ { "id": "A", "lon": 0, "lat": 0 } ],
                 "edges": [ { "src": "A", "dst": "A", "weight": -1 } ] }"#,
        )
        .unwrap();
        assert!(matches!(
            negative.restore(&mut graph),
            Err(SnapshotError::InvalidWeight { index: 0, .. })
        ));

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Snapshot::from_json("{ \"nodes\": 5 }"),
            Err(SnapshotError::Json(_))
        ));
    }

    #[test]
    fn test_save_and_load_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("graph.json");
        let graph = sample_graph();

        save_snapshot(&graph, &path).unwrap();
        assert!(path.exists());
        assert!(!temp_dir.path().join("graph.json.tmp").exists());

        let mut loaded = GraphEngine::new();
        load_snapshot(&mut loaded, &path).unwrap();
        assert_eq!(Snapshot::capture(&loaded), Snapshot::capture(&graph));
    }

    #[test]
    fn test_save_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("graph.json");

        save_snapshot(&sample_graph(), &path).unwrap();
        save_snapshot(&GraphEngine::new(), &path).unwrap();

        let mut loaded = sample_graph();
        load_snapshot(&mut loaded, &path).unwrap();
        assert_eq!(loaded.node_count(), 0);
        assert_eq!(loaded.edge_count(), 0);
    }

    #[test]
    fn test_save_rejects_duplicate_ids() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("graph.json");
        let mut graph = GraphEngine::new();
        let first = graph.create_node("X");
        let second = graph.create_node("X");
        graph.create_edge(first, second, 1.0, "ROAD").unwrap();

        let err = save_snapshot(&graph, &path).unwrap_err();
        assert!(matches!(err, SnapshotError::DuplicateNode(ref id) if id == "X"));
        assert!(!path.exists());
        assert!(!temp_dir.path().join("graph.json.tmp").exists());

        assert!(matches!(
            Snapshot::capture(&graph).to_json(),
            Err(SnapshotError::DuplicateNode(_))
        ));
    }

    #[test]
    fn test_save_rejects_non_finite_coordinates() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("graph.json");
        let mut graph = GraphEngine::new();
        graph.create_node_at("N", f64::NAN, 1.0);

        let err = save_snapshot(&graph, &path).unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidCoordinate { ref id, .. } if id == "N"));
        assert!(!path.exists());

        let mut infinite = GraphEngine::new();
        infinite.create_node_at("M", 0.0, f64::INFINITY);
        assert!(matches!(
            Snapshot::capture(&infinite).to_json(),
            Err(SnapshotError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn test_failed_save_removes_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        // Renaming a file over a directory fails
        let path = temp_dir.path().join("graph.json");
        fs::create_dir(&path).unwrap();

        let err = save_snapshot(&sample_graph(), &path).unwrap_err();
        assert!(matches!(err, SnapshotError::Io(_)));
        assert!(path.is_dir());
        assert!(!temp_dir.path().join("graph.json.tmp").exists());
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut graph = GraphEngine::new();
        let err = load_snapshot(&mut graph, temp_dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, SnapshotError::Io(_)));
    }
}
