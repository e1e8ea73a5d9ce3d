//! Persistence layer
//!
//! A graph is persisted as one flat JSON snapshot:
//! - `nodes`: `{id, lon, lat}` in sorted identifier order
//! - `edges`: `{src, dst, weight}` in creation order, one entry per directed edge

pub mod snapshot;

pub use snapshot::{
    load_snapshot, save_snapshot, Snapshot, SnapshotEdge, SnapshotError, SnapshotNode,
    SnapshotResult,
};
