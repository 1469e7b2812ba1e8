//! Construction and configuration errors
//!
//! Gameplay itself never fails: unreachable paths, off-map queries and
//! degenerate contacts all degrade to a skip or a deletion. Only building a
//! world from authored data and reading files can go wrong.

use thiserror::Error;

/// Errors raised while loading configuration or building a world
#[derive(Error, Debug)]
pub enum Error {
    /// Grid dimensions that cannot hold at least 2×2 nodes
    #[error("invalid grid: {width}x{height} with node radius {node_radius}")]
    InvalidGrid {
        width: f32,
        height: f32,
        node_radius: f32,
    },

    /// Authored waypoint lies outside the node grid
    #[error("waypoint {index} at ({x}, {y}) is outside the {columns}x{rows} grid")]
    WaypointOutOfGrid {
        index: usize,
        x: usize,
        y: usize,
        columns: usize,
        rows: usize,
    },

    /// Authored edge references a waypoint that does not exist
    #[error("edge {from} -> {to} references a missing waypoint (have {count})")]
    EdgeOutOfRange { from: usize, to: usize, count: usize },

    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}
