//! Authored waypoint layout
//!
//! Which grid nodes are waypoints and how they connect is level data, not
//! logic. Waypoints are addressed by grid coordinates; edges by index into
//! the waypoint list.

use serde::{Deserialize, Serialize};

use super::node::EdgeKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaypointEdge {
    pub from: usize,
    pub to: usize,
    pub kind: EdgeKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaypointLayout {
    /// Grid coordinates (column, row from the bottom)
    pub nodes: Vec<(usize, usize)>,
    pub edges: Vec<WaypointEdge>,
}

impl WaypointLayout {
    /// Append a waypoint and return its index
    pub fn waypoint(&mut self, x: usize, y: usize) -> usize {
        self.nodes.push((x, y));
        self.nodes.len() - 1
    }

    /// Add a one-way edge
    pub fn edge(&mut self, from: usize, to: usize, kind: EdgeKind) -> &mut Self {
        self.edges.push(WaypointEdge { from, to, kind });
        self
    }

    /// Add a walkable edge in both directions
    pub fn walk(&mut self, a: usize, b: usize) -> &mut Self {
        self.edge(a, b, EdgeKind::Move).edge(b, a, EdgeKind::Move)
    }

    /// Jump up from `low` to `high`; drop back down by walking off
    pub fn climb(&mut self, low: usize, high: usize) -> &mut Self {
        self.edge(low, high, EdgeKind::Jump).edge(high, low, EdgeKind::Move)
    }
}
