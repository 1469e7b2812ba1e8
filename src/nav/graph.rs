//! Sparse waypoint graph laid over the node grid
//!
//! Only connection nodes (waypoints) and whatever a splice attaches to them
//! are ever searched. The rest of the grid exists to map arbitrary world
//! positions onto the graph.

use glam::Vec2;

use super::grid::NodeGrid;
use super::layout::WaypointLayout;
use super::node::{EdgeKind, Node, NodeId};
use super::splice::Splice;
use crate::config::GridConfig;
use crate::error::Error;

/// Distance a nearest-node search starts from
const NEAREST_SEARCH_LIMIT: f32 = 100_000_000.0;

#[derive(Debug, Clone)]
pub struct NavGraph {
    pub(crate) grid: NodeGrid,
    pub(crate) connection_nodes: Vec<NodeId>,
}

/// Snapshot of the searchable topology, for invariant checks and debug views
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    pub connection_nodes: Vec<NodeId>,
    pub edges: Vec<(NodeId, NodeId, EdgeKind)>,
}

impl NavGraph {
    pub fn new(grid: NodeGrid) -> Self {
        Self {
            grid,
            connection_nodes: Vec::new(),
        }
    }

    /// Build the grid, block nodes covered by static geometry, then place the
    /// authored waypoints and edges.
    pub fn from_layout(
        config: GridConfig,
        layout: &WaypointLayout,
        blockers: impl IntoIterator<Item = (Vec2, Vec2)>,
    ) -> Result<Self, Error> {
        let mut grid = NodeGrid::new(config)?;
        for (center, half_extents) in blockers {
            grid.block_region(center, half_extents);
        }

        let mut ids = Vec::with_capacity(layout.nodes.len());
        for (index, &(x, y)) in layout.nodes.iter().enumerate() {
            let id = grid.id_at(x, y).ok_or(Error::WaypointOutOfGrid {
                index,
                x,
                y,
                columns: grid.columns(),
                rows: grid.rows(),
            })?;
            ids.push(id);
        }

        let mut graph = Self::new(grid);
        for &id in &ids {
            graph.add_connection_node(id);
        }

        for edge in &layout.edges {
            let (Some(&from), Some(&to)) = (ids.get(edge.from), ids.get(edge.to)) else {
                return Err(Error::EdgeOutOfRange {
                    from: edge.from,
                    to: edge.to,
                    count: ids.len(),
                });
            };
            graph.link(from, to, edge.kind);
        }

        log::info!(
            "Navigation graph: {}x{} grid, {} waypoints, {} edges",
            graph.grid.columns(),
            graph.grid.rows(),
            graph.connection_nodes.len(),
            layout.edges.len()
        );
        Ok(graph)
    }

    pub fn grid(&self) -> &NodeGrid {
        &self.grid
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        self.grid.node(id)
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.grid.node_mut(id)
    }

    /// Nearest grid node to a world position (see [`NodeGrid::node_at`])
    #[inline]
    pub fn node_at(&self, position: Vec2) -> NodeId {
        self.grid.node_at(position)
    }

    pub fn connection_nodes(&self) -> &[NodeId] {
        &self.connection_nodes
    }

    pub fn is_connection_node(&self, id: NodeId) -> bool {
        self.connection_nodes.contains(&id)
    }

    /// Register a node as a waypoint (no-op if it already is one)
    pub fn add_connection_node(&mut self, id: NodeId) {
        if !self.is_connection_node(id) {
            self.connection_nodes.push(id);
        }
    }

    /// Add or overwrite a directed edge
    pub fn link(&mut self, from: NodeId, to: NodeId, kind: EdgeKind) {
        self.grid.node_mut(from).set_edge(to, kind);
    }

    /// Closest traversable waypoint to `position`.
    ///
    /// A waypoint sitting exactly on `position` is never returned, even when
    /// it is the obvious answer; callers querying from a waypoint's own
    /// position get its nearest *other* waypoint. Returns `None` when every
    /// candidate is impassable.
    pub fn nearest_connection_node(&self, position: Vec2) -> Option<NodeId> {
        let mut best = None;
        let mut best_distance = NEAREST_SEARCH_LIMIT;

        for &id in &self.connection_nodes {
            let node = self.grid.node(id);
            if !node.can_traverse || node.position == position {
                continue;
            }
            let distance = position.distance(node.position);
            if distance < best_distance {
                best_distance = distance;
                best = Some(id);
            }
        }

        best
    }

    /// Begin a scoped set of temporary graph edits, undone when the guard drops
    pub fn splice(&mut self) -> Splice<'_> {
        Splice::new(self)
    }

    pub fn topology(&self) -> Topology {
        let edges = self
            .grid
            .nodes()
            .flat_map(|node| {
                node.neighbours()
                    .iter()
                    .map(move |n| (node.id, n.node, n.kind))
            })
            .collect();

        Topology {
            connection_nodes: self.connection_nodes.clone(),
            edges,
        }
    }
}
