//! Dense node grid with O(1) world-position lookup
//!
//! World coordinates have their origin in the top-left corner with Y growing
//! downward; grid rows are counted from the bottom up.

use glam::Vec2;

use super::node::{Node, NodeId};
use crate::config::GridConfig;
use crate::error::Error;

#[derive(Debug, Clone)]
pub struct NodeGrid {
    config: GridConfig,
    columns: usize,
    rows: usize,
    nodes: Vec<Node>,
}

impl NodeGrid {
    /// Build every node of the grid
    pub fn new(config: GridConfig) -> Result<Self, Error> {
        if !config.is_valid() {
            return Err(Error::InvalidGrid {
                width: config.width,
                height: config.height,
                node_radius: config.node_radius,
            });
        }

        let columns = config.columns();
        let rows = config.rows();
        let spacing = config.node_radius * 2.0;

        let mut nodes = Vec::with_capacity(columns * rows);
        for x in 0..columns {
            for y in 0..rows {
                let id = NodeId((x * rows + y) as u32);
                let position = Vec2::new(
                    x as f32 * spacing + config.node_radius,
                    (rows - 1 - y) as f32 * spacing + config.node_radius,
                );
                nodes.push(Node::new(id, position, x, y));
            }
        }

        Ok(Self {
            config,
            columns,
            rows,
            nodes,
        })
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Node at grid coordinates, if inside the grid
    pub fn id_at(&self, x: usize, y: usize) -> Option<NodeId> {
        (x < self.columns && y < self.rows).then(|| NodeId((x * self.rows + y) as u32))
    }

    /// Nearest grid node to a world position.
    ///
    /// Positions outside the map clamp to the border, so the result is always
    /// a valid node. Rounding means a position near a cell boundary may land
    /// on either neighbour.
    pub fn node_at(&self, position: Vec2) -> NodeId {
        let x_ratio = (position.x / self.config.width).clamp(0.0, 1.0);
        let y_ratio = ((self.config.height - position.y) / self.config.height).clamp(0.0, 1.0);

        let x = ((self.columns - 1) as f32 * x_ratio).round() as usize;
        let y = ((self.rows - 1) as f32 * y_ratio).round() as usize;
        NodeId((x * self.rows + y) as u32)
    }

    /// Mark every node strictly inside the box as impassable
    pub fn block_region(&mut self, center: Vec2, half_extents: Vec2) {
        let min = center - half_extents;
        let max = center + half_extents;
        for node in &mut self.nodes {
            let p = node.position;
            if p.x > min.x && p.x < max.x && p.y > min.y && p.y < max.y {
                node.can_traverse = false;
            }
        }
    }
}
