//! Navigation nodes and their adjacency

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Index of a node in the dense grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// How an agent traverses an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EdgeKind {
    #[default]
    Move,
    Jump,
}

/// Directed edge to another node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbour {
    pub node: NodeId,
    pub kind: EdgeKind,
}

/// A fixed point of the navigation grid
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    /// World position (Y grows downward)
    pub position: Vec2,
    /// Column, left to right
    pub grid_x: usize,
    /// Row, bottom to top
    pub grid_y: usize,
    pub can_traverse: bool,
    /// Outgoing edges in insertion order
    neighbours: Vec<Neighbour>,

    // A* scratch, only meaningful during a search
    pub(crate) g_cost: f32,
    pub(crate) h_cost: f32,
    pub(crate) parent: Option<NodeId>,
}

impl Node {
    pub fn new(id: NodeId, position: Vec2, grid_x: usize, grid_y: usize) -> Self {
        Self {
            id,
            position,
            grid_x,
            grid_y,
            can_traverse: true,
            neighbours: Vec::new(),
            g_cost: 0.0,
            h_cost: 0.0,
            parent: None,
        }
    }

    #[inline]
    pub fn f_cost(&self) -> f32 {
        self.g_cost + self.h_cost
    }

    pub fn neighbours(&self) -> &[Neighbour] {
        &self.neighbours
    }

    /// Kind of the edge from this node to `other`, if any
    pub fn edge_to(&self, other: NodeId) -> Option<EdgeKind> {
        self.neighbours
            .iter()
            .find(|n| n.node == other)
            .map(|n| n.kind)
    }

    pub fn has_edge_to(&self, other: NodeId) -> bool {
        self.edge_to(other).is_some()
    }

    /// Insert or overwrite the edge to `other`, returning the previous kind.
    /// An overwritten edge keeps its position in the adjacency order.
    pub fn set_edge(&mut self, other: NodeId, kind: EdgeKind) -> Option<EdgeKind> {
        match self.neighbours.iter_mut().find(|n| n.node == other) {
            Some(existing) => Some(std::mem::replace(&mut existing.kind, kind)),
            None => {
                self.neighbours.push(Neighbour { node: other, kind });
                None
            }
        }
    }

    pub fn remove_edge(&mut self, other: NodeId) -> Option<EdgeKind> {
        let index = self.neighbours.iter().position(|n| n.node == other)?;
        Some(self.neighbours.remove(index).kind)
    }

    pub fn distance_to(&self, other: &Node) -> f32 {
        self.position.distance(other.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_edge_overwrites_in_place() {
        let mut node = Node::new(NodeId(0), Vec2::ZERO, 0, 0);
        assert_eq!(node.set_edge(NodeId(1), EdgeKind::Move), None);
        assert_eq!(node.set_edge(NodeId(2), EdgeKind::Move), None);
        assert_eq!(node.set_edge(NodeId(1), EdgeKind::Jump), Some(EdgeKind::Move));

        assert_eq!(node.neighbours()[0].node, NodeId(1));
        assert_eq!(node.edge_to(NodeId(1)), Some(EdgeKind::Jump));
        assert_eq!(node.neighbours().len(), 2);
    }

    #[test]
    fn test_remove_edge() {
        let mut node = Node::new(NodeId(0), Vec2::ZERO, 0, 0);
        node.set_edge(NodeId(3), EdgeKind::Jump);
        assert_eq!(node.remove_edge(NodeId(3)), Some(EdgeKind::Jump));
        assert_eq!(node.remove_edge(NodeId(3)), None);
        assert!(!node.has_edge_to(NodeId(3)));
    }
}
