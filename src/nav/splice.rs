//! Temporary graph edits scoped to one navigation query
//!
//! An agent and the target rarely stand exactly on a waypoint, so each query
//! attaches both to their nearest waypoints for the duration of the search.
//! Every edit is journaled and rolled back in reverse order when the guard
//! drops, on every exit path.

use std::ops::{Deref, DerefMut};

use super::graph::NavGraph;
use super::node::{EdgeKind, NodeId};

#[derive(Debug, Clone, Copy)]
enum SpliceOp {
    Edge {
        from: NodeId,
        to: NodeId,
        previous: Option<EdgeKind>,
    },
    ConnectionNode(NodeId),
}

pub struct Splice<'g> {
    graph: &'g mut NavGraph,
    journal: Vec<SpliceOp>,
}

impl<'g> Splice<'g> {
    pub(crate) fn new(graph: &'g mut NavGraph) -> Self {
        Self {
            graph,
            journal: Vec::new(),
        }
    }

    fn set_edge(&mut self, from: NodeId, to: NodeId, kind: EdgeKind) {
        let previous = self.graph.node_mut(from).set_edge(to, kind);
        self.journal.push(SpliceOp::Edge { from, to, previous });
    }

    /// Connect the agent's cell and its nearest waypoint with walkable edges
    /// both ways, unless they are the same node or already connected in
    /// either direction. Returns whether anything was added.
    pub fn attach_agent(&mut self, cell: NodeId, anchor: NodeId) -> bool {
        if cell == anchor
            || self.graph.node(cell).has_edge_to(anchor)
            || self.graph.node(anchor).has_edge_to(cell)
        {
            return false;
        }
        self.set_edge(cell, anchor, EdgeKind::Move);
        self.set_edge(anchor, cell, EdgeKind::Move);
        true
    }

    /// Make the target's cell a waypoint for this query if it is not one
    pub fn register_target(&mut self, target: NodeId) -> bool {
        if self.graph.is_connection_node(target) {
            return false;
        }
        self.graph.connection_nodes.push(target);
        self.journal.push(SpliceOp::ConnectionNode(target));
        true
    }

    /// Connect the target to its nearest waypoint. Leaving the target is a
    /// walk; arriving at it from the waypoint is modelled as a jump.
    pub fn attach_target(&mut self, target: NodeId, anchor: NodeId) -> bool {
        if target == anchor || self.graph.node(anchor).has_edge_to(target) {
            return false;
        }
        self.set_edge(target, anchor, EdgeKind::Move);
        self.set_edge(anchor, target, EdgeKind::Jump);
        true
    }

    /// Number of journaled edits
    pub fn len(&self) -> usize {
        self.journal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.journal.is_empty()
    }

    fn rollback(&mut self) {
        while let Some(op) = self.journal.pop() {
            match op {
                SpliceOp::Edge { from, to, previous } => {
                    let node = self.graph.node_mut(from);
                    match previous {
                        Some(kind) => {
                            node.set_edge(to, kind);
                        }
                        None => {
                            node.remove_edge(to);
                        }
                    }
                }
                SpliceOp::ConnectionNode(id) => {
                    if let Some(index) = self.graph.connection_nodes.iter().rposition(|&n| n == id) {
                        self.graph.connection_nodes.remove(index);
                    }
                }
            }
        }
    }
}

impl Deref for Splice<'_> {
    type Target = NavGraph;

    fn deref(&self) -> &NavGraph {
        self.graph
    }
}

impl DerefMut for Splice<'_> {
    fn deref_mut(&mut self) -> &mut NavGraph {
        self.graph
    }
}

impl Drop for Splice<'_> {
    fn drop(&mut self) {
        self.rollback();
    }
}
