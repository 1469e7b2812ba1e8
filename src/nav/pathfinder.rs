//! A* search over the waypoint graph
//!
//! Costs and the heuristic are both straight-line distance between node
//! positions. Jump edges cost the same as walking, so the heuristic can
//! overestimate what the agent will actually experience; paths are good,
//! not guaranteed shortest in travel time.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use super::graph::NavGraph;
use super::node::NodeId;

/// Open-set entry. Ordered so the heap pops the lowest f, then the lowest h.
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    f: f32,
    h: f32,
    node: NodeId,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.h.total_cmp(&self.h))
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl NavGraph {
    /// Shortest path from `start` to `goal`.
    ///
    /// The returned nodes exclude `start` and end with `goal`; `start == goal`
    /// gives an empty path. `None` means the goal is impassable or not
    /// reachable. Node cost scratch is overwritten.
    pub fn find_path(&mut self, start: NodeId, goal: NodeId) -> Option<Vec<NodeId>> {
        if !self.node(goal).can_traverse {
            return None;
        }
        if start == goal {
            return Some(Vec::new());
        }

        let goal_position = self.node(goal).position;
        let h = self.node(start).position.distance(goal_position);
        {
            let node = self.node_mut(start);
            node.g_cost = 0.0;
            node.h_cost = h;
            node.parent = None;
        }

        let mut heap = BinaryHeap::new();
        let mut open = HashSet::new();
        let mut closed = HashSet::new();
        heap.push(OpenEntry { f: h, h, node: start });
        open.insert(start);

        while let Some(OpenEntry { node: current, .. }) = heap.pop() {
            // Stale duplicate of a node already expanded
            if !closed.insert(current) {
                continue;
            }
            open.remove(&current);

            if current == goal {
                return Some(self.retrace(start, goal));
            }

            let (position, g) = {
                let node = self.node(current);
                (node.position, node.g_cost)
            };
            let neighbours = self.node(current).neighbours().to_vec();

            for neighbour in neighbours {
                let id = neighbour.node;
                if closed.contains(&id) || !self.node(id).can_traverse {
                    continue;
                }

                let node = self.node_mut(id);
                let tentative = g + position.distance(node.position);
                if !open.contains(&id) || tentative < node.g_cost {
                    node.g_cost = tentative;
                    node.h_cost = node.position.distance(goal_position);
                    node.parent = Some(current);
                    heap.push(OpenEntry {
                        f: node.f_cost(),
                        h: node.h_cost,
                        node: id,
                    });
                    open.insert(id);
                }
            }
        }

        None
    }

    fn retrace(&self, start: NodeId, goal: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = goal;
        while current != start {
            path.push(current);
            match self.node(current).parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
        path.reverse();
        path
    }
}
