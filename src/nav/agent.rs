//! Per-enemy navigation controller
//!
//! Each tick the agent splices itself and the target into the waypoint
//! graph, refreshes its path on a duty cycle, and turns the next path node
//! into a steering command. The graph is restored before `advance` returns.

use glam::Vec2;

use super::graph::NavGraph;
use super::node::{EdgeKind, NodeId};
use crate::config::NavConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavState {
    #[default]
    Move,
    Jump,
}

/// What the controller needs to know about the body it drives
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSnapshot {
    pub position: Vec2,
    pub speed: f32,
    pub airborne: bool,
}

/// Character command chosen for this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Steer {
    Left,
    Right,
    Jump,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDecision {
    /// Nothing to do (path finished, or waiting in the air)
    Idle,
    Steer(Steer),
    /// No path to the target exists; the agent should be removed
    Unreachable,
    /// No traversable waypoint near the agent or the target; skip this tick
    NoAnchor,
}

#[derive(Debug, Clone)]
pub struct AgentNav {
    state: NavState,
    current: Option<NodeId>,
    target: Option<NodeId>,
    /// Last computed path, `None` once found unreachable
    path: Option<Vec<NodeId>>,
    cursor: usize,
    next: Option<NodeId>,
    previous_next: Option<NodeId>,
    since_node_reached: f32,
    counter: f32,
    initial_path_found: bool,
}

impl Default for AgentNav {
    fn default() -> Self {
        Self {
            state: NavState::Move,
            current: None,
            target: None,
            path: Some(Vec::new()),
            cursor: 0,
            next: None,
            previous_next: None,
            since_node_reached: 1.0,
            counter: 0.0,
            initial_path_found: false,
        }
    }
}

impl AgentNav {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    /// Grid cell the agent occupied on its last update
    pub fn current(&self) -> Option<NodeId> {
        self.current
    }

    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    pub fn path(&self) -> Option<&[NodeId]> {
        self.path.as_deref()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Node the agent is currently steering toward
    pub fn next_node(&self) -> Option<NodeId> {
        self.next
    }

    pub fn advance(
        &mut self,
        graph: &mut NavGraph,
        agent: AgentSnapshot,
        target: NodeId,
        config: &NavConfig,
        dt: f32,
    ) -> NavDecision {
        self.counter += dt;
        self.since_node_reached += dt;
        self.target = Some(target);
        let current = graph.node_at(agent.position);
        self.current = Some(current);

        let mut splice = graph.splice();
        let Some(anchor) = splice.nearest_connection_node(splice.node(current).position) else {
            return NavDecision::NoAnchor;
        };
        splice.attach_agent(current, anchor);
        splice.register_target(target);
        let Some(anchor) = splice.nearest_connection_node(splice.node(target).position) else {
            return NavDecision::NoAnchor;
        };
        splice.attach_target(target, anchor);

        if !self.initial_path_found
            || agent.speed < config.min_speed
            || self.counter % config.refresh_window < config.refresh_duty
        {
            self.path = splice.find_path(current, target);
            self.cursor = 0;
            self.initial_path_found = true;
            match &self.path {
                Some(path) => log::debug!(
                    "Path {:?} -> {:?}: {} nodes",
                    current,
                    target,
                    path.len()
                ),
                None => log::debug!("No path {:?} -> {:?}", current, target),
            }
        }

        let Some(path) = self.path.take() else {
            return NavDecision::Unreachable;
        };

        let mut decision = NavDecision::Idle;
        if self.cursor < path.len() {
            if let Some(kind) = splice.node(current).edge_to(path[self.cursor]) {
                self.state = match kind {
                    EdgeKind::Jump => NavState::Jump,
                    EdgeKind::Move => NavState::Move,
                };
            }

            decision = match self.state {
                NavState::Move => {
                    let next = self.pick_move_target(&path, config);
                    self.next = Some(next);
                    self.move_toward(&splice, current, next, config)
                }
                NavState::Jump => {
                    self.jump_toward(&splice, agent, current, path[self.cursor], config)
                }
            };
        }

        self.path = Some(path);
        self.previous_next = self.next;
        decision
    }

    /// Normally the node under the cursor. If the agent keeps aiming at the
    /// same node it skips one ahead so it does not rock between two nodes,
    /// unless it has been stuck long enough that it should go back.
    fn pick_move_target(&self, path: &[NodeId], config: &NavConfig) -> NodeId {
        let repeating = self.previous_next.is_some()
            && self.next == self.previous_next
            && self.cursor + 1 < path.len();

        if repeating && self.since_node_reached <= config.stall_seconds {
            path[self.cursor + 1]
        } else {
            path[self.cursor]
        }
    }

    fn move_toward(
        &mut self,
        graph: &NavGraph,
        current: NodeId,
        next: NodeId,
        config: &NavConfig,
    ) -> NavDecision {
        let here = graph.node(current);
        let there = graph.node(next);

        let mut decision = NavDecision::Idle;
        if there.can_traverse {
            if there.grid_x > here.grid_x {
                decision = NavDecision::Steer(Steer::Right);
            } else if there.grid_x < here.grid_x {
                decision = NavDecision::Steer(Steer::Left);
            }
        }

        let gap = (there.position - here.position).abs();
        if gap.x < config.arrive_tolerance && gap.y < config.arrive_tolerance {
            self.cursor += 1;
            self.since_node_reached = 0.0;
        }

        decision
    }

    fn jump_toward(
        &mut self,
        graph: &NavGraph,
        agent: AgentSnapshot,
        current: NodeId,
        next: NodeId,
        config: &NavConfig,
    ) -> NavDecision {
        let there = graph.node(next);
        if agent.position.y > there.position.y && !agent.airborne {
            return NavDecision::Steer(Steer::Jump);
        }

        let same_row = graph.node(current).grid_y == there.grid_y;
        if (same_row && !agent.airborne) || agent.position.y < there.position.y {
            return self.move_toward(graph, current, next, config);
        }

        NavDecision::Idle
    }
}
