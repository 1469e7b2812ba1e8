//! Enemy navigation
//!
//! A dense node grid maps world positions to nodes; a sparse set of authored
//! waypoints and edges forms the searchable graph. Agents splice themselves
//! and their target into that graph for the duration of each query.

pub mod agent;
pub mod graph;
pub mod grid;
pub mod layout;
pub mod node;
pub mod pathfinder;
pub mod splice;

pub use agent::{AgentNav, AgentSnapshot, NavDecision, NavState, Steer};
pub use graph::{NavGraph, Topology};
pub use grid::NodeGrid;
pub use layout::{WaypointEdge, WaypointLayout};
pub use node::{EdgeKind, Neighbour, Node, NodeId};
pub use splice::Splice;
