//! Portal Defense - a 2D platformer simulation core
//!
//! Core modules:
//! - `physics`: Fixed-substep rigid bodies, AABB contacts, impulse resolution
//! - `nav`: Node grid, waypoint graph, A* pathfinding and the enemy controller
//! - `sim`: World state, level data and the per-tick orchestration
//! - `config`: Data-driven tuning and debug toggles

pub mod config;
pub mod error;
pub mod event;
pub mod nav;
pub mod physics;
pub mod sim;

pub use config::{GridConfig, NavConfig, PhysicsConfig, SimConfig};
pub use error::Error;
pub use event::SimEvent;

/// Game configuration constants
pub mod consts {
    /// Outer simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Physics substeps per outer tick
    pub const PHYSICS_SUBSTEPS: u32 = 10;

    /// Playable area (world Y grows downward)
    pub const ARENA_WIDTH: f32 = 2048.0;
    pub const ARENA_HEIGHT: f32 = 2496.0;
    /// Half-spacing of the navigation node grid
    pub const GRID_NODE_RADIUS: f32 = 16.0;

    /// Gravity acceleration (pixels/s², +Y is down)
    pub const GRAVITY: f32 = 500.0;
    pub const MAX_HORIZONTAL_SPEED: f32 = 400.0;
    pub const MAX_VERTICAL_SPEED: f32 = 600.0;

    /// Target ("portal") cruise speed on the X axis
    pub const PORTAL_SPEED: f32 = 150.0;
    /// Projectile speed once in flight
    pub const PROJECTILE_SPEED: f32 = 600.0;
    /// Projectile speed at the moment of launch
    pub const PROJECTILE_LAUNCH_SPEED: f32 = 800.0;

    /// Mass given to immovable level geometry
    pub const STATIC_MASS: f32 = 100_000.0;
    pub const DEFAULT_MASS: f32 = 10.0;
    pub const DEFAULT_FRICTION: f32 = 0.2;
    pub const STATIC_FRICTION: f32 = 0.7;
    /// Friction is expressed as a force, scaled by this factor
    pub const FRICTION_FORCE_SCALE: f32 = 200.0;
    /// Horizontal speeds below this snap to zero while grounded
    pub const REST_EPSILON: f32 = 0.01;

    /// Substeps without floor contact before a body counts as airborne
    pub const CONTACT_MEMORY_TICKS: u32 = 50;
    /// Substeps without any contact before a projectile expires
    pub const PROJECTILE_IDLE_TICKS: u32 = 3000;

    /// Steering forces written by character commands
    pub const MOVE_FORCE: f32 = 200_000.0;
    pub const JUMP_FORCE: f32 = 6_000_000.0;
    /// Minimum time between two AI jumps (seconds)
    pub const AI_JUMP_COOLDOWN: f32 = 0.1;

    /// Pendulum spin limit (radians of arc per unit of arm length)
    pub const PENDULUM_MAX_ANGULAR_VELOCITY: f32 = 0.4;

    pub const CHARACTER_SIZE: f32 = 32.0;
    pub const MAX_AMMO: u32 = 20;

    /// Portal defaults
    pub const PORTAL_HEALTH: f32 = 100.0;
    pub const PORTAL_DAMAGE: f32 = 10.0;
    pub const MAX_ENEMIES: usize = 5;

    /// Spawn point timing (seconds)
    pub const SPAWN_RESPAWN_DELAY: f32 = 10.0;
    pub const SPAWN_INITIAL_ELAPSED: f32 = 7.0;
}

/// Rotate `v` counter-clockwise by `angle` radians
#[inline]
pub fn rotate(v: glam::Vec2, angle: f32) -> glam::Vec2 {
    glam::Vec2::from_angle(angle).rotate(v)
}
