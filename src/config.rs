//! Simulation configuration and debug toggles
//!
//! Passed explicitly into every tick. Loaded from JSON; missing fields fall
//! back to their defaults.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::Error;
use crate::physics::ContactRules;

/// Uniform navigation grid covering the playable area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: f32,
    pub height: f32,
    /// Half the spacing between adjacent nodes
    pub node_radius: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
            node_radius: GRID_NODE_RADIUS,
        }
    }
}

impl GridConfig {
    /// Number of node columns
    pub fn columns(&self) -> usize {
        (self.width / (self.node_radius * 2.0)) as usize
    }

    /// Number of node rows
    pub fn rows(&self) -> usize {
        (self.height / (self.node_radius * 2.0)) as usize
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0.0
            && self.height > 0.0
            && self.node_radius > 0.0
            && self.columns() >= 2
            && self.rows() >= 2
    }
}

/// Global physics constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: Vec2,
    pub max_horizontal_speed: f32,
    pub max_vertical_speed: f32,
    /// Horizontal speed the target is held at
    pub portal_speed: f32,
    /// Speed projectiles are renormalised to
    pub projectile_speed: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, GRAVITY),
            max_horizontal_speed: MAX_HORIZONTAL_SPEED,
            max_vertical_speed: MAX_VERTICAL_SPEED,
            portal_speed: PORTAL_SPEED,
            projectile_speed: PROJECTILE_SPEED,
        }
    }
}

/// Enemy navigation tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Path refresh duty cycle: recompute while `t % window < duty`
    pub refresh_window: f32,
    pub refresh_duty: f32,
    /// Below this speed an agent always recomputes its path
    pub min_speed: f32,
    /// Seconds on one waypoint before the anti-oscillation skip is dropped
    pub stall_seconds: f32,
    /// A waypoint counts as reached within this distance on both axes
    pub arrive_tolerance: f32,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            refresh_window: 0.4,
            refresh_duty: 0.2,
            min_speed: 10.0,
            stall_seconds: 2.0,
            arrive_tolerance: 16.0,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Physics substeps per outer tick
    pub substeps: u32,
    /// Seed for spawn selection and the target's launch velocity
    pub seed: u64,

    // === Debug toggles ===
    /// Enemy navigation runs each tick
    pub ai_enabled: bool,
    /// Characters pass through each other
    pub ignore_character_collision: bool,
    /// Projectiles bounce off enemies; when off, a hit enemy is removed outright
    pub projectile_character_collision: bool,

    // === Gameplay ===
    pub max_enemies: usize,
    pub portal_health: f32,
    /// Health lost each time an enemy reaches the portal
    pub portal_damage: f32,

    pub physics: PhysicsConfig,
    pub nav: NavConfig,
    pub grid: GridConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            substeps: PHYSICS_SUBSTEPS,
            seed: 0x5eed,

            ai_enabled: true,
            ignore_character_collision: false,
            projectile_character_collision: true,

            max_enemies: MAX_ENEMIES,
            portal_health: PORTAL_HEALTH,
            portal_damage: PORTAL_DAMAGE,

            physics: PhysicsConfig::default(),
            nav: NavConfig::default(),
            grid: GridConfig::default(),
        }
    }
}

impl SimConfig {
    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load a configuration file, falling back to defaults on any failure
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Using default config ({}: {})", path.display(), e);
                Self::default()
            }
        }
    }

    /// Pair-resolution toggles handed to the physics world
    pub fn contact_rules(&self) -> ContactRules {
        ContactRules {
            ignore_character_collision: self.ignore_character_collision,
            projectile_character_collision: self.projectile_character_collision,
        }
    }

    /// Length of one physics substep for an outer tick of `dt`
    pub fn substep_dt(&self, dt: f32) -> f32 {
        dt / self.substeps.max(1) as f32
    }
}
