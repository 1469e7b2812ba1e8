//! Rigid body state and axis-aligned bounds

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_MASS;

/// Collision shape. Circles are still bounded by their box for the broad
/// phase; the shape only changes how the contact normal is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Shape {
    #[default]
    Box,
    Circle,
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Overlap test; boxes that only touch count as overlapping
    pub fn overlaps(&self, other: &Aabb) -> bool {
        if other.min.x > self.max.x {
            return false;
        }
        if other.max.x < self.min.x {
            return false;
        }
        if other.min.y > self.max.y {
            return false;
        }
        if other.max.y < self.min.y {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Accumulated force, cleared every substep
    pub force: Vec2,
    pub mass: f32,
    pub half_extents: Vec2,
    pub shape: Shape,
    /// Non-dynamic bodies are never displaced or pushed by contacts
    pub is_dynamic: bool,
    pub ignore_gravity: bool,
    /// Off for bodies that move on rails (target, projectiles): no gravity,
    /// no friction, never grounded
    pub affected_by_physics: bool,
}

impl RigidBody {
    /// Dynamic box of the given full size
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            force: Vec2::ZERO,
            mass: DEFAULT_MASS,
            half_extents: size * 0.5,
            shape: Shape::Box,
            is_dynamic: true,
            ignore_gravity: false,
            affected_by_physics: true,
        }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.half_extents * 2.0
    }

    #[inline]
    pub fn inverse_mass(&self) -> f32 {
        1.0 / self.mass
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.position, self.half_extents)
    }
}
