//! Physical objects: a rigid body plus gameplay attributes
//!
//! Variant-specific data lives in [`ObjectKind`]; the integrator and the
//! resolver ask the kind about capabilities rather than matching on it
//! everywhere.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{RigidBody, Shape};
use crate::consts::*;

/// Stable object handle, allocated in increasing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Heavy bouncing shot, costs ammo
    Ball,
    /// Light single-hit shot, unlimited
    Bullet,
}

impl ProjectileKind {
    pub fn max_bounces(self) -> u32 {
        match self {
            ProjectileKind::Ball => 6,
            ProjectileKind::Bullet => 1,
        }
    }

    pub fn mass(self) -> f32 {
        match self {
            ProjectileKind::Ball => 7.5,
            ProjectileKind::Bullet => 5.0,
        }
    }

    pub fn size(self) -> f32 {
        match self {
            ProjectileKind::Ball => 16.0,
            ProjectileKind::Bullet => 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub is_player: bool,
    pub ammo: u32,
    pub max_ammo: u32,
    /// Seconds until an AI character may jump again
    pub jump_cooldown: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub kind: ProjectileKind,
    pub bounces: u32,
    pub max_bounces: u32,
}

/// Horizontal patrol bounds for a moving platform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Patrol {
    pub start: Vec2,
    pub end: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pendulum {
    pub anchor: Vec2,
    /// Offset from the anchor to the bob
    pub arm: Vec2,
    pub angular_velocity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Static level geometry
    Block,
    /// The portal enemies try to reach
    Target,
    Character(Character),
    Projectile(Projectile),
    MovingPlatform(Patrol),
    Pendulum(Pendulum),
}

impl ObjectKind {
    /// Scripted movers are integrated but keep no contact history
    pub fn tracks_contacts(&self) -> bool {
        !matches!(self, ObjectKind::MovingPlatform(_) | ObjectKind::Pendulum(_))
    }

    pub fn clamps_speed(&self) -> bool {
        !self.is_projectile()
    }

    /// Moves whatever stands on it along with itself
    pub fn carries_riders(&self) -> bool {
        matches!(self, ObjectKind::MovingPlatform(_))
    }

    /// Velocity survives a contact even though the body is not dynamic
    pub fn keeps_scripted_velocity(&self) -> bool {
        matches!(self, ObjectKind::MovingPlatform(_))
    }

    /// Non-dynamic but still integrated every substep
    pub fn is_kinematic(&self) -> bool {
        matches!(self, ObjectKind::MovingPlatform(_) | ObjectKind::Pendulum(_))
    }

    pub fn is_character(&self) -> bool {
        matches!(self, ObjectKind::Character(_))
    }

    pub fn is_projectile(&self) -> bool {
        matches!(self, ObjectKind::Projectile(_))
    }

    pub fn is_target(&self) -> bool {
        matches!(self, ObjectKind::Target)
    }

    pub fn character(&self) -> Option<&Character> {
        match self {
            ObjectKind::Character(c) => Some(c),
            _ => None,
        }
    }

    pub fn character_mut(&mut self) -> Option<&mut Character> {
        match self {
            ObjectKind::Character(c) => Some(c),
            _ => None,
        }
    }

    /// True for characters not controlled by the player
    pub fn is_enemy(&self) -> bool {
        self.character().is_some_and(|c| !c.is_player)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysObject {
    pub id: ObjectId,
    pub body: RigidBody,
    /// Coefficient of restitution used when this object decides a contact
    pub elasticity: f32,
    /// Kinetic friction coefficient
    pub friction: f32,
    pub airborne: bool,
    /// Substeps since any top/bottom contact
    pub ticks_since_collision: u32,
    /// Substeps since this object last landed on something
    pub ticks_since_floor: u32,
    /// Inert until removed at the end of the tick
    pub marked_for_deletion: bool,
    /// Objects resting on top of this one
    pub riders: Vec<ObjectId>,
    pub kind: ObjectKind,
}

impl PhysObject {
    pub fn new(id: ObjectId, body: RigidBody, kind: ObjectKind) -> Self {
        Self {
            id,
            body,
            elasticity: 0.0,
            friction: DEFAULT_FRICTION,
            airborne: true,
            ticks_since_collision: 0,
            ticks_since_floor: 0,
            marked_for_deletion: false,
            riders: Vec::new(),
            kind,
        }
    }

    /// Immovable box
    pub fn block(id: ObjectId, center: Vec2, size: Vec2) -> Self {
        let mut body = RigidBody::new(center, size);
        body.mass = STATIC_MASS;
        body.is_dynamic = false;
        body.ignore_gravity = true;
        Self::new(id, body, ObjectKind::Block)
    }

    /// The portal: a perfectly elastic circle drifting on rails
    pub fn target(id: ObjectId, position: Vec2, velocity: Vec2) -> Self {
        let mut body = RigidBody::new(position, Vec2::splat(CHARACTER_SIZE));
        body.mass = 100.0;
        body.shape = Shape::Circle;
        body.affected_by_physics = false;
        body.ignore_gravity = true;
        body.velocity = velocity;
        let mut object = Self::new(id, body, ObjectKind::Target);
        object.elasticity = 1.0;
        object
    }

    pub fn character(id: ObjectId, position: Vec2, is_player: bool) -> Self {
        let body = RigidBody::new(position, Vec2::splat(CHARACTER_SIZE));
        Self::new(
            id,
            body,
            ObjectKind::Character(Character {
                is_player,
                ammo: MAX_AMMO,
                max_ammo: MAX_AMMO,
                jump_cooldown: 0.0,
            }),
        )
    }

    /// Projectile launched along `direction` (normalised here)
    pub fn projectile(id: ObjectId, position: Vec2, direction: Vec2, kind: ProjectileKind) -> Self {
        let mut body = RigidBody::new(position, Vec2::splat(kind.size()));
        body.mass = kind.mass();
        body.shape = Shape::Circle;
        body.affected_by_physics = false;
        body.ignore_gravity = true;
        body.velocity = direction.normalize_or_zero() * PROJECTILE_LAUNCH_SPEED;
        let mut object = Self::new(
            id,
            body,
            ObjectKind::Projectile(Projectile {
                kind,
                bounces: 0,
                max_bounces: kind.max_bounces(),
            }),
        );
        object.elasticity = 1.0;
        object
    }

    pub fn moving_platform(
        id: ObjectId,
        center: Vec2,
        size: Vec2,
        patrol: Patrol,
        velocity: Vec2,
    ) -> Self {
        let mut body = RigidBody::new(center, size);
        body.mass = STATIC_MASS;
        body.is_dynamic = false;
        body.ignore_gravity = true;
        body.velocity = velocity;
        Self::new(id, body, ObjectKind::MovingPlatform(patrol))
    }

    /// Bob swinging around `anchor`, starting at `anchor + arm`
    pub fn pendulum(id: ObjectId, anchor: Vec2, arm: Vec2) -> Self {
        let mut body = RigidBody::new(anchor + arm, Vec2::splat(CHARACTER_SIZE));
        body.mass = 100.0;
        body.shape = Shape::Circle;
        body.is_dynamic = false;
        body.ignore_gravity = true;
        let mut object = Self::new(
            id,
            body,
            ObjectKind::Pendulum(Pendulum {
                anchor,
                arm,
                angular_velocity: 0.0,
            }),
        );
        object.elasticity = 1.0;
        object
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        !self.marked_for_deletion
    }

    // === Character commands ===

    pub fn move_left(&mut self) {
        self.body.force.x = -MOVE_FORCE;
    }

    pub fn move_right(&mut self) {
        self.body.force.x = MOVE_FORCE;
    }

    /// Kill horizontal velocity
    pub fn stop(&mut self) {
        self.body.velocity.x = 0.0;
    }

    /// Jump if grounded. AI characters are additionally rate limited.
    pub fn jump(&mut self) {
        if self.airborne {
            return;
        }
        let Some(character) = self.kind.character_mut() else {
            return;
        };
        if !character.is_player {
            if character.jump_cooldown > 0.0 {
                return;
            }
            character.jump_cooldown = AI_JUMP_COOLDOWN;
        }
        self.body.force.y = -JUMP_FORCE;
    }
}
