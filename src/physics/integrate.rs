//! Per-substep integration of a single body
//!
//! Semi-implicit Euler: forces and gravity update the velocity, then the
//! velocity moves the body. Variant hooks run between the two.

use glam::Vec2;

use super::PhysicsWorld;
use super::object::{ObjectKind, PhysObject};
use crate::config::PhysicsConfig;
use crate::consts::*;
use crate::rotate;

impl PhysicsWorld {
    /// Full substep for the object at `index`
    pub(super) fn integrate(&mut self, index: usize, config: &PhysicsConfig, dt: f32) {
        integrate_velocity(&mut self.objects[index], config, dt);
        self.carry_riders(index, dt);
        integrate_position(&mut self.objects[index], dt);
    }

    /// Keep riders that are still touching; a moving platform also drags
    /// them (and anything stacked on them) along.
    fn carry_riders(&mut self, index: usize, dt: f32) {
        let (own_id, velocity, affected, carries) = {
            let object = &self.objects[index];
            (
                object.id,
                object.body.velocity,
                object.body.affected_by_physics,
                object.kind.carries_riders(),
            )
        };
        if velocity == Vec2::ZERO || !affected {
            return;
        }

        let mut i = 0;
        while i < self.objects[index].riders.len() {
            let rider_id = self.objects[index].riders[i];
            let rider = match self.index_of(rider_id) {
                Some(rider) if self.objects[rider].ticks_since_collision < CONTACT_MEMORY_TICKS => {
                    rider
                }
                _ => {
                    self.objects[index].riders.remove(i);
                    continue;
                }
            };

            if carries {
                self.objects[rider].body.position += velocity * dt;
                let stacked = self.objects[rider].riders.clone();
                let riders = &mut self.objects[index].riders;
                for id in stacked {
                    if id != own_id && !riders.contains(&id) {
                        riders.push(id);
                    }
                }
            }
            i += 1;
        }
    }
}

/// Friction, forces, gravity, variant hook, contact bookkeeping and speed
/// clamp, in that order
pub fn integrate_velocity(object: &mut PhysObject, config: &PhysicsConfig, dt: f32) {
    if !object.airborne && object.body.affected_by_physics {
        apply_friction(object, config.gravity);
    }

    let body = &mut object.body;
    let acceleration = body.force * body.inverse_mass();
    if body.ignore_gravity || !body.affected_by_physics {
        body.velocity += acceleration * dt;
    } else {
        body.velocity += (config.gravity + acceleration) * dt;
    }

    match &mut object.kind {
        ObjectKind::Projectile(projectile) => {
            if projectile.bounces >= projectile.max_bounces
                || object.ticks_since_collision > PROJECTILE_IDLE_TICKS
            {
                object.marked_for_deletion = true;
            }
        }
        ObjectKind::Pendulum(pendulum) => {
            let rod = pendulum.anchor - object.body.position;
            let g = config.gravity;
            // |rod × g| in the plane
            let torque = (rod.x * g.y - rod.y * g.x).abs();
            pendulum.angular_velocity = (pendulum.angular_velocity
                + torque / object.body.mass * dt)
                .min(PENDULUM_MAX_ANGULAR_VELOCITY);

            let length = rod.length();
            if length > 0.0 {
                pendulum.arm = rotate(pendulum.arm, pendulum.angular_velocity / length);
            }
            object.body.position = pendulum.anchor + pendulum.arm;
        }
        ObjectKind::MovingPlatform(patrol) => {
            let x = object.body.position.x;
            if x < patrol.start.x || x > patrol.end.x {
                object.body.velocity.x = -object.body.velocity.x;
            }
        }
        _ => {}
    }

    if object.kind.tracks_contacts() {
        object.ticks_since_floor = object.ticks_since_floor.saturating_add(1);
        object.ticks_since_collision = object.ticks_since_collision.saturating_add(1);
        object.airborne = !(object.ticks_since_floor < CONTACT_MEMORY_TICKS
            && object.body.affected_by_physics);
    }

    if object.kind.clamps_speed() {
        let v = &mut object.body.velocity;
        v.x = v.x.clamp(-config.max_horizontal_speed, config.max_horizontal_speed);
        v.y = v.y.clamp(-config.max_vertical_speed, config.max_vertical_speed);
    }
}

/// Clear the force accumulator and move
pub fn integrate_position(object: &mut PhysObject, dt: f32) {
    object.body.force = Vec2::ZERO;
    object.body.position += object.body.velocity * dt;
}

/// Rails for bodies that ignore physics: the target cruises at a fixed
/// horizontal speed, projectiles at a fixed total speed
pub fn enforce_cruise_speed(object: &mut PhysObject, config: &PhysicsConfig) {
    match object.kind {
        ObjectKind::Target => {
            let vx = object.body.velocity.x;
            if vx != 0.0 {
                object.body.velocity.x = vx.signum() * config.portal_speed;
            }
        }
        ObjectKind::Projectile(_) => {
            object.body.velocity = object.body.velocity.normalize_or_zero() * config.projectile_speed;
        }
        _ => {}
    }
}

fn apply_friction(object: &mut PhysObject, gravity: Vec2) {
    let body = &mut object.body;
    let friction = if body.velocity.x == 0.0 {
        gravity * STATIC_FRICTION
    } else {
        -object.friction * body.velocity
    };
    body.force.x += friction.x * FRICTION_FORCE_SCALE;

    if body.velocity.x.abs() < REST_EPSILON {
        body.velocity.x = 0.0;
    }
}
