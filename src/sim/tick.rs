//! Fixed timestep simulation tick
//!
//! Core game loop that advances the world deterministically.

use glam::Vec2;

use super::state::World;
use crate::config::SimConfig;
use crate::event::SimEvent;
use crate::nav::{AgentSnapshot, NavDecision, Steer};
use crate::physics::ProjectileKind;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    /// Kill the player's horizontal velocity
    pub stop: bool,
    pub jump: bool,
    /// Fire toward a world position
    pub attack: Option<(Vec2, ProjectileKind)>,
    /// Spawn an enemy at a world position (debug)
    pub debug_spawn: Option<Vec2>,
    /// Change the enemy limit
    pub max_enemies: Option<usize>,
}

/// Advance the world by one fixed timestep
pub fn tick(world: &mut World, input: &TickInput, config: &SimConfig, dt: f32) {
    world.events.clear();
    world.time_ticks += 1;

    // Input is ignored once the portal is lost
    if !world.game_over {
        apply_input(world, input);
    }

    let sub_dt = config.substep_dt(dt);
    let rules = config.contact_rules();
    let mut events = Vec::new();
    for _ in 0..config.substeps.max(1) {
        world
            .physics
            .advance(sub_dt, &config.physics, rules, &mut events);
        for event in events.drain(..) {
            world.apply_event(event, config);
        }
    }
    remove_deleted(world);

    if config.ai_enabled {
        update_enemies(world, config, dt);
        remove_deleted(world);
    }

    if world.enemies.len() < world.max_enemies {
        world.spawn_enemy();
    }
    for point in &mut world.spawn_points {
        point.update(dt);
    }

    world.portal_health = world.portal_health.max(0.0);
    if world.portal_health <= 0.0 && !world.game_over {
        world.game_over = true;
        world.events.push(SimEvent::GameOver);
        log::info!(
            "Game over after {:.1}s ({} ticks)",
            world.score,
            world.time_ticks
        );
    }
    if !world.game_over {
        world.score += dt;
    }
}

fn apply_input(world: &mut World, input: &TickInput) {
    if let Some(max) = input.max_enemies {
        world.set_max_enemies(max);
    }
    if let Some(position) = input.debug_spawn {
        world.debug_spawn_enemy(position);
    }
    if let Some((aim, kind)) = input.attack {
        world.attack(aim, kind);
    }

    let Some(player) = world.physics.get_mut(world.player) else {
        return;
    };
    if input.move_left {
        player.move_left();
    }
    if input.move_right {
        player.move_right();
    }
    if input.stop {
        player.stop();
    }
    if input.jump {
        player.jump();
    }
}

/// One navigation update per enemy toward the target's grid cell. Steering
/// lands in the force accumulator and is consumed by the next tick's physics.
fn update_enemies(world: &mut World, config: &SimConfig, dt: f32) {
    let Some(target) = world.physics.get(world.target) else {
        return;
    };
    let target_cell = world.graph.node_at(target.body.position);

    for enemy in &mut world.enemies {
        let Some(object) = world.physics.get_mut(enemy.id) else {
            continue;
        };
        if !object.is_live() {
            continue;
        }

        let snapshot = AgentSnapshot {
            position: object.body.position,
            speed: object.body.velocity.length(),
            airborne: object.airborne,
        };
        match enemy
            .nav
            .advance(&mut world.graph, snapshot, target_cell, &config.nav, dt)
        {
            NavDecision::Steer(Steer::Left) => object.move_left(),
            NavDecision::Steer(Steer::Right) => object.move_right(),
            NavDecision::Steer(Steer::Jump) => object.jump(),
            NavDecision::Idle | NavDecision::NoAnchor => {}
            NavDecision::Unreachable => {
                log::debug!("Enemy {:?} has no path to the portal", enemy.id);
                object.marked_for_deletion = true;
                world.events.push(SimEvent::EnemyStranded { enemy: enemy.id });
                continue;
            }
        }

        if let Some(character) = object.kind.character_mut() {
            character.jump_cooldown -= dt;
        }
    }
}

/// Flush marked objects and forget enemies that went with them
fn remove_deleted(world: &mut World) {
    let removed = world.physics.flush_deleted();
    if !removed.is_empty() {
        world.enemies.retain(|e| !removed.contains(&e.id));
    }
}
