//! World state and core simulation types
//!
//! Owns the physics world, the navigation graph and everything the game
//! loop keeps between ticks.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::level::LevelDesc;
use crate::config::SimConfig;
use crate::consts::*;
use crate::error::Error;
use crate::event::SimEvent;
use crate::nav::{AgentNav, NavGraph};
use crate::physics::{ObjectId, Patrol, PhysObject, PhysicsWorld, ProjectileKind};

/// Where enemies appear. A point is used at most once per respawn delay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub position: Vec2,
    pub since_last_spawn: f32,
    pub respawn_delay: f32,
    pub active: bool,
}

impl SpawnPoint {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            since_last_spawn: SPAWN_INITIAL_ELAPSED,
            respawn_delay: SPAWN_RESPAWN_DELAY,
            active: false,
        }
    }

    /// Activate once the delay has passed, then advance the timer
    pub fn update(&mut self, dt: f32) {
        if self.since_last_spawn > self.respawn_delay {
            self.active = true;
        }
        self.since_last_spawn += dt;
    }
}

/// An AI character and its navigation controller
#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: ObjectId,
    pub nav: AgentNav,
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct World {
    pub(super) physics: PhysicsWorld,
    pub(super) graph: NavGraph,
    pub(super) rng: Pcg32,
    pub(super) player: ObjectId,
    pub(super) target: ObjectId,
    /// Live enemies, in spawn order
    pub(super) enemies: Vec<Enemy>,
    pub(super) spawn_points: Vec<SpawnPoint>,
    pub(super) max_enemies: usize,
    pub(super) portal_health: f32,
    pub(super) score: f32,
    pub(super) game_over: bool,
    pub(super) time_ticks: u64,
    /// Events raised during the last tick
    pub(super) events: Vec<SimEvent>,
}

impl World {
    /// Build a world from level data
    pub fn new(level: &LevelDesc, config: &SimConfig) -> Result<Self, Error> {
        let graph = NavGraph::from_layout(config.grid, &level.waypoints, level.blockers())?;
        let mut rng = Pcg32::seed_from_u64(config.seed);
        let mut physics = PhysicsWorld::new();

        let id = physics.next_object_id();
        let player = physics.add(PhysObject::character(id, level.player_start, true));

        let velocity = random_target_velocity(&mut rng, config.physics.portal_speed);
        let id = physics.next_object_id();
        let target = physics.add(PhysObject::target(id, level.target_start, velocity));

        for block in &level.blocks {
            let id = physics.next_object_id();
            physics.add(PhysObject::block(id, block.center, block.size));
        }
        for platform in &level.platforms {
            let id = physics.next_object_id();
            let patrol = Patrol {
                start: platform.patrol_start,
                end: platform.patrol_end,
            };
            physics.add(PhysObject::moving_platform(
                id,
                platform.center,
                platform.size,
                patrol,
                platform.velocity,
            ));
        }
        for pendulum in &level.pendulums {
            let id = physics.next_object_id();
            physics.add(PhysObject::pendulum(id, pendulum.anchor, pendulum.arm));
        }

        log::info!(
            "World built: {} objects, {} spawn points, seed {:#x}",
            physics.len(),
            level.spawn_points.len(),
            config.seed
        );

        Ok(Self {
            physics,
            graph,
            rng,
            player,
            target,
            enemies: Vec::new(),
            spawn_points: level.spawn_points.iter().copied().map(SpawnPoint::new).collect(),
            max_enemies: config.max_enemies,
            portal_health: config.portal_health,
            score: 0.0,
            game_over: false,
            time_ticks: 0,
            events: Vec::new(),
        })
    }

    // === Spawning ===

    /// Spawn one enemy at a random active spawn point, if below the limit
    pub fn spawn_enemy(&mut self) -> Option<ObjectId> {
        if self.enemies.len() >= self.max_enemies {
            return None;
        }
        let active: Vec<usize> = self
            .spawn_points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.active)
            .map(|(i, _)| i)
            .collect();
        if active.is_empty() {
            return None;
        }

        let index = active[self.rng.random_range(0..active.len())];
        let point = &mut self.spawn_points[index];
        point.since_last_spawn = 0.0;
        point.active = false;
        let position = point.position;

        Some(self.add_enemy(position))
    }

    /// Spawn an enemy at an arbitrary position, if below the limit
    pub fn debug_spawn_enemy(&mut self, position: Vec2) -> Option<ObjectId> {
        if self.enemies.len() >= self.max_enemies {
            return None;
        }
        Some(self.add_enemy(position))
    }

    fn add_enemy(&mut self, position: Vec2) -> ObjectId {
        let id = self.physics.next_object_id();
        self.physics.add(PhysObject::character(id, position, false));
        self.enemies.push(Enemy {
            id,
            nav: AgentNav::new(),
        });
        self.events.push(SimEvent::EnemySpawned { enemy: id });
        log::info!("Enemy {:?} spawned at ({:.0}, {:.0})", id, position.x, position.y);
        id
    }

    /// Fire from the player's centre toward `aim`. Balls cost one ammo and
    /// are refused when empty; bullets are unlimited.
    pub fn attack(&mut self, aim: Vec2, kind: ProjectileKind) -> Option<ObjectId> {
        let player = self.physics.get_mut(self.player)?;
        let origin = player.body.position;
        let direction = (aim - origin).try_normalize()?;

        if kind == ProjectileKind::Ball {
            let character = player.kind.character_mut()?;
            if character.ammo == 0 {
                return None;
            }
            character.ammo -= 1;
        }

        let id = self.physics.next_object_id();
        Some(self.physics.add(PhysObject::projectile(id, origin, direction, kind)))
    }

    /// Consequences of a contact event on the game state
    pub(super) fn apply_event(&mut self, event: SimEvent, config: &SimConfig) {
        match event {
            SimEvent::PortalBreached { enemy } => {
                self.portal_health -= config.portal_damage;
                log::info!("Enemy {:?} reached the portal, health {}", enemy, self.portal_health);
            }
            SimEvent::AmmoRecovered { .. } => {
                if let Some(character) = self
                    .physics
                    .get_mut(self.player)
                    .and_then(|p| p.kind.character_mut())
                {
                    character.ammo = (character.ammo + 1).min(character.max_ammo);
                }
            }
            _ => {}
        }
        self.events.push(event);
    }

    // === Accessors ===

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn graph(&self) -> &NavGraph {
        &self.graph
    }

    pub fn player(&self) -> ObjectId {
        self.player
    }

    pub fn target(&self) -> ObjectId {
        self.target
    }

    pub fn player_ammo(&self) -> u32 {
        self.physics
            .get(self.player)
            .and_then(|p| p.kind.character())
            .map_or(0, |c| c.ammo)
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    /// Navigation state per enemy, for debug views
    pub fn agents(&self) -> impl Iterator<Item = (ObjectId, &AgentNav)> {
        self.enemies.iter().map(|e| (e.id, &e.nav))
    }

    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    pub fn spawn_points(&self) -> &[SpawnPoint] {
        &self.spawn_points
    }

    pub fn max_enemies(&self) -> usize {
        self.max_enemies
    }

    pub fn set_max_enemies(&mut self, max: usize) {
        self.max_enemies = max;
    }

    pub fn portal_health(&self) -> f32 {
        self.portal_health
    }

    /// Seconds survived
    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    /// Events raised during the last tick
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }
}

/// Each axis gets `U{0.3, 0.4, 0.5, 0.6} * speed` with a random sign
fn random_target_velocity(rng: &mut Pcg32, speed: f32) -> Vec2 {
    let mut axis = || {
        let magnitude = rng.random_range(3..7) as f32 / 10.0 * speed;
        if rng.random_bool(0.5) { -magnitude } else { magnitude }
    };
    let x = axis();
    let y = axis();
    Vec2::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        World::new(&LevelDesc::arena(), &SimConfig::default()).unwrap()
    }

    #[test]
    fn test_world_from_arena() {
        let world = world();
        let level = LevelDesc::arena();
        // Player, target, blocks, platforms, pendulums
        let expected = 2 + level.blocks.len() + level.platforms.len() + level.pendulums.len();
        assert_eq!(world.physics().len(), expected);
        assert_eq!(world.portal_health(), PORTAL_HEALTH);
        assert_eq!(world.player_ammo(), MAX_AMMO);
        assert_eq!(world.enemy_count(), 0);
        assert_eq!(world.graph().connection_nodes().len(), level.waypoints.nodes.len());

        let player = world.physics().get(world.player()).unwrap();
        assert!(player.kind.character().unwrap().is_player);
        assert!(world.physics().get(world.target()).unwrap().kind.is_target());
    }

    #[test]
    fn test_target_velocity_components() {
        for seed in 0..32 {
            let config = SimConfig {
                seed,
                ..Default::default()
            };
            let world = World::new(&LevelDesc::arena(), &config).unwrap();
            let v = world.physics().get(world.target()).unwrap().body.velocity;
            for component in [v.x, v.y] {
                let ratio = component.abs() / PORTAL_SPEED;
                assert!(
                    [0.3, 0.4, 0.5, 0.6].iter().any(|r| (ratio - r).abs() < 1e-4),
                    "unexpected component {component}"
                );
            }
        }
    }

    #[test]
    fn test_invalid_grid_is_an_error() {
        let mut config = SimConfig::default();
        config.grid.node_radius = 0.0;
        assert!(World::new(&LevelDesc::arena(), &config).is_err());
    }

    #[test]
    fn test_spawn_point_activation() {
        let mut point = SpawnPoint::new(Vec2::ZERO);
        point.update(2.9);
        assert!(!point.active);
        point.update(0.2);
        assert!(!point.active);
        // Activation is checked before the timer moves
        point.update(0.0);
        assert!(point.active);
    }

    #[test]
    fn test_spawn_uses_active_points_only() {
        let mut world = world();
        assert_eq!(world.spawn_enemy(), None);

        world.spawn_points[2].active = true;
        let enemy = world.spawn_enemy().unwrap();
        let position = world.physics().get(enemy).unwrap().body.position;
        assert_eq!(position, world.spawn_points()[2].position);
        assert!(!world.spawn_points()[2].active);
        assert_eq!(world.spawn_points()[2].since_last_spawn, 0.0);
        assert_eq!(world.events(), &[SimEvent::EnemySpawned { enemy }]);
        assert_eq!(world.spawn_enemy(), None);
    }

    #[test]
    fn test_spawn_respects_max_enemies() {
        let mut world = world();
        world.set_max_enemies(2);
        assert!(world.debug_spawn_enemy(Vec2::new(500.0, 500.0)).is_some());
        assert!(world.debug_spawn_enemy(Vec2::new(600.0, 500.0)).is_some());
        assert!(world.debug_spawn_enemy(Vec2::new(700.0, 500.0)).is_none());

        for point in &mut world.spawn_points {
            point.active = true;
        }
        assert!(world.spawn_enemy().is_none());
        assert_eq!(world.enemy_count(), 2);
    }

    #[test]
    fn test_attack_ammo() {
        let mut world = world();
        let aim = Vec2::new(1000.0, 2400.0);

        let ball = world.attack(aim, ProjectileKind::Ball).unwrap();
        assert_eq!(world.player_ammo(), MAX_AMMO - 1);
        let shot = world.physics().get(ball).unwrap();
        assert!(shot.body.velocity.x > 0.0);
        assert!((shot.body.velocity.length() - PROJECTILE_LAUNCH_SPEED).abs() < 0.01);

        world
            .physics
            .get_mut(world.player)
            .and_then(|p| p.kind.character_mut())
            .unwrap()
            .ammo = 0;
        assert!(world.attack(aim, ProjectileKind::Ball).is_none());
        assert!(world.attack(aim, ProjectileKind::Bullet).is_some());
        assert_eq!(world.player_ammo(), 0);

        // Aiming at the player's own centre fires nothing
        let centre = world.physics().get(world.player()).unwrap().body.position;
        assert!(world.attack(centre, ProjectileKind::Bullet).is_none());
    }

    #[test]
    fn test_events_update_health_and_ammo() {
        let mut world = world();
        let config = SimConfig::default();
        let enemy = ObjectId(999);

        world.apply_event(SimEvent::AmmoRecovered { enemy }, &config);
        assert_eq!(world.player_ammo(), MAX_AMMO);

        world.attack(Vec2::ZERO, ProjectileKind::Ball);
        world.apply_event(SimEvent::AmmoRecovered { enemy }, &config);
        assert_eq!(world.player_ammo(), MAX_AMMO);

        world.apply_event(SimEvent::PortalBreached { enemy }, &config);
        assert_eq!(world.portal_health(), PORTAL_HEALTH - PORTAL_DAMAGE);
        assert_eq!(world.events().len(), 3);
    }
}
