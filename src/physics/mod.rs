//! Rigid-body physics
//!
//! One call to [`PhysicsWorld::advance`] is one substep:
//! - integrate dynamic bodies, then the scripted movers
//! - detect overlapping pairs (AABB, touching counts)
//! - resolve each pair once: positional correction, then impulse
//!
//! Gameplay consequences of contacts are reported as [`SimEvent`]s; bodies
//! removed by a contact are only marked, and stay inert until
//! [`PhysicsWorld::flush_deleted`] runs at the end of the tick.

pub mod body;
pub mod collision;
pub mod integrate;
pub mod object;

pub use body::{Aabb, RigidBody, Shape};
pub use collision::{Contact, ContactRules};
pub use object::{
    Character, ObjectId, ObjectKind, Patrol, Pendulum, PhysObject, Projectile, ProjectileKind,
};

use crate::config::PhysicsConfig;
use crate::event::SimEvent;

/// Owns every object; stored sorted by id so iteration order is stable
#[derive(Debug, Clone, Default)]
pub struct PhysicsWorld {
    objects: Vec<PhysObject>,
    next_id: u32,
    /// Contacts found in the last substep
    contacts: Vec<Contact>,
}

impl PhysicsWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new object id
    pub fn next_object_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Insert an object, keeping id order
    pub fn add(&mut self, object: PhysObject) -> ObjectId {
        let id = object.id;
        if id.0 >= self.next_id {
            self.next_id = id.0 + 1;
        }
        match self.objects.binary_search_by_key(&id, |o| o.id) {
            Ok(index) => {
                log::warn!("Replacing object {:?}", id);
                self.objects[index] = object;
            }
            Err(index) => self.objects.insert(index, object),
        }
        id
    }

    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.binary_search_by_key(&id, |o| o.id).ok()
    }

    pub fn get(&self, id: ObjectId) -> Option<&PhysObject> {
        self.index_of(id).map(|i| &self.objects[i])
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut PhysObject> {
        self.index_of(id).map(|i| &mut self.objects[i])
    }

    pub fn objects(&self) -> &[PhysObject] {
        &self.objects
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Run one substep
    pub fn advance(
        &mut self,
        dt: f32,
        config: &PhysicsConfig,
        rules: ContactRules,
        events: &mut Vec<SimEvent>,
    ) {
        for i in 0..self.objects.len() {
            let object = &self.objects[i];
            if !object.is_live() || !object.body.is_dynamic {
                continue;
            }
            self.integrate(i, config, dt);
            integrate::enforce_cruise_speed(&mut self.objects[i], config);
        }

        for i in 0..self.objects.len() {
            let object = &self.objects[i];
            if !object.is_live() || object.body.is_dynamic || !object.kind.is_kinematic() {
                continue;
            }
            self.integrate(i, config, dt);
        }

        self.detect_contacts();
        log::trace!("{} contacts", self.contacts.len());
        self.resolve_contacts(rules, events);
    }

    /// Drop every marked object and return the removed ids
    pub fn flush_deleted(&mut self) -> Vec<ObjectId> {
        let removed: Vec<ObjectId> = self
            .objects
            .iter()
            .filter(|o| o.marked_for_deletion)
            .map(|o| o.id)
            .collect();
        if removed.is_empty() {
            return removed;
        }

        self.objects.retain(|o| !o.marked_for_deletion);
        for object in &mut self.objects {
            object.riders.retain(|id| !removed.contains(id));
        }
        self.contacts
            .retain(|c| !removed.contains(&c.a) && !removed.contains(&c.b));
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use glam::Vec2;

    const DT: f32 = SIM_DT / PHYSICS_SUBSTEPS as f32;

    fn spawn(world: &mut PhysicsWorld, build: impl FnOnce(ObjectId) -> PhysObject) -> ObjectId {
        let id = world.next_object_id();
        world.add(build(id))
    }

    fn run(world: &mut PhysicsWorld, substeps: u32) -> Vec<SimEvent> {
        let config = PhysicsConfig::default();
        let mut events = Vec::new();
        for _ in 0..substeps {
            world.advance(DT, &config, ContactRules::default(), &mut events);
        }
        events
    }

    #[test]
    fn test_ids_stay_sorted() {
        let mut world = PhysicsWorld::new();
        world.add(PhysObject::block(ObjectId(7), Vec2::ZERO, Vec2::ONE));
        world.add(PhysObject::block(ObjectId(3), Vec2::ZERO, Vec2::ONE));
        let next = world.next_object_id();
        assert_eq!(next, ObjectId(8));
        world.add(PhysObject::block(next, Vec2::ZERO, Vec2::ONE));

        let ids: Vec<u32> = world.objects().iter().map(|o| o.id.0).collect();
        assert_eq!(ids, vec![3, 7, 8]);
        assert!(world.get(ObjectId(5)).is_none());
        assert_eq!(world.len(), 3);
    }

    #[test]
    fn test_enemy_lands_and_rests_on_floor() {
        let mut world = PhysicsWorld::new();
        let floor = spawn(&mut world, |id| {
            PhysObject::block(id, Vec2::new(500.0, 600.0), Vec2::new(1000.0, 64.0))
        });
        let enemy = spawn(&mut world, |id| PhysObject::character(id, Vec2::new(500.0, 400.0), false));

        run(&mut world, 600);

        let enemy = world.get(enemy).unwrap();
        let top = world.get(floor).unwrap().body.aabb().min.y;
        assert!(!enemy.airborne);
        // Resting within a few pixels of the surface
        let bottom = enemy.body.aabb().max.y;
        assert!((bottom - top).abs() < 4.0, "bottom {bottom} top {top}");
        assert!(enemy.body.velocity.y.abs() < 20.0);
        assert_eq!(world.get(floor).unwrap().body.position, Vec2::new(500.0, 600.0));
    }

    #[test]
    fn test_platform_carries_rider() {
        let mut world = PhysicsWorld::new();
        let patrol = Patrol {
            start: Vec2::new(0.0, 300.0),
            end: Vec2::new(1000.0, 300.0),
        };
        let platform = spawn(&mut world, |id| {
            PhysObject::moving_platform(
                id,
                Vec2::new(400.0, 300.0),
                Vec2::new(256.0, 32.0),
                patrol,
                Vec2::new(100.0, 0.0),
            )
        });
        let enemy = spawn(&mut world, |id| PhysObject::character(id, Vec2::new(400.0, 268.0), false));

        run(&mut world, 300);

        let platform = world.get(platform).unwrap();
        let enemy_x = world.get(enemy).unwrap().body.position.x;
        assert!(platform.body.position.x > 440.0);
        assert!(platform.riders.contains(&enemy));
        // Dragged along with the platform
        assert!(enemy_x > 420.0, "enemy at {enemy_x}");
        assert!((platform.body.velocity.x - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_platform_adopts_stacked_riders_and_drops_stale_ones() {
        let config = PhysicsConfig::default();
        let mut world = PhysicsWorld::new();
        let patrol = Patrol {
            start: Vec2::new(0.0, 300.0),
            end: Vec2::new(1000.0, 300.0),
        };
        let platform = spawn(&mut world, |id| {
            PhysObject::moving_platform(
                id,
                Vec2::new(400.0, 300.0),
                Vec2::new(256.0, 32.0),
                patrol,
                Vec2::new(100.0, 0.0),
            )
        });
        let lower = spawn(&mut world, |id| PhysObject::character(id, Vec2::new(400.0, 268.0), false));
        let upper = spawn(&mut world, |id| PhysObject::character(id, Vec2::new(400.0, 236.0), false));

        // Lower rides the platform, upper rides lower (and lists the platform)
        world.get_mut(platform).unwrap().riders = vec![lower];
        world.get_mut(lower).unwrap().riders = vec![upper, platform];
        let index = world.index_of(platform).unwrap();

        world.integrate(index, &config, DT);
        assert_eq!(world.get(platform).unwrap().riders, vec![lower, upper]);
        let carried = world.get(upper).unwrap().body.position.x;
        assert!((carried - (400.0 + 100.0 * DT)).abs() < 0.001);

        // Adopting again adds nothing
        world.integrate(index, &config, DT);
        assert_eq!(world.get(platform).unwrap().riders, vec![lower, upper]);

        // Both lose contact long enough to be forgotten
        for id in [lower, upper] {
            world.get_mut(id).unwrap().ticks_since_collision = CONTACT_MEMORY_TICKS;
        }
        world.integrate(index, &config, DT);
        assert!(world.get(platform).unwrap().riders.is_empty());
        assert!((world.get(upper).unwrap().body.position.x - carried - 100.0 * DT).abs() < 0.001);
    }

    #[test]
    fn test_riders_are_dropped_after_leaving_the_platform() {
        let mut world = PhysicsWorld::new();
        let patrol = Patrol {
            start: Vec2::new(0.0, 300.0),
            end: Vec2::new(1000.0, 300.0),
        };
        let platform = spawn(&mut world, |id| {
            PhysObject::moving_platform(
                id,
                Vec2::new(400.0, 300.0),
                Vec2::new(256.0, 32.0),
                patrol,
                Vec2::new(100.0, 0.0),
            )
        });
        let enemy = spawn(&mut world, |id| PhysObject::character(id, Vec2::new(400.0, 268.0), false));
        run(&mut world, 30);
        assert!(world.get(platform).unwrap().riders.contains(&enemy));

        // Lifted far above and held there
        for _ in 0..CONTACT_MEMORY_TICKS + 30 {
            let rider = world.get_mut(enemy).unwrap();
            rider.body.position = Vec2::new(400.0, -2000.0);
            rider.body.velocity = Vec2::ZERO;
            run(&mut world, 1);
        }
        assert!(world.get(platform).unwrap().riders.is_empty());
    }

    #[test]
    fn test_marked_objects_are_inert_until_flushed() {
        let mut world = PhysicsWorld::new();
        let floor = spawn(&mut world, |id| {
            PhysObject::block(id, Vec2::new(0.0, 100.0), Vec2::new(400.0, 64.0))
        });
        let enemy = spawn(&mut world, |id| PhysObject::character(id, Vec2::new(0.0, 52.0), false));
        run(&mut world, 1);
        assert!(world.get(floor).unwrap().riders.contains(&enemy));

        world.get_mut(enemy).unwrap().marked_for_deletion = true;
        let before = world.get(enemy).unwrap().body.position;
        run(&mut world, 10);
        assert_eq!(world.get(enemy).unwrap().body.position, before);

        assert_eq!(world.flush_deleted(), vec![enemy]);
        assert!(world.get(enemy).is_none());
        assert!(world.get(floor).unwrap().riders.is_empty());
        assert!(world.flush_deleted().is_empty());
    }

    #[test]
    fn test_breach_event_from_advance() {
        let mut world = PhysicsWorld::new();
        let enemy = spawn(&mut world, |id| PhysObject::character(id, Vec2::new(0.0, 0.0), false));
        spawn(&mut world, |id| PhysObject::target(id, Vec2::new(40.0, 0.0), Vec2::new(-150.0, 0.0)));

        let events = run(&mut world, 60);
        assert_eq!(events, vec![SimEvent::PortalBreached { enemy }]);
        assert_eq!(world.flush_deleted(), vec![enemy]);
    }

    #[test]
    fn test_pendulum_swings_without_gravity_drop() {
        let mut world = PhysicsWorld::new();
        let anchor = Vec2::new(300.0, 100.0);
        let pendulum = spawn(&mut world, |id| PhysObject::pendulum(id, anchor, Vec2::new(128.0, 0.0)));
        run(&mut world, 50);

        let bob = world.get(pendulum).unwrap();
        assert!((bob.body.position.distance(anchor) - 128.0).abs() < 0.5);
        assert_ne!(bob.body.position, anchor + Vec2::new(128.0, 0.0));
    }
}
