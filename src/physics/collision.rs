//! Contact generation and response
//!
//! Every live dynamic body is tested against every other live body with an
//! AABB overlap check. Contacts are collected for the whole substep, then
//! resolved in order: position correction along the normal first, then an
//! impulse.

use glam::Vec2;

use super::PhysicsWorld;
use super::body::Shape;
use super::object::{ObjectId, ObjectKind};
use crate::event::SimEvent;

/// Offset of the contact point from body A's centre on box contacts
const CONTACT_OFFSET: f32 = 0.2;

/// Debug toggles that change how specific pairs resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactRules {
    pub ignore_character_collision: bool,
    pub projectile_character_collision: bool,
}

impl Default for ContactRules {
    fn default() -> Self {
        Self {
            ignore_character_collision: false,
            projectile_character_collision: true,
        }
    }
}

/// Contact between two objects. Box normals point from B toward A; circle
/// normals point from A toward the circle's centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub a: ObjectId,
    pub b: ObjectId,
    pub normal: Vec2,
    pub point: Vec2,
}

impl Contact {
    pub fn involves_pair(&self, a: ObjectId, b: ObjectId) -> bool {
        (self.a == a && self.b == b) || (self.a == b && self.b == a)
    }
}

impl PhysicsWorld {
    pub(super) fn detect_contacts(&mut self) {
        self.contacts.clear();

        for i in (0..self.objects.len()).rev() {
            if !self.objects[i].is_live() || !self.objects[i].body.is_dynamic {
                continue;
            }
            for j in (0..self.objects.len()).rev() {
                if i == j || !self.objects[j].is_live() {
                    continue;
                }
                if !self.objects[i].body.aabb().overlaps(&self.objects[j].body.aabb()) {
                    continue;
                }

                let contact = self.make_contact(i, j);
                if !self.contacts.iter().any(|c| c.involves_pair(contact.a, contact.b)) {
                    self.contacts.push(contact);
                }
            }
        }
    }

    /// Build the contact for an overlapping pair. Landing on top of something
    /// refreshes contact timers and records the rider.
    fn make_contact(&mut self, ia: usize, ib: usize) -> Contact {
        let a = &self.objects[ia].body;
        let b = &self.objects[ib].body;
        let separation = b.position - a.position;
        let overlap = a.half_extents + b.half_extents - separation.abs();

        let mut on_top = false;
        let (normal, point) = if b.shape == Shape::Circle {
            let normal = separation.try_normalize().unwrap_or(Vec2::NEG_Y);
            (normal, a.position + normal)
        } else if overlap.x > overlap.y {
            if a.position.y < b.position.y {
                on_top = true;
                (Vec2::NEG_Y, a.position + Vec2::new(0.0, CONTACT_OFFSET))
            } else {
                (Vec2::Y, a.position - Vec2::new(0.0, CONTACT_OFFSET))
            }
        } else if a.position.x < b.position.x {
            (Vec2::NEG_X, a.position + Vec2::new(CONTACT_OFFSET, 0.0))
        } else {
            (Vec2::X, a.position - Vec2::new(CONTACT_OFFSET, 0.0))
        };

        let id_a = self.objects[ia].id;
        let id_b = self.objects[ib].id;

        if on_top {
            let a_is_target = self.objects[ia].kind.is_target();
            let a_is_character = self.objects[ia].kind.is_character();

            let a = &mut self.objects[ia];
            a.ticks_since_collision = 0;
            a.ticks_since_floor = 0;

            let b = &mut self.objects[ib];
            if b.body.is_dynamic && !a_is_target {
                b.ticks_since_collision = 0;
                b.ticks_since_floor = 0;
            }
            if a_is_character && !b.riders.contains(&id_a) {
                b.riders.push(id_a);
            }
        }

        Contact {
            a: id_a,
            b: id_b,
            normal,
            point,
        }
    }

    pub(super) fn resolve_contacts(&mut self, rules: ContactRules, events: &mut Vec<SimEvent>) {
        let contacts = std::mem::take(&mut self.contacts);
        for contact in &contacts {
            self.resolve(contact, rules, events);
        }
        self.contacts = contacts;
    }

    fn resolve(&mut self, contact: &Contact, rules: ContactRules, events: &mut Vec<SimEvent>) {
        let (Some(ia), Some(ib)) = (self.index_of(contact.a), self.index_of(contact.b)) else {
            return;
        };
        if !self.objects[ia].is_live() || !self.objects[ib].is_live() {
            return;
        }

        let kind_a = self.objects[ia].kind;
        let kind_b = self.objects[ib].kind;

        if kind_a.is_projectile() && kind_b.is_projectile() {
            return;
        }
        if kind_a.is_character() && kind_b.is_character() && rules.ignore_character_collision {
            return;
        }

        if kind_b.is_target() || (kind_a.is_target() && self.objects[ib].body.is_dynamic) {
            let visitor = if kind_b.is_character() {
                Some(ib)
            } else if kind_a.is_character() {
                Some(ia)
            } else {
                None
            };
            if let Some(index) = visitor {
                let enemy = &mut self.objects[index];
                if enemy.kind.is_enemy() {
                    enemy.marked_for_deletion = true;
                    events.push(SimEvent::PortalBreached { enemy: enemy.id });
                }
            }
            return;
        }

        let shot = if kind_a.is_projectile() {
            Some((ia, ib))
        } else if kind_b.is_projectile() {
            Some((ib, ia))
        } else {
            None
        };

        let elasticity = match shot {
            Some((projectile, struck)) => {
                if let Some(character) = self.objects[struck].kind.character() {
                    if character.is_player {
                        return;
                    }
                    let enemy = self.objects[struck].id;
                    events.push(SimEvent::AmmoRecovered { enemy });
                    if !rules.projectile_character_collision {
                        self.objects[struck].marked_for_deletion = true;
                        return;
                    }
                }

                let projectile = &mut self.objects[projectile];
                if let ObjectKind::Projectile(p) = &mut projectile.kind {
                    p.bounces += 1;
                }
                projectile.elasticity
            }
            None if kind_a.is_target() => self.objects[ia].elasticity,
            None => self.objects[ib].elasticity,
        };

        let normal = contact.normal.normalize_or_zero();
        self.separate(ia, ib, normal, contact.point);
        self.apply_impulse(ia, ib, normal, elasticity);
    }

    /// Push dynamic bodies out along the normal by the depth of A's centre
    /// behind the contact plane
    fn separate(&mut self, ia: usize, ib: usize, normal: Vec2, point: Vec2) {
        let depth = normal.dot(self.objects[ia].body.position - point);
        let displacement = -normal * depth;

        let a = &mut self.objects[ia].body;
        if a.is_dynamic {
            a.position -= displacement;
        }
        let b = &mut self.objects[ib].body;
        if b.is_dynamic {
            b.position += displacement;
        }
    }

    fn apply_impulse(&mut self, ia: usize, ib: usize, normal: Vec2, elasticity: f32) {
        let keeps_a = self.objects[ia].kind.keeps_scripted_velocity();
        let keeps_b = self.objects[ib].kind.keeps_scripted_velocity();
        let (a, b) = pair_mut(&mut self.objects, ia, ib);
        let (a, b) = (&mut a.body, &mut b.body);

        let va = a.velocity;
        let vb = b.velocity;
        let restitution = -(1.0 + elasticity) * (va - vb).dot(normal);

        if !a.is_dynamic {
            let impulse = restitution / b.inverse_mass();
            if !keeps_a {
                a.velocity = Vec2::ZERO;
            }
            b.velocity = vb - normal * (impulse * b.inverse_mass());
        } else if !b.is_dynamic {
            let impulse = restitution / a.inverse_mass();
            if !keeps_b {
                b.velocity = Vec2::ZERO;
            }
            a.velocity = va + normal * (impulse * a.inverse_mass());
        } else {
            let impulse = restitution / (a.inverse_mass() + b.inverse_mass());
            a.velocity = va + normal * (impulse * a.inverse_mass());
            b.velocity = vb - normal * (impulse * b.inverse_mass());
        }
    }
}

/// Two distinct mutable elements of a slice
fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(i, j);
    if i < j {
        let (left, right) = items.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConfig;
    use crate::consts::*;
    use crate::physics::integrate::integrate_velocity;
    use crate::physics::object::{PhysObject, ProjectileKind};

    fn add(world: &mut PhysicsWorld, build: impl FnOnce(ObjectId) -> PhysObject) -> ObjectId {
        let id = world.next_object_id();
        world.add(build(id))
    }

    fn step(world: &mut PhysicsWorld, rules: ContactRules) -> Vec<SimEvent> {
        let mut events = Vec::new();
        world.detect_contacts();
        world.resolve_contacts(rules, &mut events);
        events
    }

    /// Two characters overlapping slightly side by side
    fn head_on(elasticity: f32) -> (PhysicsWorld, ObjectId, ObjectId) {
        let mut world = PhysicsWorld::new();
        let a = add(&mut world, |id| {
            let mut o = PhysObject::character(id, Vec2::new(0.0, 0.0), false);
            o.body.velocity = Vec2::new(100.0, 0.0);
            o.elasticity = elasticity;
            o
        });
        let b = add(&mut world, |id| {
            let mut o = PhysObject::character(id, Vec2::new(30.0, 0.0), false);
            o.body.velocity = Vec2::new(-100.0, 0.0);
            o.elasticity = elasticity;
            o
        });
        (world, a, b)
    }

    #[test]
    fn test_elastic_equal_masses_swap() {
        let (mut world, a, b) = head_on(1.0);
        step(&mut world, ContactRules::default());

        let va = world.get(a).unwrap().body.velocity;
        let vb = world.get(b).unwrap().body.velocity;
        assert!((va.x - -100.0).abs() < 0.001);
        assert!((vb.x - 100.0).abs() < 0.001);
        // Momentum conserved
        assert!((va.x + vb.x).abs() < 0.001);
    }

    #[test]
    fn test_inelastic_common_velocity() {
        let (mut world, a, b) = head_on(0.0);
        step(&mut world, ContactRules::default());

        let va = world.get(a).unwrap().body.velocity;
        let vb = world.get(b).unwrap().body.velocity;
        assert!(va.x.abs() < 0.001);
        assert!(vb.x.abs() < 0.001);
    }

    #[test]
    fn test_pair_resolved_once() {
        let (mut world, _, _) = head_on(1.0);
        world.detect_contacts();
        assert_eq!(world.contacts.len(), 1);
    }

    #[test]
    fn test_ignore_character_collision() {
        let (mut world, a, _) = head_on(1.0);
        let rules = ContactRules {
            ignore_character_collision: true,
            ..Default::default()
        };
        step(&mut world, rules);
        assert_eq!(world.get(a).unwrap().body.velocity.x, 100.0);
    }

    #[test]
    fn test_static_block_never_moves() {
        let mut world = PhysicsWorld::new();
        let floor = add(&mut world, |id| {
            PhysObject::block(id, Vec2::new(0.0, 100.0), Vec2::new(400.0, 64.0))
        });
        let enemy = add(&mut world, |id| {
            let mut o = PhysObject::character(id, Vec2::new(0.0, 60.0), false);
            o.body.velocity = Vec2::new(20.0, 300.0);
            o.ticks_since_floor = 40;
            o
        });

        for _ in 0..5 {
            step(&mut world, ContactRules::default());
        }

        let block = world.get(floor).unwrap();
        assert_eq!(block.body.position, Vec2::new(0.0, 100.0));
        assert_eq!(block.body.velocity, Vec2::ZERO);

        let enemy = world.get(enemy).unwrap();
        // Landing kills the downward speed and pushes the body up
        assert!(enemy.body.velocity.y.abs() < 0.001);
        assert!(enemy.body.position.y < 60.0);
        assert_eq!(enemy.ticks_since_floor, 0);
        assert!(world.get(floor).unwrap().riders.contains(&enemy.id));
    }

    #[test]
    fn test_circle_contact_normal() {
        let mut world = PhysicsWorld::new();
        let shot = add(&mut world, |id| {
            PhysObject::projectile(id, Vec2::new(0.0, 0.0), Vec2::X, ProjectileKind::Bullet)
        });
        let pendulum = add(&mut world, |id| {
            PhysObject::pendulum(id, Vec2::new(20.0, -128.0), Vec2::new(0.0, 128.0))
        });

        world.detect_contacts();
        let contact = world.contacts[0];
        assert_eq!((contact.a, contact.b), (shot, pendulum));
        assert!((contact.normal - Vec2::X).length() < 0.001);
        assert!((contact.point - Vec2::X).length() < 0.001);
    }

    #[test]
    fn test_projectile_bounce_counts_and_ammo() {
        let mut world = PhysicsWorld::new();
        let enemy = add(&mut world, |id| PhysObject::character(id, Vec2::new(20.0, 0.0), false));
        let shot = add(&mut world, |id| {
            PhysObject::projectile(id, Vec2::ZERO, Vec2::X, ProjectileKind::Ball)
        });

        let events = step(&mut world, ContactRules::default());
        assert_eq!(events, vec![SimEvent::AmmoRecovered { enemy }]);
        let ObjectKind::Projectile(p) = world.get(shot).unwrap().kind else {
            panic!("expected projectile");
        };
        assert_eq!(p.bounces, 1);
        assert!(world.get(enemy).unwrap().is_live());
        assert!(world.get(shot).unwrap().body.velocity.x < 0.0);
    }

    #[test]
    fn test_ball_expires_on_the_update_after_its_last_bounce() {
        let config = PhysicsConfig::default();
        let dt = SIM_DT / PHYSICS_SUBSTEPS as f32;
        let mut world = PhysicsWorld::new();
        add(&mut world, |id| PhysObject::block(id, Vec2::new(10.0, 0.0), Vec2::new(16.0, 64.0)));
        let ball = add(&mut world, |id| {
            PhysObject::projectile(id, Vec2::ZERO, Vec2::X, ProjectileKind::Ball)
        });
        let bounces = |world: &PhysicsWorld| match world.get(ball).unwrap().kind {
            ObjectKind::Projectile(p) => p.bounces,
            _ => panic!("expected projectile"),
        };

        for n in 1..=6 {
            // Back into the wall so every resolve counts one hit
            world.get_mut(ball).unwrap().body.position = Vec2::ZERO;
            step(&mut world, ContactRules::default());
            assert_eq!(bounces(&world), n);
            assert!(world.get(ball).unwrap().is_live(), "bounce {n}");

            integrate_velocity(world.get_mut(ball).unwrap(), &config, dt);
            assert_eq!(world.get(ball).unwrap().is_live(), n < 6, "after bounce {n}");
        }
    }

    #[test]
    fn test_projectile_removes_enemy_when_bounce_disabled() {
        let mut world = PhysicsWorld::new();
        let enemy = add(&mut world, |id| PhysObject::character(id, Vec2::new(20.0, 0.0), false));
        let shot = add(&mut world, |id| {
            PhysObject::projectile(id, Vec2::ZERO, Vec2::X, ProjectileKind::Ball)
        });
        let rules = ContactRules {
            projectile_character_collision: false,
            ..Default::default()
        };

        let events = step(&mut world, rules);
        assert_eq!(events, vec![SimEvent::AmmoRecovered { enemy }]);
        assert!(!world.get(enemy).unwrap().is_live());
        // Projectile carries on untouched
        assert_eq!(
            world.get(shot).unwrap().body.velocity,
            Vec2::new(PROJECTILE_LAUNCH_SPEED, 0.0)
        );
    }

    #[test]
    fn test_projectile_ignores_player_and_other_projectiles() {
        let mut world = PhysicsWorld::new();
        let player = add(&mut world, |id| PhysObject::character(id, Vec2::new(20.0, 0.0), true));
        let shot = add(&mut world, |id| {
            PhysObject::projectile(id, Vec2::ZERO, Vec2::X, ProjectileKind::Ball)
        });
        let other = add(&mut world, |id| {
            PhysObject::projectile(id, Vec2::new(-4.0, 0.0), Vec2::NEG_X, ProjectileKind::Bullet)
        });

        let events = step(&mut world, ContactRules::default());
        assert!(events.is_empty());
        assert_eq!(world.get(player).unwrap().body.velocity, Vec2::ZERO);
        assert_eq!(
            world.get(shot).unwrap().body.velocity,
            Vec2::new(PROJECTILE_LAUNCH_SPEED, 0.0)
        );
        assert_eq!(
            world.get(other).unwrap().body.velocity,
            Vec2::new(-PROJECTILE_LAUNCH_SPEED, 0.0)
        );
    }

    #[test]
    fn test_enemy_breaches_portal_once() {
        let mut world = PhysicsWorld::new();
        let enemy = add(&mut world, |id| PhysObject::character(id, Vec2::new(0.0, 0.0), false));
        add(&mut world, |id| PhysObject::target(id, Vec2::new(20.0, 0.0), Vec2::new(150.0, 0.0)));
        let player = add(&mut world, |id| PhysObject::character(id, Vec2::new(40.0, 0.0), true));

        let mut events = step(&mut world, ContactRules::default());
        events.extend(step(&mut world, ContactRules::default()));
        assert_eq!(events, vec![SimEvent::PortalBreached { enemy }]);
        assert!(!world.get(enemy).unwrap().is_live());
        assert!(world.get(player).unwrap().is_live());
    }

    #[test]
    fn test_target_bounces_off_static_geometry() {
        let mut world = PhysicsWorld::new();
        let target = add(&mut world, |id| {
            PhysObject::target(id, Vec2::new(0.0, 0.0), Vec2::new(150.0, 0.0))
        });
        add(&mut world, |id| PhysObject::block(id, Vec2::new(40.0, 0.0), Vec2::new(64.0, 400.0)));

        step(&mut world, ContactRules::default());
        let target = world.get(target).unwrap();
        assert!((target.body.velocity.x - -150.0).abs() < 0.001);
    }
}
