//! Portal Defense headless runner
//!
//! Builds the built-in arena (or a level file) and plays a scripted session:
//! the player patrols the floor and fires at enemies while the AI heads for
//! the portal. Logs a summary at the end.
//!
//! Usage: `portal-defense [config.json] [level.json]`

use glam::Vec2;

use portal_defense::consts::SIM_DT;
use portal_defense::physics::ProjectileKind;
use portal_defense::sim::{LevelDesc, TickInput, World, tick};
use portal_defense::{Error, SimConfig, SimEvent};

/// Length of the scripted session
const SESSION_SECONDS: f32 = 120.0;
/// Seconds between direction changes of the patrolling player
const PATROL_PERIOD: f32 = 4.0;

fn main() {
    env_logger::init();
    log::info!("Portal Defense (headless) starting...");

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Error> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => SimConfig::load_or_default(path),
        None => SimConfig::default(),
    };
    let level = match args.next() {
        Some(path) => LevelDesc::load(path)?,
        None => LevelDesc::arena(),
    };

    let mut world = World::new(&level, &config)?;
    let ticks = (SESSION_SECONDS / SIM_DT) as u64;
    let mut breaches = 0u32;
    let mut spawned = 0u32;
    let mut hits = 0u32;

    for t in 0..ticks {
        let input = scripted_input(&world, t);
        tick(&mut world, &input, &config, SIM_DT);

        for event in world.events() {
            match event {
                SimEvent::PortalBreached { .. } => breaches += 1,
                SimEvent::EnemySpawned { .. } => spawned += 1,
                SimEvent::AmmoRecovered { .. } => hits += 1,
                SimEvent::EnemyStranded { .. } | SimEvent::GameOver => {}
            }
        }

        if world.is_game_over() {
            break;
        }
    }

    log::info!(
        "Session over: survived {:.1}s, portal health {}, {} enemies spawned, {} breaches, {} hits, {} left",
        world.score(),
        world.portal_health(),
        spawned,
        breaches,
        hits,
        world.enemy_count()
    );
    Ok(())
}

/// Walk back and forth, hop now and then, and shoot at the nearest enemy
fn scripted_input(world: &World, t: u64) -> TickInput {
    let seconds = t as f32 * SIM_DT;
    let heading_right = (seconds / PATROL_PERIOD) as u64 % 2 == 0;
    let mut input = TickInput {
        move_right: heading_right,
        move_left: !heading_right,
        jump: t % 90 == 0,
        ..Default::default()
    };

    let Some(player) = world.physics().get(world.player()) else {
        return input;
    };
    let origin = player.body.position;
    let nearest = world
        .enemies()
        .iter()
        .filter_map(|e| world.physics().get(e.id))
        .map(|e| e.body.position)
        .min_by(|a, b| a.distance(origin).total_cmp(&b.distance(origin)));

    if let Some(aim) = nearest.filter(|_| t % 30 == 0) {
        let kind = if world.player_ammo() > 0 && t % 120 == 0 {
            ProjectileKind::Ball
        } else {
            ProjectileKind::Bullet
        };
        input.attack = Some((aim + Vec2::new(0.0, -8.0), kind));
    }
    input
}
