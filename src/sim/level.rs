//! Level data: geometry, spawn points and the waypoint layout
//!
//! Everything here is authored data. The simulation only reads it once when
//! a [`World`](super::World) is built.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::nav::WaypointLayout;

/// Static box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockDesc {
    pub center: Vec2,
    pub size: Vec2,
}

/// Box that patrols horizontally between two x bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlatformDesc {
    pub center: Vec2,
    pub size: Vec2,
    pub patrol_start: Vec2,
    pub patrol_end: Vec2,
    pub velocity: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendulumDesc {
    pub anchor: Vec2,
    pub arm: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDesc {
    pub player_start: Vec2,
    pub target_start: Vec2,
    pub blocks: Vec<BlockDesc>,
    #[serde(default)]
    pub platforms: Vec<PlatformDesc>,
    #[serde(default)]
    pub pendulums: Vec<PendulumDesc>,
    pub spawn_points: Vec<Vec2>,
    pub waypoints: WaypointLayout,
}

fn block(x: f32, y: f32, width: f32, height: f32) -> BlockDesc {
    BlockDesc {
        center: Vec2::new(x, y),
        size: Vec2::new(width, height),
    }
}

impl LevelDesc {
    /// Small three-tier arena: a floor, two ledges and a middle platform,
    /// enclosed by walls, with a pendulum and two patrolling platforms
    pub fn arena() -> Self {
        let blocks = vec![
            // Bounds
            block(-480.0, 1248.0, 1024.0, 2496.0),
            block(2528.0, 1248.0, 1024.0, 2496.0),
            block(1024.0, -480.0, 4096.0, 1024.0),
            block(1024.0, 2464.0, 2048.0, 64.0),
            // Ledges
            block(448.0, 2256.0, 384.0, 32.0),
            block(1600.0, 2256.0, 384.0, 32.0),
            // Middle
            block(1024.0, 2096.0, 512.0, 32.0),
        ];

        let platforms = vec![
            PlatformDesc {
                center: Vec2::new(448.0, 1936.0),
                size: Vec2::new(256.0, 32.0),
                patrol_start: Vec2::new(320.0, 1936.0),
                patrol_end: Vec2::new(704.0, 1936.0),
                velocity: Vec2::new(100.0, 0.0),
            },
            PlatformDesc {
                center: Vec2::new(1600.0, 1936.0),
                size: Vec2::new(256.0, 32.0),
                patrol_start: Vec2::new(1344.0, 1936.0),
                patrol_end: Vec2::new(1728.0, 1936.0),
                velocity: Vec2::new(-100.0, 0.0),
            },
        ];

        let pendulums = vec![PendulumDesc {
            anchor: Vec2::new(1024.0, 2096.0),
            arm: Vec2::new(128.0, 0.0),
        }];

        // Row 2 stands on the floor, row 8 on the ledges, row 13 on the middle
        let mut waypoints = WaypointLayout::default();
        let floor_far_left = waypoints.waypoint(4, 2);
        let floor_left = waypoints.waypoint(22, 2);
        let floor_mid = waypoints.waypoint(32, 2);
        let floor_right = waypoints.waypoint(42, 2);
        let floor_far_right = waypoints.waypoint(60, 2);
        let ledge_left_out = waypoints.waypoint(10, 8);
        let ledge_left_in = waypoints.waypoint(18, 8);
        let ledge_right_in = waypoints.waypoint(46, 8);
        let ledge_right_out = waypoints.waypoint(54, 8);
        let mid_left = waypoints.waypoint(26, 13);
        let mid_centre = waypoints.waypoint(32, 13);
        let mid_right = waypoints.waypoint(38, 13);

        waypoints
            .walk(floor_far_left, floor_left)
            .walk(floor_left, floor_mid)
            .walk(floor_mid, floor_right)
            .walk(floor_right, floor_far_right)
            .climb(floor_left, ledge_left_in)
            .climb(floor_right, ledge_right_in)
            .walk(ledge_left_out, ledge_left_in)
            .walk(ledge_right_in, ledge_right_out)
            .climb(ledge_left_in, mid_left)
            .climb(ledge_right_in, mid_right)
            .walk(mid_left, mid_centre)
            .walk(mid_centre, mid_right);

        Self {
            player_start: Vec2::new(64.0, 2400.0),
            target_start: Vec2::new(1024.0, 2240.0),
            blocks,
            platforms,
            pendulums,
            spawn_points: vec![
                Vec2::new(336.0, 2208.0),
                Vec2::new(1744.0, 2208.0),
                Vec2::new(1040.0, 2048.0),
                Vec2::new(1936.0, 2400.0),
            ],
            waypoints,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Static geometry as `(center, half_extents)`, for blocking grid nodes.
    /// Moving platforms never block.
    pub fn blockers(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.blocks.iter().map(|b| (b.center, b.size * 0.5))
    }
}
