//! Gameplay events
//!
//! Physics only records what happened; the world applies the consequences
//! (portal damage, ammo) after each substep.

use serde::{Deserialize, Serialize};

use crate::physics::ObjectId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimEvent {
    /// An enemy touched the portal and was removed
    PortalBreached { enemy: ObjectId },
    /// A projectile struck an enemy; the player gets a ball back
    AmmoRecovered { enemy: ObjectId },
    EnemySpawned { enemy: ObjectId },
    /// Enemy removed because no path to the portal exists
    EnemyStranded { enemy: ObjectId },
    GameOver,
}
