//! Deterministic simulation module
//!
//! Ties physics and navigation together. This module must stay deterministic:
//! - Fixed timestep and fixed substep count
//! - Seeded RNG only
//! - Stable iteration order (by object id)
//! - No rendering or platform dependencies

pub mod level;
pub mod state;
pub mod tick;

pub use level::{BlockDesc, LevelDesc, PendulumDesc, PlatformDesc};
pub use state::{Enemy, SpawnPoint, World};
pub use tick::{TickInput, tick};
