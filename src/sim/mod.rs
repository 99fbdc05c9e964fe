//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through `dt` passed by the caller
//! - Seeded RNG only, owned by the session
//! - Stable iteration order (chain order, then firing order)
//! - No rendering or platform dependencies

pub mod chain;
pub mod collision;
pub mod launcher;
pub mod level;
pub mod snapshot;
pub mod spiral;
pub mod state;
pub mod tick;

pub use chain::{Chain, ChainSphere, PowerUpKind, SphereKind};
pub use collision::{circles_overlap, hit_index};
pub use launcher::{Launcher, Projectile};
pub use level::{ActivePowerUp, Level, compose_speed_factor};
pub use snapshot::Snapshot;
pub use spiral::SpiralPath;
pub use state::{Command, GameEvent, GamePhase, GameState};
pub use tick::{TickInput, tick, update};
