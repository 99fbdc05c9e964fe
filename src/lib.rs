//! Spiral Shooter - a spiral-chain marble shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spiral path, chain, launcher, session)
//! - `tuning`: Data-driven game balance
//!
//! Rendering, input decoding and window management live outside this crate;
//! they drive the simulation through [`sim::Command`] / [`sim::TickInput`] and
//! read it back through [`sim::Snapshot`].

pub mod sim;
pub mod tuning;

pub use tuning::{ConfigError, LevelConfig, LevelTable, Tuning};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Nominal frame time used for discrete (keyboard) rotation steps
    pub const NOMINAL_TICK: f32 = 1.0 / 60.0;

    /// Visible play area (screen space, y grows downward)
    pub const SCREEN_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;

    /// Spiral geometry
    pub const SPIRAL_CENTER_X: f32 = SCREEN_WIDTH / 2.0;
    pub const SPIRAL_CENTER_Y: f32 = SCREEN_HEIGHT / 2.0;
    pub const SPIRAL_START_RADIUS: f32 = 250.0;
    pub const SPIRAL_END_RADIUS: f32 = 30.0;
    /// Radius lost per unit of path parameter
    pub const SPIRAL_TIGHTNESS: f32 = 1.5;
    /// Winding rate (radians per unit of path parameter)
    pub const SPIRAL_ANGULAR_RATE: f32 = 0.2;

    /// Chain spheres
    pub const SPHERE_RADIUS: f32 = 15.0;
    pub const SPHERE_GAP: f32 = 2.0;
    /// Centre-to-centre distance between neighbours in the chain
    pub const CHAIN_SPACING: f32 = SPHERE_RADIUS * 2.0 + SPHERE_GAP;

    /// Launcher defaults - sits in the middle of the spiral
    pub const LAUNCHER_X: f32 = SCREEN_WIDTH / 2.0;
    pub const LAUNCHER_Y: f32 = SCREEN_HEIGHT / 2.0;
    pub const LAUNCHER_RADIUS: f32 = 20.0;
    /// Nominal rotation speed (radians/sec); smoothing allows 5x this
    pub const LAUNCHER_ROTATION_SPEED: f32 = std::f32::consts::PI;
    pub const SHOT_SPEED: f32 = 250.0;
    pub const SHOT_COOLDOWN_BASE: f32 = 0.8;
    /// Short recoil window after every shot
    pub const SHOT_RECOIL: f32 = 0.2;
    pub const BURST_SPREAD: f32 = 10.0 * std::f32::consts::PI / 180.0;

    /// Rules
    pub const LIVES: u8 = 3;
    pub const MIN_MATCH: usize = 3;
    pub const POINTS_PER_SPHERE: u64 = 10;
    pub const PICKUP_BONUS: u64 = 150;

    /// Power-ups
    pub const POWERUP_DURATION: f32 = 6.0;
    pub const POWERUP_SLOW_FACTOR: f32 = 0.35;
    pub const FAST_SHOT_MULTIPLIER: f32 = 1.5;
    pub const BURST_SHOT_COUNT: u32 = 3;
    pub const EXPLOSION_RADIUS: usize = 3;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Signed shortest rotation taking `from` onto `to`, in [-π, π)
#[inline]
pub fn shortest_angle_delta(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_wraps() {
        // 3π lands on the ±π seam; either side is the same direction
        assert!(shortest_angle_delta(normalize_angle(3.0 * PI), PI).abs() < 1e-5);
        assert!((normalize_angle(2.5 * PI) - 0.5 * PI).abs() < 1e-5);
        assert!((normalize_angle(-3.5 * PI) - (0.5 * PI)).abs() < 1e-5);
        assert_eq!(normalize_angle(0.25), 0.25);
    }

    #[test]
    fn test_shortest_delta_crosses_seam() {
        // 170° -> -170° is a +20° turn, not -340°
        let d = shortest_angle_delta(170f32.to_radians(), -170f32.to_radians());
        assert!((d - 20f32.to_radians()).abs() < 1e-4);
    }
}
