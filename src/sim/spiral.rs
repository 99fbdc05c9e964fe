//! Spiral path geometry
//!
//! Chain spheres live on the path as a scalar parameter `t`, not an angle.
//! `t` grows toward the center: the radius shrinks linearly with `t` while
//! the angle winds at a constant (cosmetic) rate. There is no closed-form
//! inverse for arc length on a shrinking spiral, so spacing is found
//! numerically with [`SpiralPath::step_to`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::polar_to_cartesian;

/// Acceptable chord-length error when stepping along the path
pub const STEP_TOLERANCE: f32 = 0.5;
/// Iteration cap for [`SpiralPath::step_to`]; exhausting it gives a
/// best-effort answer, so callers must tolerate approximate spacing
pub const STEP_ITERATION_CAP: u32 = 200;

/// An inward spiral in screen space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpiralPath {
    pub center: Vec2,
    pub start_radius: f32,
    /// Radius at which the chain has reached the end
    pub end_radius: f32,
    /// Radius lost per unit of `t`
    pub tightness: f32,
    /// Radians per unit of `t`
    pub angular_rate: f32,
}

impl Default for SpiralPath {
    fn default() -> Self {
        Self {
            center: Vec2::new(SPIRAL_CENTER_X, SPIRAL_CENTER_Y),
            start_radius: SPIRAL_START_RADIUS,
            end_radius: SPIRAL_END_RADIUS,
            tightness: SPIRAL_TIGHTNESS,
            angular_rate: SPIRAL_ANGULAR_RATE,
        }
    }
}

impl SpiralPath {
    #[inline]
    pub fn radius_at(&self, t: f32) -> f32 {
        (self.start_radius - self.tightness * t).max(0.0)
    }

    #[inline]
    pub fn angle_at(&self, t: f32) -> f32 {
        self.angular_rate * t
    }

    #[inline]
    pub fn position_at(&self, t: f32) -> Vec2 {
        self.center + polar_to_cartesian(self.radius_at(t), self.angle_at(t))
    }

    /// Straight-line distance between two points on the path
    #[inline]
    pub fn chord_length(&self, t0: f32, t1: f32) -> f32 {
        self.position_at(t0).distance(self.position_at(t1))
    }

    /// Parameter value at which a sphere has reached the end radius
    pub fn end_t(&self) -> f32 {
        (self.start_radius - self.end_radius) / self.tightness
    }

    /// True once the radius at `t` is at or inside the end radius
    #[inline]
    pub fn is_at_end(&self, t: f32) -> bool {
        self.radius_at(t) <= self.end_radius
    }

    /// Find a `t` whose chord distance from `start_t` is about `target_distance`.
    ///
    /// Walks in unit steps in the requested direction while the probe falls
    /// short, halving the step whenever it overshoots. Stops when within
    /// [`STEP_TOLERANCE`] or after [`STEP_ITERATION_CAP`] iterations, in which
    /// case the last probe is returned.
    pub fn step_to(&self, start_t: f32, target_distance: f32, forward: bool) -> f32 {
        let sign = if forward { 1.0 } else { -1.0 };
        let mut probe = start_t;
        let mut step = sign;

        for _ in 0..STEP_ITERATION_CAP {
            let next = probe + step;
            let err = self.chord_length(start_t, next) - target_distance;
            if err.abs() <= STEP_TOLERANCE {
                return next;
            }
            if err < 0.0 {
                // Still short - keep walking
                probe = next;
                continue;
            }
            step *= 0.5;
        }

        probe + step
    }

    /// `count` ascending parameters from 0, each `spacing` apart along the path
    pub fn seed_positions(&self, count: usize, spacing: f32) -> Vec<f32> {
        let mut positions = Vec::with_capacity(count);
        if count == 0 {
            return positions;
        }

        let mut t = 0.0;
        positions.push(t);
        for _ in 1..count {
            t = self.step_to(t, spacing, true);
            positions.push(t);
        }
        positions
    }
}
