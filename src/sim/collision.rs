//! Projectile vs chain collision
//!
//! Plain circle-circle overlap. The chain is scanned in order and the first
//! overlapping sphere wins, so lower indices are struck preferentially when
//! several overlap in the same frame.

use glam::Vec2;

use super::chain::Chain;
use super::launcher::Projectile;

/// True if two circles touch or overlap
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    a.distance_squared(b) <= r * r
}

/// Index of the first chain sphere the projectile overlaps
pub fn hit_index(projectile: &Projectile, chain: &Chain) -> Option<usize> {
    chain
        .iter()
        .position(|s| circles_overlap(projectile.pos, projectile.radius, s.pos, s.radius))
}
