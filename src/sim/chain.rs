//! The sphere chain travelling along the spiral
//!
//! Ordering: index 0 is the entry-most sphere (smallest `t`). `t` grows
//! toward the center, so the lead sphere - the one that can reach the end -
//! is the last one. Index-based mutators tolerate stale indices as no-ops.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::spiral::SpiralPath;
use crate::consts::SPHERE_RADIUS;
use crate::tuning::{PALETTE, Rgb, SKULL_COLOR};

/// Timed power-up carried by a special chain sphere
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Chain crawls at a fraction of its speed
    Slow,
    /// Chain runs backward
    Reverse,
    /// Faster projectiles
    FastShoot,
    /// Clears neighbouring spheres on pickup
    Explosion,
    /// Launcher fires a spread of projectiles
    BurstShoot,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 5] = [
        PowerUpKind::Slow,
        PowerUpKind::Reverse,
        PowerUpKind::FastShoot,
        PowerUpKind::Explosion,
        PowerUpKind::BurstShoot,
    ];

    /// Fixed display colour
    pub fn color(self) -> Rgb {
        match self {
            PowerUpKind::Slow => [80, 200, 255],
            PowerUpKind::Reverse => [255, 100, 255],
            PowerUpKind::FastShoot => [255, 200, 0],
            PowerUpKind::Explosion => [255, 70, 70],
            PowerUpKind::BurstShoot => [30, 60, 70],
        }
    }

    /// Single-letter badge drawn on the sphere
    pub fn glyph(self) -> char {
        match self {
            PowerUpKind::Slow => 'S',
            PowerUpKind::Reverse => 'R',
            PowerUpKind::FastShoot => 'F',
            PowerUpKind::Explosion => 'X',
            PowerUpKind::BurstShoot => 'B',
        }
    }
}

/// What a chain sphere does when struck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SphereKind {
    #[default]
    Normal,
    /// Costs a life when shot
    Skull,
    PowerUp(PowerUpKind),
}

/// A sphere in the chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSphere {
    pub color: Rgb,
    /// Path parameter
    pub t: f32,
    pub kind: SphereKind,
    /// Derived from `t`; refreshed whenever `t` changes
    pub pos: Vec2,
    pub radius: f32,
}

impl ChainSphere {
    pub fn new(color: Rgb, t: f32, kind: SphereKind, path: &SpiralPath) -> Self {
        Self {
            color,
            t,
            kind,
            pos: path.position_at(t),
            radius: SPHERE_RADIUS,
        }
    }

    pub fn normal(color: Rgb, t: f32, path: &SpiralPath) -> Self {
        Self::new(color, t, SphereKind::Normal, path)
    }

    /// Move to a new path parameter
    #[inline]
    pub fn place(&mut self, t: f32, path: &SpiralPath) {
        self.t = t;
        self.pos = path.position_at(t);
    }

    /// Only normal spheres join colour runs
    #[inline]
    fn matches(&self, color: Rgb) -> bool {
        self.kind == SphereKind::Normal && self.color == color
    }
}

/// Uniform pick from `palette` (the first palette colour if it is empty)
pub fn random_color<R: Rng + ?Sized>(palette: &[Rgb], rng: &mut R) -> Rgb {
    if palette.is_empty() {
        return PALETTE[0];
    }
    palette[rng.random_range(0..palette.len())]
}

/// Ordered chain of spheres
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    spheres: Vec<ChainSphere>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_spheres(spheres: Vec<ChainSphere>) -> Self {
        Self { spheres }
    }

    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ChainSphere> {
        self.spheres.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChainSphere> {
        self.spheres.iter()
    }

    pub fn as_slice(&self) -> &[ChainSphere] {
        &self.spheres
    }

    pub fn push(&mut self, sphere: ChainSphere) {
        self.spheres.push(sphere);
    }

    /// Entry-most sphere (reflow anchor)
    pub fn entry(&self) -> Option<&ChainSphere> {
        self.spheres.first()
    }

    /// Foremost sphere, closest to the spiral's end
    pub fn lead(&self) -> Option<&ChainSphere> {
        self.spheres.last()
    }

    /// Insert at `index` (clamped to the end)
    pub fn insert(&mut self, index: usize, sphere: ChainSphere) -> usize {
        let index = index.min(self.spheres.len());
        self.spheres.insert(index, sphere);
        index
    }

    /// Remove one sphere; `None` for a stale index
    pub fn remove(&mut self, index: usize) -> Option<ChainSphere> {
        (index < self.spheres.len()).then(|| self.spheres.remove(index))
    }

    /// Re-space every sphere `spacing` apart, starting from `anchor_t`
    /// (or the current entry sphere when `None`)
    pub fn reflow(&mut self, path: &SpiralPath, spacing: f32, anchor_t: Option<f32>) {
        let Some(first) = self.spheres.first() else {
            return;
        };
        let mut t = anchor_t.unwrap_or(first.t);

        let mut spheres = self.spheres.iter_mut();
        if let Some(first) = spheres.next() {
            first.place(t, path);
        }
        for sphere in spheres {
            t = path.step_to(t, spacing, true);
            sphere.place(t, path);
        }
    }

    /// Add `count` spheres ahead of index 0, each stepped backward along the
    /// path. Each new sphere is a skull with probability `skull_rate`,
    /// otherwise a random palette colour.
    pub fn prepend_wave<R: Rng + ?Sized>(
        &mut self,
        path: &SpiralPath,
        spacing: f32,
        count: usize,
        skull_rate: f32,
        palette: &[Rgb],
        rng: &mut R,
    ) {
        let mut t = self.entry().map(|s| s.t);

        for _ in 0..count {
            let new_t = match t {
                Some(t) => path.step_to(t, spacing, false),
                None => 0.0,
            };
            let sphere = if rng.random::<f32>() < skull_rate {
                ChainSphere::new(SKULL_COLOR, new_t, SphereKind::Skull, path)
            } else {
                ChainSphere::normal(random_color(palette, rng), new_t, path)
            };
            self.spheres.insert(0, sphere);
            t = Some(new_t);
        }
    }

    /// Move every sphere by `dt * speed` along the path (negative speed moves
    /// outward)
    pub fn advance(&mut self, path: &SpiralPath, dt: f32, speed: f32) {
        let delta = dt * speed;
        for sphere in &mut self.spheres {
            sphere.place(sphere.t + delta, path);
        }
    }

    /// True when the lead sphere is at or past the end of the path
    pub fn reached_end(&self, path: &SpiralPath) -> bool {
        self.lead().is_some_and(|s| s.t >= path.end_t())
    }

    /// Contiguous same-colour run around `index`, or empty if shorter than
    /// `min_match`. Skulls and power-ups never match.
    pub fn group_at(&self, index: usize, min_match: usize) -> Vec<usize> {
        let Some(sphere) = self.spheres.get(index) else {
            return Vec::new();
        };
        if sphere.kind != SphereKind::Normal {
            return Vec::new();
        }
        let wanted = sphere.color;

        let mut lo = index;
        let mut hi = index;
        while lo > 0 && self.spheres[lo - 1].matches(wanted) {
            lo -= 1;
        }
        while hi + 1 < self.spheres.len() && self.spheres[hi + 1].matches(wanted) {
            hi += 1;
        }

        if hi - lo + 1 < min_match {
            return Vec::new();
        }
        (lo..=hi).collect()
    }

    /// Remove the given indices, highest first. Out-of-range and duplicate
    /// indices are skipped. Returns how many spheres were removed.
    pub fn drop_indices(&mut self, indices: &[usize]) -> usize {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        sorted.dedup();

        let mut removed = 0;
        for i in sorted {
            if i < self.spheres.len() {
                self.spheres.remove(i);
                removed += 1;
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::CHAIN_SPACING;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const R: Rgb = PALETTE[0];
    const G: Rgb = PALETTE[1];
    const B: Rgb = PALETTE[2];

    fn chain_of(colors: &[Rgb]) -> Chain {
        let path = SpiralPath::default();
        let ts = path.seed_positions(colors.len(), CHAIN_SPACING);
        Chain::from_spheres(
            colors
                .iter()
                .zip(ts)
                .map(|(&c, t)| ChainSphere::normal(c, t, &path))
                .collect(),
        )
    }

    #[test]
    fn test_group_at_finds_run() {
        let chain = chain_of(&[R, R, R, G]);
        assert_eq!(chain.group_at(1, 3), vec![0, 1, 2]);
        assert_eq!(chain.group_at(3, 3), Vec::<usize>::new());
    }

    #[test]
    fn test_group_at_short_run_is_empty() {
        let chain = chain_of(&[R, R, G]);
        assert!(chain.group_at(0, 3).is_empty());
        assert!(chain.group_at(7, 3).is_empty());
    }

    #[test]
    fn test_group_at_ignores_special_spheres() {
        let path = SpiralPath::default();
        let mut chain = chain_of(&[R, R, G]);
        // A power-up that happens to share the colour does not extend the run
        chain.insert(2, ChainSphere::new(R, 0.0, SphereKind::PowerUp(PowerUpKind::Slow), &path));
        assert!(chain.group_at(0, 3).is_empty());
        assert!(chain.group_at(2, 1).is_empty());
    }

    #[test]
    fn test_drop_indices_tolerates_stale() {
        let mut chain = chain_of(&[R, G, B, R]);
        let removed = chain.drop_indices(&[1, 3, 3, 99]);
        assert_eq!(removed, 2);
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.get(0).unwrap().color, R);
        assert_eq!(chain.get(1).unwrap().color, B);
        assert!(chain.remove(5).is_none());
    }

    #[test]
    fn test_reflow_closes_gap() {
        let path = SpiralPath::default();
        let mut chain = chain_of(&[R, G, B, R, G]);
        chain.drop_indices(&[2]);
        chain.reflow(&path, CHAIN_SPACING, None);

        assert_eq!(chain.get(0).unwrap().t, 0.0);
        for pair in chain.as_slice().windows(2) {
            let gap = path.chord_length(pair[0].t, pair[1].t);
            assert!((gap - CHAIN_SPACING).abs() <= 0.5);
            assert_eq!(pair[1].pos, path.position_at(pair[1].t));
        }
    }

    #[test]
    fn test_prepend_wave_steps_backward() {
        let path = SpiralPath::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut chain = chain_of(&[R, G]);
        chain.prepend_wave(&path, CHAIN_SPACING, 3, 0.0, &PALETTE[..3], &mut rng);

        assert_eq!(chain.len(), 5);
        let ts: Vec<f32> = chain.iter().map(|s| s.t).collect();
        assert!(ts.windows(2).all(|w| w[0] < w[1]));
        assert!(chain.iter().take(3).all(|s| s.kind == SphereKind::Normal));
    }

    #[test]
    fn test_prepend_wave_all_skulls() {
        let path = SpiralPath::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut chain = Chain::new();
        chain.prepend_wave(&path, CHAIN_SPACING, 2, 1.0, &PALETTE, &mut rng);
        assert_eq!(chain.len(), 2);
        assert!(chain.iter().all(|s| s.kind == SphereKind::Skull && s.color == SKULL_COLOR));
    }

    #[test]
    fn test_advance_moves_lead_to_end() {
        let path = SpiralPath::default();
        let mut chain = chain_of(&[R, G, B]);
        chain.advance(&path, 1.0, 1.0);
        assert!(!chain.reached_end(&path));

        let lead_t = chain.lead().unwrap().t;
        chain.advance(&path, 1.0, path.end_t() - lead_t + 0.01);
        assert!(chain.reached_end(&path));

        // Negative speed pulls the chain back out
        chain.advance(&path, 1.0, -5.0);
        assert!(!chain.reached_end(&path));
        assert!(Chain::new().iter().rev().next().is_none());
    }
}
