//! A level: its chain, countdown and active power-ups
//!
//! Power-up effects are a flat list of timed entries. Their combined effect on
//! the chain is computed by [`compose_speed_factor`], a pure function, so the
//! slow/reverse interaction can be tested on its own.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::chain::{Chain, ChainSphere, PowerUpKind, SphereKind, random_color};
use super::spiral::SpiralPath;
use crate::consts::CHAIN_SPACING;
use crate::tuning::{LevelConfig, Rgb, SKULL_COLOR, Tuning};

/// A running power-up
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivePowerUp {
    pub kind: PowerUpKind,
    /// Seconds left
    pub remaining: f32,
}

/// Combine active effects into one chain speed multiplier.
///
/// Slow contributes `slow_factor` once, however many slow entries are live.
/// Reverse flips the sign of the result, so slow + reverse is slow and
/// backward.
pub fn compose_speed_factor(active: &[ActivePowerUp], slow_factor: f32) -> f32 {
    let mut magnitude: f32 = 1.0;
    let mut direction = 1.0;
    for p in active {
        match p.kind {
            PowerUpKind::Slow => magnitude = magnitude.min(slow_factor),
            PowerUpKind::Reverse => direction = -1.0,
            PowerUpKind::FastShoot | PowerUpKind::Explosion | PowerUpKind::BurstShoot => {}
        }
    }
    magnitude * direction
}

/// Kind for one seeded sphere from a uniform roll in [0, 1).
///
/// Cumulative bands: slow 3%, reverse 2%, fast-shoot 2%, explosion 2%,
/// burst-shoot 11%, then `skull_chance`, else normal.
pub fn roll_sphere_kind(roll: f32, skull_chance: f32) -> SphereKind {
    if roll < 0.03 {
        SphereKind::PowerUp(PowerUpKind::Slow)
    } else if roll < 0.05 {
        SphereKind::PowerUp(PowerUpKind::Reverse)
    } else if roll < 0.07 {
        SphereKind::PowerUp(PowerUpKind::FastShoot)
    } else if roll < 0.09 {
        SphereKind::PowerUp(PowerUpKind::Explosion)
    } else if roll < 0.20 {
        SphereKind::PowerUp(PowerUpKind::BurstShoot)
    } else if roll < 0.20 + skull_chance {
        SphereKind::Skull
    } else {
        SphereKind::Normal
    }
}

/// Display colour for a sphere kind; normal spheres draw from the palette
pub fn sphere_color<R: Rng + ?Sized>(kind: SphereKind, palette: &[Rgb], rng: &mut R) -> Rgb {
    match kind {
        SphereKind::Skull => SKULL_COLOR,
        SphereKind::PowerUp(p) => p.color(),
        SphereKind::Normal => random_color(palette, rng),
    }
}

/// One level of play
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    pub number: u32,
    pub config: LevelConfig,
    pub path: SpiralPath,
    pub chain: Chain,
    pub time_remaining: f32,
    pub active_powerups: Vec<ActivePowerUp>,
    pub powerup_duration: f32,
    pub slow_factor: f32,
}

impl Level {
    /// Build level `number` (unknown numbers use level 1) and seed its chain
    pub fn new<R: Rng + ?Sized>(number: u32, tuning: &Tuning, rng: &mut R) -> Self {
        let config = tuning.levels.get(number);
        let mut level = Self {
            number,
            time_remaining: config.time_limit,
            config,
            path: SpiralPath::default(),
            chain: Chain::new(),
            active_powerups: Vec::new(),
            powerup_duration: tuning.powerup_duration,
            slow_factor: tuning.slow_factor,
        };
        level.spawn_initial_chain(rng);
        level
    }

    pub fn palette(&self) -> &'static [Rgb] {
        Tuning::palette_for(&self.config)
    }

    pub fn target_score(&self) -> u64 {
        self.config.target_score
    }

    fn spawn_initial_chain<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let palette = self.palette();
        let ts = self.path.seed_positions(self.config.initial_balls, CHAIN_SPACING);

        let mut chain = Chain::new();
        for t in ts {
            let kind = roll_sphere_kind(rng.random::<f32>(), self.config.skull_chance);
            let color = sphere_color(kind, palette, rng);
            chain.push(ChainSphere::new(color, t, kind, &self.path));
        }
        self.chain = chain;

        log::info!(
            "Level {}: {} spheres, {} colours, target {}",
            self.number,
            self.chain.len(),
            palette.len(),
            self.config.target_score
        );
    }

    /// Start a power-up timer. Duplicates keep independent timers.
    pub fn activate_powerup(&mut self, kind: PowerUpKind) {
        self.active_powerups.push(ActivePowerUp {
            kind,
            remaining: self.powerup_duration,
        });
    }

    /// Count timers down and drop the expired ones
    pub fn tick_powerups(&mut self, dt: f32) {
        for p in &mut self.active_powerups {
            p.remaining -= dt;
        }
        self.active_powerups.retain(|p| p.remaining > 0.0);
    }

    pub fn speed_factor(&self) -> f32 {
        compose_speed_factor(&self.active_powerups, self.slow_factor)
    }

    /// Chain speed after power-ups
    pub fn effective_speed(&self) -> f32 {
        self.config.spiral_speed * self.speed_factor()
    }

    /// Tick power-ups, move the chain, run the countdown
    pub fn update(&mut self, dt: f32) {
        self.tick_powerups(dt);
        let speed = self.effective_speed();
        self.chain.advance(&self.path, dt, speed);
        self.time_remaining = (self.time_remaining - dt).max(0.0);
    }

    /// Score target met or time up
    pub fn is_complete(&self, score: u64) -> bool {
        score >= self.config.target_score || self.time_remaining <= 0.0
    }

    /// Re-space the chain from its current entry sphere
    pub fn reflow(&mut self) {
        self.chain.reflow(&self.path, CHAIN_SPACING, None);
    }

    /// With probability `skull_chance`, add a skull at the chain's entry
    pub fn spawn_skull<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if rng.random::<f32>() >= self.config.skull_chance {
            return false;
        }
        self.chain
            .prepend_wave(&self.path, CHAIN_SPACING, 1, 1.0, self.palette(), rng);
        true
    }
}
