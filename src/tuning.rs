//! Data-driven game balance
//!
//! Per-level table plus the tunable rule constants. Everything deserializes
//! from JSON with per-field defaults, so partial files are fine: whatever is
//! missing keeps the built-in value.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Configuration loading failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The document is not valid JSON or has the wrong shape
    Json { message: String },
    /// The document defines a `levels` table with no entries
    EmptyLevelTable,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json { message } => write!(f, "invalid tuning document: {message}"),
            Self::EmptyLevelTable => write!(f, "level table has no entries"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            message: err.to_string(),
        }
    }
}

/// Settings for a single level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Seconds on the countdown
    pub time_limit: f32,
    /// Score that completes the level
    pub target_score: u64,
    /// Chain speed in path-parameter units per second
    pub spiral_speed: f32,
    /// Spheres seeded at level start
    pub initial_balls: usize,
    /// Probability band width for skull spheres (0..1)
    pub skull_chance: f32,
    /// How many palette colours are in play
    pub colors_count: usize,
}

impl Default for LevelConfig {
    /// Level 1
    fn default() -> Self {
        Self {
            time_limit: 60.0,
            target_score: 600,
            spiral_speed: 0.6,
            initial_balls: 50,
            skull_chance: 0.03,
            colors_count: 4,
        }
    }
}

impl LevelConfig {
    /// Clamp values into playable ranges
    pub fn sanitized(mut self) -> Self {
        if !self.time_limit.is_finite() || self.time_limit < 0.0 {
            self.time_limit = 0.0;
        }
        if !self.spiral_speed.is_finite() {
            self.spiral_speed = LevelConfig::default().spiral_speed;
        }
        if !self.skull_chance.is_finite() {
            self.skull_chance = 0.0;
        }
        self.skull_chance = self.skull_chance.clamp(0.0, 1.0);
        self.colors_count = self.colors_count.clamp(1, PALETTE.len());
        self
    }
}

/// Display colour as an RGB triple
pub type Rgb = [u8; 3];

/// Full palette; a level uses the first `colors_count` entries
pub const PALETTE: [Rgb; 6] = [
    [255, 0, 0],   // red
    [0, 255, 0],   // green
    [0, 0, 255],   // blue
    [255, 255, 0], // yellow
    [255, 165, 0], // orange
    [128, 0, 128], // purple
];

pub const SKULL_COLOR: Rgb = [45, 45, 55];

/// Level table keyed by level number (1-based)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelTable {
    levels: BTreeMap<u32, LevelConfig>,
}

impl Default for LevelTable {
    fn default() -> Self {
        let row = |time_limit: f32,
                   target_score: u64,
                   spiral_speed: f32,
                   initial_balls: usize,
                   skull_chance: f32,
                   colors_count: usize| LevelConfig {
            time_limit,
            target_score,
            spiral_speed,
            initial_balls,
            skull_chance,
            colors_count,
        };

        let levels = BTreeMap::from([
            (1, row(60.0, 600, 0.6, 50, 0.03, 4)),
            (2, row(90.0, 800, 1.0, 60, 0.05, 5)),
            (3, row(120.0, 1000, 1.0, 60, 0.07, 6)),
            (4, row(150.0, 1500, 1.0, 55, 0.08, 6)),
            (5, row(180.0, 2000, 1.0, 40, 0.10, 6)),
        ]);
        Self { levels }
    }
}

impl LevelTable {
    /// Config for `number`; unknown numbers fall back to level 1
    pub fn get(&self, number: u32) -> LevelConfig {
        if let Some(cfg) = self.levels.get(&number) {
            return cfg.clone().sanitized();
        }
        log::warn!("No config for level {number}, using level 1");
        self.levels
            .get(&1)
            .cloned()
            .unwrap_or_default()
            .sanitized()
    }

    /// Highest configured level number
    pub fn max_level(&self) -> u32 {
        self.levels.keys().next_back().copied().unwrap_or(1)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// Largest accepted explosion radius (spheres on each side)
pub const MAX_EXPLOSION_RADIUS: usize = 16;

/// `value` when finite and at least `min`, else `fallback`
fn finite_at_least(value: f32, min: f32, fallback: f32) -> f32 {
    if value.is_finite() && value >= min { value } else { fallback }
}

/// Tunable rule constants plus the level table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub lives: u8,
    pub min_match: usize,
    pub points_per_sphere: u64,
    pub pickup_bonus: u64,
    pub powerup_duration: f32,
    pub slow_factor: f32,
    pub shot_speed: f32,
    /// Radians per second
    pub rotation_speed: f32,
    pub cooldown_base: f32,
    pub shot_recoil: f32,
    pub fast_shot_multiplier: f32,
    pub burst_count: u32,
    /// Radians between neighbouring burst projectiles
    pub burst_spread: f32,
    pub explosion_radius: usize,
    pub screen_width: f32,
    pub screen_height: f32,
    pub levels: LevelTable,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            lives: LIVES,
            min_match: MIN_MATCH,
            points_per_sphere: POINTS_PER_SPHERE,
            pickup_bonus: PICKUP_BONUS,
            powerup_duration: POWERUP_DURATION,
            slow_factor: POWERUP_SLOW_FACTOR,
            shot_speed: SHOT_SPEED,
            rotation_speed: LAUNCHER_ROTATION_SPEED,
            cooldown_base: SHOT_COOLDOWN_BASE,
            shot_recoil: SHOT_RECOIL,
            fast_shot_multiplier: FAST_SHOT_MULTIPLIER,
            burst_count: BURST_SHOT_COUNT,
            burst_spread: BURST_SPREAD,
            explosion_radius: EXPLOSION_RADIUS,
            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,
            levels: LevelTable::default(),
        }
    }
}

impl Tuning {
    /// Parse a tuning document. Missing fields keep their defaults and
    /// out-of-range values are clamped.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        if tuning.levels.is_empty() {
            return Err(ConfigError::EmptyLevelTable);
        }
        let tuning = tuning.sanitized();
        log::info!("Loaded tuning with {} levels", tuning.levels.len());
        Ok(tuning)
    }

    /// Clamp rule values into playable ranges. Non-finite or negative
    /// times and speeds take their defaults.
    pub fn sanitized(mut self) -> Self {
        let d = Tuning::default();
        self.lives = self.lives.max(1);
        self.min_match = self.min_match.max(1);
        self.burst_count = self.burst_count.max(1);
        self.explosion_radius = self.explosion_radius.min(MAX_EXPLOSION_RADIUS);

        self.powerup_duration =
            finite_at_least(self.powerup_duration, f32::MIN_POSITIVE, d.powerup_duration);
        self.slow_factor = finite_at_least(self.slow_factor, 0.0, d.slow_factor).min(1.0);
        self.shot_speed = finite_at_least(self.shot_speed, 0.0, d.shot_speed);
        self.rotation_speed = finite_at_least(self.rotation_speed, 0.0, d.rotation_speed);
        self.cooldown_base = finite_at_least(self.cooldown_base, 0.0, d.cooldown_base);
        self.shot_recoil = finite_at_least(self.shot_recoil, 0.0, d.shot_recoil);
        self.fast_shot_multiplier =
            finite_at_least(self.fast_shot_multiplier, 0.0, d.fast_shot_multiplier);
        self.burst_spread = finite_at_least(self.burst_spread, 0.0, d.burst_spread);
        self.screen_width = finite_at_least(self.screen_width, 1.0, d.screen_width);
        self.screen_height = finite_at_least(self.screen_height, 1.0, d.screen_height);
        self
    }

    /// Parse a tuning document, falling back to the built-in defaults
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("Using default tuning: {e}");
                Self::default()
            }
        }
    }

    /// Level palette: the first `colors_count` palette entries
    pub fn palette_for(config: &LevelConfig) -> &'static [Rgb] {
        &PALETTE[..config.colors_count.clamp(1, PALETTE.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_has_five_levels() {
        let table = LevelTable::default();
        assert_eq!(table.len(), 5);
        assert_eq!(table.max_level(), 5);
        assert_eq!(table.get(3).target_score, 1000);
    }

    #[test]
    fn test_unknown_level_falls_back_to_level_one() {
        let table = LevelTable::default();
        assert_eq!(table.get(42), table.get(1));
        assert_eq!(table.get(0).initial_balls, 50);
    }

    #[test]
    fn test_partial_level_uses_defaults() {
        let json = r#"{ "levels": { "1": { "target_score": 100 }, "2": {} } }"#;
        let tuning = Tuning::from_json(json).unwrap();
        let l1 = tuning.levels.get(1);
        assert_eq!(l1.target_score, 100);
        assert_eq!(l1.initial_balls, 50);
        assert_eq!(tuning.levels.max_level(), 2);
        assert_eq!(tuning.lives, LIVES);
    }

    #[test]
    fn test_sanitize_clamps_out_of_range() {
        let cfg = LevelConfig {
            time_limit: -5.0,
            skull_chance: 3.0,
            colors_count: 0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(cfg.time_limit, 0.0);
        assert_eq!(cfg.skull_chance, 1.0);
        assert_eq!(cfg.colors_count, 1);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(ConfigError::Json { .. })
        ));
        assert_eq!(
            Tuning::from_json(r#"{ "levels": {} }"#),
            Err(ConfigError::EmptyLevelTable)
        );
        assert_eq!(Tuning::from_json_or_default("[]"), Tuning::default());
    }

    #[test]
    fn test_tuning_values_are_clamped() {
        let json = r#"{
            "explosion_radius": 18446744073709551615,
            "lives": 0,
            "min_match": 0,
            "burst_count": 0,
            "powerup_duration": -1.0,
            "slow_factor": 4.0,
            "shot_speed": -250.0
        }"#;
        let tuning = Tuning::from_json(json).unwrap();
        assert_eq!(tuning.explosion_radius, MAX_EXPLOSION_RADIUS);
        assert_eq!(tuning.lives, 1);
        assert_eq!(tuning.min_match, 1);
        assert_eq!(tuning.burst_count, 1);
        assert_eq!(tuning.powerup_duration, POWERUP_DURATION);
        assert_eq!(tuning.slow_factor, 1.0);
        assert_eq!(tuning.shot_speed, SHOT_SPEED);
        assert_eq!(Tuning::default().sanitized(), Tuning::default());
    }

    #[test]
    fn test_palette_for_level() {
        let table = LevelTable::default();
        assert_eq!(Tuning::palette_for(&table.get(1)).len(), 4);
        assert_eq!(Tuning::palette_for(&table.get(5)).len(), 6);
    }
}
