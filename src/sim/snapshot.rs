//! Read-only view of a session for renderers and tooling

use glam::Vec2;
use serde::Serialize;

use super::chain::{PowerUpKind, SphereKind};
use super::level::ActivePowerUp;
use super::state::{GamePhase, GameState};
use crate::tuning::Rgb;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SphereSnapshot {
    pub pos: Vec2,
    pub radius: f32,
    pub color: Rgb,
    pub kind: SphereKind,
    /// Badge letter for power-up spheres
    pub glyph: Option<char>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectileSnapshot {
    pub pos: Vec2,
    pub radius: f32,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LauncherSnapshot {
    pub pos: Vec2,
    pub radius: f32,
    pub angle: f32,
    pub loaded_color: Rgb,
    pub next_color: Rgb,
    pub cooldown_remaining: f32,
}

/// Everything a frame needs to draw, in drawing order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub level_number: u32,
    pub score: u64,
    pub target_score: u64,
    pub lives: u8,
    pub time_remaining: f32,
    pub active_powerups: Vec<ActivePowerUp>,
    /// Entry sphere first
    pub chain: Vec<SphereSnapshot>,
    pub projectiles: Vec<ProjectileSnapshot>,
    pub launcher: LauncherSnapshot,
}

impl Snapshot {
    pub fn is_powerup_active(&self, kind: PowerUpKind) -> bool {
        self.active_powerups.iter().any(|p| p.kind == kind)
    }
}

impl GameState {
    pub fn snapshot(&self) -> Snapshot {
        let chain = self
            .level
            .chain
            .iter()
            .map(|s| SphereSnapshot {
                pos: s.pos,
                radius: s.radius,
                color: s.color,
                kind: s.kind,
                glyph: match s.kind {
                    SphereKind::PowerUp(p) => Some(p.glyph()),
                    SphereKind::Normal | SphereKind::Skull => None,
                },
            })
            .collect();

        let projectiles = self
            .projectiles
            .iter()
            .map(|p| ProjectileSnapshot {
                pos: p.pos,
                radius: p.radius,
                color: p.color,
            })
            .collect();

        let l = &self.launcher;
        Snapshot {
            phase: self.phase,
            level_number: self.level_number,
            score: self.score,
            target_score: self.level.target_score(),
            lives: self.lives,
            time_remaining: self.level.time_remaining,
            active_powerups: self.level.active_powerups.clone(),
            chain,
            projectiles,
            launcher: LauncherSnapshot {
                pos: l.pos,
                radius: l.radius,
                angle: l.angle,
                loaded_color: l.loaded_color,
                next_color: l.next_color,
                cooldown_remaining: l.cooldown_remaining(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_mirrors_state() {
        let mut state = GameState::new(21);
        state.start_level(1);
        state.level.activate_powerup(PowerUpKind::Slow);
        state.fire(Some(Vec2::new(0.0, 0.0)));

        let snap = state.snapshot();
        assert_eq!(snap.phase, GamePhase::Playing);
        assert_eq!(snap.chain.len(), state.level.chain.len());
        assert_eq!(snap.projectiles.len(), 1);
        assert_eq!(snap.target_score, state.level.target_score());
        assert!(snap.is_powerup_active(PowerUpKind::Slow));
        assert!(!snap.is_powerup_active(PowerUpKind::Reverse));
        assert!(snap.launcher.cooldown_remaining > 0.0);

        for (view, sphere) in snap.chain.iter().zip(state.level.chain.iter()) {
            assert_eq!(view.pos, sphere.pos);
            assert_eq!(view.glyph.is_some(), matches!(sphere.kind, SphereKind::PowerUp(_)));
        }
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut state = GameState::new(3);
        state.start_level(1);
        let json = serde_json::to_value(state.snapshot()).unwrap();
        assert_eq!(json["phase"], "Playing");
        assert_eq!(json["lives"], 3);
        assert!(json["chain"].as_array().is_some_and(|c| !c.is_empty()));
    }
}
