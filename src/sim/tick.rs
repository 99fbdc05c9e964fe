//! Per-frame simulation step
//!
//! Core game loop: apply one frame of input, advance the level and launcher,
//! move projectiles, resolve hits against the chain, then check win/loss.

use glam::Vec2;

use super::chain::{ChainSphere, PowerUpKind, SphereKind};
use super::collision::hit_index;
use super::launcher::Projectile;
use super::state::{Command, GameEvent, GamePhase, GameState};
use crate::shortest_angle_delta;

/// Angular error under which the autopilot pulls the trigger
const AUTOPILOT_FIRE_TOLERANCE: f32 = 0.02;

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Keyboard rotation (-1, 0, +1)
    pub rotate: i8,
    /// Pointer position to aim at
    pub aim: Option<Vec2>,
    /// Fire (click/space)
    pub fire: bool,
    /// Pause toggle
    pub pause: bool,
    /// Start / next level / restart
    pub advance: bool,
    pub quit: bool,
    /// Idle/demo mode - the autopilot plays
    pub idle_mode: bool,
}

impl TickInput {
    /// The frame's input as discrete commands, in application order
    pub fn commands(&self) -> Vec<Command> {
        let mut commands = Vec::new();
        if self.quit {
            commands.push(Command::Quit);
        }
        if self.pause {
            commands.push(Command::TogglePause);
        }
        if self.advance {
            commands.push(Command::AdvanceOrRestart);
        }
        if self.rotate != 0 {
            commands.push(Command::Rotate(self.rotate));
        }
        if let Some(point) = self.aim {
            commands.push(Command::AimAt(point));
        }
        if self.fire {
            commands.push(Command::Fire(self.aim));
        }
        commands
    }
}

/// Apply one frame of input, then advance the simulation by `dt`
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.events.clear();

    for command in input.commands() {
        state.apply(command);
    }

    if input.idle_mode {
        autopilot(state);
    }

    update(state, dt);
}

/// Advance the session by `dt` seconds. Does nothing unless playing.
///
/// Callers should clamp very large `dt` (e.g. after a debugger stop): spheres
/// and projectiles move in one step and can tunnel past each other.
pub fn update(state: &mut GameState, dt: f32) {
    if state.phase != GamePhase::Playing {
        return;
    }
    state.time_ticks += 1;

    state.level.update(dt);
    state.launcher.update(dt);
    state.launcher.tick_effects(dt);

    let mut pending = std::mem::take(&mut state.projectiles).into_iter();
    let mut survivors = Vec::with_capacity(pending.len());
    while let Some(mut projectile) = pending.next() {
        projectile.update(dt);

        let Some(index) = hit_index(&projectile, &state.level.chain) else {
            if projectile.is_offscreen(state.tuning.screen_width, state.tuning.screen_height) {
                state.events.push(GameEvent::ProjectileLost);
            } else {
                survivors.push(projectile);
            }
            continue;
        };

        resolve_hit(state, &projectile, index);
        if state.phase != GamePhase::Playing {
            survivors.extend(pending);
            state.projectiles = survivors;
            return;
        }
    }
    state.projectiles = survivors;

    if state.level.chain.reached_end(&state.level.path) {
        log::info!("Chain reached the end of the spiral");
        state.set_phase(GamePhase::GameOver);
        return;
    }

    if state.level.is_complete(state.score) {
        if state.score >= state.level.target_score() {
            state.set_phase(GamePhase::LevelComplete);
        } else {
            state.set_phase(GamePhase::GameOver);
        }
    }
}

/// Apply the effect of `projectile` striking chain sphere `index`
fn resolve_hit(state: &mut GameState, projectile: &Projectile, index: usize) {
    let Some(kind) = state.level.chain.get(index).map(|s| s.kind) else {
        return;
    };

    match kind {
        SphereKind::Skull => consume_skull(state, index),
        SphereKind::PowerUp(kind) => pickup_powerup(state, kind, index),
        SphereKind::Normal => insert_and_match(state, projectile, index),
    }
}

fn consume_skull(state: &mut GameState, index: usize) {
    if state.level.chain.remove(index).is_none() {
        return;
    }
    state.lives = state.lives.saturating_sub(1);
    log::debug!("Skull hit at {index}, {} lives left", state.lives);
    state.events.push(GameEvent::SkullConsumed {
        lives_left: state.lives,
    });

    if state.lives == 0 {
        state.set_phase(GamePhase::GameOver);
        return;
    }
    state.level.reflow();
}

fn pickup_powerup(state: &mut GameState, kind: PowerUpKind, index: usize) {
    if state.level.chain.remove(index).is_none() {
        return;
    }

    state.score = state.score.saturating_add(state.tuning.pickup_bonus);
    state.level.activate_powerup(kind);
    state.events.push(GameEvent::PowerUpCollected { kind });
    log::debug!("Picked up {kind:?} at {index}");

    let duration = state.tuning.powerup_duration;
    match kind {
        PowerUpKind::FastShoot => state
            .launcher
            .start_fast_shot(state.tuning.fast_shot_multiplier, duration),
        PowerUpKind::BurstShoot => state.launcher.start_burst(state.tuning.burst_count, duration),
        PowerUpKind::Explosion => {
            // The pickup is already gone: its old neighbours now sit at
            // [index - radius, index + radius - 1]
            let radius = state.tuning.explosion_radius;
            let lo = index.saturating_sub(radius);
            let hi = index.saturating_add(radius).min(state.level.chain.len());
            if lo < hi {
                let window: Vec<usize> = (lo..hi).collect();
                let removed = state.level.chain.drop_indices(&window);
                state.events.push(GameEvent::Exploded { removed });
            }
        }
        PowerUpKind::Slow | PowerUpKind::Reverse => {}
    }

    state.level.reflow();
}

fn insert_and_match(state: &mut GameState, projectile: &Projectile, index: usize) {
    let Some(target) = state.level.chain.get(index) else {
        return;
    };

    let sphere = ChainSphere::normal(projectile.color, target.t, &state.level.path);
    let index = state.level.chain.insert(index, sphere);
    state.level.reflow();
    state.events.push(GameEvent::SphereInserted { index });

    let group = state.level.chain.group_at(index, state.tuning.min_match);
    if group.is_empty() {
        return;
    }

    let removed = state.level.chain.drop_indices(&group);
    let points = (removed as u64).saturating_mul(state.tuning.points_per_sphere);
    state.score = state.score.saturating_add(points);
    log::debug!("Cleared {removed} spheres for {points} points");
    state.events.push(GameEvent::MatchCleared {
        count: removed,
        points,
    });
    state.level.reflow();
}

/// Demo player: keeps runs going between levels, aims at the innermost
/// sphere matching the loaded colour (or the lead sphere) and fires once
/// lined up.
fn autopilot(state: &mut GameState) {
    match state.phase {
        GamePhase::Menu | GamePhase::LevelComplete | GamePhase::GameOver | GamePhase::Victory => {
            state.advance_or_restart();
            return;
        }
        GamePhase::Paused => return,
        GamePhase::Playing => {}
    }

    let loaded = state.launcher.loaded_color;
    let target = state
        .level
        .chain
        .iter()
        .rev()
        .find(|s| s.kind == SphereKind::Normal && s.color == loaded)
        .or_else(|| state.level.chain.lead())
        .map(|s| s.pos);

    let Some(point) = target else {
        return;
    };
    state.aim_at(point);

    let error = shortest_angle_delta(state.launcher.angle, state.launcher.target_angle);
    if error.abs() < AUTOPILOT_FIRE_TOLERANCE {
        state.fire(None);
    }
}
