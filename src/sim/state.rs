//! Session state and the commands that drive it
//!
//! The session owns everything: the level (and through it the chain), the
//! launcher, projectiles, score and lives. All mutation happens on the caller's
//! thread through the command methods here and [`super::tick::update`].

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::chain::PowerUpKind;
use super::launcher::{Launcher, Projectile};
use super::level::Level;
use crate::tuning::Tuning;

/// Top-level phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for start
    #[default]
    Menu,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Target score reached
    LevelComplete,
    /// Time ran out short of target, lives exhausted, or chain reached the end
    GameOver,
    /// Advanced past the last configured level
    Victory,
}

/// Something that happened during a tick, for sound/effects collaborators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Fired { count: usize },
    SphereInserted { index: usize },
    MatchCleared { count: usize, points: u64 },
    SkullConsumed { lives_left: u8 },
    PowerUpCollected { kind: PowerUpKind },
    Exploded { removed: usize },
    ProjectileLost,
    PhaseChanged { from: GamePhase, to: GamePhase },
}

/// Input commands from the presentation layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Leave the menu and start level 1
    Start,
    /// Keyboard rotation, sign of the value is the direction
    Rotate(i8),
    /// Pointer aiming
    AimAt(Vec2),
    /// Fire, optionally aiming at a point first
    Fire(Option<Vec2>),
    TogglePause,
    /// Next level after a win, level 1 after a loss or victory
    AdvanceOrRestart,
    Quit,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Current level number (1-based)
    pub level_number: u32,
    pub score: u64,
    pub lives: u8,
    pub level: Level,
    pub launcher: Launcher,
    /// Live projectiles, in firing order
    pub projectiles: Vec<Projectile>,
    /// Events since the start of the current tick
    pub events: Vec<GameEvent>,
    /// Playing ticks simulated
    pub time_ticks: u64,
    /// Set by [`Command::Quit`]; the host should stop ticking
    pub quit_requested: bool,
}

impl GameState {
    /// New session in the menu with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let tuning = tuning.sanitized();
        let mut rng = Pcg32::seed_from_u64(seed);
        let level = Level::new(1, &tuning, &mut rng);
        let launcher = Launcher::new(&tuning, level.palette(), &mut rng);

        Self {
            seed,
            rng,
            lives: tuning.lives,
            tuning,
            phase: GamePhase::Menu,
            level_number: 1,
            score: 0,
            level,
            launcher,
            projectiles: Vec::new(),
            events: Vec::new(),
            time_ticks: 0,
            quit_requested: false,
        }
    }

    pub fn max_level(&self) -> u32 {
        self.tuning.levels.max_level()
    }

    pub(crate) fn set_phase(&mut self, phase: GamePhase) {
        if self.phase == phase {
            return;
        }
        log::info!(
            "Phase {:?} -> {:?} (level {}, score {}, lives {})",
            self.phase,
            phase,
            self.level_number,
            self.score,
            self.lives
        );
        self.events.push(GameEvent::PhaseChanged {
            from: self.phase,
            to: phase,
        });
        self.phase = phase;
    }

    /// Build level `number` and start playing it. Score and lives reset,
    /// since level targets are absolute. Past the last level is a victory.
    pub fn start_level(&mut self, number: u32) {
        self.level_number = number.max(1);
        if self.level_number > self.max_level() {
            self.set_phase(GamePhase::Victory);
            return;
        }

        self.level = Level::new(self.level_number, &self.tuning, &mut self.rng);
        self.launcher = Launcher::new(&self.tuning, self.level.palette(), &mut self.rng);
        self.score = 0;
        self.lives = self.tuning.lives;
        self.projectiles.clear();
        self.set_phase(GamePhase::Playing);
    }

    pub fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Playing => self.set_phase(GamePhase::Paused),
            GamePhase::Paused => self.set_phase(GamePhase::Playing),
            _ => {}
        }
    }

    /// Menu starts level 1, a completed level moves on, a finished run restarts
    pub fn advance_or_restart(&mut self) {
        match self.phase {
            GamePhase::Menu | GamePhase::GameOver | GamePhase::Victory => self.start_level(1),
            GamePhase::LevelComplete => self.start_level(self.level_number + 1),
            GamePhase::Playing | GamePhase::Paused => {}
        }
    }

    pub fn rotate(&mut self, direction: i8) {
        if self.phase == GamePhase::Playing {
            self.launcher.rotate(direction);
        }
    }

    pub fn aim_at(&mut self, point: Vec2) {
        if matches!(self.phase, GamePhase::Playing | GamePhase::Paused) {
            self.launcher.aim_at(point);
        }
    }

    /// Fire while playing; returns how many projectiles left the launcher
    pub fn fire(&mut self, aim: Option<Vec2>) -> usize {
        if self.phase != GamePhase::Playing {
            return 0;
        }
        let shots = self.launcher.shoot(aim, self.level.palette(), &mut self.rng);
        let count = shots.len();
        if count > 0 {
            self.projectiles.extend(shots);
            self.events.push(GameEvent::Fired { count });
        }
        count
    }

    pub fn quit(&mut self) {
        log::info!("Quit requested");
        self.quit_requested = true;
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Start => {
                if self.phase == GamePhase::Menu {
                    self.start_level(1);
                }
            }
            Command::Rotate(dir) => self.rotate(dir),
            Command::AimAt(point) => self.aim_at(point),
            Command::Fire(aim) => {
                self.fire(aim);
            }
            Command::TogglePause => self.toggle_pause(),
            Command::AdvanceOrRestart => self.advance_or_restart(),
            Command::Quit => self.quit(),
        }
    }

    /// Drain recorded events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::LIVES;

    #[test]
    fn test_new_session_waits_in_menu() {
        let state = GameState::new(1);
        assert_eq!(state.phase, GamePhase::Menu);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_start_level_one() {
        let mut state = GameState::new(12345);
        state.apply(Command::Start);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.level_number, 1);
        assert_eq!(state.level.chain.len(), state.tuning.levels.get(1).initial_balls);
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, LIVES);
        assert!(state.projectiles.is_empty());
        assert_eq!(
            state.events,
            vec![GameEvent::PhaseChanged {
                from: GamePhase::Menu,
                to: GamePhase::Playing
            }]
        );
    }

    #[test]
    fn test_pause_toggles() {
        let mut state = GameState::new(5);
        state.toggle_pause();
        assert_eq!(state.phase, GamePhase::Menu, "menu is not pausable");

        state.start_level(1);
        state.apply(Command::TogglePause);
        assert_eq!(state.phase, GamePhase::Paused);
        assert_eq!(state.fire(None), 0, "no firing while paused");
        state.apply(Command::TogglePause);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_advance_after_level_complete() {
        let mut state = GameState::new(5);
        state.start_level(1);
        state.score = 999;
        state.set_phase(GamePhase::LevelComplete);

        state.advance_or_restart();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.level_number, 2);
        assert_eq!(state.score, 0);
        assert_eq!(state.level.chain.len(), state.tuning.levels.get(2).initial_balls);
    }

    #[test]
    fn test_past_last_level_is_victory_then_restart() {
        let mut state = GameState::new(5);
        state.start_level(state.max_level());
        state.set_phase(GamePhase::LevelComplete);
        state.advance_or_restart();
        assert_eq!(state.phase, GamePhase::Victory);

        state.advance_or_restart();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.level_number, 1);
        assert_eq!(state.lives, LIVES);
    }

    #[test]
    fn test_fire_records_projectile() {
        let mut state = GameState::new(5);
        state.start_level(1);
        state.take_events();

        let loaded = state.launcher.loaded_color;
        assert_eq!(state.fire(Some(Vec2::new(700.0, 300.0))), 1);
        assert_eq!(state.projectiles.len(), 1);
        assert_eq!(state.projectiles[0].color, loaded);
        assert_eq!(state.take_events(), vec![GameEvent::Fired { count: 1 }]);

        // Still cooling down
        assert_eq!(state.fire(None), 0);
    }

    #[test]
    fn test_quit_sets_flag() {
        let mut state = GameState::new(5);
        state.apply(Command::Quit);
        assert!(state.quit_requested);
    }
}
