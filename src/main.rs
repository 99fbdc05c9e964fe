//! Spiral Shooter headless runner
//!
//! Plays the simulation with the autopilot at a fixed frame rate and prints a
//! summary. Useful for balance checks and for reproducing a run from its seed.
//!
//! Usage:
//!   spiral-shooter --seed 7 --seconds 120
//!   RUST_LOG=debug spiral-shooter --config levels.json --json

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::fs;
    use std::path::PathBuf;

    use anyhow::{Context, Result, bail};
    use clap::Parser;
    use serde::Serialize;

    use spiral_shooter::Tuning;
    use spiral_shooter::sim::{GameEvent, GamePhase, GameState, Snapshot, TickInput, tick};

    #[derive(Parser)]
    #[command(name = "spiral-shooter")]
    #[command(about = "Run the spiral shooter simulation headless with the autopilot")]
    struct Args {
        /// Session seed
        #[arg(long, default_value_t = 1)]
        seed: u64,

        /// Simulated seconds to run
        #[arg(long, default_value_t = 60.0)]
        seconds: f32,

        /// Simulation frames per second
        #[arg(long, default_value_t = 60)]
        fps: u32,

        /// JSON tuning file (missing fields keep their defaults)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the summary and final frame as JSON
        #[arg(long)]
        json: bool,
    }

    #[derive(Debug, Default, Serialize)]
    struct Summary {
        seed: u64,
        frames: u64,
        playing_frames: u64,
        shots: usize,
        spheres_cleared: usize,
        points_from_matches: u64,
        skulls_hit: usize,
        powerups: usize,
        levels_completed: usize,
        games_over: usize,
        final_phase: GamePhase,
        final_level: u32,
        final_score: u64,
    }

    impl Summary {
        fn record(&mut self, event: &GameEvent) {
            match *event {
                GameEvent::Fired { count } => self.shots += count,
                GameEvent::MatchCleared { count, points } => {
                    self.spheres_cleared += count;
                    self.points_from_matches += points;
                }
                GameEvent::Exploded { removed } => self.spheres_cleared += removed,
                GameEvent::SkullConsumed { .. } => self.skulls_hit += 1,
                GameEvent::PowerUpCollected { .. } => self.powerups += 1,
                GameEvent::PhaseChanged { to, .. } => match to {
                    GamePhase::LevelComplete => self.levels_completed += 1,
                    GamePhase::GameOver => self.games_over += 1,
                    _ => {}
                },
                GameEvent::SphereInserted { .. } | GameEvent::ProjectileLost => {}
            }
        }
    }

    #[derive(Serialize)]
    struct Report<'a> {
        summary: &'a Summary,
        last_frame: Snapshot,
    }

    fn load_tuning(path: Option<&PathBuf>) -> Result<Tuning> {
        let Some(path) = path else {
            return Ok(Tuning::default());
        };
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let tuning = Tuning::from_json(&json)
            .with_context(|| format!("invalid config {}", path.display()))?;
        log::info!(
            "Loaded {} ({} levels)",
            path.display(),
            tuning.levels.len()
        );
        Ok(tuning)
    }

    pub fn run() -> Result<()> {
        env_logger::init();
        let args = Args::parse();

        if args.fps == 0 {
            bail!("--fps must be at least 1");
        }
        if !(args.seconds.is_finite() && args.seconds >= 0.0) {
            bail!("--seconds must be a non-negative number");
        }

        let tuning = load_tuning(args.config.as_ref())?;
        let mut state = GameState::with_tuning(args.seed, tuning);
        log::info!("Spiral Shooter starting with seed {}", args.seed);

        let dt = 1.0 / args.fps as f32;
        let frames = (args.seconds * args.fps as f32).round() as u64;
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };

        let mut summary = Summary {
            seed: args.seed,
            ..Default::default()
        };
        for _ in 0..frames {
            tick(&mut state, &input, dt);
            for event in &state.events {
                log::debug!("{event:?}");
                summary.record(event);
            }
            summary.frames += 1;
            if state.quit_requested {
                break;
            }
        }
        summary.playing_frames = state.time_ticks;
        summary.final_phase = state.phase;
        summary.final_level = state.level_number;
        summary.final_score = state.score;

        if args.json {
            let report = Report {
                summary: &summary,
                last_frame: state.snapshot(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        println!("=== RUN SUMMARY ===");
        println!("  Seed:        {}", summary.seed);
        println!("  Frames:      {} ({:.1}s)", summary.frames, summary.frames as f32 * dt);
        println!("  In play:     {}", summary.playing_frames);
        println!("  Shots:       {}", summary.shots);
        println!(
            "  Cleared:     {} spheres ({} points)",
            summary.spheres_cleared, summary.points_from_matches
        );
        println!("  Skulls hit:  {}", summary.skulls_hit);
        println!("  Power-ups:   {}", summary.powerups);
        println!("  Levels won:  {}", summary.levels_completed);
        println!("  Games over:  {}", summary.games_over);
        println!(
            "  Final:       {:?} on level {} with {} points",
            summary.final_phase, summary.final_level, summary.final_score
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is the wasm surface; there is no wasm binary
}
