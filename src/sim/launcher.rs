//! The launcher in the middle of the spiral, and the projectiles it fires
//!
//! Time is explicit: the launcher keeps its own clock, advanced by
//! [`Launcher::update`], so cooldown checks never read a wall clock.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::chain::random_color;
use crate::consts::*;
use crate::tuning::{Rgb, Tuning};
use crate::{normalize_angle, shortest_angle_delta};

/// A fired sphere flying in free space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    /// Unit direction
    pub dir: Vec2,
    pub speed: f32,
    pub radius: f32,
    pub color: Rgb,
}

impl Projectile {
    pub fn new(pos: Vec2, dir: Vec2, speed: f32, color: Rgb) -> Self {
        Self {
            pos,
            // Degenerate directions fire along +x
            dir: dir.try_normalize().unwrap_or(Vec2::X),
            speed,
            radius: SPHERE_RADIUS,
            color,
        }
    }

    #[inline]
    pub fn update(&mut self, dt: f32) {
        self.pos += self.dir * self.speed * dt;
    }

    /// Fully outside the `width` x `height` screen rectangle
    pub fn is_offscreen(&self, width: f32, height: f32) -> bool {
        let r = self.radius;
        self.pos.x < -r || self.pos.x > width + r || self.pos.y < -r || self.pos.y > height + r
    }
}

/// The player's launcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Launcher {
    pub pos: Vec2,
    pub radius: f32,
    /// Current (smoothed) angle in radians
    pub angle: f32,
    /// Angle the launcher is turning toward
    pub target_angle: f32,
    /// Nominal rotation speed (radians/sec)
    pub rotation_speed: f32,
    pub cooldown_base: f32,
    pub cooldown_multiplier: f32,
    /// Recoil window after a shot, decays to 0
    pub shot_cooldown: f32,
    pub shot_recoil: f32,
    pub loaded_color: Rgb,
    pub next_color: Rgb,
    pub base_shot_speed: f32,
    pub shot_speed_multiplier: f32,
    pub burst_count: u32,
    pub burst_spread: f32,
    /// Seconds of fast-shot left
    pub fast_shot_timer: f32,
    /// Seconds of burst-shot left
    pub burst_timer: f32,
    /// Accumulated launcher time (seconds)
    clock: f32,
    last_shot_at: Option<f32>,
}

impl Launcher {
    /// Fresh launcher with ammunition drawn from `palette`
    pub fn new<R: Rng + ?Sized>(tuning: &Tuning, palette: &[Rgb], rng: &mut R) -> Self {
        Self {
            pos: Vec2::new(LAUNCHER_X, LAUNCHER_Y),
            radius: LAUNCHER_RADIUS,
            angle: 0.0,
            target_angle: 0.0,
            rotation_speed: tuning.rotation_speed,
            cooldown_base: tuning.cooldown_base,
            cooldown_multiplier: 1.0,
            shot_cooldown: 0.0,
            shot_recoil: tuning.shot_recoil,
            loaded_color: random_color(palette, rng),
            next_color: random_color(palette, rng),
            base_shot_speed: tuning.shot_speed,
            shot_speed_multiplier: 1.0,
            burst_count: 1,
            burst_spread: tuning.burst_spread,
            fast_shot_timer: 0.0,
            burst_timer: 0.0,
            clock: 0.0,
            last_shot_at: None,
        }
    }

    /// Launcher time in seconds
    pub fn clock(&self) -> f32 {
        self.clock
    }

    /// Nudge the aim one nominal tick in `direction` (sign only)
    pub fn rotate(&mut self, direction: i8) {
        let sign = f32::from(direction.signum());
        self.target_angle =
            normalize_angle(self.target_angle + self.rotation_speed * NOMINAL_TICK * sign);
    }

    /// Aim at a screen point
    pub fn aim_at(&mut self, point: Vec2) {
        let d = point - self.pos;
        if d.length_squared() > 0.0 {
            self.target_angle = d.y.atan2(d.x);
        }
    }

    /// Advance the launcher clock, decay the recoil window, and turn toward
    /// the target (at most 5x nominal speed per second; snaps when close).
    pub fn update(&mut self, dt: f32) {
        self.clock += dt;
        self.shot_cooldown = (self.shot_cooldown - dt).max(0.0);

        let delta = shortest_angle_delta(self.angle, self.target_angle);
        let cap = self.rotation_speed * dt * 5.0;
        if delta.abs() > cap {
            self.angle = normalize_angle(self.angle + cap.copysign(delta));
        } else {
            self.angle = self.target_angle;
        }
    }

    /// Tick the timed launcher effects, reverting them on expiry
    pub fn tick_effects(&mut self, dt: f32) {
        if self.burst_timer > 0.0 {
            self.burst_timer -= dt;
            if self.burst_timer <= 0.0 {
                self.burst_timer = 0.0;
                self.burst_count = 1;
                log::debug!("Burst shot expired");
            }
        }
        if self.fast_shot_timer > 0.0 {
            self.fast_shot_timer -= dt;
            if self.fast_shot_timer <= 0.0 {
                self.fast_shot_timer = 0.0;
                self.shot_speed_multiplier = 1.0;
                log::debug!("Fast shot expired");
            }
        }
    }

    pub fn start_fast_shot(&mut self, multiplier: f32, duration: f32) {
        self.shot_speed_multiplier = multiplier;
        self.fast_shot_timer = duration;
    }

    pub fn start_burst(&mut self, count: u32, duration: f32) {
        self.burst_count = count.max(1);
        self.burst_timer = duration;
    }

    /// Effective cooldown between shots
    #[inline]
    pub fn cooldown(&self) -> f32 {
        self.cooldown_base * self.cooldown_multiplier
    }

    /// True if the cooldown has elapsed at launcher time `now`
    pub fn can_shoot(&self, now: f32) -> bool {
        match self.last_shot_at {
            Some(last) => now - last >= self.cooldown(),
            None => true,
        }
    }

    /// Seconds until the next shot is allowed
    pub fn cooldown_remaining(&self) -> f32 {
        match self.last_shot_at {
            Some(last) => (self.cooldown() - (self.clock - last)).max(0.0),
            None => 0.0,
        }
    }

    /// Fire the loaded sphere. Returns nothing while cooling down.
    pub fn shoot<R: Rng + ?Sized>(
        &mut self,
        aim: Option<Vec2>,
        palette: &[Rgb],
        rng: &mut R,
    ) -> Vec<Projectile> {
        if let Some(point) = aim {
            self.aim_at(point);
        }
        if !self.can_shoot(self.clock) {
            return Vec::new();
        }

        let speed = self.base_shot_speed * self.shot_speed_multiplier;
        let shots = self
            .burst_angles()
            .into_iter()
            .map(|a| Projectile::new(self.pos, Vec2::new(a.cos(), a.sin()), speed, self.loaded_color))
            .collect();

        // Rotate ammunition
        self.loaded_color = self.next_color;
        self.next_color = random_color(palette, rng);

        self.last_shot_at = Some(self.clock);
        self.shot_cooldown = self.shot_recoil;
        shots
    }

    /// Projectile angles, symmetric about the current angle
    fn burst_angles(&self) -> Vec<f32> {
        let n = self.burst_count.max(1);
        if n == 1 {
            return vec![self.angle];
        }
        let mid = (n - 1) as f32 / 2.0;
        let step = self.burst_spread / mid.max(1.0);
        (0..n)
            .map(|i| normalize_angle(self.angle + (i as f32 - mid) * step))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::PALETTE;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn launcher() -> (Launcher, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(1);
        let l = Launcher::new(&Tuning::default(), &PALETTE[..4], &mut rng);
        (l, rng)
    }

    #[test]
    fn test_projectile_moves_along_direction() {
        let mut p = Projectile::new(Vec2::new(100.0, 100.0), Vec2::new(2.0, 0.0), 100.0, PALETTE[0]);
        p.update(0.1);
        assert!((p.pos.x - 110.0).abs() < 1e-4);
        assert_eq!(p.pos.y, 100.0);
    }

    #[test]
    fn test_projectile_offscreen() {
        let mut p = Projectile::new(Vec2::new(400.0, 300.0), Vec2::X, 250.0, PALETTE[0]);
        assert!(!p.is_offscreen(800.0, 600.0));
        p.pos.x = 810.0; // still overlapping the edge
        assert!(!p.is_offscreen(800.0, 600.0));
        p.pos.x = 816.0;
        assert!(p.is_offscreen(800.0, 600.0));
    }

    #[test]
    fn test_update_caps_rotation_then_snaps() {
        let (mut l, _) = launcher();
        l.aim_at(l.pos + Vec2::new(0.0, 100.0)); // straight down, +90°
        let dt = 0.05;
        l.update(dt);
        let cap = l.rotation_speed * dt * 5.0;
        assert!((l.angle - cap).abs() < 1e-5);

        l.update(dt);
        assert!((l.angle - FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_update_turns_the_short_way() {
        let (mut l, _) = launcher();
        l.angle = 170f32.to_radians();
        l.target_angle = -170f32.to_radians();
        l.update(1.0);
        assert_eq!(l.angle, l.target_angle);

        l.angle = PI - 0.01;
        l.target_angle = -PI + 0.5;
        l.update(0.01);
        // Turned counter-clockwise across the seam
        assert!(l.angle < -PI + 0.5);
    }

    #[test]
    fn test_rotate_steps_target() {
        let (mut l, _) = launcher();
        l.rotate(1);
        assert!((l.target_angle - l.rotation_speed * NOMINAL_TICK).abs() < 1e-6);
        l.rotate(-1);
        l.rotate(-1);
        assert!((l.target_angle + l.rotation_speed * NOMINAL_TICK).abs() < 1e-6);
    }

    #[test]
    fn test_shoot_rotates_ammo_and_uses_loaded_color() {
        let (mut l, mut rng) = launcher();
        let loaded = l.loaded_color;
        let next = l.next_color;
        let shots = l.shoot(None, &PALETTE[..4], &mut rng);

        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].color, loaded);
        assert_eq!(shots[0].pos, l.pos);
        assert!((shots[0].speed - SHOT_SPEED).abs() < 1e-4);
        assert_eq!(l.loaded_color, next);
        assert!(PALETTE[..4].contains(&l.next_color));
        assert_eq!(l.shot_cooldown, SHOT_RECOIL);
    }

    #[test]
    fn test_shoot_respects_cooldown() {
        let (mut l, mut rng) = launcher();
        assert_eq!(l.shoot(None, &PALETTE, &mut rng).len(), 1);
        let loaded = l.loaded_color;

        l.update(0.5);
        assert!(l.shoot(None, &PALETTE, &mut rng).is_empty());
        assert_eq!(l.loaded_color, loaded, "failed shot keeps ammo");
        assert!((l.cooldown_remaining() - 0.3).abs() < 1e-4);

        l.update(0.31);
        assert!(l.can_shoot(l.clock()));
        assert_eq!(l.shoot(None, &PALETTE, &mut rng).len(), 1);
    }

    #[test]
    fn test_burst_is_symmetric() {
        let (mut l, mut rng) = launcher();
        l.start_burst(3, POWERUP_DURATION);
        let shots = l.shoot(None, &PALETTE, &mut rng);
        assert_eq!(shots.len(), 3);

        let angles: Vec<f32> = shots.iter().map(|p| p.dir.y.atan2(p.dir.x)).collect();
        assert!((angles[1] - l.angle).abs() < 1e-5);
        assert!((angles[0] + angles[2] - 2.0 * l.angle).abs() < 1e-5);
        assert!((angles[2] - angles[1] - BURST_SPREAD).abs() < 1e-5);
    }

    #[test]
    fn test_timed_effects_revert() {
        let (mut l, _) = launcher();
        l.start_burst(3, 1.0);
        l.start_fast_shot(FAST_SHOT_MULTIPLIER, 0.5);

        l.tick_effects(0.6);
        assert_eq!(l.shot_speed_multiplier, 1.0);
        assert_eq!(l.burst_count, 3);

        l.tick_effects(0.6);
        assert_eq!(l.burst_count, 1);
        assert_eq!(l.burst_timer, 0.0);
    }
}
