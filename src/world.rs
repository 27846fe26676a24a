use rand::rngs::StdRng;
use rand::Rng;

use crate::config::Tuning;
use crate::entities::{BossPhase, WeaponKind};
use crate::fx::FxQueue;
use crate::player::Player;

/// Shared simulation context handed to every system update.
///
/// Holds the per-run counters and flags, the one RNG all randomness is drawn
/// from, and the effect queue drained by the loop driver each frame.
#[derive(Debug)]
pub struct World {
    pub w: f32,
    pub h: f32,
    /// Scroll rate in px/s.
    pub scroll: f32,
    /// Pixels the world moves this frame (0 during a boss fight).
    pub dy: f32,
    pub dist: f32,
    pub enemies_destroyed: u32,
    /// Incidental walkers killed.
    pub collateral: u32,
    pub player: Option<Player>,
    pub boss_active: bool,
    pub boss_phase: BossPhase,
    pub next_boss_dist: f32,
    pub spawn_locked: bool,
    /// Ambient spawn density in [0, 1].
    pub spawn_scale: f32,
    pub allowed_weapon_drops: Vec<WeaponKind>,
    pub rng: StdRng,
    pub fx: FxQueue,
}

impl World {
    pub fn new(tuning: &Tuning, rng: StdRng) -> Self {
        Self {
            w: tuning.canvas_w,
            h: tuning.canvas_h,
            scroll: tuning.scroll_px_per_sec,
            dy: 0.0,
            dist: 0.0,
            enemies_destroyed: 0,
            collateral: 0,
            player: None,
            boss_active: false,
            boss_phase: BossPhase::None,
            next_boss_dist: tuning.boss_interval(),
            spawn_locked: false,
            spawn_scale: 1.0,
            allowed_weapon_drops: tuning.pickups.allowed_weapon_drops.clone(),
            rng,
            fx: FxQueue::default(),
        }
    }

    /// Back to run-start values.  The RNG stream carries on.
    pub fn reset(&mut self, tuning: &Tuning) {
        self.w = tuning.canvas_w;
        self.h = tuning.canvas_h;
        self.scroll = tuning.scroll_px_per_sec;
        self.dy = 0.0;
        self.dist = 0.0;
        self.enemies_destroyed = 0;
        self.collateral = 0;
        self.player = None;
        self.boss_active = false;
        self.boss_phase = BossPhase::None;
        self.next_boss_dist = tuning.boss_interval();
        self.spawn_locked = false;
        self.spawn_scale = 1.0;
        self.allowed_weapon_drops = tuning.pickups.allowed_weapon_drops.clone();
        self.fx.clear();
    }

    /// The player, if present and not in its death animation.
    pub fn live_player(&self) -> Option<&Player> {
        self.player.as_ref().filter(|p| !p.dead)
    }

    pub fn live_player_mut(&mut self) -> Option<&mut Player> {
        self.player.as_mut().filter(|p| !p.dead)
    }

    /// One ambient spawn roll: never while locked, otherwise weighted by
    /// the current spawn density.
    pub fn roll_spawn(&mut self) -> bool {
        if self.spawn_locked || self.spawn_scale <= 0.0 {
            return false;
        }
        self.spawn_scale >= 1.0 || self.rng.gen::<f32>() < self.spawn_scale
    }

    pub fn rand(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    pub fn rand_range(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }
}
