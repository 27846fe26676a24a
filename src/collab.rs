//! Collaborator hooks the simulation calls out to.
//!
//! Every hook has a `Null*` implementation so the core runs headless; the
//! terminal front-end supplies real ones.

use rand::rngs::StdRng;
use thiserror::Error;

use crate::bosses::BossStatus;
use crate::entities::{
    Beam, BossPhase, FloatBoss, HostileShot, Pickup, Projectile, Splat, Turret, Walker,
};
use crate::fx::{Burst, Sound};
use crate::player::Player;
use crate::score::RunSummary;

/// Storage key the best score is kept under.
pub const BEST_SCORE_KEY: &str = "walker_shooter.best_score";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render backend failed: {0}")]
    Backend(#[from] std::io::Error),
    #[error("render surface unavailable: {0}")]
    Surface(String),
}

/// Walkable ground.  Generation lives behind this trait.
pub trait Terrain {
    fn is_safe(&self, x: f32, y: f32) -> bool;
    /// Full-width rows from now on (boss arena).
    fn set_full_mode(&mut self, on: bool);
    fn set_generation_enabled(&mut self, on: bool);
    /// Every visible row is full width.
    fn is_cleared(&self) -> bool;
    fn advance(&mut self, dy: f32, rng: &mut StdRng);
    fn reset(&mut self, rng: &mut StdRng);
}

pub trait Audio {
    fn play(&mut self, sound: Sound);
}

pub trait Particles {
    fn spawn(&mut self, burst: &Burst);
    fn update(&mut self, _dt: f32) {}
}

/// Counters shown every frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HudCounters {
    pub distance: u32,
    pub enemies_destroyed: u32,
    pub collateral: u32,
    pub hp: f32,
    pub max_hp: f32,
    pub boss_phase: BossPhase,
}

pub trait Hud {
    fn tick(&mut self, counters: &HudCounters);
    /// `(0, 1)` hides the bar.
    fn boss_bar(&mut self, _hp: f32, _max_hp: f32) {}
    fn banner(&mut self, _text: &str, _millis: u32) {}
    fn run_summary(&mut self, _summary: &RunSummary, _best: u32) {}
}

pub trait ScoreStore {
    fn load_best(&self, key: &str) -> u32;
    fn save_best(&mut self, key: &str, score: u32);
}

/// Read-only snapshot of everything drawable in one frame.
pub struct FrameView<'a> {
    pub w: f32,
    pub h: f32,
    pub dist: f32,
    pub player: Option<&'a Player>,
    pub projectiles: &'a [Projectile],
    pub beams: &'a [Beam],
    pub turrets: &'a [Turret],
    pub floats: &'a [FloatBoss],
    pub enemy_shots: Vec<&'a HostileShot>,
    pub walkers: &'a [Walker],
    pub splats: &'a [Splat],
    pub pickups: &'a [Pickup],
    pub boss: Option<BossStatus>,
    pub terrain: &'a dyn Terrain,
}

pub trait Renderer {
    fn draw(&mut self, view: &FrameView<'_>) -> Result<(), RenderError>;
}

// ── Null objects ──────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct NullAudio;

impl Audio for NullAudio {
    fn play(&mut self, _sound: Sound) {}
}

#[derive(Debug, Default)]
pub struct NullParticles;

impl Particles for NullParticles {
    fn spawn(&mut self, _burst: &Burst) {}
}

#[derive(Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn draw(&mut self, _view: &FrameView<'_>) -> Result<(), RenderError> {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct NullHud;

impl Hud for NullHud {
    fn tick(&mut self, _counters: &HudCounters) {}
}

/// Keeps the best score in memory only.
#[derive(Debug, Default)]
pub struct NullScores {
    best: u32,
}

impl ScoreStore for NullScores {
    fn load_best(&self, _key: &str) -> u32 {
        self.best
    }

    fn save_best(&mut self, _key: &str, score: u32) {
        self.best = score;
    }
}

/// The full set of hooks a [`crate::game::Game`] drives.
pub struct Collaborators {
    pub terrain: Box<dyn Terrain>,
    pub audio: Box<dyn Audio>,
    pub particles: Box<dyn Particles>,
    pub renderer: Box<dyn Renderer>,
    pub hud: Box<dyn Hud>,
    pub scores: Box<dyn ScoreStore>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            terrain: Box::new(crate::terrain::OpenGround::default()),
            audio: Box::new(NullAudio),
            particles: Box::new(NullParticles),
            renderer: Box::new(NullRenderer),
            hud: Box::new(NullHud),
            scores: Box::new(NullScores::default()),
        }
    }
}

impl Collaborators {
    pub fn with_terrain(mut self, terrain: impl Terrain + 'static) -> Self {
        self.terrain = Box::new(terrain);
        self
    }

    pub fn with_audio(mut self, audio: impl Audio + 'static) -> Self {
        self.audio = Box::new(audio);
        self
    }

    pub fn with_particles(mut self, particles: impl Particles + 'static) -> Self {
        self.particles = Box::new(particles);
        self
    }

    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn with_hud(mut self, hud: impl Hud + 'static) -> Self {
        self.hud = Box::new(hud);
        self
    }

    pub fn with_scores(mut self, scores: impl ScoreStore + 'static) -> Self {
        self.scores = Box::new(scores);
        self
    }
}
