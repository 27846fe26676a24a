//! Gameplay tuning.
//!
//! Everything numeric the simulation consults at spawn/build time lives here.
//! The tree is read-only once built: systems hold an `Arc<Tuning>` and never
//! write back into it.  Keep this separate from front-end settings (terminal
//! size, key bindings, ...).

use std::path::{Path, PathBuf};

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::{BeamKind, TurretType, WeaponKind};

/// Errors raised while loading a tuning file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read tuning file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid tuning file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

// ── Ranges ────────────────────────────────────────────────────────────────────

/// Inclusive float range used for randomized stats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Uniform sample.  Degenerate or inverted ranges collapse to `min`.
    pub fn sample(&self, rng: &mut impl Rng) -> f32 {
        if self.max > self.min {
            rng.gen_range(self.min..self.max)
        } else {
            self.min
        }
    }

    /// Both ends divided by `div` (used for fire-rate multipliers).
    pub fn scaled_down(&self, div: f32) -> Self {
        let div = if div > 0.0 { div } else { 1.0 };
        Self::new(self.min / div, self.max / div)
    }
}

/// Inclusive integer range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CountSpan {
    pub min: u32,
    pub max: u32,
}

impl CountSpan {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn sample(&self, rng: &mut impl Rng) -> u32 {
        if self.max > self.min {
            rng.gen_range(self.min..=self.max)
        } else {
            self.min
        }
    }
}

// ── Root ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Play surface size in world pixels.
    pub canvas_w: f32,
    pub canvas_h: f32,
    /// World scroll rate in px/s.
    pub scroll_px_per_sec: f32,
    /// Upper bound on a single simulation step, in seconds.
    pub max_dt: f32,
    /// Seconds for ambient spawn density to ramp back to full after a boss.
    pub spawn_ramp_secs: f32,
    /// Terrain row height; spawn cadences are expressed in rows.
    pub tile_h: f32,
    pub player: PlayerTuning,
    pub weapons: WeaponTuning,
    pub projectiles: ProjectileTuning,
    pub beams: BeamTuning,
    pub turrets: TurretTuning,
    pub walkers: WalkerTuning,
    pub boss: BossTuning,
    pub pickups: PickupTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            canvas_w: 768.0,
            canvas_h: 1024.0,
            scroll_px_per_sec: 60.0,
            max_dt: 0.033,
            spawn_ramp_secs: 6.0,
            tile_h: 200.0,
            player: PlayerTuning::default(),
            weapons: WeaponTuning::default(),
            projectiles: ProjectileTuning::default(),
            beams: BeamTuning::default(),
            turrets: TurretTuning::default(),
            walkers: WalkerTuning::default(),
            boss: BossTuning::default(),
            pickups: PickupTuning::default(),
        }
    }
}

impl Tuning {
    /// Parse a RON tuning file.  Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_ron(data: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(data)
    }

    /// Load `path` if it exists, otherwise (or on any error) the built-in table.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("no tuning file at {:?}, using built-in table", path);
            return Self::default();
        }
        match Self::load(path) {
            Ok(t) => {
                log::info!("loaded tuning from {:?}", path);
                t
            }
            Err(e) => {
                log::warn!("{}, using built-in table", e);
                Self::default()
            }
        }
    }

    /// Boss interval, never below one pixel.
    pub fn boss_interval(&self) -> f32 {
        self.boss.interval_dist.max(1.0)
    }
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub start_x_frac: f32,
    pub start_y_frac: f32,
    pub hp: f32,
    pub move_px_per_sec: f32,
    pub mount_offset_x: f32,
    pub mount_offset_y: f32,
    /// Max aim deflection from forward when the pointer is off the play surface.
    pub twist_deg: f32,
    /// Max aim deflection when the pointer is over the play surface.
    pub twist_deg_surface: f32,
    /// Per-60Hz-frame smoothing factors for the two cases above.
    pub twist_lerp: f32,
    pub twist_lerp_surface: f32,
    /// Body radius used for stomping walkers and ramming turrets.
    pub squash_r: f32,
    /// Radius enemy bullets test against.
    pub hit_r: f32,
    pub edge_margin: f32,
    /// Fraction of max HP that, once lost, costs the biggest equipped weapon.
    pub damage_bucket_frac: f32,
    pub death_anim_secs: f32,
    pub start_left: Option<WeaponKind>,
    pub start_right: Option<WeaponKind>,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            start_x_frac: 0.5,
            start_y_frac: 0.9,
            hp: 120.0,
            move_px_per_sec: 100.0,
            mount_offset_x: 30.0,
            mount_offset_y: 4.0,
            twist_deg: 50.0,
            twist_deg_surface: 115.0,
            twist_lerp: 0.15,
            twist_lerp_surface: 0.36,
            squash_r: 18.0,
            hit_r: 18.0,
            edge_margin: 14.0,
            damage_bucket_frac: 0.20,
            death_anim_secs: 1.1,
            start_left: Some(WeaponKind::Chaingun),
            start_right: Some(WeaponKind::Cannon),
        }
    }
}

// ── Weapons ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WeaponSpec {
    /// Seconds between shots before the reload multiplier.
    pub cooldown: f32,
    /// Muzzle offset from the mount, in mount-local space (−y is forward).
    pub muzzle_x: f32,
    pub muzzle_y: f32,
}

impl WeaponSpec {
    const fn new(cooldown: f32, muzzle_x: f32, muzzle_y: f32) -> Self {
        Self { cooldown, muzzle_x, muzzle_y }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaingunSpec {
    pub windup: f32,
    pub heat_per_sec: f32,
    pub cool_per_sec: f32,
}

impl Default for ChaingunSpec {
    fn default() -> Self {
        Self {
            windup: 0.85,
            heat_per_sec: 0.35,
            cool_per_sec: 0.25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponTuning {
    pub rifle: WeaponSpec,
    pub shotgun: WeaponSpec,
    pub chaingun: WeaponSpec,
    pub beamer: WeaponSpec,
    pub cannon: WeaponSpec,
    pub rocket: WeaponSpec,
    pub puncher: WeaponSpec,
    pub shotgun_pellets: u32,
    pub shotgun_spread_deg: f32,
    pub chaingun_heat: ChaingunSpec,
}

impl Default for WeaponTuning {
    fn default() -> Self {
        Self {
            rifle: WeaponSpec::new(0.18, 6.0, -12.0),
            shotgun: WeaponSpec::new(0.56, 8.0, -6.0),
            chaingun: WeaponSpec::new(0.08, 0.0, -60.0),
            beamer: WeaponSpec::new(1.35, 6.0, -12.0),
            cannon: WeaponSpec::new(0.50, 18.0, -2.0),
            rocket: WeaponSpec::new(0.90, 0.0, -18.0),
            puncher: WeaponSpec::new(0.70, 6.0, -8.0),
            shotgun_pellets: 3,
            shotgun_spread_deg: 8.0,
            chaingun_heat: ChaingunSpec::default(),
        }
    }
}

impl WeaponTuning {
    pub fn spec(&self, kind: WeaponKind) -> &WeaponSpec {
        match kind {
            WeaponKind::Rifle => &self.rifle,
            WeaponKind::Shotgun => &self.shotgun,
            WeaponKind::Chaingun => &self.chaingun,
            WeaponKind::Beamer => &self.beamer,
            WeaponKind::Cannon => &self.cannon,
            WeaponKind::Rocket => &self.rocket,
            WeaponKind::Puncher => &self.puncher,
        }
    }
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RoundSpec {
    pub speed: f32,
    pub life: f32,
    pub r: f32,
    pub damage: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TracerSpec {
    pub speed: f32,
    pub life: f32,
    pub len: f32,
    pub w: f32,
    pub damage: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RocketSpec {
    pub speed: f32,
    pub life: f32,
    pub accel: f32,
    pub vmax: f32,
    pub len: f32,
    pub w: f32,
    pub damage: f32,
    pub ramp_secs: f32,
    pub accel_base: f32,
    pub accel_peak: f32,
    pub trail_dt: f32,
    pub trail_len: usize,
    pub puff_r0: f32,
    pub puff_growth: f32,
    pub puff_fade: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    pub rifle: RoundSpec,
    pub shotgun: RoundSpec,
    pub cannon: RoundSpec,
    pub chaingun: TracerSpec,
    pub rocket: RocketSpec,
    /// Off-screen slack before a projectile is culled.
    pub cull_margin_x: f32,
    pub cull_margin_y: f32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            rifle: RoundSpec { speed: 450.0, life: 3.0, r: 3.0, damage: 10.0 },
            shotgun: RoundSpec { speed: 900.0, life: 3.0, r: 6.0, damage: 10.0 },
            cannon: RoundSpec { speed: 400.0, life: 2.0, r: 5.0, damage: 50.0 },
            chaingun: TracerSpec { speed: 550.0, life: 2.0, len: 18.0, w: 3.0, damage: 6.0 },
            rocket: RocketSpec {
                speed: 220.0,
                life: 2.6,
                accel: 800.0,
                vmax: 1000.0,
                len: 16.0,
                w: 6.0,
                damage: 60.0,
                ramp_secs: 0.6,
                accel_base: 0.2,
                accel_peak: 3.0,
                trail_dt: 0.03,
                trail_len: 12,
                puff_r0: 2.0,
                puff_growth: 22.0,
                puff_fade: 1.6,
            },
            cull_margin_x: 40.0,
            cull_margin_y: 80.0,
        }
    }
}

// ── Beams ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamSpec {
    pub range: f32,
    pub life: f32,
    pub damage: f32,
    /// Full damage within this perpendicular distance.
    pub core_radius: f32,
    /// Perpendicular reach at the far end of the beam.
    pub edge_radius: f32,
    pub near_frac: f32,
    pub far_damage_mul: f32,
    pub close_boost_frac: f32,
    pub close_boost_mul: f32,
    /// Portion of the segment that can deal damage.
    pub hit_range_frac: f32,
    /// Edge radius multiplier at the muzzle; tapers to 1 at the far end.
    pub fan_muzzle_mul: f32,
    /// Max relative jitter on the standard radial falloff.
    pub jitter: f32,
    /// How far the punch falloff drops at the fan edge (1 = to zero).
    pub edge_fade: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamTuning {
    pub standard: BeamSpec,
    pub punch: BeamSpec,
}

impl Default for BeamTuning {
    fn default() -> Self {
        Self {
            standard: BeamSpec {
                range: 980.0,
                life: 0.50,
                damage: 40.0,
                core_radius: 7.0,
                edge_radius: 34.0,
                near_frac: 0.25,
                far_damage_mul: 0.15,
                close_boost_frac: 0.16,
                close_boost_mul: 2.8,
                hit_range_frac: 1.0,
                fan_muzzle_mul: 1.6,
                jitter: 0.15,
                edge_fade: 1.0,
            },
            punch: BeamSpec {
                range: 300.0,
                life: 0.25,
                damage: 70.0,
                core_radius: 12.0,
                edge_radius: 42.0,
                near_frac: 0.45,
                far_damage_mul: 0.4,
                close_boost_frac: 0.25,
                close_boost_mul: 1.8,
                hit_range_frac: 1.0,
                fan_muzzle_mul: 1.3,
                jitter: 0.0,
                edge_fade: 0.5,
            },
        }
    }
}

impl BeamTuning {
    pub fn spec(&self, kind: BeamKind) -> &BeamSpec {
        match kind {
            BeamKind::Standard => &self.standard,
            BeamKind::Punch => &self.punch,
        }
    }
}

// ── Turrets ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TurretTypeSpec {
    pub size: f32,
    pub hp: f32,
    pub fire_cooldown: Span,
    pub bullet_speed: f32,
    pub bullet_damage: f32,
    pub bullet_r: f32,
    /// Relative spawn weight among ambient turrets.
    pub weight: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TurretTuning {
    pub spawn_rows: f32,
    pub spawn_attempts: u32,
    pub bullet_life: f32,
    /// Damage dealt to the player when walking into a turret.
    pub contact_damage: f32,
    pub small: TurretTypeSpec,
    pub medium: TurretTypeSpec,
    pub large: TurretTypeSpec,
}

impl Default for TurretTuning {
    fn default() -> Self {
        Self {
            spawn_rows: 2.0,
            spawn_attempts: 24,
            bullet_life: 8.0,
            contact_damage: 18.0,
            small: TurretTypeSpec {
                size: 13.0,
                hp: 35.0,
                fire_cooldown: Span::new(0.9, 1.5),
                bullet_speed: 180.0,
                bullet_damage: 7.0,
                bullet_r: 3.2,
                weight: 0.45,
            },
            medium: TurretTypeSpec {
                size: 18.0,
                hp: 70.0,
                fire_cooldown: Span::new(1.5, 2.4),
                bullet_speed: 175.0,
                bullet_damage: 14.0,
                bullet_r: 4.5,
                weight: 0.35,
            },
            large: TurretTypeSpec {
                size: 26.0,
                hp: 130.0,
                fire_cooldown: Span::new(1.4, 2.1),
                bullet_speed: 105.0,
                bullet_damage: 28.0,
                bullet_r: 6.2,
                weight: 0.20,
            },
        }
    }
}

impl TurretTuning {
    pub fn spec(&self, ty: TurretType) -> &TurretTypeSpec {
        match ty {
            TurretType::Small => &self.small,
            TurretType::Medium => &self.medium,
            TurretType::Large => &self.large,
        }
    }
}

// ── Walkers ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkerTuning {
    pub spawn_rows: f32,
    pub per_spawn: u32,
    /// Soft cap the density top-up steers toward.
    pub max: usize,
    /// Walkers placed above the screen at run start.
    pub seed: u32,
    pub spawn_attempts: u32,
    pub r: f32,
    pub hp: f32,
    /// Horizontal wander speed in px/s.
    pub speed: Span,
    pub talk_chance: f32,
    pub talk_time: f32,
    /// Per-second chance an idle walker starts a new line.
    pub talk_density: f32,
    pub talk_cooldown: f32,
    pub walk_freq: f32,
    pub smear_life: f32,
    pub impact_life: f32,
}

impl Default for WalkerTuning {
    fn default() -> Self {
        Self {
            spawn_rows: 2.0,
            per_spawn: 3,
            max: 30,
            seed: 6,
            spawn_attempts: 24,
            r: 10.0,
            hp: 1.0,
            speed: Span::new(6.0, 96.0),
            talk_chance: 0.05,
            talk_time: 1.2,
            talk_density: 0.12,
            talk_cooldown: 3.0,
            walk_freq: 8.0,
            smear_life: 5.0,
            impact_life: 6.2,
        }
    }
}

// ── Bosses ────────────────────────────────────────────────────────────────────

/// Multipliers an encounter applies on top of base stats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterMods {
    pub hp_mul: f32,
    pub size_mul: f32,
    pub damage_mul: f32,
    pub projectile_speed_mul: f32,
    /// Above 1 fires faster.
    pub fire_rate_mul: f32,
    pub mount_mul: f32,
    /// Added to the float hull's large-mount chance.
    pub large_mount_bonus: f32,
    pub hover_speed_mul: f32,
}

impl Default for EncounterMods {
    fn default() -> Self {
        Self {
            hp_mul: 1.0,
            size_mul: 1.0,
            damage_mul: 1.0,
            projectile_speed_mul: 1.0,
            fire_rate_mul: 1.0,
            mount_mul: 1.0,
            large_mount_bonus: 0.0,
            hover_speed_mul: 1.0,
        }
    }
}

impl EncounterMods {
    /// Stack per-member overrides on top of encounter-level modifiers.
    pub fn stacked(&self, other: &EncounterMods) -> EncounterMods {
        EncounterMods {
            hp_mul: self.hp_mul * other.hp_mul,
            size_mul: self.size_mul * other.size_mul,
            damage_mul: self.damage_mul * other.damage_mul,
            projectile_speed_mul: self.projectile_speed_mul * other.projectile_speed_mul,
            fire_rate_mul: self.fire_rate_mul * other.fire_rate_mul,
            mount_mul: self.mount_mul * other.mount_mul,
            large_mount_bonus: self.large_mount_bonus + other.large_mount_bonus,
            hover_speed_mul: self.hover_speed_mul * other.hover_speed_mul,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackMember {
    pub turret_type: TurretType,
    /// Horizontal placement: 0 left edge, 0.5 center, 1 right edge.
    pub x_frac: f32,
    #[serde(default)]
    pub mods: EncounterMods,
}

impl PackMember {
    pub fn new(turret_type: TurretType, x_frac: f32, mods: EncounterMods) -> Self {
        Self { turret_type, x_frac, mods }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EncounterKind {
    Float,
    Turret { turret_type: TurretType },
    /// Empty member list means the default pack.
    Pack { members: Vec<PackMember> },
}

/// One row of the encounter table; `max_level: None` is open-ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterRule {
    pub min_level: u32,
    #[serde(default)]
    pub max_level: Option<u32>,
    pub kind: EncounterKind,
    #[serde(default)]
    pub mods: EncounterMods,
}

impl EncounterRule {
    pub fn matches(&self, level: u32) -> bool {
        level >= self.min_level && self.max_level.map_or(true, |max| level <= max)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TurretBossSpec {
    pub stop_y_frac: f32,
    pub hp_mult: f32,
    pub size_mult: f32,
    /// Extra HP per boss level past the first.
    pub level_hp_step: f32,
    /// Minimum fire cooldown after all multipliers.
    pub min_cooldown: f32,
}

impl Default for TurretBossSpec {
    fn default() -> Self {
        Self {
            stop_y_frac: 0.24,
            hp_mult: 4.0,
            size_mult: 1.5,
            level_hp_step: 0.12,
            min_cooldown: 0.12,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FloatSpec {
    pub hp_base: f32,
    pub hp_per_level: f32,
    pub width: Span,
    pub height: Span,
    pub stop_y_frac: f32,
    /// Gap between the screen top and the hull when spawned from the top.
    pub entry_gap: f32,
    pub hover_x: Span,
    pub hover_y: Span,
    pub hover_speed: Span,
    pub cooldown_level_reduce: f32,
    pub mounts: CountSpan,
    pub large_mount_chance: f32,
    pub deco: CountSpan,
    pub mount_overhang_chance: f32,
    pub mount_min_overlap: f32,
    pub deco_overhang_chance: f32,
    pub deco_min_overlap: f32,
    /// Seconds between two mounts popping off.
    pub mount_pop_cooldown: f32,
}

impl Default for FloatSpec {
    fn default() -> Self {
        Self {
            hp_base: 220.0,
            hp_per_level: 85.0,
            width: Span::new(72.0, 118.0),
            height: Span::new(120.0, 186.0),
            stop_y_frac: 0.26,
            entry_gap: 34.0,
            hover_x: Span::new(28.0, 55.0),
            hover_y: Span::new(6.0, 18.0),
            hover_speed: Span::new(0.7, 1.25),
            cooldown_level_reduce: 0.045,
            mounts: CountSpan::new(3, 6),
            large_mount_chance: 0.32,
            deco: CountSpan::new(10, 20),
            mount_overhang_chance: 0.35,
            mount_min_overlap: 0.20,
            deco_overhang_chance: 0.40,
            deco_min_overlap: 0.10,
            mount_pop_cooldown: 0.24,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BossTuning {
    pub interval_dist: f32,
    pub encounter_default: EncounterRule,
    /// Matched top to bottom; first hit wins.
    pub encounters: Vec<EncounterRule>,
    pub turret: TurretBossSpec,
    pub pack_default_members: Vec<PackMember>,
    pub float: FloatSpec,
}

impl Default for BossTuning {
    fn default() -> Self {
        let flanker = EncounterMods {
            fire_rate_mul: 1.45,
            damage_mul: 0.75,
            ..EncounterMods::default()
        };
        Self {
            interval_dist: 2000.0,
            encounter_default: EncounterRule {
                min_level: 1,
                max_level: None,
                kind: EncounterKind::Float,
                mods: EncounterMods::default(),
            },
            encounters: vec![
                EncounterRule {
                    min_level: 1,
                    max_level: Some(1),
                    kind: EncounterKind::Turret { turret_type: TurretType::Large },
                    mods: EncounterMods {
                        hp_mul: 1.2,
                        size_mul: 1.4,
                        ..EncounterMods::default()
                    },
                },
                EncounterRule {
                    min_level: 2,
                    max_level: Some(2),
                    kind: EncounterKind::Pack {
                        members: vec![
                            PackMember::new(
                                TurretType::Large,
                                0.50,
                                EncounterMods {
                                    hp_mul: 1.25,
                                    size_mul: 1.45,
                                    ..EncounterMods::default()
                                },
                            ),
                            PackMember::new(TurretType::Small, 0.30, flanker),
                            PackMember::new(TurretType::Small, 0.70, flanker),
                        ],
                    },
                    mods: EncounterMods::default(),
                },
                EncounterRule {
                    min_level: 3,
                    max_level: Some(5),
                    kind: EncounterKind::Float,
                    mods: EncounterMods::default(),
                },
                EncounterRule {
                    min_level: 6,
                    max_level: None,
                    kind: EncounterKind::Float,
                    mods: EncounterMods {
                        hp_mul: 1.18,
                        fire_rate_mul: 1.12,
                        damage_mul: 1.12,
                        mount_mul: 1.15,
                        large_mount_bonus: 0.12,
                        hover_speed_mul: 1.08,
                        ..EncounterMods::default()
                    },
                },
            ],
            turret: TurretBossSpec::default(),
            pack_default_members: vec![
                PackMember::new(TurretType::Large, 0.50, EncounterMods::default()),
                PackMember::new(
                    TurretType::Small,
                    0.32,
                    EncounterMods {
                        fire_rate_mul: 1.35,
                        damage_mul: 0.78,
                        ..EncounterMods::default()
                    },
                ),
                PackMember::new(
                    TurretType::Small,
                    0.68,
                    EncounterMods {
                        fire_rate_mul: 1.35,
                        damage_mul: 0.78,
                        ..EncounterMods::default()
                    },
                ),
            ],
            float: FloatSpec::default(),
        }
    }
}

// ── Pickups ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupTuning {
    pub radius: f32,
    pub repair_heal_frac: f32,
    /// Base factor the minor bot upgrades derive from.
    pub minor_walker_factor: f32,
    pub speed_cap: f32,
    pub projectile_speed_cap: f32,
    pub reload_floor: f32,
    pub damage_cap: f32,
    /// Weapons a drop may carry.  Empty means every weapon.
    pub allowed_weapon_drops: Vec<WeaponKind>,
    pub burst_drag_x: f32,
    pub burst_drag_y: f32,
    pub burst_gravity: f32,
    pub burst_bounce: f32,
    pub settle_speed: f32,
    pub edge_margin: f32,
    pub despawn_margin: f32,
}

impl Default for PickupTuning {
    fn default() -> Self {
        Self {
            radius: 20.0,
            repair_heal_frac: 0.15,
            minor_walker_factor: 1.08,
            speed_cap: 2.0,
            projectile_speed_cap: 2.5,
            reload_floor: 0.4,
            damage_cap: 3.0,
            allowed_weapon_drops: vec![
                WeaponKind::Rifle,
                WeaponKind::Chaingun,
                WeaponKind::Beamer,
                WeaponKind::Rocket,
                WeaponKind::Cannon,
                WeaponKind::Puncher,
            ],
            burst_drag_x: 2.6,
            burst_drag_y: 2.2,
            burst_gravity: 110.0,
            burst_bounce: 0.35,
            settle_speed: 2.0,
            edge_margin: 20.0,
            despawn_margin: 40.0,
        }
    }
}
