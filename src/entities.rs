/// Game entity types: pure data, small accessors only.
use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::Span;

// ── Enumerations ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    Rifle,
    Shotgun,
    Chaingun,
    Beamer,
    Cannon,
    Rocket,
    /// Short heavy beam.
    Puncher,
}

impl WeaponKind {
    /// Debug cycling order.
    pub const ALL: [WeaponKind; 7] = [
        WeaponKind::Rifle,
        WeaponKind::Shotgun,
        WeaponKind::Chaingun,
        WeaponKind::Beamer,
        WeaponKind::Rocket,
        WeaponKind::Cannon,
        WeaponKind::Puncher,
    ];

    /// Physical size used to pick which weapon is lost first.
    pub fn size_rank(self) -> u8 {
        match self {
            WeaponKind::Rifle => 1,
            WeaponKind::Shotgun => 2,
            WeaponKind::Puncher => 3,
            WeaponKind::Chaingun => 4,
            WeaponKind::Beamer => 5,
            WeaponKind::Rocket => 6,
            WeaponKind::Cannon => 7,
        }
    }

    /// Heavy rounds keep flying after hitting a walker.
    pub fn pierces_walkers(self) -> bool {
        matches!(self, WeaponKind::Rocket | WeaponKind::Cannon)
    }

    pub fn beam_kind(self) -> Option<BeamKind> {
        match self {
            WeaponKind::Beamer => Some(BeamKind::Standard),
            WeaponKind::Puncher => Some(BeamKind::Punch),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WeaponKind::Rifle => "RIFLE",
            WeaponKind::Shotgun => "SHOTGUN",
            WeaponKind::Chaingun => "CHAINGUN",
            WeaponKind::Beamer => "BEAMER",
            WeaponKind::Cannon => "CANNON",
            WeaponKind::Rocket => "ROCKET",
            WeaponKind::Puncher => "PUNCHER",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MountSide {
    Left,
    Right,
}

impl MountSide {
    pub const BOTH: [MountSide; 2] = [MountSide::Left, MountSide::Right];

    pub fn index(self) -> usize {
        match self {
            MountSide::Left => 0,
            MountSide::Right => 1,
        }
    }

    /// −1 for the left mount, +1 for the right.
    pub fn sign(self) -> f32 {
        match self {
            MountSide::Left => -1.0,
            MountSide::Right => 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurretType {
    Small,
    Medium,
    Large,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BossPhase {
    #[default]
    None,
    Clearing,
    Approach,
    Fight,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BossKind {
    Float,
    Turret,
    Pack,
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Puff {
    pub x: f32,
    pub y: f32,
    pub r: f32,
    pub alpha: f32,
}

#[derive(Clone, Debug)]
pub struct RocketState {
    pub speed: f32,
    pub vmax: f32,
    pub accel: f32,
    pub ramp_secs: f32,
    pub accel_base: f32,
    pub accel_peak: f32,
    pub len: f32,
    pub w: f32,
    pub trail_dt: f32,
    pub trail_acc: f32,
    pub trail_len: usize,
    pub puff_r0: f32,
    pub puff_growth: f32,
    pub puff_fade: f32,
    /// Newest puff at the back.
    pub trail: VecDeque<Puff>,
}

#[derive(Clone, Debug)]
pub enum Shape {
    Round { r: f32 },
    Tracer { len: f32, w: f32 },
    Rocket(RocketState),
}

#[derive(Clone, Debug)]
pub struct Projectile {
    pub kind: WeaponKind,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub damage: f32,
    /// Seconds alive.
    pub t: f32,
    pub life: f32,
    pub shape: Shape,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BeamKind {
    Standard,
    Punch,
}

#[derive(Clone, Debug)]
pub struct Beam {
    pub kind: BeamKind,
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    pub angle: f32,
    /// Total damage over the full lifetime, before field falloff.
    pub damage: f32,
    pub range: f32,
    pub t: f32,
    pub life: f32,
    /// Mount whose muzzle the beam follows, if any.
    pub tracking: Option<MountSide>,
}

// ── Enemies ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BossTag {
    pub level: u32,
    pub kind: BossKind,
}

#[derive(Clone, Debug)]
pub struct Turret {
    pub x: f32,
    pub y: f32,
    pub ty: TurretType,
    pub size: f32,
    pub hp: f32,
    pub max_hp: f32,
    /// Seconds until the next shot.
    pub cool: f32,
    pub fire_cooldown: Span,
    pub bullet_speed: f32,
    pub bullet_damage: f32,
    pub bullet_r: f32,
    pub fx_spark_t: f32,
    pub fx_smoke_t: f32,
    pub boss: Option<BossTag>,
    /// Still descending toward `stop_y`; does not fire meanwhile.
    pub entering: bool,
    pub stop_y: f32,
}

impl Turret {
    pub fn hit_r(&self) -> f32 {
        self.size * 0.9
    }

    pub fn is_boss(&self) -> bool {
        self.boss.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct HostileShot {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub r: f32,
    pub damage: f32,
    pub t: f32,
    pub life: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MountClass {
    Small,
    Large,
}

/// A gun mount on a float hull, relative to the hull center.
#[derive(Clone, Debug)]
pub struct Mount {
    pub class: MountClass,
    pub ox: f32,
    pub oy: f32,
    pub size: f32,
    pub bullet_r: f32,
    pub bullet_speed: f32,
    pub bullet_damage: f32,
    pub fire_cooldown: Span,
    pub cool: f32,
    pub alive: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DecoShape {
    Rect { w: f32, h: f32 },
    Antenna { len: f32 },
    Pod { r: f32 },
    Slot { w: f32, h: f32 },
}

impl DecoShape {
    /// Bounding box (w, h).
    pub fn footprint(&self) -> (f32, f32) {
        match *self {
            DecoShape::Rect { w, h } | DecoShape::Slot { w, h } => (w, h),
            DecoShape::Antenna { len } => (2.0, len),
            DecoShape::Pod { r } => (r * 2.0, r * 2.0),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Deco {
    pub ox: f32,
    pub oy: f32,
    pub shape: DecoShape,
}

#[derive(Clone, Debug)]
pub struct FloatBoss {
    pub level: u32,
    pub x: f32,
    pub y: f32,
    pub base_x: f32,
    pub base_y: f32,
    pub stop_y: f32,
    pub entering: bool,
    pub w: f32,
    pub h: f32,
    pub hp: f32,
    pub max_hp: f32,
    /// Hover clock; restarts when the entry descent finishes.
    pub t: f32,
    pub hover_x: f32,
    pub hover_y: f32,
    pub hover_speed: f32,
    pub mounts: Vec<Mount>,
    pub deco: Vec<Deco>,
    pub mount_pop_t: f32,
    pub bullet_life: f32,
}

impl FloatBoss {
    pub fn hit_r(&self) -> f32 {
        self.w.max(self.h) * 0.55
    }

    pub fn alive_mounts(&self) -> usize {
        self.mounts.iter().filter(|m| m.alive).count()
    }

    pub fn hp_ratio(&self) -> f32 {
        if self.max_hp > 0.0 {
            (self.hp / self.max_hp).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

// ── Incidental walkers ────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Speech {
    pub line: &'static str,
    pub t: f32,
}

/// Last damage a walker took, used to orient its splat.
#[derive(Clone, Copy, Debug)]
pub struct HitVector {
    pub damage: f32,
    pub vx: f32,
    pub vy: f32,
}

#[derive(Clone, Debug)]
pub struct Walker {
    pub x: f32,
    pub y: f32,
    pub r: f32,
    pub hp: f32,
    pub max_hp: f32,
    /// px/s.
    pub speed: f32,
    /// −1 or +1.
    pub dir: f32,
    pub anim_t: f32,
    pub walk_phase: f32,
    pub sway_mul: f32,
    pub bob_mul: f32,
    pub speech: Option<Speech>,
    pub talk_cd: f32,
    pub last_hit: Option<HitVector>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SplatMode {
    /// Stomped: stretched along the walking direction.
    Smear { len: f32, width: f32, rot: f32 },
    /// Shot: sprayed along the hit direction.
    Impact,
}

#[derive(Clone, Debug)]
pub struct Blob {
    pub x: f32,
    pub y: f32,
    pub r: f32,
}

#[derive(Clone, Debug)]
pub struct Splat {
    pub x: f32,
    pub y: f32,
    pub t: f32,
    pub life: f32,
    pub mode: SplatMode,
    pub blobs: Vec<Blob>,
}

// ── Pickups ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatKind {
    MoveSpeed,
    Damage,
    ProjectileSpeed,
    Reload,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PickupEffect {
    Weapon { side: MountSide, weapon: WeaponKind },
    Repair { heal_frac: f32 },
    BotUpgrade { stat: StatKind, factor: f32 },
}

#[derive(Clone, Debug)]
pub struct Pickup {
    pub x: f32,
    pub y: f32,
    /// Present while a boss-burst item is still sliding.
    pub vel: Option<(f32, f32)>,
    pub effect: PickupEffect,
}
