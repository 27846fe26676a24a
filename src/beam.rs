//! Beam damage field.
//!
//! A beam is a segment from the muzzle along its aim.  A target's share of
//! the per-tick damage depends on where it projects onto the segment and how
//! far it sits from it:
//!
//! * along the beam: full damage up to `near_frac`, then a linear falloff to
//!   `far_damage_mul` at the far end, plus a point-blank boost inside
//!   `close_boost_frac`;
//! * across the beam: full damage inside the core, then a falloff to the fan
//!   edge.  The fan is wider at the muzzle (`fan_muzzle_mul`) and tapers to
//!   `edge_radius` at the far end.
//!
//! Standard beams fade to zero at the fan edge with a small random jitter.
//! Punch beams fade only part way and are deterministic.

use rand::Rng;

use crate::config::BeamSpec;
use crate::entities::{Beam, BeamKind};

/// Where a target sits inside a beam's fan.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldSample {
    /// Position along the beam in [0, hit_range_frac].
    pub t: f32,
    /// Perpendicular gap between the beam and the target's edge.
    pub radial: f32,
    /// Fan half-width at `t`.
    pub fan: f32,
}

fn lerp(a: f32, b: f32, k: f32) -> f32 {
    a + (b - a) * k
}

/// Unit vector for an aim angle (0 is straight up the screen).
pub fn aim_dir(angle: f32) -> (f32, f32) {
    (angle.sin(), -angle.cos())
}

pub fn distance_mul(t: f32, spec: &BeamSpec) -> f32 {
    if t <= spec.near_frac || spec.near_frac >= 1.0 {
        return 1.0;
    }
    let k = ((t - spec.near_frac) / (1.0 - spec.near_frac)).clamp(0.0, 1.0);
    lerp(1.0, spec.far_damage_mul, k)
}

pub fn close_boost(t: f32, spec: &BeamSpec) -> f32 {
    if spec.close_boost_frac <= 0.0 || t >= spec.close_boost_frac {
        return 1.0;
    }
    1.0 + (spec.close_boost_mul - 1.0) * (1.0 - t / spec.close_boost_frac)
}

/// Radial multiplier for standard beams.  `jitter` is a relative offset
/// applied outside the core.
pub fn standard_radial_mul(radial: f32, core: f32, fan: f32, jitter: f32) -> f32 {
    if radial <= core {
        return 1.0;
    }
    let span = (fan - core).max(f32::EPSILON);
    let u = ((radial - core) / span).clamp(0.0, 1.0);
    ((1.0 - u) * (1.0 + jitter)).clamp(0.0, 1.0)
}

/// Radial multiplier for punch beams: drops by `edge_fade` across the fan.
pub fn punch_radial_mul(radial: f32, core: f32, fan: f32, edge_fade: f32) -> f32 {
    if radial <= core {
        return 1.0;
    }
    let span = (fan - core).max(f32::EPSILON);
    let u = ((radial - core) / span).clamp(0.0, 1.0);
    (1.0 - edge_fade.clamp(0.0, 1.0) * u).clamp(0.0, 1.0)
}

/// One beam as seen by a resolver during a single tick.
#[derive(Clone, Copy, Debug)]
pub struct BeamField<'a> {
    pub beam: &'a Beam,
    pub spec: &'a BeamSpec,
    pub tick_dt: f32,
}

impl<'a> BeamField<'a> {
    pub fn new(beam: &'a Beam, spec: &'a BeamSpec, tick_dt: f32) -> Self {
        Self { beam, spec, tick_dt }
    }

    pub fn kind(&self) -> BeamKind {
        self.beam.kind
    }

    pub fn direction(&self) -> (f32, f32) {
        aim_dir(self.beam.angle)
    }

    /// Share of the beam's total damage delivered this tick.
    pub fn tick_damage(&self) -> f32 {
        if self.spec.life <= 0.0 {
            return self.beam.damage;
        }
        self.beam.damage * (self.tick_dt / self.spec.life)
    }

    pub fn sample(&self, x: f32, y: f32, target_r: f32) -> Option<FieldSample> {
        let range = self.beam.range.max(f32::EPSILON);
        let (dx, dy) = self.direction();
        let px = x - self.beam.x0;
        let py = y - self.beam.y0;
        let along = px * dx + py * dy;
        let t = (along / range).max(0.0);
        let hit_frac = self.spec.hit_range_frac.max(f32::EPSILON);
        if t > hit_frac {
            return None;
        }
        let cx = self.beam.x0 + dx * t * range;
        let cy = self.beam.y0 + dy * t * range;
        let dist = ((x - cx).powi(2) + (y - cy).powi(2)).sqrt();
        let radial = (dist - target_r).max(0.0);
        let fan = self.spec.edge_radius * lerp(self.spec.fan_muzzle_mul, 1.0, t / hit_frac);
        if radial > fan {
            return None;
        }
        Some(FieldSample { t, radial, fan })
    }

    /// Damage this tick with an explicit jitter draw (ignored by punch beams).
    pub fn damage_with_jitter(&self, x: f32, y: f32, target_r: f32, jitter: f32) -> f32 {
        let Some(s) = self.sample(x, y, target_r) else {
            return 0.0;
        };
        let radial = match self.beam.kind {
            BeamKind::Standard => standard_radial_mul(s.radial, self.spec.core_radius, s.fan, jitter),
            BeamKind::Punch => {
                punch_radial_mul(s.radial, self.spec.core_radius, s.fan, self.spec.edge_fade)
            }
        };
        self.tick_damage() * distance_mul(s.t, self.spec) * close_boost(s.t, self.spec) * radial
    }

    /// Damage this tick against a circle of radius `target_r` at (x, y).
    pub fn damage_at(&self, x: f32, y: f32, target_r: f32, rng: &mut impl Rng) -> f32 {
        let Some(s) = self.sample(x, y, target_r) else {
            return 0.0;
        };
        let jitter = if self.beam.kind == BeamKind::Standard
            && s.radial > self.spec.core_radius
            && self.spec.jitter > 0.0
        {
            rng.gen_range(-self.spec.jitter..=self.spec.jitter)
        } else {
            0.0
        };
        self.damage_with_jitter(x, y, target_r, jitter)
    }
}
