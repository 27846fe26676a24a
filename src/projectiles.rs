//! Player projectiles and beams.
//!
//! Ballistic shots are integrated here and queried by the enemy pools through
//! [`Projectiles::consume_hits_circle`].  Beams are not queried: each tick the
//! engine hands every live beam to the resolvers registered for its kind.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

use crate::beam::{aim_dir, BeamField};
use crate::config::Tuning;
use crate::entities::{Beam, BeamKind, MountSide, Projectile, Puff, RocketState, Shape, WeaponKind};
use crate::world::World;

/// What a hit handler wants done with the projectile it was shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hit {
    /// Remove the projectile.
    Consume,
    /// Leave it flying.
    Pierce,
}

/// Per-shot multipliers from the firer's upgrades.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShotMods {
    pub speed_mul: f32,
    pub damage_mul: f32,
}

impl Default for ShotMods {
    fn default() -> Self {
        Self { speed_mul: 1.0, damage_mul: 1.0 }
    }
}

/// A pool that takes beam damage.
pub trait BeamResolver {
    fn resolve_beam(&mut self, field: &BeamField<'_>, world: &mut World);
}

pub type SharedResolver = Rc<RefCell<dyn BeamResolver>>;

pub struct Projectiles {
    tuning: Arc<Tuning>,
    shots: Vec<Projectile>,
    beams: Vec<Beam>,
    beam_resolvers: Vec<SharedResolver>,
    punch_resolvers: Vec<SharedResolver>,
}

impl Projectiles {
    pub fn new(tuning: Arc<Tuning>) -> Self {
        Self {
            tuning,
            shots: Vec::new(),
            beams: Vec::new(),
            beam_resolvers: Vec::new(),
            punch_resolvers: Vec::new(),
        }
    }

    pub fn shots(&self) -> &[Projectile] {
        &self.shots
    }

    pub fn beams(&self) -> &[Beam] {
        &self.beams
    }

    pub fn is_empty(&self) -> bool {
        self.shots.is_empty() && self.beams.is_empty()
    }

    /// Drop every shot and beam.  Registered resolvers stay.
    pub fn reset(&mut self) {
        self.shots.clear();
        self.beams.clear();
    }

    pub fn register_beam_resolver(&mut self, resolver: SharedResolver) {
        self.beam_resolvers.push(resolver);
    }

    pub fn register_punch_beam_resolver(&mut self, resolver: SharedResolver) {
        self.punch_resolvers.push(resolver);
    }

    /// Launch a shot of `kind` from (x, y) along `angle`.  Beam weapons are
    /// forwarded to [`Projectiles::fire_beam`] untracked.
    pub fn spawn(&mut self, x: f32, y: f32, angle: f32, kind: WeaponKind, mods: ShotMods) {
        if let Some(beam) = kind.beam_kind() {
            self.fire_beam(x, y, angle, beam, mods, None);
            return;
        }
        let p = &self.tuning.projectiles;
        let (dx, dy) = aim_dir(angle);
        let (speed, life, damage, shape) = match kind {
            WeaponKind::Rifle => (p.rifle.speed, p.rifle.life, p.rifle.damage, Shape::Round { r: p.rifle.r }),
            WeaponKind::Shotgun => {
                (p.shotgun.speed, p.shotgun.life, p.shotgun.damage, Shape::Round { r: p.shotgun.r })
            }
            WeaponKind::Cannon => (p.cannon.speed, p.cannon.life, p.cannon.damage, Shape::Round { r: p.cannon.r }),
            WeaponKind::Chaingun => (
                p.chaingun.speed,
                p.chaingun.life,
                p.chaingun.damage,
                Shape::Tracer { len: p.chaingun.len, w: p.chaingun.w },
            ),
            WeaponKind::Rocket => {
                let r = &p.rocket;
                let speed = r.speed * mods.speed_mul;
                let state = RocketState {
                    speed,
                    vmax: r.vmax * mods.speed_mul.max(1.0),
                    accel: r.accel,
                    ramp_secs: r.ramp_secs,
                    accel_base: r.accel_base,
                    accel_peak: r.accel_peak,
                    len: r.len,
                    w: r.w,
                    trail_dt: r.trail_dt,
                    trail_acc: 0.0,
                    trail_len: r.trail_len,
                    puff_r0: r.puff_r0,
                    puff_growth: r.puff_growth,
                    puff_fade: r.puff_fade,
                    trail: VecDeque::with_capacity(r.trail_len),
                };
                (r.speed, r.life, r.damage, Shape::Rocket(state))
            }
            WeaponKind::Beamer | WeaponKind::Puncher => return,
        };
        self.shots.push(Projectile {
            kind,
            x,
            y,
            vx: dx * speed * mods.speed_mul,
            vy: dy * speed * mods.speed_mul,
            damage: damage * mods.damage_mul,
            t: 0.0,
            life,
            shape,
        });
    }

    /// Start a beam.  A tracked beam follows its mount's muzzle through
    /// [`Projectiles::retrack`].
    pub fn fire_beam(
        &mut self,
        x: f32,
        y: f32,
        angle: f32,
        kind: BeamKind,
        mods: ShotMods,
        tracking: Option<MountSide>,
    ) {
        let spec = self.tuning.beams.spec(kind);
        let mut beam = Beam {
            kind,
            x0: x,
            y0: y,
            x1: x,
            y1: y,
            angle,
            damage: spec.damage * mods.damage_mul,
            range: spec.range,
            t: 0.0,
            life: spec.life,
            tracking,
        };
        place_beam(&mut beam, x, y, angle);
        self.beams.push(beam);
    }

    /// Move tracked beams onto their mount's current muzzle pose
    /// `(x, y, angle)`.  Beams whose source is gone keep their last pose.
    pub fn retrack(&mut self, pose: impl Fn(MountSide) -> Option<(f32, f32, f32)>) {
        for beam in self.beams.iter_mut() {
            if let Some((x, y, angle)) = beam.tracking.and_then(&pose) {
                place_beam(beam, x, y, angle);
            }
        }
    }

    pub fn update(&mut self, dt: f32, world: &mut World) {
        for s in self.shots.iter_mut() {
            s.t += dt;
            if let Shape::Rocket(r) = &mut s.shape {
                steer_rocket(r, &mut s.vx, &mut s.vy, s.t, dt);
                r.trail_acc += dt;
                if r.trail_dt > 0.0 && r.trail_acc >= r.trail_dt {
                    r.trail_acc = 0.0;
                    r.trail.push_back(Puff { x: s.x, y: s.y, r: r.puff_r0, alpha: 1.0 });
                    while r.trail.len() > r.trail_len {
                        r.trail.pop_front();
                    }
                }
                let (growth, fade) = (r.puff_growth, r.puff_fade);
                r.trail.retain_mut(|puff| {
                    puff.r += growth * dt;
                    puff.alpha -= fade * dt;
                    puff.alpha > 0.0
                });
            }
            s.x += s.vx * dt;
            s.y += s.vy * dt;
        }

        let (mx, my) = (self.tuning.projectiles.cull_margin_x, self.tuning.projectiles.cull_margin_y);
        let (w, h) = (world.w, world.h);
        self.shots
            .retain(|s| s.t <= s.life && s.x >= -mx && s.x <= w + mx && s.y >= -my && s.y <= h + my);

        for beam in self.beams.iter() {
            let field = BeamField::new(beam, self.tuning.beams.spec(beam.kind), dt);
            let resolvers = match beam.kind {
                BeamKind::Standard => &self.beam_resolvers,
                BeamKind::Punch => &self.punch_resolvers,
            };
            for r in resolvers {
                r.borrow_mut().resolve_beam(&field, world);
            }
        }
        for beam in self.beams.iter_mut() {
            beam.t += dt;
        }
        self.beams.retain(|b| b.t < b.life);
    }

    /// Offer every shot inside the circle to `handler`, newest first.  Shots
    /// the handler consumes are removed and are never offered again.
    pub fn consume_hits_circle(&mut self, cx: f32, cy: f32, r: f32, mut handler: impl FnMut(&Projectile) -> Hit) {
        let r2 = r * r;
        let mut i = self.shots.len();
        while i > 0 {
            i -= 1;
            let s = &self.shots[i];
            let (dx, dy) = (s.x - cx, s.y - cy);
            if dx * dx + dy * dy <= r2 && handler(s) == Hit::Consume {
                self.shots.remove(i);
            }
        }
    }

    /// Like [`Projectiles::consume_hits_circle`] but never removes anything.
    pub fn for_each_hit_circle(&self, cx: f32, cy: f32, r: f32, mut handler: impl FnMut(&Projectile)) {
        let r2 = r * r;
        for s in self.shots.iter().rev() {
            let (dx, dy) = (s.x - cx, s.y - cy);
            if dx * dx + dy * dy <= r2 {
                handler(s);
            }
        }
    }
}

fn place_beam(beam: &mut Beam, x: f32, y: f32, angle: f32) {
    let (dx, dy) = aim_dir(angle);
    beam.x0 = x;
    beam.y0 = y;
    beam.angle = angle;
    beam.x1 = x + dx * beam.range;
    beam.y1 = y + dy * beam.range;
}

fn steer_rocket(r: &mut RocketState, vx: &mut f32, vy: &mut f32, t: f32, dt: f32) {
    let v = (*vx * *vx + *vy * *vy).sqrt();
    let (nx, ny) = if v > 0.0 { (*vx / v, *vy / v) } else { (0.0, -1.0) };
    let k = if r.ramp_secs > 0.0 { (t / r.ramp_secs).min(1.0) } else { 1.0 };
    let ease = 1.0 - (1.0 - k).powi(3);
    let factor = r.accel_base + (r.accel_peak - r.accel_base) * ease;
    r.speed = (v + r.accel * factor * dt).min(r.vmax);
    *vx = nx * r.speed;
    *vy = ny * r.speed;
}
