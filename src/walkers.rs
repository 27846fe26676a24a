//! Incidental walkers (IBS).
//!
//! Bystanders wander the safe ground and get in the way.  Stomping or
//! shooting one costs score through the collateral counter and leaves a
//! splat decal that rides the scroll until it fades.

use std::f32::consts::PI;
use std::sync::Arc;

use rand::Rng;

use crate::beam::BeamField;
use crate::collab::Terrain;
use crate::config::Tuning;
use crate::entities::{Blob, HitVector, Speech, Splat, SplatMode, Walker};
use crate::fx::{ParticleKind, Sound};
use crate::projectiles::{BeamResolver, Hit, Projectiles};
use crate::world::World;

pub const LINES: [&str; 12] = [
    "Don't shoot",
    "I'm too young",
    "Why me?",
    "Think of the children",
    "Are you crazy?",
    "Yikes",
    "Run",
    "Watch out",
    "Mind the gap",
    "I'm innocent",
    "Help",
    "Why oh why?",
];

fn random_line(rng: &mut impl Rng) -> &'static str {
    LINES[rng.gen_range(0..LINES.len())]
}

/// Stomp decal: a short smear of a few blobs.
pub fn smear_splat(x: f32, y: f32, life: f32, rng: &mut impl Rng) -> Splat {
    let len = 18.0 + rng.gen::<f32>() * 20.0;
    let width = 5.0 + rng.gen::<f32>() * 5.0;
    let rot = (rng.gen::<f32>() - 0.5) * 0.45;
    let n = 2 + rng.gen_range(0..2);
    let blobs = (0..n)
        .map(|_| Blob {
            x: x + (rng.gen::<f32>() - 0.5) * len * 0.4,
            y: y + (rng.gen::<f32>() - 0.5) * width * 1.8,
            r: 3.0 + rng.gen::<f32>() * 5.0,
        })
        .collect();
    Splat { x, y, t: 0.0, life, mode: SplatMode::Smear { len, width, rot }, blobs }
}

/// How far an impact decal spreads for a killing hit of `damage`.
pub fn impact_spread(damage: f32) -> f32 {
    (0.7 + damage.max(1.0) / 22.0).clamp(0.8, 3.5)
}

/// Shot decal: blobs sprayed along the incoming hit direction, wider and
/// more numerous for heavier hits.
pub fn impact_splat(x: f32, y: f32, hit: &HitVector, life: f32, rng: &mut impl Rng) -> Splat {
    let spread = impact_spread(hit.damage);
    let mag = hit.vx.hypot(hit.vy);
    let (nx, ny) = if mag > 0.0 { (hit.vx / mag, hit.vy / mag) } else { (0.0, -1.0) };
    let n = 4 + rng.gen_range(0..(5.0 + spread * 2.0) as u32);
    let blobs = (0..n)
        .map(|_| {
            let forward = 2.0 + rng.gen::<f32>() * 18.0 * spread;
            let lateral = (rng.gen::<f32>() - 0.5) * 10.0 * spread;
            let jitter = rng.gen::<f32>() * 3.0 * spread;
            Blob {
                x: x + nx * forward - ny * lateral + (rng.gen::<f32>() - 0.5) * jitter,
                y: y + ny * forward + nx * lateral + (rng.gen::<f32>() - 0.5) * jitter,
                r: 2.5 + rng.gen::<f32>() * (5.0 + spread * 1.7),
            }
        })
        .collect();
    Splat { x, y, t: 0.0, life, mode: SplatMode::Impact, blobs }
}

pub struct Walkers {
    tuning: Arc<Tuning>,
    walkers: Vec<Walker>,
    splats: Vec<Splat>,
    acc_px: f32,
}

impl Walkers {
    pub fn new(tuning: Arc<Tuning>) -> Self {
        Self {
            tuning,
            walkers: Vec::new(),
            splats: Vec::new(),
            acc_px: 0.0,
        }
    }

    /// Clear everything and pre-seed a few walkers above the screen.
    pub fn reset(&mut self, world: &mut World, terrain: &dyn Terrain) {
        self.walkers.clear();
        self.splats.clear();
        self.acc_px = 0.0;
        let row_h = self.tuning.tile_h;
        for _ in 0..self.tuning.walkers.seed {
            let y = -(row_h * (1.0 + world.rand() * 6.0));
            self.spawn_one(world, terrain, Some(y));
        }
    }

    pub fn walkers(&self) -> &[Walker] {
        &self.walkers
    }

    pub fn walkers_mut(&mut self) -> &mut Vec<Walker> {
        &mut self.walkers
    }

    pub fn splats(&self) -> &[Splat] {
        &self.splats
    }

    pub fn has_active(&self) -> bool {
        !self.walkers.is_empty()
    }

    pub fn clear(&mut self) {
        self.walkers.clear();
    }

    /// One walker on safe ground at `y` (just above the screen by default),
    /// centred if no safe spot turns up.
    pub fn spawn_one(&mut self, world: &mut World, terrain: &dyn Terrain, y: Option<f32>) {
        let cfg = &self.tuning.walkers;
        let y = y.unwrap_or(-cfg.r - 8.0);
        let mut spot = None;
        for _ in 0..cfg.spawn_attempts {
            let x = 20.0 + world.rand() * (world.w - 40.0).max(0.0);
            if terrain.is_safe(x, y + 8.0) {
                spot = Some(x);
                break;
            }
        }
        let speech = match spot {
            Some(_) if world.rand() < cfg.talk_chance => Some(Speech { line: random_line(&mut world.rng), t: 0.0 }),
            _ => None,
        };
        let rng = &mut world.rng;
        self.walkers.push(Walker {
            x: spot.unwrap_or(world.w / 2.0),
            y,
            r: cfg.r,
            hp: cfg.hp,
            max_hp: cfg.hp,
            speed: cfg.speed.sample(rng),
            dir: if rng.gen_bool(0.5) { -1.0 } else { 1.0 },
            anim_t: 0.0,
            walk_phase: 0.0,
            sway_mul: 0.7 + rng.gen::<f32>() * 0.8,
            bob_mul: 0.7 + rng.gen::<f32>() * 1.0,
            speech,
            talk_cd: 0.0,
            last_hit: None,
        });
    }

    fn spawn_cadence(&mut self, world: &mut World, terrain: &dyn Terrain) {
        let cfg = &self.tuning.walkers;
        let (per_spawn, max) = (cfg.per_spawn.max(1), cfg.max);
        let spacing = (self.tuning.tile_h * cfg.spawn_rows).max(1.0);
        self.acc_px += world.dy;
        while self.acc_px >= spacing {
            self.acc_px -= spacing;
            if world.roll_spawn() {
                for _ in 0..per_spawn {
                    self.spawn_one(world, terrain, None);
                }
            }
        }

        if self.walkers.len() < max && !world.spawn_locked {
            let deficit = (max - self.walkers.len()) as f32;
            let p = (deficit / max.max(1) as f32 * (world.dy / self.tuning.tile_h.max(1.0)) * 4.0).min(0.9)
                * world.spawn_scale.clamp(0.0, 1.0);
            if world.rand() < p {
                self.spawn_one(world, terrain, None);
            }
        }
    }

    pub fn update(&mut self, dt: f32, world: &mut World, terrain: &dyn Terrain, projectiles: &mut Projectiles) {
        self.spawn_cadence(world, terrain);

        let cfg = self.tuning.walkers.clone();
        let reach = self.tuning.player.squash_r + cfg.r;
        let dy = world.dy;

        let mut i = self.walkers.len();
        while i > 0 {
            i -= 1;
            let w = &mut self.walkers[i];
            w.anim_t += dt;
            w.y += dy;
            w.walk_phase += dt * cfg.walk_freq * (0.6 + w.speed / 60.0);

            let next_x = w.x + w.dir * w.speed * dt;
            if terrain.is_safe(next_x, w.y + 2.0) {
                w.x = next_x;
            } else {
                w.dir = -w.dir;
            }

            if let Some(s) = w.speech.as_mut() {
                s.t += dt;
                if s.t > cfg.talk_time {
                    w.speech = None;
                }
            }
            w.talk_cd = (w.talk_cd - dt).max(0.0);
            if w.speech.is_none() && w.talk_cd <= 0.0 && cfg.talk_density > 0.0 && world.rand() < cfg.talk_density * dt
            {
                w.speech = Some(Speech { line: random_line(&mut world.rng), t: 0.0 });
                w.talk_cd = cfg.talk_cooldown;
            }

            if w.y > world.h + 30.0 {
                self.walkers.remove(i);
                continue;
            }

            let stomped = world
                .live_player()
                .is_some_and(|p| (p.x - w.x).powi(2) + (p.y - w.y).powi(2) <= reach * reach);
            if stomped {
                let (x, y) = (w.x, w.y);
                self.walkers.remove(i);
                world.fx.burst(ParticleKind::Blood, x, y, 0.55);
                world.fx.sound(Sound::Splat);
                self.splats.push(smear_splat(x, y, cfg.smear_life, &mut world.rng));
                world.collateral += 1;
                continue;
            }

            let (wx, wy) = (w.x, w.y);
            let fx = &mut world.fx;
            projectiles.consume_hits_circle(wx, wy, cfg.r, |proj| {
                let damage = proj.damage.max(1.0);
                w.hp -= damage;
                w.last_hit = Some(HitVector { damage, vx: proj.vx, vy: proj.vy });
                fx.burst_toward(ParticleKind::Blood, proj.x, proj.y, (damage / 9.0).max(0.45), (proj.vx, proj.vy));
                if proj.kind.pierces_walkers() {
                    Hit::Pierce
                } else {
                    Hit::Consume
                }
            });

            if w.hp <= 0.0 {
                let hit = w.last_hit.unwrap_or(HitVector { damage: 1.0, vx: 0.0, vy: -1.0 });
                let (x, y) = (w.x, w.y);
                self.walkers.remove(i);
                world
                    .fx
                    .burst_toward(ParticleKind::Blood, x, y, (hit.damage / 7.0).max(0.6), (hit.vx, hit.vy));
                world.fx.sound(Sound::Splat);
                self.splats.push(impact_splat(x, y, &hit, cfg.impact_life, &mut world.rng));
                world.collateral += 1;
                log::trace!("walker down at ({:.0}, {:.0})", x, y);
            }
        }

        for s in self.splats.iter_mut() {
            s.t += dt;
            s.y += dy;
            for b in s.blobs.iter_mut() {
                b.y += dy;
            }
        }
        self.splats.retain(|s| s.t < s.life);
    }
}

impl BeamResolver for Walkers {
    fn resolve_beam(&mut self, field: &BeamField<'_>, world: &mut World) {
        let (dx, dy) = field.direction();
        let kind = field.kind();
        for w in self.walkers.iter_mut() {
            let dmg = field.damage_at(w.x, w.y, w.r, &mut world.rng);
            if dmg > 0.0 {
                w.hp -= dmg;
                let damage = dmg.max(1.0);
                w.last_hit = Some(HitVector { damage, vx: dx * 100.0, vy: dy * 100.0 });
                if world.rand() < 0.25 {
                    world.fx.burst_toward(ParticleKind::Blood, w.x, w.y, 0.5, (dx, dy));
                }
                log::trace!("{:?} beam scorches walker ({:.1})", kind, dmg);
            }
        }
    }
}

/// Leg swing for the walking animation, in radians.
pub fn stride_angle(w: &Walker) -> f32 {
    w.walk_phase.sin() * 0.35 * w.sway_mul * PI / 4.0
}
