//! Ambient turrets and turret-type bosses.
//!
//! Turrets drop in from the top on a cadence measured in scrolled pixels,
//! ride the scroll down, fire at the player and die to player shots, beams
//! or being walked into.  Boss-tagged turrets share the pool but descend to a
//! fixed stop line, never cull off-screen and cannot be rammed.

use std::sync::Arc;

use crate::beam::BeamField;
use crate::collab::Terrain;
use crate::config::{Tuning, TurretTypeSpec};
use crate::entities::{BeamKind, Turret, TurretType, WeaponKind};
use crate::fx::{ParticleKind, Sound};
use crate::hostile::HostileShots;
use crate::pickups::Pickups;
use crate::projectiles::{BeamResolver, Hit, Projectiles};
use crate::world::World;

/// Weighted tier pick.  No positive weight falls back to the first tier.
pub fn pick_turret_type(tuning: &Tuning, roll: f32) -> TurretType {
    let tiers = [TurretType::Small, TurretType::Medium, TurretType::Large];
    let weights: Vec<f32> = tiers.iter().map(|t| tuning.turrets.spec(*t).weight.max(0.0)).collect();
    let total: f32 = weights.iter().sum();
    if total <= 0.0 {
        return tiers[0];
    }
    let mut r = roll.clamp(0.0, 1.0) * total;
    for (ty, w) in tiers.iter().zip(weights.iter()) {
        if r < *w {
            return *ty;
        }
        r -= w;
    }
    tiers[tiers.len() - 1]
}

/// Fresh ambient turret of tier `ty` at (x, y).
pub fn build_turret(spec: &TurretTypeSpec, ty: TurretType, x: f32, y: f32, cool: f32) -> Turret {
    Turret {
        x,
        y,
        ty,
        size: spec.size,
        hp: spec.hp,
        max_hp: spec.hp,
        cool,
        fire_cooldown: spec.fire_cooldown,
        bullet_speed: spec.bullet_speed,
        bullet_damage: spec.bullet_damage,
        bullet_r: spec.bullet_r,
        fx_spark_t: 0.0,
        fx_smoke_t: 0.0,
        boss: None,
        entering: false,
        stop_y: y,
    }
}

pub struct Turrets {
    tuning: Arc<Tuning>,
    turrets: Vec<Turret>,
    shots: HostileShots,
    acc_px: f32,
}

impl Turrets {
    pub fn new(tuning: Arc<Tuning>) -> Self {
        Self {
            tuning,
            turrets: Vec::new(),
            shots: HostileShots::default(),
            acc_px: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.turrets.clear();
        self.shots.clear();
        self.acc_px = 0.0;
    }

    pub fn turrets(&self) -> &[Turret] {
        &self.turrets
    }

    pub fn turrets_mut(&mut self) -> &mut [Turret] {
        &mut self.turrets
    }

    pub fn shots(&self) -> &HostileShots {
        &self.shots
    }

    pub fn insert(&mut self, turret: Turret) {
        self.turrets.push(turret);
    }

    /// Drop every non-boss turret.
    pub fn clear_ambient(&mut self) {
        self.turrets.retain(|t| t.is_boss());
    }

    pub fn has_active_non_boss(&self) -> bool {
        self.turrets.iter().any(|t| !t.is_boss())
    }

    pub fn boss_members(&self) -> impl Iterator<Item = &Turret> {
        self.turrets.iter().filter(|t| t.is_boss())
    }

    pub fn has_boss(&self) -> bool {
        self.turrets.iter().any(|t| t.is_boss())
    }

    /// Place a new ambient turret just above the screen on safe ground.
    pub fn spawn_turret(&mut self, world: &mut World, terrain: &dyn Terrain) {
        let ty = pick_turret_type(&self.tuning, world.rand());
        let spec = self.tuning.turrets.spec(ty);
        let y = -spec.size - 8.0;
        let mut x = world.w / 2.0;
        for _ in 0..self.tuning.turrets.spawn_attempts {
            let cx = 20.0 + world.rand() * (world.w - 40.0).max(0.0);
            if terrain.is_safe(cx, y + 10.0) {
                x = cx;
                break;
            }
        }
        let cool = spec.fire_cooldown.sample(&mut world.rng);
        self.turrets.push(build_turret(spec, ty, x, y, cool));
    }

    pub fn update(
        &mut self,
        dt: f32,
        world: &mut World,
        terrain: &dyn Terrain,
        projectiles: &mut Projectiles,
        pickups: &mut Pickups,
    ) {
        let spacing = (self.tuning.tile_h * self.tuning.turrets.spawn_rows).max(1.0);
        self.acc_px += world.dy;
        while self.acc_px >= spacing {
            self.acc_px -= spacing;
            if world.roll_spawn() {
                self.spawn_turret(world, terrain);
            }
        }

        let contact = self.tuning.turrets.contact_damage;
        let squash_r = self.tuning.player.squash_r;
        let bullet_life = self.tuning.turrets.bullet_life;

        let mut i = self.turrets.len();
        while i > 0 {
            i -= 1;
            let t = &mut self.turrets[i];

            if t.entering {
                t.y += world.scroll * dt;
                if t.y >= t.stop_y {
                    t.y = t.stop_y;
                    t.entering = false;
                    log::debug!("boss turret in position at y={:.0}", t.y);
                }
            } else if !t.is_boss() {
                t.y += world.dy;
            }

            if !t.is_boss() && t.y > world.h + t.size + 20.0 {
                self.turrets.remove(i);
                continue;
            }

            t.fx_spark_t = (t.fx_spark_t - dt).max(0.0);
            t.fx_smoke_t = (t.fx_smoke_t - dt).max(0.0);

            if !t.is_boss() {
                if let Some(p) = world.live_player_mut() {
                    let reach = t.size * 0.9 + squash_r;
                    if (p.x - t.x).powi(2) + (p.y - t.y).powi(2) <= reach * reach {
                        p.take_damage(contact);
                        let dead = self.turrets.remove(i);
                        destroy(&dead, world, pickups);
                        continue;
                    }
                }
            }

            let (tx, ty, hit_r) = (t.x, t.y, t.hit_r());
            let mut taken = 0.0;
            let fx = &mut world.fx;
            projectiles.consume_hits_circle(tx, ty, hit_r, |proj| {
                taken += proj.damage;
                fx.impact(proj.kind, proj.x, proj.y, proj.damage);
                Hit::Consume
            });
            t.hp -= taken;

            if t.hp <= 0.0 {
                let dead = self.turrets.remove(i);
                destroy(&dead, world, pickups);
                continue;
            }

            damage_feedback(t, world);

            if !t.entering {
                t.cool -= dt;
                if t.cool <= 0.0 {
                    if let Some((px, py)) = world.live_player().map(|p| (p.x, p.y)) {
                        self.shots
                            .fire_at(t.x, t.y, px, py, t.bullet_speed, t.bullet_r, t.bullet_damage, bullet_life);
                        t.cool = t.fire_cooldown.sample(&mut world.rng);
                    }
                }
            }
        }

        self.shots.update(dt, world, self.tuning.player.hit_r);
    }
}

fn damage_feedback(t: &mut Turret, world: &mut World) {
    let ratio = t.hp / t.max_hp.max(1.0);
    if ratio <= 0.75 && t.fx_spark_t <= 0.0 {
        let x = t.x + world.rand_range(-t.size * 0.4, t.size * 0.4);
        let y = t.y + world.rand_range(-t.size * 0.4, t.size * 0.4);
        world.fx.burst(ParticleKind::WarnSpark, x, y, 0.4);
        t.fx_spark_t = 0.14 + world.rand() * 0.24;
    }
    if ratio <= 0.5 && t.fx_smoke_t <= 0.0 {
        world.fx.burst(ParticleKind::Smoke, t.x, t.y - t.size * 0.3, 0.6);
        t.fx_smoke_t = 0.25 + world.rand() * 0.3;
    }
}

/// Kill bookkeeping shared by every way a turret can die.
fn destroy(t: &Turret, world: &mut World, pickups: &mut Pickups) {
    world.enemies_destroyed += 1;
    world.fx.burst(ParticleKind::Explosion, t.x, t.y, (t.size / 14.0).clamp(0.8, 3.0));
    world.fx.sound(Sound::Explosion);
    match t.boss {
        Some(tag) => {
            log::info!("boss turret down (level {})", tag.level);
            world.fx.burst(ParticleKind::Explosion, t.x, t.y, 3.0);
            pickups.spawn_boss_burst(t.x, t.y, t.max_hp, world);
        }
        None => pickups.spawn_from_turret(t.x, t.y, t.ty, world),
    }
}

impl BeamResolver for Turrets {
    fn resolve_beam(&mut self, field: &BeamField<'_>, world: &mut World) {
        for t in self.turrets.iter_mut() {
            let dmg = field.damage_at(t.x, t.y, t.hit_r(), &mut world.rng);
            if dmg > 0.0 {
                t.hp -= dmg;
                let kind = match field.kind() {
                    BeamKind::Standard => WeaponKind::Beamer,
                    BeamKind::Punch => WeaponKind::Puncher,
                };
                if world.rand() < 0.35 {
                    world.fx.impact(kind, t.x, t.y, dmg);
                }
            }
        }
    }
}
