//! Boss encounters.
//!
//! An encounter is either a float hull, owned and run here, or one or more
//! boss-tagged turrets placed into the turret pool.  Only one encounter
//! group is active at a time.

pub mod encounter;
pub mod hull;

use std::sync::Arc;

use rand::Rng;

use crate::beam::BeamField;
use crate::config::{EncounterKind, Tuning};
use crate::entities::{BossKind, FloatBoss};
use crate::fx::{ParticleKind, Sound};
use crate::hostile::HostileShots;
use crate::pickups::Pickups;
use crate::projectiles::{BeamResolver, Hit, Projectiles};
use crate::turrets::Turrets;
use crate::world::World;

pub use encounter::{boss_level, build_boss_turret, pack_members, select_encounter, Encounter};
pub use hull::generate_float_boss;

/// Aggregate view over the active encounter group.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BossStatus {
    pub hp: f32,
    pub max_hp: f32,
    /// Every member has finished its entry descent.
    pub entered: bool,
    pub kind: BossKind,
    pub level: u32,
}

/// Mounts a float boss should keep at `hp_ratio`: never fewer than one.
pub fn desired_alive_mounts(total: usize, hp_ratio: f32) -> usize {
    let total = total.max(1);
    ((total as f32 * hp_ratio.clamp(0.0, 1.0)).ceil() as usize).max(1)
}

/// One attrition step: if the pop timer allows and more mounts are alive
/// than the HP ratio warrants, knock one out at random.  Returns its index.
pub fn attrition_step(boss: &mut FloatBoss, dt: f32, pop_cooldown: f32, rng: &mut impl Rng) -> Option<usize> {
    boss.mount_pop_t = (boss.mount_pop_t - dt).max(0.0);
    if boss.mount_pop_t > 0.0 {
        return None;
    }
    let desired = desired_alive_mounts(boss.mounts.len(), boss.hp_ratio());
    let alive: Vec<usize> = (0..boss.mounts.len()).filter(|&i| boss.mounts[i].alive).collect();
    if alive.len() <= desired || alive.len() <= 1 {
        return None;
    }
    let idx = alive[rng.gen_range(0..alive.len())];
    boss.mounts[idx].alive = false;
    boss.mount_pop_t = pop_cooldown;
    Some(idx)
}

pub struct Bosses {
    tuning: Arc<Tuning>,
    floats: Vec<FloatBoss>,
    shots: HostileShots,
    active: Option<Encounter>,
}

impl Bosses {
    pub fn new(tuning: Arc<Tuning>) -> Self {
        Self {
            tuning,
            floats: Vec::new(),
            shots: HostileShots::default(),
            active: None,
        }
    }

    pub fn reset(&mut self) {
        self.floats.clear();
        self.shots.clear();
        self.active = None;
    }

    pub fn floats(&self) -> &[FloatBoss] {
        &self.floats
    }

    pub fn floats_mut(&mut self) -> &mut [FloatBoss] {
        &mut self.floats
    }

    pub fn shots(&self) -> &HostileShots {
        &self.shots
    }

    pub fn active_encounter(&self) -> Option<&Encounter> {
        self.active.as_ref()
    }

    /// Build and place the encounter for `level`.  Turret-shaped members go
    /// into `turrets`; a float hull stays here.
    pub fn start_encounter(&mut self, level: u32, from_top: bool, world: &mut World, turrets: &mut Turrets) -> BossKind {
        self.floats.clear();
        self.shots.clear();
        let enc = select_encounter(&self.tuning, level);
        let kind = enc.boss_kind();
        match &enc.kind {
            EncounterKind::Float => {
                let boss = generate_float_boss(
                    &mut world.rng,
                    &self.tuning,
                    enc.level,
                    &enc.mods,
                    world.w,
                    world.h,
                    from_top,
                );
                log::info!(
                    "float boss level {}: {:.0}x{:.0}, {} hp, {} mounts",
                    enc.level,
                    boss.w,
                    boss.h,
                    boss.max_hp,
                    boss.mounts.len()
                );
                self.floats.push(boss);
            }
            EncounterKind::Turret { .. } | EncounterKind::Pack { .. } => {
                let members = pack_members(&self.tuning, &enc);
                for m in &members {
                    let t = build_boss_turret(&self.tuning, m, &enc, world.w, world.h, from_top, &mut world.rng);
                    turrets.insert(t);
                }
                log::info!("{:?} boss level {}: {} member(s)", kind, enc.level, members.len());
            }
        }
        self.active = Some(enc);
        kind
    }

    /// Status over float hulls plus boss-tagged turrets; `None` once the
    /// group is gone.
    pub fn status(&self, turrets: &Turrets) -> Option<BossStatus> {
        let enc = self.active.as_ref()?;
        let mut hp = 0.0;
        let mut max_hp = 0.0;
        let mut entered = true;
        let mut any = false;
        for b in &self.floats {
            hp += b.hp.max(0.0);
            max_hp += b.max_hp;
            entered &= !b.entering;
            any = true;
        }
        for t in turrets.boss_members() {
            hp += t.hp.max(0.0);
            max_hp += t.max_hp;
            entered &= !t.entering;
            any = true;
        }
        any.then_some(BossStatus {
            hp,
            max_hp,
            entered,
            kind: enc.boss_kind(),
            level: enc.level,
        })
    }

    pub fn has_active_boss(&self, turrets: &Turrets) -> bool {
        !self.floats.is_empty() || turrets.has_boss()
    }

    /// Forget the finished encounter.
    pub fn close_encounter(&mut self) {
        self.active = None;
    }

    pub fn update(&mut self, dt: f32, world: &mut World, projectiles: &mut Projectiles, pickups: &mut Pickups) {
        let pop_cooldown = self.tuning.boss.float.mount_pop_cooldown;
        let mut i = self.floats.len();
        while i > 0 {
            i -= 1;
            let b = &mut self.floats[i];
            b.t += dt;

            if b.entering {
                b.y += world.scroll * dt;
                if b.y >= b.stop_y {
                    b.y = b.stop_y;
                    b.entering = false;
                    b.t = 0.0;
                    log::debug!("float boss in position");
                }
            } else {
                b.x = b.base_x + (b.t * b.hover_speed).sin() * b.hover_x;
                b.y = b.base_y + (b.t * b.hover_speed * 1.7).sin() * b.hover_y;
            }

            let (bx, by, hit_r) = (b.x, b.y, b.hit_r());
            let mut taken = 0.0;
            let fx = &mut world.fx;
            projectiles.consume_hits_circle(bx, by, hit_r, |proj| {
                let damage = proj.damage.max(1.0);
                taken += damage;
                fx.burst(ParticleKind::PlayerShot, proj.x, proj.y, 0.8);
                fx.burst(ParticleKind::Damage, proj.x, proj.y, damage / 10.0);
                fx.sound(Sound::Hit { big: damage >= 20.0 });
                Hit::Consume
            });
            b.hp -= taken;

            if b.hp <= 0.0 {
                let dead = self.floats.remove(i);
                for m in dead.mounts.iter().filter(|m| m.alive) {
                    world.fx.burst(ParticleKind::Explosion, dead.x + m.ox, dead.y + m.oy, 1.5);
                }
                world.fx.burst(ParticleKind::Explosion, dead.x, dead.y, (dead.max_hp / 14.0).min(6.0));
                world.fx.sound(Sound::Explosion);
                world.enemies_destroyed += 1;
                pickups.spawn_boss_burst(dead.x, dead.y, dead.max_hp, world);
                log::info!("float boss level {} destroyed", dead.level);
                continue;
            }

            let ratio = b.hp_ratio();
            if ratio <= 0.75 && world.rand() < dt * 4.5 {
                let x = b.x + world.rand_range(-b.w * 0.35, b.w * 0.35);
                let y = b.y + world.rand_range(-b.h * 0.35, b.h * 0.35);
                world.fx.burst(ParticleKind::WarnSpark, x, y, 0.5);
            }
            if ratio <= 0.5 && world.rand() < dt * 2.8 {
                let x = b.x + world.rand_range(-b.w * 0.35, b.w * 0.35);
                world.fx.burst(ParticleKind::Smoke, x, b.y - b.h * 0.25, 0.75);
            }

            if let Some(idx) = attrition_step(b, dt, pop_cooldown, &mut world.rng) {
                let m = &b.mounts[idx];
                world.fx.burst(ParticleKind::Explosion, b.x + m.ox, b.y + m.oy, 1.6);
                world.fx.sound(Sound::Explosion);
            }

            if !b.entering {
                let target = world.live_player().map(|p| (p.x, p.y));
                for m in b.mounts.iter_mut().filter(|m| m.alive) {
                    m.cool -= dt;
                    if m.cool <= 0.0 {
                        if let Some((px, py)) = target {
                            let (gx, gy) = (b.x + m.ox, b.y + m.oy);
                            self.shots
                                .fire_at(gx, gy, px, py, m.bullet_speed, m.bullet_r, m.bullet_damage, b.bullet_life);
                        }
                        m.cool = m.fire_cooldown.sample(&mut world.rng);
                    }
                }
            }
        }

        self.shots.update(dt, world, self.tuning.player.hit_r);
    }
}

impl BeamResolver for Bosses {
    fn resolve_beam(&mut self, field: &BeamField<'_>, world: &mut World) {
        for b in self.floats.iter_mut() {
            let dmg = field.damage_at(b.x, b.y, b.hit_r(), &mut world.rng);
            if dmg > 0.0 {
                b.hp -= dmg;
                if world.rand() < 0.3 {
                    world.fx.burst(ParticleKind::Damage, b.x, b.y + b.h * 0.3, dmg.max(0.5));
                }
            }
        }
    }
}
