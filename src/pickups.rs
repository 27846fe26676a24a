//! Drops: weapon swaps, repairs and small bot upgrades.
//!
//! Ambient turrets drop one item by tier.  A destroyed boss throws a burst of
//! items that slide out under drag and gravity before coming to rest.

use std::f32::consts::TAU;
use std::sync::Arc;

use rand::Rng;

use crate::config::{PickupTuning, Tuning};
use crate::entities::{MountSide, Pickup, PickupEffect, StatKind, TurretType, WeaponKind};
use crate::fx::{ParticleKind, Sound};
use crate::player::Player;
use crate::world::World;

/// Number of items a boss with `max_hp` drops.
pub fn burst_count(max_hp: f32) -> usize {
    let hp = max_hp.max(1.0);
    (3.0 + (hp / 180.0).round()).clamp(3.0, 10.0) as usize
}

/// 0 for a ~180 HP boss, 1 from ~720 HP up.
pub fn burst_hp_factor(max_hp: f32) -> f32 {
    ((max_hp.max(1.0) - 180.0) / 540.0).clamp(0.0, 1.0)
}

/// The four minor upgrades, derived from one base factor.
pub fn minor_upgrades(base: f32) -> [PickupEffect; 4] {
    let b = base.max(1.01);
    [
        PickupEffect::BotUpgrade { stat: StatKind::MoveSpeed, factor: b },
        PickupEffect::BotUpgrade { stat: StatKind::Damage, factor: 1.0 + (b - 1.0) * 0.80 },
        PickupEffect::BotUpgrade { stat: StatKind::ProjectileSpeed, factor: 1.0 + (b - 1.0) * 0.95 },
        PickupEffect::BotUpgrade { stat: StatKind::Reload, factor: (1.0 - (b - 1.0) * 0.75).max(0.82) },
    ]
}

/// Apply one effect to the player, honoring the stat caps.
pub fn apply_effect(effect: &PickupEffect, player: &mut Player, caps: &PickupTuning, rng: &mut impl Rng) {
    match *effect {
        PickupEffect::Weapon { side, weapon } => {
            player.set_weapon(side, Some(weapon));
            log::debug!("picked up {} for {:?} mount", weapon.label(), side);
        }
        PickupEffect::Repair { heal_frac } => {
            let heal = player.max_hp.max(1.0) * heal_frac;
            player.heal(heal);
        }
        PickupEffect::BotUpgrade { stat, factor } => {
            player.add_rig_mark(rng);
            match stat {
                StatKind::MoveSpeed => player.speed_mul = (player.speed_mul * factor).min(caps.speed_cap),
                StatKind::ProjectileSpeed => {
                    player.proj_speed_mul = (player.proj_speed_mul * factor).min(caps.projectile_speed_cap)
                }
                StatKind::Reload => player.reload_mul = (player.reload_mul * factor).max(caps.reload_floor),
                StatKind::Damage => player.damage_mul = (player.damage_mul * factor).min(caps.damage_cap),
            }
        }
    }
}

pub struct Pickups {
    tuning: Arc<Tuning>,
    items: Vec<Pickup>,
}

impl Pickups {
    pub fn new(tuning: Arc<Tuning>) -> Self {
        Self { tuning, items: Vec::new() }
    }

    pub fn items(&self) -> &[Pickup] {
        &self.items
    }

    pub fn has_active(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn insert(&mut self, item: Pickup) {
        self.items.push(item);
    }

    fn clamp_x(&self, x: f32, w: f32) -> f32 {
        let m = self.tuning.pickups.edge_margin;
        x.clamp(m, (w - m).max(m))
    }

    fn weapon_drop(&self, world: &mut World) -> PickupEffect {
        let pool: &[WeaponKind] = if world.allowed_weapon_drops.is_empty() {
            &WeaponKind::ALL
        } else {
            &world.allowed_weapon_drops
        };
        let weapon = pool[world.rng.gen_range(0..pool.len())];
        let side = if world.rng.gen_bool(0.5) { MountSide::Left } else { MountSide::Right };
        PickupEffect::Weapon { side, weapon }
    }

    fn repair(&self) -> PickupEffect {
        PickupEffect::Repair { heal_frac: self.tuning.pickups.repair_heal_frac }
    }

    fn minor_upgrade(&self, world: &mut World) -> PickupEffect {
        let all = minor_upgrades(self.tuning.pickups.minor_walker_factor);
        all[world.rng.gen_range(0..all.len())]
    }

    /// Drop for a destroyed ambient turret of tier `ty`.
    pub fn drop_for_turret(&self, ty: TurretType, world: &mut World) -> PickupEffect {
        match ty {
            TurretType::Small => self.repair(),
            TurretType::Medium => self.minor_upgrade(world),
            TurretType::Large => self.weapon_drop(world),
        }
    }

    pub fn spawn_from_turret(&mut self, x: f32, y: f32, ty: TurretType, world: &mut World) {
        let effect = self.drop_for_turret(ty, world);
        let x = self.clamp_x(x, world.w);
        self.items.push(Pickup { x, y, vel: None, effect });
    }

    fn boss_drop(&self, hp_factor: f32, world: &mut World) -> PickupEffect {
        let weapon_chance = (0.24 + hp_factor * 0.36).min(0.72);
        let repair_chance = (0.32 - hp_factor * 0.14).max(0.12);
        let r = world.rand();
        if r < weapon_chance {
            self.weapon_drop(world)
        } else if r < weapon_chance + repair_chance {
            self.repair()
        } else {
            self.minor_upgrade(world)
        }
    }

    /// Scatter a boss's reward around (x, y).
    pub fn spawn_boss_burst(&mut self, x: f32, y: f32, max_hp: f32, world: &mut World) {
        let hp_factor = burst_hp_factor(max_hp);
        let count = burst_count(max_hp);
        let mut guaranteed = Vec::new();
        if count >= 4 {
            guaranteed.push(self.repair());
        }
        if count >= 5 {
            guaranteed.push(self.weapon_drop(world));
        }

        for i in 0..count {
            let effect = match guaranteed.get(i) {
                Some(e) => *e,
                None => self.boss_drop(hp_factor, world),
            };
            let a = world.rand() * TAU;
            let sp = 55.0 + world.rand() * 130.0 + hp_factor * 55.0;
            let ix = x + a.cos() * (6.0 + world.rand() * 18.0);
            let iy = y + a.sin() * (4.0 + world.rand() * 14.0);
            let lift = 25.0 + world.rand() * 60.0;
            self.items.push(Pickup {
                x: self.clamp_x(ix, world.w),
                y: iy,
                vel: Some((a.cos() * sp, a.sin() * sp - lift)),
                effect,
            });
        }
        log::debug!("boss burst: {} pickups (hp factor {:.2})", count, hp_factor);
    }

    pub fn update(&mut self, dt: f32, world: &mut World) {
        let pt = &self.tuning.pickups;
        let (w, h, dy) = (world.w, world.h, world.dy);
        let m = pt.edge_margin;
        for it in self.items.iter_mut() {
            it.y += dy;
            if let Some((mut vx, mut vy)) = it.vel {
                vx *= (1.0 - dt * pt.burst_drag_x).max(0.0);
                vy = vy * (1.0 - dt * pt.burst_drag_y).max(0.0) + pt.burst_gravity * dt;
                it.x += vx * dt;
                it.y += vy * dt;
                if it.x < m {
                    it.x = m;
                    vx = vx.abs() * pt.burst_bounce;
                }
                if it.x > w - m {
                    it.x = w - m;
                    vx = -vx.abs() * pt.burst_bounce;
                }
                it.vel = if vx.abs() < pt.settle_speed && vy.abs() < pt.settle_speed {
                    None
                } else {
                    Some((vx, vy))
                };
            }
        }

        if let Some(p) = world.player.as_mut().filter(|p| !p.dead) {
            let reach = pt.radius + self.tuning.player.squash_r;
            let reach2 = reach * reach;
            let mut i = self.items.len();
            while i > 0 {
                i -= 1;
                let it = &self.items[i];
                if (it.x - p.x).powi(2) + (it.y - p.y).powi(2) <= reach2 {
                    let it = self.items.remove(i);
                    world.fx.burst(ParticleKind::PickupFlash, it.x, it.y, 1.0);
                    world.fx.sound(Sound::Pickup);
                    apply_effect(&it.effect, p, pt, &mut world.rng);
                }
            }
        }

        let limit = h + pt.despawn_margin;
        self.items.retain(|it| it.y <= limit);
    }
}
