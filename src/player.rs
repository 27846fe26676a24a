//! The player's walker: movement, aim, the two weapon mounts and damage state.

use std::f32::consts::{FRAC_PI_2, PI};
use std::sync::Arc;

use rand::Rng;

use crate::beam::aim_dir;
use crate::config::Tuning;
use crate::entities::{MountSide, WeaponKind};
use crate::fx::{FxQueue, ParticleKind, Sound};
use crate::projectiles::{Projectiles, ShotMods};
use crate::world::World;

/// One frame of player intent, in world coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerInput {
    /// −1..1 on each axis.
    pub move_x: f32,
    pub move_y: f32,
    pub aim: Option<(f32, f32)>,
    /// Pointer is over the play surface (wider, faster aim).
    pub aim_on_surface: bool,
    /// Trigger held, indexed by [`MountSide::index`].
    pub fire: [bool; 2],
}

impl PlayerInput {
    pub fn holding(&self, side: MountSide) -> bool {
        self.fire[side.index()]
    }
}

/// Sustained-fire state for one mount.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChaingunState {
    pub heat: f32,
    pub windup_t: f32,
    pub spinning: bool,
    pub overheated: bool,
    pub windup_played: bool,
}

impl ChaingunState {
    fn settle(&mut self) {
        self.spinning = false;
        self.windup_t = 0.0;
        self.windup_played = false;
    }
}

/// Cosmetic patch left on the hull by a bot upgrade.
#[derive(Clone, Debug, PartialEq)]
pub struct RigMark {
    pub ox: f32,
    pub oy: f32,
    pub size: f32,
}

#[derive(Clone, Debug)]
pub struct Player {
    tuning: Arc<Tuning>,
    pub x: f32,
    pub y: f32,
    /// Walk animation clock.
    pub t: f32,
    /// Aim relative to straight up, radians.
    pub angle: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub weapons: [Option<WeaponKind>; 2],
    pub cooldown: [f32; 2],
    pub chaingun: [ChaingunState; 2],
    pub speed_mul: f32,
    pub reload_mul: f32,
    pub proj_speed_mul: f32,
    pub damage_mul: f32,
    /// HP lost since the last weapon was shed.
    pub damage_bucket: f32,
    last_hp: f32,
    pub rig_marks: Vec<RigMark>,
    fx_spark_t: f32,
    fx_smoke_t: f32,
    pub dead: bool,
    pub death_t: f32,
}

impl Player {
    pub fn new(tuning: Arc<Tuning>, w: f32, h: f32) -> Self {
        let pt = &tuning.player;
        let max_hp = pt.hp.max(1.0);
        Self {
            x: w * pt.start_x_frac,
            y: h * pt.start_y_frac,
            t: 0.0,
            angle: 0.0,
            hp: max_hp,
            max_hp,
            weapons: [pt.start_left, pt.start_right],
            cooldown: [0.0; 2],
            chaingun: [ChaingunState::default(), ChaingunState::default()],
            speed_mul: 1.0,
            reload_mul: 1.0,
            proj_speed_mul: 1.0,
            damage_mul: 1.0,
            damage_bucket: 0.0,
            last_hp: max_hp,
            rig_marks: Vec::new(),
            fx_spark_t: 0.0,
            fx_smoke_t: 0.0,
            dead: false,
            death_t: 0.0,
            tuning,
        }
    }

    // ── Loadout ──────────────────────────────────────────────────────────────

    pub fn weapon(&self, side: MountSide) -> Option<WeaponKind> {
        self.weapons[side.index()]
    }

    pub fn set_weapon(&mut self, side: MountSide, weapon: Option<WeaponKind>) {
        self.weapons[side.index()] = weapon;
    }

    pub fn equipped_count(&self) -> usize {
        self.weapons.iter().filter(|w| w.is_some()).count()
    }

    pub fn chaingun(&self, side: MountSide) -> &ChaingunState {
        &self.chaingun[side.index()]
    }

    pub fn mods(&self) -> ShotMods {
        ShotMods { speed_mul: self.proj_speed_mul, damage_mul: self.damage_mul }
    }

    pub fn hp_ratio(&self) -> f32 {
        self.hp / self.max_hp.max(1.0)
    }

    // ── Geometry ─────────────────────────────────────────────────────────────

    fn to_world(&self, lx: f32, ly: f32) -> (f32, f32) {
        let (sin, cos) = self.angle.sin_cos();
        (self.x + lx * cos - ly * sin, self.y + lx * sin + ly * cos)
    }

    pub fn mount_pos(&self, side: MountSide) -> (f32, f32) {
        let pt = &self.tuning.player;
        self.to_world(side.sign() * pt.mount_offset_x, pt.mount_offset_y)
    }

    /// Muzzle position and aim of the weapon on `side`, if any.
    pub fn muzzle_pose(&self, side: MountSide) -> Option<(f32, f32, f32)> {
        let kind = self.weapon(side)?;
        let pt = &self.tuning.player;
        let m = self.tuning.weapons.spec(kind);
        let s = side.sign();
        let (x, y) = self.to_world(s * pt.mount_offset_x + s * m.muzzle_x, pt.mount_offset_y + m.muzzle_y);
        Some((x, y, self.angle))
    }

    // ── Per-frame ────────────────────────────────────────────────────────────

    pub fn update(&mut self, dt: f32, input: &PlayerInput, world: &mut World, projectiles: &mut Projectiles) {
        if self.dead {
            self.death_t = (self.death_t - dt).max(0.0);
            return;
        }
        let pt = &self.tuning.player;
        let step = pt.move_px_per_sec * self.speed_mul * dt;
        let margin = pt.edge_margin;
        self.x = (self.x + input.move_x.clamp(-1.0, 1.0) * step).clamp(margin, (world.w - margin).max(margin));
        self.y = (self.y + input.move_y.clamp(-1.0, 1.0) * step).clamp(margin, (world.h - margin).max(margin));
        self.t += dt;

        if let Some((ax, ay)) = input.aim {
            self.aim_toward(ax, ay, input.aim_on_surface, dt);
        }

        for c in self.cooldown.iter_mut() {
            *c = (*c - dt).max(0.0);
        }

        self.check_damage_bucket(&mut world.fx);
        self.damage_feedback(dt, world);

        for side in MountSide::BOTH {
            self.update_chaingun(side, input.holding(side), dt, world, projectiles);
            if input.holding(side) {
                self.fire(side, world, projectiles);
            }
        }
    }

    /// Ease the aim toward the pointer, clamped to the allowed twist.
    pub fn aim_toward(&mut self, tx: f32, ty: f32, on_surface: bool, dt: f32) {
        let pt = &self.tuning.player;
        let (twist_deg, lerp) = if on_surface {
            (pt.twist_deg_surface, pt.twist_lerp_surface)
        } else {
            (pt.twist_deg, pt.twist_lerp)
        };
        let max_twist = twist_deg.to_radians();
        let mut relative = (ty - self.y).atan2(tx - self.x) + FRAC_PI_2;
        if relative > PI {
            relative -= 2.0 * PI;
        }
        let limited = relative.clamp(-max_twist, max_twist);
        // Smoothing factors are per 60 Hz frame.
        let k = 1.0 - (1.0 - lerp.clamp(0.0, 1.0)).powf(dt * 60.0);
        self.angle += (limited - self.angle) * k;
    }

    /// Fire a standard weapon if its mount is ready.  Chainguns only fire
    /// through their own spin-up.
    pub fn fire(&mut self, side: MountSide, world: &mut World, projectiles: &mut Projectiles) {
        match self.weapon(side) {
            Some(WeaponKind::Chaingun) | None => {}
            Some(kind) => self.shoot(side, kind, world, projectiles),
        }
    }

    fn shoot(&mut self, side: MountSide, kind: WeaponKind, world: &mut World, projectiles: &mut Projectiles) {
        if self.dead || self.cooldown[side.index()] > 0.0 {
            return;
        }
        let Some((wx, wy, a)) = self.muzzle_pose(side) else {
            return;
        };
        let mods = self.mods();
        let wt = &self.tuning.weapons;
        match kind {
            WeaponKind::Shotgun => {
                let n = wt.shotgun_pellets.max(1);
                let spread = wt.shotgun_spread_deg.to_radians();
                let mid = (n - 1) as f32 / 2.0;
                for i in 0..n {
                    projectiles.spawn(wx, wy, a + (i as f32 - mid) * spread, kind, mods);
                }
            }
            WeaponKind::Beamer | WeaponKind::Puncher => {
                if let Some(beam) = kind.beam_kind() {
                    projectiles.fire_beam(wx, wy, a, beam, mods, Some(side));
                }
            }
            _ => projectiles.spawn(wx, wy, a, kind, mods),
        }
        if matches!(kind, WeaponKind::Chaingun | WeaponKind::Cannon) {
            self.eject_shell(side, kind, wx, wy, world);
        }
        world.fx.sound(Sound::Shot(kind));
        self.cooldown[side.index()] = wt.spec(kind).cooldown * self.reload_mul;
    }

    fn eject_shell(&self, side: MountSide, kind: WeaponKind, wx: f32, wy: f32, world: &mut World) {
        let a = self.angle;
        let s = side.sign();
        let (out_x, out_y) = (a.cos() * s, a.sin() * s);
        let (fx, fy) = aim_dir(a);
        let (rear, side_off, out_v, back_v) = match kind {
            WeaponKind::Chaingun => {
                let m = self.tuning.weapons.chaingun.muzzle_y.abs();
                (m + 40.0, 4.0, world.rand_range(90.0, 155.0), world.rand_range(85.0, 140.0))
            }
            _ => (16.0, 7.0, world.rand_range(75.0, 115.0), world.rand_range(62.0, 98.0)),
        };
        let ex = wx - fx * rear + out_x * side_off;
        let ey = wy - fy * rear + out_y * side_off;
        let lift = world.rand_range(8.0, 28.0);
        let v = (out_x * out_v - fx * back_v, out_y * out_v - fy * back_v - lift);
        world.fx.burst_toward(ParticleKind::ShellEject, ex, ey, 1.0, v);
    }

    fn update_chaingun(
        &mut self,
        side: MountSide,
        holding: bool,
        dt: f32,
        world: &mut World,
        projectiles: &mut Projectiles,
    ) {
        let spec = self.tuning.weapons.chaingun_heat;
        let windup = spec.windup.max(0.05);
        let heat_rate = spec.heat_per_sec.max(0.05);
        let cool_rate = spec.cool_per_sec.max(0.05);
        let is_chain = self.weapon(side) == Some(WeaponKind::Chaingun);
        let st = &mut self.chaingun[side.index()];

        if !is_chain {
            st.heat = (st.heat - cool_rate * dt * 1.25).max(0.0);
            st.settle();
            st.overheated = false;
            return;
        }
        if st.overheated {
            st.settle();
            st.heat = (st.heat - cool_rate * dt).max(0.0);
            if st.heat <= 0.02 {
                st.heat = 0.0;
                st.overheated = false;
            }
            return;
        }
        if !holding {
            st.settle();
            st.heat = (st.heat - cool_rate * dt).max(0.0);
            return;
        }
        if !st.spinning {
            if !st.windup_played {
                world.fx.sound(Sound::ChaingunWindup);
                st.windup_played = true;
            }
            st.windup_t += dt;
            if st.windup_t < windup {
                return;
            }
            st.spinning = true;
        }

        self.shoot(side, WeaponKind::Chaingun, world, projectiles);
        let st = &mut self.chaingun[side.index()];
        st.heat = (st.heat + heat_rate * dt).min(1.0);
        if st.heat >= 1.0 {
            st.overheated = true;
            st.settle();
            log::debug!("chaingun on {:?} mount overheated", side);
        }
    }

    // ── Damage ───────────────────────────────────────────────────────────────

    pub fn take_damage(&mut self, amount: f32) {
        if self.dead || amount <= 0.0 {
            return;
        }
        self.hp = (self.hp - amount).max(0.0);
    }

    pub fn heal(&mut self, amount: f32) {
        if self.dead {
            return;
        }
        self.hp = (self.hp + amount.max(0.0)).min(self.max_hp);
    }

    /// Full HP and an empty damage bucket.
    pub fn refill(&mut self) {
        self.hp = self.max_hp;
        self.last_hp = self.max_hp;
        self.damage_bucket = 0.0;
    }

    /// Fold HP lost since the last check into the bucket and shed the
    /// biggest weapon for every full threshold.  Returns what was shed.
    pub fn check_damage_bucket(&mut self, fx: &mut FxQueue) -> Vec<(MountSide, WeaponKind)> {
        let lost = (self.last_hp - self.hp).max(0.0);
        self.last_hp = self.hp;
        self.damage_bucket += lost;

        let threshold = self.max_hp * self.tuning.player.damage_bucket_frac;
        let mut shed = Vec::new();
        if threshold <= 0.0 {
            return shed;
        }
        while self.damage_bucket >= threshold {
            self.damage_bucket -= threshold;
            if self.equipped_count() <= 1 {
                continue;
            }
            if let Some(side) = self.largest_weapon_side() {
                if let Some(kind) = self.weapon(side) {
                    let (mx, my) = self.mount_pos(side);
                    fx.burst(ParticleKind::Explosion, mx, my, 0.9);
                    fx.sound(Sound::Explosion);
                    self.set_weapon(side, None);
                    self.chaingun[side.index()] = ChaingunState::default();
                    log::info!("lost {} from {:?} mount", kind.label(), side);
                    shed.push((side, kind));
                }
            }
        }
        shed
    }

    /// Mount holding the highest-ranked weapon; the left mount wins ties.
    pub fn largest_weapon_side(&self) -> Option<MountSide> {
        let mut best: Option<(MountSide, u8)> = None;
        for side in MountSide::BOTH {
            if let Some(kind) = self.weapon(side) {
                let rank = kind.size_rank();
                if best.map_or(true, |(_, r)| rank > r) {
                    best = Some((side, rank));
                }
            }
        }
        best.map(|(side, _)| side)
    }

    fn damage_feedback(&mut self, dt: f32, world: &mut World) {
        let ratio = self.hp_ratio();
        self.fx_spark_t = (self.fx_spark_t - dt).max(0.0);
        self.fx_smoke_t = (self.fx_smoke_t - dt).max(0.0);

        if ratio <= 0.75 && self.fx_spark_t <= 0.0 {
            let x = self.x + world.rand_range(-5.0, 5.0);
            let y = self.y - 10.0 + world.rand_range(-4.0, 4.0);
            world.fx.burst(ParticleKind::WarnSpark, x, y, 0.35);
            self.fx_spark_t = 0.12 + world.rand() * 0.2;
        }
        if ratio <= 0.5 && self.fx_smoke_t <= 0.0 {
            let heavy = ratio <= 0.25;
            let x = self.x + world.rand_range(-7.0, 7.0);
            let y = self.y - 16.0 + world.rand_range(-5.0, 5.0);
            if heavy {
                world.fx.burst(ParticleKind::HeavySmoke, x, y, 1.35);
                self.fx_smoke_t = 0.06 + world.rand() * 0.08;
            } else {
                world.fx.burst(ParticleKind::Smoke, x, y, 0.55);
                self.fx_smoke_t = 0.22 + world.rand() * 0.3;
            }
        }
    }

    pub fn destroy(&mut self, fx: &mut FxQueue) {
        if self.dead {
            return;
        }
        self.dead = true;
        self.death_t = self.tuning.player.death_anim_secs;
        fx.burst(ParticleKind::BotExplosion, self.x, self.y - 6.0, 1.4);
        fx.sound(Sound::Explosion);
        log::info!("player destroyed at ({:.0}, {:.0})", self.x, self.y);
    }

    pub fn is_death_anim_done(&self) -> bool {
        self.dead && self.death_t <= 0.0
    }

    pub fn add_rig_mark(&mut self, rng: &mut impl Rng) {
        self.rig_marks.push(RigMark {
            ox: rng.gen_range(-20.0..=20.0),
            oy: rng.gen_range(-13.0..=13.0),
            size: rng.gen_range(3.0..=6.0),
        });
    }
}
