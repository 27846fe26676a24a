//! Sound and particle events emitted by the simulation.
//!
//! Systems push events onto the world's [`FxQueue`]; the loop driver drains
//! it once per frame and hands each event to the audio and particle sinks.

use crate::entities::WeaponKind;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Sound {
    Shot(WeaponKind),
    ChaingunWindup,
    /// Projectile or beam hit; `big` for heavy damage.
    Hit { big: bool },
    Explosion,
    Pickup,
    Splat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleKind {
    PlayerShot,
    Spark,
    Damage,
    Explosion,
    BotExplosion,
    WarnSpark,
    Smoke,
    HeavySmoke,
    Blood,
    PickupFlash,
    ShellEject,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Burst {
    pub kind: ParticleKind,
    pub x: f32,
    pub y: f32,
    /// Relative size/count; 1.0 is a normal burst.
    pub amount: f32,
    /// Preferred spray direction or initial velocity.
    pub dir: Option<(f32, f32)>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Fx {
    Sound(Sound),
    Burst(Burst),
}

#[derive(Debug, Default)]
pub struct FxQueue {
    events: Vec<Fx>,
}

impl FxQueue {
    pub fn sound(&mut self, sound: Sound) {
        self.events.push(Fx::Sound(sound));
    }

    pub fn burst(&mut self, kind: ParticleKind, x: f32, y: f32, amount: f32) {
        self.events.push(Fx::Burst(Burst { kind, x, y, amount, dir: None }));
    }

    pub fn burst_toward(&mut self, kind: ParticleKind, x: f32, y: f32, amount: f32, dir: (f32, f32)) {
        self.events.push(Fx::Burst(Burst { kind, x, y, amount, dir: Some(dir) }));
    }

    /// Impact feedback scaled by damage: sparks for light rounds, a small
    /// explosion for heavy ones, plus the matching hit sound.
    pub fn impact(&mut self, kind: WeaponKind, x: f32, y: f32, damage: f32) {
        let big = damage >= 20.0;
        match kind {
            WeaponKind::Cannon | WeaponKind::Rocket => self.burst(ParticleKind::Explosion, x, y, 0.6),
            _ => self.burst(ParticleKind::Spark, x, y, 0.5),
        }
        self.sound(Sound::Hit { big });
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, Fx> {
        self.events.drain(..)
    }

    pub fn events(&self) -> &[Fx] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn count_sounds(&self, sound: Sound) -> usize {
        self.events.iter().filter(|e| **e == Fx::Sound(sound)).count()
    }

    pub fn count_bursts(&self, kind: ParticleKind) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Fx::Burst(b) if b.kind == kind))
            .count()
    }
}
