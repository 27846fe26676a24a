//! Encounter selection and turret/pack boss construction.

use rand::Rng;

use crate::config::{EncounterKind, EncounterMods, PackMember, Span, Tuning};
use crate::entities::{BossKind, BossTag, Turret};
use crate::turrets::build_turret;

/// The encounter chosen for one boss level.
#[derive(Clone, Debug, PartialEq)]
pub struct Encounter {
    pub level: u32,
    pub kind: EncounterKind,
    pub mods: EncounterMods,
}

impl Encounter {
    pub fn boss_kind(&self) -> BossKind {
        match self.kind {
            EncounterKind::Float => BossKind::Float,
            EncounterKind::Turret { .. } => BossKind::Turret,
            EncounterKind::Pack { .. } => BossKind::Pack,
        }
    }
}

/// Boss level for a distance threshold: one per interval, at least 1.
pub fn boss_level(next_boss_dist: f32, interval: f32) -> u32 {
    let interval = interval.max(1.0);
    ((next_boss_dist.max(0.0) / interval).floor() as u32).max(1)
}

/// First rule in the table whose level range contains `level`, else the
/// default rule.
pub fn select_encounter(tuning: &Tuning, level: u32) -> Encounter {
    let level = level.max(1);
    let boss = &tuning.boss;
    let rule = boss
        .encounters
        .iter()
        .find(|r| r.matches(level))
        .unwrap_or(&boss.encounter_default);
    Encounter {
        level,
        kind: rule.kind.clone(),
        mods: rule.mods,
    }
}

/// Members a turret-shaped encounter places.  A single turret is a pack of
/// one at the center; an empty pack uses the default line-up.
pub fn pack_members(tuning: &Tuning, encounter: &Encounter) -> Vec<PackMember> {
    match &encounter.kind {
        EncounterKind::Float => Vec::new(),
        EncounterKind::Turret { turret_type } => {
            vec![PackMember::new(*turret_type, 0.5, EncounterMods::default())]
        }
        EncounterKind::Pack { members } if members.is_empty() => tuning.boss.pack_default_members.clone(),
        EncounterKind::Pack { members } => members.clone(),
    }
}

/// One boss-tagged turret.  `from_top` starts it above the screen in its
/// entry descent.
#[allow(clippy::too_many_arguments)]
pub fn build_boss_turret(
    tuning: &Tuning,
    member: &PackMember,
    encounter: &Encounter,
    screen_w: f32,
    screen_h: f32,
    from_top: bool,
    rng: &mut impl Rng,
) -> Turret {
    let spec = tuning.turrets.spec(member.turret_type);
    let tb = &tuning.boss.turret;
    let mods = encounter.mods.stacked(&member.mods);
    let level_mul = 1.0 + tb.level_hp_step * encounter.level.saturating_sub(1) as f32;

    let size = spec.size * tb.size_mult * mods.size_mul;
    let x = (screen_w * member.x_frac).clamp(size, (screen_w - size).max(size));
    let stop_y = screen_h * tb.stop_y_frac;
    let y = if from_top { -size - tuning.boss.float.entry_gap } else { stop_y };

    let mut t = build_turret(spec, member.turret_type, x, y, 0.0);
    t.size = size;
    t.max_hp = (spec.hp * tb.hp_mult * mods.hp_mul * level_mul).round().max(1.0);
    t.hp = t.max_hp;
    let cd = spec.fire_cooldown.scaled_down(mods.fire_rate_mul);
    t.fire_cooldown = Span::new(
        cd.min.max(tb.min_cooldown),
        cd.max.max(tb.min_cooldown),
    );
    t.cool = t.fire_cooldown.sample(rng);
    t.bullet_damage = spec.bullet_damage * mods.damage_mul;
    t.bullet_speed = spec.bullet_speed * mods.projectile_speed_mul;
    t.boss = Some(BossTag {
        level: encounter.level,
        kind: encounter.boss_kind(),
    });
    t.entering = from_top;
    t.stop_y = stop_y;
    t
}
