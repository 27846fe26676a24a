use std::sync::Arc;

use walker_shooter::bosses::hull::overlap_fraction;
use walker_shooter::bosses::*;
use walker_shooter::config::{EncounterKind, EncounterMods, Tuning};
use walker_shooter::entities::*;
use walker_shooter::pickups::Pickups;
use walker_shooter::projectiles::{Projectiles, ShotMods};
use walker_shooter::turrets::Turrets;
use walker_shooter::world::World;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn tuning() -> Arc<Tuning> {
    Arc::new(Tuning::default())
}

fn make_world(tuning: &Tuning) -> World {
    World::new(tuning, seeded_rng())
}

fn make_float(tuning: &Tuning, level: u32, seed: u64) -> FloatBoss {
    let mut rng = StdRng::seed_from_u64(seed);
    generate_float_boss(&mut rng, tuning, level, &EncounterMods::default(), 768.0, 1024.0, true)
}

// ── encounter table ───────────────────────────────────────────────────────────

#[test]
fn boss_level_counts_intervals() {
    assert_eq!(boss_level(0.0, 2000.0), 1);
    assert_eq!(boss_level(2000.0, 2000.0), 1);
    assert_eq!(boss_level(4000.0, 2000.0), 2);
    assert_eq!(boss_level(10000.0, 2000.0), 5);
}

#[test]
fn level_one_is_large_turret() {
    let t = tuning();
    let enc = select_encounter(&t, 1);
    assert_eq!(enc.kind, EncounterKind::Turret { turret_type: TurretType::Large });
    assert_eq!(enc.boss_kind(), BossKind::Turret);
    assert_eq!(enc.mods.hp_mul, 1.2);
}

#[test]
fn level_two_is_three_turret_pack() {
    let t = tuning();
    let enc = select_encounter(&t, 2);
    assert_eq!(enc.boss_kind(), BossKind::Pack);
    let members = pack_members(&t, &enc);
    assert_eq!(members.len(), 3);
    assert_eq!(members[0].turret_type, TurretType::Large);
}

#[test]
fn middle_levels_are_plain_floats() {
    let t = tuning();
    for level in 3..=5 {
        let enc = select_encounter(&t, level);
        assert_eq!(enc.boss_kind(), BossKind::Float);
        assert_eq!(enc.mods, EncounterMods::default());
    }
}

#[test]
fn late_levels_are_modded_floats() {
    let t = tuning();
    let enc = select_encounter(&t, 9);
    assert_eq!(enc.boss_kind(), BossKind::Float);
    assert!(enc.mods.hp_mul > 1.0);
    assert!(enc.mods.large_mount_bonus > 0.0);
}

#[test]
fn empty_table_falls_back_to_default_rule() {
    let mut t = Tuning::default();
    t.boss.encounters.clear();
    let enc = select_encounter(&t, 1);
    assert_eq!(enc.boss_kind(), BossKind::Float);
}

#[test]
fn empty_pack_uses_default_members() {
    let mut t = Tuning::default();
    t.boss.encounters[1].kind = EncounterKind::Pack { members: Vec::new() };
    let enc = select_encounter(&t, 2);
    let members = pack_members(&t, &enc);
    assert_eq!(members, t.boss.pack_default_members);
}

#[test]
fn boss_turret_scaled_from_tier() {
    let t = tuning();
    let enc = select_encounter(&t, 1);
    let members = pack_members(&t, &enc);
    let mut rng = seeded_rng();
    let turret = build_boss_turret(&t, &members[0], &enc, 768.0, 1024.0, true, &mut rng);

    assert_eq!(turret.max_hp, (130.0f32 * 4.0 * 1.2).round());
    assert!((turret.size - 26.0 * 1.5 * 1.4).abs() < 1e-3);
    assert!(turret.entering);
    assert!(turret.y < 0.0);
    assert!((turret.stop_y - 1024.0 * 0.24).abs() < 1e-3);
    assert_eq!(turret.x, 384.0);
    assert_eq!(turret.boss.map(|b| b.kind), Some(BossKind::Turret));
}

#[test]
fn boss_turret_hp_grows_with_level() {
    let t = tuning();
    let mut rng = seeded_rng();
    let mut enc = select_encounter(&t, 1);
    let members = pack_members(&t, &enc);
    let lv1 = build_boss_turret(&t, &members[0], &enc, 768.0, 1024.0, false, &mut rng);
    enc.level = 3;
    let lv3 = build_boss_turret(&t, &members[0], &enc, 768.0, 1024.0, false, &mut rng);
    assert!(lv3.max_hp > lv1.max_hp);
    assert!(!lv3.entering);
    assert_eq!(lv3.y, lv3.stop_y);
}

// ── float hull ────────────────────────────────────────────────────────────────

#[test]
fn float_hull_same_seed_same_hull() {
    let t = tuning();
    let a = make_float(&t, 4, 42);
    let b = make_float(&t, 4, 42);
    assert_eq!((a.w, a.h, a.max_hp), (b.w, b.h, b.max_hp));
    assert_eq!(a.mounts.len(), b.mounts.len());
    for (ma, mb) in a.mounts.iter().zip(b.mounts.iter()) {
        assert_eq!((ma.ox, ma.oy, ma.size, ma.class), (mb.ox, mb.oy, mb.size, mb.class));
    }
    assert_eq!(a.deco.len(), b.deco.len());
}

#[test]
fn float_hull_stats_follow_level() {
    let t = tuning();
    let b = make_float(&t, 3, 42);
    assert_eq!(b.max_hp, 220.0 + 85.0 * 3.0);
    assert_eq!(b.hp, b.max_hp);
    assert!(b.mounts.len() >= 3 && b.mounts.len() <= 6);
    assert!(b.w >= 72.0 && b.w <= 118.0);
    assert!(b.entering);
    assert!(b.y < 0.0);
    assert!(b.mounts.iter().all(|m| m.alive));
}

#[test]
fn float_mounts_and_deco_keep_overlap() {
    let t = tuning();
    for seed in 0..40 {
        let b = make_float(&t, 5, seed);
        for m in &b.mounts {
            let f = overlap_fraction(b.w, b.h, m.ox, m.oy, m.size * 2.0, m.size * 2.0);
            assert!(f >= 0.2 - 1e-3, "mount overlap {} (seed {})", f, seed);
        }
        for d in &b.deco {
            let (dw, dh) = d.shape.footprint();
            let f = overlap_fraction(b.w, b.h, d.ox, d.oy, dw, dh);
            assert!(f >= 0.1 - 1e-3, "deco overlap {} (seed {})", f, seed);
        }
    }
}

#[test]
fn overlap_fraction_basics() {
    assert_eq!(overlap_fraction(100.0, 100.0, 0.0, 0.0, 10.0, 10.0), 1.0);
    assert_eq!(overlap_fraction(100.0, 100.0, 200.0, 0.0, 10.0, 10.0), 0.0);
    assert!((overlap_fraction(100.0, 100.0, 50.0, 0.0, 10.0, 10.0) - 0.5).abs() < 1e-4);
}

// ── mount attrition ───────────────────────────────────────────────────────────

#[test]
fn desired_mounts_track_hp() {
    assert_eq!(desired_alive_mounts(6, 1.0), 6);
    assert_eq!(desired_alive_mounts(6, 0.5), 3);
    assert_eq!(desired_alive_mounts(5, 0.5), 3);
    assert_eq!(desired_alive_mounts(6, 0.01), 1);
    assert_eq!(desired_alive_mounts(6, 0.0), 1);
}

#[test]
fn attrition_converges_one_pop_at_a_time() {
    let t = tuning();
    let mut b = make_float(&t, 4, 42);
    let total = b.mounts.len();
    b.hp = b.max_hp * 0.3;
    let desired = desired_alive_mounts(total, b.hp_ratio());
    let mut rng = seeded_rng();

    let mut prev = b.alive_mounts();
    for _ in 0..20 {
        attrition_step(&mut b, 0.3, 0.24, &mut rng);
        let now = b.alive_mounts();
        assert!(prev - now <= 1);
        prev = now;
    }
    assert_eq!(b.alive_mounts(), desired);
}

#[test]
fn attrition_waits_for_pop_cooldown() {
    let t = tuning();
    let mut b = make_float(&t, 4, 42);
    b.hp = 1.0;
    let mut rng = seeded_rng();
    assert!(attrition_step(&mut b, 0.01, 0.24, &mut rng).is_some());
    assert!(attrition_step(&mut b, 0.01, 0.24, &mut rng).is_none());
    assert!(attrition_step(&mut b, 0.3, 0.24, &mut rng).is_some() || b.alive_mounts() == 1);
}

#[test]
fn attrition_never_pops_last_mount() {
    let t = tuning();
    let mut b = make_float(&t, 4, 42);
    b.hp = 0.0;
    let mut rng = seeded_rng();
    for _ in 0..50 {
        attrition_step(&mut b, 1.0, 0.24, &mut rng);
    }
    assert_eq!(b.alive_mounts(), 1);
}

#[test]
fn attrition_idle_at_full_hp() {
    let t = tuning();
    let mut b = make_float(&t, 4, 42);
    let mut rng = seeded_rng();
    assert!(attrition_step(&mut b, 1.0, 0.24, &mut rng).is_none());
    assert_eq!(b.alive_mounts(), b.mounts.len());
}

// ── Bosses pool ───────────────────────────────────────────────────────────────

#[test]
fn start_turret_encounter_fills_turret_pool() {
    let t = tuning();
    let mut world = make_world(&t);
    let mut turrets = Turrets::new(t.clone());
    let mut bosses = Bosses::new(t.clone());

    let kind = bosses.start_encounter(1, true, &mut world, &mut turrets);
    assert_eq!(kind, BossKind::Turret);
    assert!(bosses.floats().is_empty());
    assert!(turrets.has_boss());
    assert!(!turrets.has_active_non_boss());

    let status = bosses.status(&turrets).map(|s| (s.kind, s.level, s.entered));
    assert_eq!(status, Some((BossKind::Turret, 1, false)));
}

#[test]
fn start_float_encounter_keeps_hull() {
    let t = tuning();
    let mut world = make_world(&t);
    let mut turrets = Turrets::new(t.clone());
    let mut bosses = Bosses::new(t.clone());

    let kind = bosses.start_encounter(3, true, &mut world, &mut turrets);
    assert_eq!(kind, BossKind::Float);
    assert_eq!(bosses.floats().len(), 1);
    assert!(!turrets.has_boss());
    assert!(bosses.has_active_boss(&turrets));
}

#[test]
fn float_descends_then_hovers() {
    let t = tuning();
    let mut world = make_world(&t);
    let mut turrets = Turrets::new(t.clone());
    let mut bosses = Bosses::new(t.clone());
    let mut proj = Projectiles::new(t.clone());
    let mut pickups = Pickups::new(t.clone());
    bosses.start_encounter(4, true, &mut world, &mut turrets);

    let mut ticks = 0;
    while bosses.floats()[0].entering && ticks < 1000 {
        bosses.update(0.05, &mut world, &mut proj, &mut pickups);
        ticks += 1;
    }
    let b = &bosses.floats()[0];
    assert!(!b.entering);
    assert!((b.y - b.stop_y).abs() < 1e-3);
    assert!(bosses.status(&turrets).map_or(false, |s| s.entered));

    for _ in 0..40 {
        bosses.update(0.05, &mut world, &mut proj, &mut pickups);
    }
    let b = &bosses.floats()[0];
    assert!((b.x - b.base_x).abs() <= b.hover_x + 1e-3);
    assert!((b.y - b.base_y).abs() <= b.hover_y + 1e-3);
}

#[test]
fn float_takes_shot_damage() {
    let t = tuning();
    let mut world = make_world(&t);
    let mut turrets = Turrets::new(t.clone());
    let mut bosses = Bosses::new(t.clone());
    let mut proj = Projectiles::new(t.clone());
    let mut pickups = Pickups::new(t.clone());
    bosses.start_encounter(3, false, &mut world, &mut turrets);

    let (x, y) = (bosses.floats()[0].x, bosses.floats()[0].y);
    proj.spawn(x, y, 0.0, WeaponKind::Cannon, ShotMods::default());
    bosses.update(0.0, &mut world, &mut proj, &mut pickups);

    let b = &bosses.floats()[0];
    assert_eq!(b.hp, b.max_hp - 50.0);
    assert!(proj.shots().is_empty());
}

#[test]
fn dead_float_drops_burst_and_counts_kill() {
    let t = tuning();
    let mut world = make_world(&t);
    let mut turrets = Turrets::new(t.clone());
    let mut bosses = Bosses::new(t.clone());
    let mut proj = Projectiles::new(t.clone());
    let mut pickups = Pickups::new(t.clone());
    bosses.start_encounter(3, false, &mut world, &mut turrets);
    bosses.floats_mut()[0].hp = 0.0;

    bosses.update(0.016, &mut world, &mut proj, &mut pickups);
    assert!(bosses.floats().is_empty());
    assert_eq!(world.enemies_destroyed, 1);
    assert!(pickups.items().len() >= 3);
    assert!(!bosses.has_active_boss(&turrets));
    assert!(bosses.status(&turrets).is_none());
}

#[test]
fn entered_float_fires_at_player() {
    let t = tuning();
    let mut world = make_world(&t);
    world.player = Some(walker_shooter::player::Player::new(t.clone(), world.w, world.h));
    let mut turrets = Turrets::new(t.clone());
    let mut bosses = Bosses::new(t.clone());
    let mut proj = Projectiles::new(t.clone());
    let mut pickups = Pickups::new(t.clone());
    bosses.start_encounter(3, false, &mut world, &mut turrets);

    for _ in 0..60 {
        bosses.update(0.05, &mut world, &mut proj, &mut pickups);
    }
    let fired = !bosses.shots().is_empty()
        || world.player.as_ref().map_or(false, |p| p.hp < p.max_hp);
    assert!(fired);
}
