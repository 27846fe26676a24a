use std::sync::Arc;

use walker_shooter::config::Tuning;
use walker_shooter::entities::*;
use walker_shooter::fx::Sound;
use walker_shooter::pickups::*;
use walker_shooter::player::Player;
use walker_shooter::world::World;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn tuning() -> Arc<Tuning> {
    Arc::new(Tuning::default())
}

/// World with a fresh player at the start position.
fn make_world(tuning: &Arc<Tuning>) -> World {
    let mut world = World::new(tuning, seeded_rng());
    world.player = Some(Player::new(tuning.clone(), world.w, world.h));
    world
}

fn item_at(x: f32, y: f32, effect: PickupEffect) -> Pickup {
    Pickup { x, y, vel: None, effect }
}

// ── burst sizing ──────────────────────────────────────────────────────────────

#[test]
fn burst_count_scales_and_clamps() {
    assert_eq!(burst_count(1.0), 3);
    assert_eq!(burst_count(180.0), 4);
    assert_eq!(burst_count(900.0), 8);
    assert_eq!(burst_count(50_000.0), 10);
}

#[test]
fn burst_hp_factor_range() {
    assert_eq!(burst_hp_factor(100.0), 0.0);
    assert_eq!(burst_hp_factor(180.0), 0.0);
    assert!((burst_hp_factor(450.0) - 0.5).abs() < 1e-4);
    assert_eq!(burst_hp_factor(5000.0), 1.0);
}

#[test]
fn boss_burst_guarantees_repair_then_weapon() {
    let t = tuning();
    let mut world = World::new(&t, seeded_rng());
    let mut pickups = Pickups::new(t.clone());
    pickups.spawn_boss_burst(384.0, 300.0, 900.0, &mut world);

    let items = pickups.items();
    assert_eq!(items.len(), 8);
    assert!(matches!(items[0].effect, PickupEffect::Repair { .. }));
    assert!(matches!(items[1].effect, PickupEffect::Weapon { .. }));
    assert!(items.iter().all(|it| it.vel.is_some()));
    assert!(items.iter().all(|it| it.x >= 20.0 && it.x <= 748.0));
}

#[test]
fn small_burst_has_no_guarantees() {
    let t = tuning();
    let mut world = World::new(&t, seeded_rng());
    let mut pickups = Pickups::new(t.clone());
    pickups.spawn_boss_burst(384.0, 300.0, 1.0, &mut world);
    assert_eq!(pickups.items().len(), 3);
}

#[test]
fn burst_items_slow_down_and_stay_on_screen() {
    let t = tuning();
    let mut world = World::new(&t, seeded_rng());
    let mut pickups = Pickups::new(t.clone());
    pickups.spawn_boss_burst(20.0, 300.0, 900.0, &mut world);

    for _ in 0..60 {
        pickups.update(0.05, &mut world);
    }
    for it in pickups.items() {
        assert!(it.x >= 20.0 && it.x <= 748.0);
        if let Some((vx, _)) = it.vel {
            assert!(vx.abs() < 10.0);
        }
    }
}

// ── turret drops ──────────────────────────────────────────────────────────────

#[test]
fn turret_drop_by_tier() {
    let t = tuning();
    let mut world = World::new(&t, seeded_rng());
    let pickups = Pickups::new(t.clone());

    assert!(matches!(
        pickups.drop_for_turret(TurretType::Small, &mut world),
        PickupEffect::Repair { .. }
    ));
    assert!(matches!(
        pickups.drop_for_turret(TurretType::Medium, &mut world),
        PickupEffect::BotUpgrade { .. }
    ));
    for _ in 0..30 {
        match pickups.drop_for_turret(TurretType::Large, &mut world) {
            PickupEffect::Weapon { weapon, .. } => {
                assert!(world.allowed_weapon_drops.contains(&weapon));
                assert_ne!(weapon, WeaponKind::Shotgun);
            }
            other => panic!("large turret dropped {:?}", other),
        }
    }
}

#[test]
fn turret_drop_clamped_inside_edges() {
    let t = tuning();
    let mut world = World::new(&t, seeded_rng());
    let mut pickups = Pickups::new(t.clone());
    pickups.spawn_from_turret(2.0, 50.0, TurretType::Small, &mut world);
    assert_eq!(pickups.items()[0].x, 20.0);
    assert!(pickups.items()[0].vel.is_none());
}

// ── collection ────────────────────────────────────────────────────────────────

#[test]
fn repair_collected_once() {
    let t = tuning();
    let mut world = make_world(&t);
    let mut pickups = Pickups::new(t.clone());
    if let Some(p) = world.player.as_mut() {
        p.take_damage(60.0);
    }
    let (px, py) = world.player.as_ref().map_or((0.0, 0.0), |p| (p.x, p.y));
    pickups.insert(item_at(px + 30.0, py, PickupEffect::Repair { heal_frac: 0.15 }));

    pickups.update(0.016, &mut world);
    pickups.update(0.016, &mut world);

    assert!(!pickups.has_active());
    assert_eq!(world.player.as_ref().map(|p| p.hp), Some(60.0 + 18.0));
    assert_eq!(world.fx.count_sounds(Sound::Pickup), 1);
}

#[test]
fn out_of_reach_item_stays() {
    let t = tuning();
    let mut world = make_world(&t);
    let mut pickups = Pickups::new(t.clone());
    let (px, py) = world.player.as_ref().map_or((0.0, 0.0), |p| (p.x, p.y));
    pickups.insert(item_at(px + 40.0, py, PickupEffect::Repair { heal_frac: 0.15 }));
    pickups.update(0.016, &mut world);
    assert!(pickups.has_active());
}

#[test]
fn dead_player_collects_nothing() {
    let t = tuning();
    let mut world = make_world(&t);
    let mut pickups = Pickups::new(t.clone());
    if let Some(p) = world.player.as_mut() {
        p.dead = true;
    }
    let (px, py) = world.player.as_ref().map_or((0.0, 0.0), |p| (p.x, p.y));
    pickups.insert(item_at(px, py, PickupEffect::Repair { heal_frac: 0.15 }));
    pickups.update(0.016, &mut world);
    assert!(pickups.has_active());
}

#[test]
fn weapon_pickup_replaces_mount() {
    let t = tuning();
    let mut world = make_world(&t);
    let mut pickups = Pickups::new(t.clone());
    let (px, py) = world.player.as_ref().map_or((0.0, 0.0), |p| (p.x, p.y));
    pickups.insert(item_at(
        px,
        py,
        PickupEffect::Weapon { side: MountSide::Left, weapon: WeaponKind::Rocket },
    ));
    pickups.update(0.016, &mut world);
    let left = world.player.as_ref().and_then(|p| p.weapon(MountSide::Left));
    assert_eq!(left, Some(WeaponKind::Rocket));
}

#[test]
fn items_scroll_and_despawn_below_screen() {
    let t = tuning();
    let mut world = World::new(&t, seeded_rng());
    let mut pickups = Pickups::new(t.clone());
    pickups.insert(item_at(100.0, 1050.0, PickupEffect::Repair { heal_frac: 0.15 }));
    world.dy = 10.0;
    pickups.update(0.016, &mut world);
    assert_eq!(pickups.items()[0].y, 1060.0);
    pickups.update(0.016, &mut world); // 1070 > 1024 + 40
    assert!(!pickups.has_active());
}

// ── upgrade caps ──────────────────────────────────────────────────────────────

#[test]
fn speed_upgrades_capped() {
    let t = tuning();
    let mut p = Player::new(t.clone(), 768.0, 1024.0);
    let mut rng = seeded_rng();
    let up = PickupEffect::BotUpgrade { stat: StatKind::MoveSpeed, factor: 1.5 };
    for _ in 0..5 {
        apply_effect(&up, &mut p, &t.pickups, &mut rng);
    }
    assert_eq!(p.speed_mul, 2.0);
    assert_eq!(p.rig_marks.len(), 5);
}

#[test]
fn reload_upgrades_floored() {
    let t = tuning();
    let mut p = Player::new(t.clone(), 768.0, 1024.0);
    let mut rng = seeded_rng();
    let up = PickupEffect::BotUpgrade { stat: StatKind::Reload, factor: 0.5 };
    for _ in 0..3 {
        apply_effect(&up, &mut p, &t.pickups, &mut rng);
    }
    assert_eq!(p.reload_mul, 0.4);
}

#[test]
fn damage_and_projectile_speed_capped() {
    let t = tuning();
    let mut p = Player::new(t.clone(), 768.0, 1024.0);
    let mut rng = seeded_rng();
    for _ in 0..10 {
        apply_effect(&PickupEffect::BotUpgrade { stat: StatKind::Damage, factor: 2.0 }, &mut p, &t.pickups, &mut rng);
        apply_effect(
            &PickupEffect::BotUpgrade { stat: StatKind::ProjectileSpeed, factor: 2.0 },
            &mut p,
            &t.pickups,
            &mut rng,
        );
    }
    assert_eq!(p.damage_mul, 3.0);
    assert_eq!(p.proj_speed_mul, 2.5);
}

#[test]
fn repair_never_overheals() {
    let t = tuning();
    let mut p = Player::new(t.clone(), 768.0, 1024.0);
    let mut rng = seeded_rng();
    p.take_damage(5.0);
    apply_effect(&PickupEffect::Repair { heal_frac: 0.15 }, &mut p, &t.pickups, &mut rng);
    assert_eq!(p.hp, p.max_hp);
}

#[test]
fn minor_upgrades_derive_from_base() {
    let ups = minor_upgrades(1.08);
    assert_eq!(ups.len(), 4);
    for up in ups {
        match up {
            PickupEffect::BotUpgrade { stat: StatKind::Reload, factor } => assert!(factor < 1.0 && factor >= 0.82),
            PickupEffect::BotUpgrade { factor, .. } => assert!(factor > 1.0),
            other => panic!("unexpected {:?}", other),
        }
    }
}
