use std::sync::Arc;

use walker_shooter::config::Tuning;
use walker_shooter::entities::*;
use walker_shooter::fx::{FxQueue, Sound};
use walker_shooter::player::*;
use walker_shooter::projectiles::Projectiles;
use walker_shooter::world::World;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn tuning() -> Arc<Tuning> {
    Arc::new(Tuning::default())
}

fn make_player(tuning: &Arc<Tuning>) -> Player {
    Player::new(tuning.clone(), tuning.canvas_w, tuning.canvas_h)
}

fn make_world(tuning: &Tuning) -> World {
    World::new(tuning, seeded_rng())
}

fn fire_left() -> PlayerInput {
    PlayerInput { fire: [true, false], ..PlayerInput::default() }
}

// ── construction ──────────────────────────────────────────────────────────────

#[test]
fn new_player_starts_bottom_center() {
    let t = tuning();
    let p = make_player(&t);
    assert_eq!(p.x, 384.0);
    assert!((p.y - 921.6).abs() < 1e-3);
    assert_eq!(p.hp, 120.0);
    assert_eq!(p.weapon(MountSide::Left), Some(WeaponKind::Chaingun));
    assert_eq!(p.weapon(MountSide::Right), Some(WeaponKind::Cannon));
    assert!(!p.dead);
}

// ── movement ──────────────────────────────────────────────────────────────────

#[test]
fn movement_scales_with_speed_and_clamps_to_edges() {
    let t = tuning();
    let mut world = make_world(&t);
    let mut proj = Projectiles::new(t.clone());
    let mut p = make_player(&t);
    let input = PlayerInput { move_x: 1.0, ..PlayerInput::default() };

    p.update(0.5, &input, &mut world, &mut proj);
    assert!((p.x - 434.0).abs() < 1e-3); // 100 px/s

    for _ in 0..100 {
        p.update(0.5, &input, &mut world, &mut proj);
    }
    assert_eq!(p.x, 768.0 - 14.0);
}

// ── aim ───────────────────────────────────────────────────────────────────────

#[test]
fn aim_clamped_to_twist_off_surface() {
    let t = tuning();
    let mut p = make_player(&t);
    let (tx, ty) = (p.x + 500.0, p.y); // 90° to the right
    for _ in 0..600 {
        p.aim_toward(tx, ty, false, 1.0 / 60.0);
    }
    assert!((p.angle - 50f32.to_radians()).abs() < 1e-3);
}

#[test]
fn aim_wider_on_surface() {
    let t = tuning();
    let mut p = make_player(&t);
    let (tx, ty) = (p.x + 500.0, p.y);
    for _ in 0..600 {
        p.aim_toward(tx, ty, true, 1.0 / 60.0);
    }
    assert!((p.angle - std::f32::consts::FRAC_PI_2).abs() < 1e-3);
}

#[test]
fn aim_behind_clamps_to_limit() {
    let t = tuning();
    let mut p = make_player(&t);
    let (tx, ty) = (p.x - 1.0, p.y + 500.0); // almost straight down, left side
    for _ in 0..600 {
        p.aim_toward(tx, ty, true, 1.0 / 60.0);
    }
    assert!(p.angle.abs() <= 115f32.to_radians() + 1e-3);
    assert!(p.angle.abs() > 100f32.to_radians());
}

#[test]
fn aim_eases_rather_than_snaps() {
    let t = tuning();
    let mut p = make_player(&t);
    p.aim_toward(p.x + 500.0, p.y, false, 1.0 / 60.0);
    assert!(p.angle > 0.0);
    assert!(p.angle < 50f32.to_radians());
}

// ── standard weapons ──────────────────────────────────────────────────────────

#[test]
fn cannon_respects_cooldown() {
    let t = tuning();
    let mut world = make_world(&t);
    let mut proj = Projectiles::new(t.clone());
    let mut p = make_player(&t);
    let input = PlayerInput { fire: [false, true], ..PlayerInput::default() };

    for _ in 0..10 {
        p.update(0.02, &input, &mut world, &mut proj); // 0.2 s < 0.5 s cooldown
    }
    assert_eq!(world.fx.count_sounds(Sound::Shot(WeaponKind::Cannon)), 1);
    assert_eq!(proj.shots().len(), 1);
}

#[test]
fn reload_mul_shortens_cooldown() {
    let t = tuning();
    let mut world = make_world(&t);
    let mut proj = Projectiles::new(t.clone());
    let mut p = make_player(&t);
    p.reload_mul = 0.4;
    let input = PlayerInput { fire: [false, true], ..PlayerInput::default() };

    for _ in 0..11 {
        p.update(0.05, &input, &mut world, &mut proj); // 0.55 s, cooldown 0.2 s
    }
    assert_eq!(world.fx.count_sounds(Sound::Shot(WeaponKind::Cannon)), 3);
}

#[test]
fn shotgun_fires_spread() {
    let t = tuning();
    let mut world = make_world(&t);
    let mut proj = Projectiles::new(t.clone());
    let mut p = make_player(&t);
    p.set_weapon(MountSide::Left, Some(WeaponKind::Shotgun));
    p.fire(MountSide::Left, &mut world, &mut proj);
    assert_eq!(proj.shots().len(), 3);
    let vx: Vec<f32> = proj.shots().iter().map(|s| s.vx).collect();
    assert!(vx[0] < vx[1] && vx[1] < vx[2]);
}

#[test]
fn beamer_fires_tracked_beam() {
    let t = tuning();
    let mut world = make_world(&t);
    let mut proj = Projectiles::new(t.clone());
    let mut p = make_player(&t);
    p.set_weapon(MountSide::Right, Some(WeaponKind::Beamer));
    p.fire(MountSide::Right, &mut world, &mut proj);
    assert_eq!(proj.beams().len(), 1);
    assert_eq!(proj.beams()[0].tracking, Some(MountSide::Right));
}

#[test]
fn empty_mount_does_nothing() {
    let t = tuning();
    let mut world = make_world(&t);
    let mut proj = Projectiles::new(t.clone());
    let mut p = make_player(&t);
    p.set_weapon(MountSide::Right, None);
    p.fire(MountSide::Right, &mut world, &mut proj);
    assert!(proj.is_empty());
    assert!(p.muzzle_pose(MountSide::Right).is_none());
}

// ── chaingun ──────────────────────────────────────────────────────────────────

#[test]
fn chaingun_silent_during_windup() {
    let t = tuning();
    let mut world = make_world(&t);
    let mut proj = Projectiles::new(t.clone());
    let mut p = make_player(&t);

    for _ in 0..8 {
        p.update(0.1, &fire_left(), &mut world, &mut proj); // 0.8 s < 0.85 s
    }
    assert!(proj.shots().is_empty());
    assert_eq!(world.fx.count_sounds(Sound::ChaingunWindup), 1);

    p.update(0.1, &fire_left(), &mut world, &mut proj);
    assert_eq!(proj.shots().len(), 1);
    assert!(p.chaingun(MountSide::Left).spinning);
}

#[test]
fn chaingun_release_resets_windup() {
    let t = tuning();
    let mut world = make_world(&t);
    let mut proj = Projectiles::new(t.clone());
    let mut p = make_player(&t);

    for _ in 0..5 {
        p.update(0.1, &fire_left(), &mut world, &mut proj);
    }
    p.update(0.1, &PlayerInput::default(), &mut world, &mut proj);
    for _ in 0..5 {
        p.update(0.1, &fire_left(), &mut world, &mut proj);
    }
    assert!(proj.shots().is_empty());
}

#[test]
fn chaingun_heats_while_firing_and_cools_after() {
    let t = tuning();
    let mut world = make_world(&t);
    let mut proj = Projectiles::new(t.clone());
    let mut p = make_player(&t);

    for _ in 0..20 {
        p.update(0.1, &fire_left(), &mut world, &mut proj);
    }
    let hot = p.chaingun(MountSide::Left).heat;
    assert!(hot > 0.3);

    for _ in 0..5 {
        p.update(0.1, &PlayerInput::default(), &mut world, &mut proj);
    }
    assert!(p.chaingun(MountSide::Left).heat < hot);
}

#[test]
fn chaingun_overheat_locks_until_cool() {
    let t = tuning();
    let mut world = make_world(&t);
    let mut proj = Projectiles::new(t.clone());
    let mut p = make_player(&t);

    let mut ticks = 0;
    while !p.chaingun(MountSide::Left).overheated && ticks < 400 {
        p.update(0.05, &fire_left(), &mut world, &mut proj);
        ticks += 1;
    }
    assert!(p.chaingun(MountSide::Left).overheated);

    // Still holding the trigger: no rounds while overheated.
    world.fx.clear();
    for _ in 0..10 {
        p.update(0.05, &fire_left(), &mut world, &mut proj);
    }
    assert_eq!(world.fx.count_sounds(Sound::Shot(WeaponKind::Chaingun)), 0);

    let mut ticks = 0;
    while p.chaingun(MountSide::Left).overheated && ticks < 400 {
        p.update(0.05, &PlayerInput::default(), &mut world, &mut proj);
        ticks += 1;
    }
    assert!(!p.chaingun(MountSide::Left).overheated);
    assert_eq!(p.chaingun(MountSide::Left).heat, 0.0);
}

// ── damage bucket ─────────────────────────────────────────────────────────────

#[test]
fn bucket_sheds_largest_weapon() {
    let t = tuning();
    let mut fx = FxQueue::default();
    let mut p = make_player(&t);
    p.take_damage(24.0); // threshold = 120 · 0.2
    let shed = p.check_damage_bucket(&mut fx);
    assert_eq!(shed, vec![(MountSide::Right, WeaponKind::Cannon)]);
    assert_eq!(p.weapon(MountSide::Right), None);
    assert_eq!(p.weapon(MountSide::Left), Some(WeaponKind::Chaingun));
    assert!(p.damage_bucket.abs() < 1e-4);
    assert_eq!(fx.count_sounds(Sound::Explosion), 1);
}

#[test]
fn bucket_keeps_remainder() {
    let t = tuning();
    let mut fx = FxQueue::default();
    let mut p = make_player(&t);
    p.take_damage(30.0);
    p.check_damage_bucket(&mut fx);
    assert!((p.damage_bucket - 6.0).abs() < 1e-4);
}

#[test]
fn bucket_below_threshold_sheds_nothing() {
    let t = tuning();
    let mut fx = FxQueue::default();
    let mut p = make_player(&t);
    p.take_damage(10.0);
    assert!(p.check_damage_bucket(&mut fx).is_empty());
    p.take_damage(10.0);
    assert!(p.check_damage_bucket(&mut fx).is_empty());
    assert!((p.damage_bucket - 20.0).abs() < 1e-4);
    assert_eq!(p.equipped_count(), 2);
}

#[test]
fn last_weapon_is_never_shed() {
    let t = tuning();
    let mut fx = FxQueue::default();
    let mut p = make_player(&t);
    p.set_weapon(MountSide::Left, None);
    p.take_damage(100.0);
    let shed = p.check_damage_bucket(&mut fx);
    assert!(shed.is_empty());
    assert_eq!(p.weapon(MountSide::Right), Some(WeaponKind::Cannon));
    assert!(p.damage_bucket < 24.0);
}

#[test]
fn big_hit_sheds_down_to_one_weapon() {
    let t = tuning();
    let mut fx = FxQueue::default();
    let mut p = make_player(&t);
    p.take_damage(60.0);
    let shed = p.check_damage_bucket(&mut fx);
    assert_eq!(shed.len(), 1);
    assert_eq!(p.equipped_count(), 1);
}

#[test]
fn equal_rank_prefers_left() {
    let t = tuning();
    let mut p = make_player(&t);
    p.set_weapon(MountSide::Left, Some(WeaponKind::Rifle));
    p.set_weapon(MountSide::Right, Some(WeaponKind::Rifle));
    assert_eq!(p.largest_weapon_side(), Some(MountSide::Left));
}

#[test]
fn bucket_counts_net_loss_since_last_check() {
    let t = tuning();
    let mut fx = FxQueue::default();
    let mut p = make_player(&t);
    p.take_damage(20.0);
    p.heal(20.0);
    p.take_damage(10.0);
    let shed = p.check_damage_bucket(&mut fx);
    assert!(shed.is_empty());
    assert!((p.damage_bucket - 10.0).abs() < 1e-4);
}

// ── death ─────────────────────────────────────────────────────────────────────

#[test]
fn destroy_runs_death_animation() {
    let t = tuning();
    let mut world = make_world(&t);
    let mut proj = Projectiles::new(t.clone());
    let mut p = make_player(&t);
    p.take_damage(500.0);
    assert_eq!(p.hp, 0.0);
    p.destroy(&mut world.fx);
    assert!(p.dead);
    assert!(!p.is_death_anim_done());

    for _ in 0..3 {
        p.update(0.5, &fire_left(), &mut world, &mut proj);
    }
    assert!(p.is_death_anim_done());
    assert!(proj.is_empty());
}

#[test]
fn dead_player_ignores_damage_and_healing() {
    let t = tuning();
    let mut world = make_world(&t);
    let mut p = make_player(&t);
    p.destroy(&mut world.fx);
    let hp = p.hp;
    p.take_damage(10.0);
    p.heal(10.0);
    assert_eq!(p.hp, hp);
}
