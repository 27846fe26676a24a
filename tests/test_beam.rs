use std::f32::consts::FRAC_PI_2;

use walker_shooter::beam::*;
use walker_shooter::config::{BeamSpec, Tuning};
use walker_shooter::entities::*;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn standard() -> BeamSpec {
    Tuning::default().beams.standard
}

fn punch() -> BeamSpec {
    Tuning::default().beams.punch
}

/// A beam from (0, 500) pointing straight up the screen.
fn make_beam(kind: BeamKind, spec: &BeamSpec) -> Beam {
    Beam {
        kind,
        x0: 0.0,
        y0: 500.0,
        x1: 0.0,
        y1: 500.0 - spec.range,
        angle: 0.0,
        damage: spec.damage,
        range: spec.range,
        t: 0.0,
        life: spec.life,
        tracking: None,
    }
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

// ── aim_dir ───────────────────────────────────────────────────────────────────

#[test]
fn aim_dir_zero_is_up() {
    let (x, y) = aim_dir(0.0);
    assert!(approx(x, 0.0));
    assert!(approx(y, -1.0));
}

#[test]
fn aim_dir_quarter_turn_is_right() {
    let (x, y) = aim_dir(FRAC_PI_2);
    assert!(approx(x, 1.0));
    assert!(approx(y, 0.0));
}

// ── falloff curves ────────────────────────────────────────────────────────────

#[test]
fn distance_mul_full_until_near() {
    let s = standard();
    assert_eq!(distance_mul(0.0, &s), 1.0);
    assert_eq!(distance_mul(s.near_frac, &s), 1.0);
}

#[test]
fn distance_mul_reaches_far_value() {
    let s = standard();
    assert!(approx(distance_mul(1.0, &s), s.far_damage_mul));
    let mid = distance_mul(0.6, &s);
    assert!(mid < 1.0 && mid > s.far_damage_mul);
}

#[test]
fn close_boost_peaks_at_muzzle() {
    let s = standard();
    assert!(approx(close_boost(0.0, &s), s.close_boost_mul));
    assert_eq!(close_boost(s.close_boost_frac, &s), 1.0);
    assert_eq!(close_boost(0.5, &s), 1.0);
}

#[test]
fn standard_radial_fades_to_zero_at_edge() {
    assert_eq!(standard_radial_mul(5.0, 7.0, 34.0, 0.0), 1.0);
    assert!(approx(standard_radial_mul(20.5, 7.0, 34.0, 0.0), 0.5));
    assert_eq!(standard_radial_mul(34.0, 7.0, 34.0, 0.0), 0.0);
}

#[test]
fn standard_radial_jitter_stays_clamped() {
    assert_eq!(standard_radial_mul(8.0, 7.0, 34.0, 0.15), 1.0);
    assert_eq!(standard_radial_mul(34.0, 7.0, 34.0, 0.15), 0.0);
}

#[test]
fn punch_radial_keeps_part_at_edge() {
    let p = punch();
    assert_eq!(punch_radial_mul(p.core_radius, p.core_radius, 42.0, p.edge_fade), 1.0);
    assert!(approx(punch_radial_mul(42.0, p.core_radius, 42.0, p.edge_fade), 0.5));
}

#[test]
fn punch_beats_standard_near_fan_edge() {
    let s = standard();
    let p = punch();
    let sd = standard_radial_mul(30.0, s.core_radius, 34.0, 0.0);
    let pd = punch_radial_mul(30.0, s.core_radius, 34.0, p.edge_fade);
    assert!(pd > sd);
}

// ── BeamField ─────────────────────────────────────────────────────────────────

#[test]
fn tick_damage_is_share_of_total() {
    let s = standard();
    let beam = make_beam(BeamKind::Standard, &s);
    let field = BeamField::new(&beam, &s, 0.05);
    assert!(approx(field.tick_damage(), 4.0)); // 40 · 0.05 / 0.5
}

#[test]
fn target_on_axis_close_gets_boosted_damage() {
    let s = standard();
    let beam = make_beam(BeamKind::Standard, &s);
    let field = BeamField::new(&beam, &s, 0.05);
    let dmg = field.damage_with_jitter(0.0, 400.0, 10.0, 0.0);
    assert!(dmg > field.tick_damage());
}

#[test]
fn target_far_along_beam_takes_less() {
    let s = standard();
    let beam = make_beam(BeamKind::Standard, &s);
    let field = BeamField::new(&beam, &s, 0.05);
    let near = field.damage_with_jitter(0.0, 300.0, 10.0, 0.0);
    let far = field.damage_with_jitter(0.0, 500.0 - 0.9 * s.range, 10.0, 0.0);
    assert!(far > 0.0);
    assert!(far < near);
}

#[test]
fn target_behind_muzzle_untouched() {
    let s = standard();
    let beam = make_beam(BeamKind::Standard, &s);
    let field = BeamField::new(&beam, &s, 0.05);
    assert!(field.sample(0.0, 600.0, 10.0).is_none());
    assert_eq!(field.damage_with_jitter(0.0, 600.0, 10.0, 0.0), 0.0);
}

#[test]
fn target_off_axis_untouched() {
    let s = standard();
    let beam = make_beam(BeamKind::Standard, &s);
    let field = BeamField::new(&beam, &s, 0.05);
    let mut rng = seeded_rng();
    assert_eq!(field.damage_at(200.0, 400.0, 10.0, &mut rng), 0.0);
}

#[test]
fn big_target_reached_from_further_out() {
    let s = standard();
    let beam = make_beam(BeamKind::Standard, &s);
    let field = BeamField::new(&beam, &s, 0.05);
    assert!(field.sample(90.0, 300.0, 10.0).is_none());
    assert!(field.sample(90.0, 300.0, 60.0).is_some());
}

#[test]
fn fan_is_wider_at_muzzle() {
    let s = standard();
    let beam = make_beam(BeamKind::Standard, &s);
    let field = BeamField::new(&beam, &s, 0.05);
    let near = field.sample(0.0, 480.0, 0.0).map(|f| f.fan).unwrap_or(0.0);
    let far = field.sample(0.0, 500.0 - 0.9 * s.range, 0.0).map(|f| f.fan).unwrap_or(0.0);
    assert!(near > far);
    assert!(near <= s.edge_radius * s.fan_muzzle_mul + 1e-3);
}

#[test]
fn standard_damage_jitters_within_bounds() {
    let s = standard();
    let beam = make_beam(BeamKind::Standard, &s);
    let field = BeamField::new(&beam, &s, 0.05);
    let base = field.damage_with_jitter(25.0, 200.0, 0.0, 0.0);
    let lo = field.damage_with_jitter(25.0, 200.0, 0.0, -s.jitter);
    let hi = field.damage_with_jitter(25.0, 200.0, 0.0, s.jitter);
    let mut rng = seeded_rng();
    for _ in 0..20 {
        let d = field.damage_at(25.0, 200.0, 0.0, &mut rng);
        assert!(d >= lo - 1e-4 && d <= hi + 1e-4);
    }
    assert!(lo < base && base < hi);
}

#[test]
fn punch_damage_is_deterministic() {
    let p = punch();
    let beam = make_beam(BeamKind::Punch, &p);
    let field = BeamField::new(&beam, &p, 0.05);
    let mut a = seeded_rng();
    let mut b = StdRng::seed_from_u64(7);
    let da = field.damage_at(30.0, 350.0, 0.0, &mut a);
    let db = field.damage_at(30.0, 350.0, 0.0, &mut b);
    assert!(da > 0.0);
    assert_eq!(da, db);
}

#[test]
fn punch_beam_range_is_short() {
    let p = punch();
    let beam = make_beam(BeamKind::Punch, &p);
    let field = BeamField::new(&beam, &p, 0.05);
    assert!(field.sample(0.0, 500.0 - p.range - 40.0, 5.0).is_none());
}
