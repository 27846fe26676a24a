use std::path::Path;

use walker_shooter::config::*;
use walker_shooter::entities::WeaponKind;

// ── defaults ──────────────────────────────────────────────────────────────────

#[test]
fn default_table_values() {
    let t = Tuning::default();
    assert_eq!((t.canvas_w, t.canvas_h), (768.0, 1024.0));
    assert_eq!(t.scroll_px_per_sec, 60.0);
    assert_eq!(t.player.hp, 120.0);
    assert_eq!(t.player.start_left, Some(WeaponKind::Chaingun));
    assert_eq!(t.player.start_right, Some(WeaponKind::Cannon));
}

#[test]
fn span_sampling_stays_in_range() {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    let mut rng = StdRng::seed_from_u64(42);
    let s = Span::new(2.0, 3.0);
    for _ in 0..50 {
        let v = s.sample(&mut rng);
        assert!((2.0..3.0).contains(&v));
    }
    assert_eq!(Span::new(5.0, 1.0).sample(&mut rng), 5.0);
    assert_eq!(Span::new(1.0, 2.0).scaled_down(2.0), Span::new(0.5, 1.0));
    assert_eq!(Span::new(1.0, 2.0).scaled_down(0.0), Span::new(1.0, 2.0));
}

// ── RON overrides ─────────────────────────────────────────────────────────────

#[test]
fn partial_override_keeps_defaults() {
    let t = Tuning::from_ron("(scroll_px_per_sec: 90.0, player: (hp: 200.0))").unwrap();
    assert_eq!(t.scroll_px_per_sec, 90.0);
    assert_eq!(t.player.hp, 200.0);
    assert_eq!(t.player.move_px_per_sec, 100.0);
    assert_eq!(t.canvas_w, 768.0);
}

#[test]
fn bad_ron_is_an_error() {
    assert!(Tuning::from_ron("(scroll_px_per_sec: \"fast\")").is_err());
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let t = Tuning::load_or_default(Path::new("/nonexistent/walker_shooter.ron"));
    assert_eq!(t.player.hp, 120.0);
}

#[test]
fn load_reports_missing_file() {
    match Tuning::load(Path::new("/nonexistent/walker_shooter.ron")) {
        Err(ConfigError::Io { .. }) => {}
        other => panic!("expected io error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn boss_interval_floor() {
    let mut t = Tuning::default();
    t.boss.interval_dist = 0.0;
    assert_eq!(t.boss_interval(), 1.0);
}
