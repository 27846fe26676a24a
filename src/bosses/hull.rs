//! Float-hull generation.
//!
//! [`generate_float_boss`] is a pure function of its random source, level,
//! modifiers and tuning: the same seed always yields the same hull.

use rand::Rng;

use crate::config::{EncounterMods, Span, Tuning};
use crate::entities::{Deco, DecoShape, FloatBoss, Mount, MountClass, TurretType};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl Edge {
    const ALL: [Edge; 4] = [Edge::Left, Edge::Right, Edge::Top, Edge::Bottom];
}

/// Fraction of a `pw`×`ph` piece centred at (ox, oy) that lies on a
/// `hull_w`×`hull_h` hull centred at the origin.
pub fn overlap_fraction(hull_w: f32, hull_h: f32, ox: f32, oy: f32, pw: f32, ph: f32) -> f32 {
    let area = pw * ph;
    if area <= 0.0 {
        return 1.0;
    }
    let ix = ((ox + pw / 2.0).min(hull_w / 2.0) - (ox - pw / 2.0).max(-hull_w / 2.0)).max(0.0);
    let iy = ((oy + ph / 2.0).min(hull_h / 2.0) - (oy - ph / 2.0).max(-hull_h / 2.0)).max(0.0);
    (ix * iy) / area
}

fn spread(rng: &mut impl Rng, half: f32) -> f32 {
    if half > 0.0 {
        rng.gen_range(-half..=half)
    } else {
        0.0
    }
}

/// Anywhere fully inside the hull (centred when the piece is too big).
pub fn place_inside(rng: &mut impl Rng, hull: (f32, f32), piece: (f32, f32)) -> (f32, f32) {
    let half_x = ((hull.0 - piece.0) / 2.0).max(0.0);
    let half_y = ((hull.1 - piece.1) / 2.0).max(0.0);
    (spread(rng, half_x), spread(rng, half_y))
}

/// Straddling `edge`, with at least `min_overlap` of the piece on the hull.
pub fn place_overhang(
    rng: &mut impl Rng,
    hull: (f32, f32),
    piece: (f32, f32),
    edge: Edge,
    min_overlap: f32,
) -> (f32, f32) {
    let lo = min_overlap.clamp(0.0, 1.0);
    let f = if lo < 1.0 { rng.gen_range(lo..=1.0) } else { 1.0 };
    let (hw, hh) = (hull.0 / 2.0, hull.1 / 2.0);
    let (pw, ph) = piece;
    let half_x = ((hull.0 - pw) / 2.0).max(0.0);
    let half_y = ((hull.1 - ph) / 2.0).max(0.0);
    // Covered span along the crossing axis is f·size (capped at the hull).
    match edge {
        Edge::Left => (-hw - pw / 2.0 + (pw * f).min(hull.0), spread(rng, half_y)),
        Edge::Right => (hw + pw / 2.0 - (pw * f).min(hull.0), spread(rng, half_y)),
        Edge::Top => (spread(rng, half_x), -hh - ph / 2.0 + (ph * f).min(hull.1)),
        Edge::Bottom => (spread(rng, half_x), hh + ph / 2.0 - (ph * f).min(hull.1)),
    }
}

/// Inside the hull, or (with `overhang_chance`) over a random edge.
pub fn place_piece(
    rng: &mut impl Rng,
    hull: (f32, f32),
    piece: (f32, f32),
    overhang_chance: f32,
    min_overlap: f32,
) -> (f32, f32) {
    if rng.gen::<f32>() < overhang_chance {
        let edge = Edge::ALL[rng.gen_range(0..Edge::ALL.len())];
        place_overhang(rng, hull, piece, edge, min_overlap)
    } else {
        place_inside(rng, hull, piece)
    }
}

fn build_mount(
    rng: &mut impl Rng,
    tuning: &Tuning,
    level: u32,
    mods: &EncounterMods,
    large: bool,
    hull: (f32, f32),
) -> Mount {
    let fs = &tuning.boss.float;
    let lv = level as f32;
    let td = tuning
        .turrets
        .spec(if large { TurretType::Large } else { TurretType::Small });
    let level_boost = (1.0 - lv * fs.cooldown_level_reduce).max(0.65);
    let rate = if mods.fire_rate_mul > 0.0 { mods.fire_rate_mul } else { 1.0 };
    let fire_min = (td.fire_cooldown.min * level_boost / rate).max(0.12);
    let fire_max = (td.fire_cooldown.max * level_boost / rate).max(fire_min + 0.04);
    let base_size: f32 = if large { rng.gen_range(8.0..11.5) } else { rng.gen_range(5.0..7.2) };
    let size = base_size * mods.size_mul;
    let (speed_step, dmg_step) = if large { (0.012, 0.09) } else { (0.008, 0.06) };
    let (ox, oy) = place_piece(
        rng,
        hull,
        (size * 2.0, size * 2.0),
        fs.mount_overhang_chance,
        fs.mount_min_overlap,
    );
    let fire_cooldown = Span::new(fire_min, fire_max);
    Mount {
        class: if large { MountClass::Large } else { MountClass::Small },
        ox,
        oy,
        size,
        bullet_r: td.bullet_r.max(2.6),
        bullet_speed: (td.bullet_speed * (1.0 + lv * speed_step)).max(90.0) * mods.projectile_speed_mul,
        bullet_damage: (td.bullet_damage * (1.0 + lv * dmg_step)).max(4.0) * mods.damage_mul,
        cool: fire_cooldown.sample(rng),
        fire_cooldown,
        alive: true,
    }
}

fn build_deco(rng: &mut impl Rng, tuning: &Tuning, hull: (f32, f32)) -> Deco {
    let fs = &tuning.boss.float;
    let roll: f32 = rng.gen();
    let shape = if roll < 0.35 {
        DecoShape::Rect { w: rng.gen_range(6.0..22.0), h: rng.gen_range(4.0..16.0) }
    } else if roll < 0.7 {
        DecoShape::Antenna { len: rng.gen_range(10.0..28.0) }
    } else if roll < 0.88 {
        DecoShape::Pod { r: rng.gen_range(3.0..8.0) }
    } else {
        DecoShape::Slot { w: rng.gen_range(4.0..12.0), h: rng.gen_range(2.0..4.0) }
    };
    let footprint = shape.footprint();
    let (ox, oy) = match shape {
        // Antennas always stick out of the top edge.
        DecoShape::Antenna { .. } => place_overhang(rng, hull, footprint, Edge::Top, fs.deco_min_overlap),
        _ => place_piece(rng, hull, footprint, fs.deco_overhang_chance, fs.deco_min_overlap),
    };
    Deco { ox, oy, shape }
}

/// Build a float boss for `level` centred horizontally on a `screen_w`-wide
/// surface.  With `from_top` it starts above the screen in its entry descent.
pub fn generate_float_boss(
    rng: &mut impl Rng,
    tuning: &Tuning,
    level: u32,
    mods: &EncounterMods,
    screen_w: f32,
    screen_h: f32,
    from_top: bool,
) -> FloatBoss {
    let fs = &tuning.boss.float;
    let level = level.max(1);
    let lv = level as f32;
    let w = fs.width.sample(rng) * mods.size_mul;
    let h = fs.height.sample(rng) * mods.size_mul;
    let hp = ((fs.hp_base + lv * fs.hp_per_level) * mods.hp_mul).round().max(1.0);
    let x = screen_w * 0.5;
    let stop_y = screen_h * fs.stop_y_frac;
    let y = if from_top { -h - fs.entry_gap } else { stop_y };

    let mount_count = ((fs.mounts.sample(rng) as f32 * mods.mount_mul).round() as usize).max(1);
    let large_chance = (fs.large_mount_chance + mods.large_mount_bonus).clamp(0.0, 1.0);
    let deco_count = fs.deco.sample(rng) as usize;
    let hover_x = fs.hover_x.sample(rng);
    let hover_y = fs.hover_y.sample(rng);
    let hover_speed = fs.hover_speed.sample(rng) * mods.hover_speed_mul;

    let hull = (w, h);
    let mounts = (0..mount_count)
        .map(|_| {
            let large = rng.gen::<f32>() < large_chance;
            build_mount(rng, tuning, level, mods, large, hull)
        })
        .collect();
    let deco = (0..deco_count).map(|_| build_deco(rng, tuning, hull)).collect();

    FloatBoss {
        level,
        x,
        y,
        base_x: x,
        base_y: stop_y,
        stop_y,
        entering: from_top,
        w,
        h,
        hp,
        max_hp: hp,
        t: 0.0,
        hover_x,
        hover_y,
        hover_speed,
        mounts,
        deco,
        mount_pop_t: 0.0,
        bullet_life: tuning.turrets.bullet_life,
    }
}
