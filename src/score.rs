//! End-of-run scoring.

/// Why a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndReason {
    /// The death animation finished.
    Destroyed,
    /// The player stood off safe ground.
    Fell,
    /// Ended from outside (restart or quit).
    Abandoned,
}

impl EndReason {
    pub fn message(self) -> &'static str {
        match self {
            EndReason::Destroyed => "Your bot exploded!",
            EndReason::Fell => "You fell!",
            EndReason::Abandoned => "Run abandoned.",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub reason: EndReason,
    pub score: u32,
    /// Tier flavor text.
    pub message: &'static str,
    pub distance: u32,
    pub enemies: u32,
    pub collateral: u32,
}

// ── Score formula ─────────────────────────────────────────────────────────────

const DISTANCE_WEIGHT: f64 = 0.55;
const ENEMY_POINTS: f64 = 160.0;
const COLLATERAL_PENALTY: f64 = 120.0;

/// `max(0, round(distance·0.55 + enemies·160 − collateral·120))`.
pub fn score(distance: u32, enemies: u32, collateral: u32) -> u32 {
    let raw = distance as f64 * DISTANCE_WEIGHT + enemies as f64 * ENEMY_POINTS
        - collateral as f64 * COLLATERAL_PENALTY;
    raw.round().max(0.0) as u32
}

pub fn tier_message(score: u32) -> &'static str {
    match score {
        2600.. => "Legendary run. Clinical execution.",
        1600.. => "Excellent operation. Precision under pressure.",
        800.. => "Clean run. Efficient and controlled.",
        _ => "Rough outing. Keep moving and limit collateral.",
    }
}

/// Score a finished run.  Distance is truncated to whole pixels.
pub fn evaluate_run(reason: EndReason, dist: f32, enemies: u32, collateral: u32) -> RunSummary {
    let distance = dist.max(0.0) as u32;
    let score = score(distance, enemies, collateral);
    RunSummary {
        reason,
        score,
        message: tier_message(score),
        distance,
        enemies,
        collateral,
    }
}
