use crate::models::Tastiness;

// ─────────────────────────────────────────────────────────────────────────────
// Game rules
// ─────────────────────────────────────────────────────────────────────────────

/// Base skill points added after all multipliers.
pub const BASE_SKILL_POINTS: f64 = 12.0;

/// Calories per food required to qualify for variety bonus.
pub const VARIETY_CAL_THRESHOLD: f64 = 2000.0;

/// Asymptotic cap for the variety bonus, in percentage points.
pub const VARIETY_BONUS_CAP_PP: f64 = 55.0;

/// Reward fraction per satisfied craving.
pub const CRAVING_SATISFIED_FRAC: f64 = 0.10;

/// Scale applied to the taste bonus.
pub const TASTINESS_WEIGHT: f64 = 1.0;

/// Default server skill gain multiplier.
pub const DEFAULT_SERVER_MULT: f64 = 1.0;

/// Default dinner party multiplier.
pub const DEFAULT_DINNER_PARTY_MULT: f64 = 1.0;

// ─────────────────────────────────────────────────────────────────────────────
// Tuner-derived defaults (from hyperparameter optimization)
// ─────────────────────────────────────────────────────────────────────────────

/// Minimum calories per unit before penalty applies.
pub const LOW_CALORIE_THRESHOLD: f64 = 395.0;

/// Quadratic penalty strength for low-calorie foods.
pub const LOW_CALORIE_PENALTY_STRENGTH: f64 = 2.48;

/// Soft-variety ranking bias strength.
pub const SOFT_VARIETY_BIAS_STRENGTH: f64 = 3.61;

/// Tie-break window in SP for near-equal candidates.
pub const TIEBREAK_SCORE_WINDOW_SP: f64 = 0.449;

/// Proximity weight to variety threshold.
pub const PROXIMITY_APPROACH_WEIGHT: f64 = 0.977;

/// Small malus when overshooting the variety threshold.
pub const PROXIMITY_OVERSHOOT_PENALTY: f64 = 0.076;

// ─────────────────────────────────────────────────────────────────────────────
// Display thresholds and safety
// ─────────────────────────────────────────────────────────────────────────────

/// Minimum delta to display variety change.
pub const VARIETY_DELTA_THRESHOLD: f64 = 0.01;

/// Minimum delta to display taste change.
pub const TASTE_DELTA_THRESHOLD: f64 = 0.01;

/// Maximum iterations (bites) per planning loop.
pub const MAX_ITERATIONS: usize = 100;

/// Taste multiplier as a fraction (+0.20 means +20 pp before weighting).
///
/// Unknown ratings contribute nothing.
pub fn tastiness_multiplier(rating: Tastiness) -> f64 {
    match rating.value() {
        -3 => -0.30,
        -2 => -0.20,
        -1 => -0.10,
        1 => 0.10,
        2 => 0.20,
        3 => 0.30,
        _ => 0.0,
    }
}

/// Human-readable label for a rating.
pub fn tastiness_name(rating: Tastiness) -> &'static str {
    match rating.value() {
        -3 => "worst",
        -2 => "horrible",
        -1 => "bad",
        0 => "ok",
        1 => "good",
        2 => "delicious",
        3 => "favorite",
        _ => "unknown",
    }
}
