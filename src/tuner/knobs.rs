use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::PlannerConfig;
use crate::planner::constants::{
    LOW_CALORIE_PENALTY_STRENGTH, LOW_CALORIE_THRESHOLD, PROXIMITY_APPROACH_WEIGHT,
    PROXIMITY_OVERSHOOT_PENALTY, SOFT_VARIETY_BIAS_STRENGTH, TIEBREAK_SCORE_WINDOW_SP,
};

/// One tunable ranking coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Knob {
    SoftVarietyBias,
    TiebreakWindow,
    ProximityApproach,
    ProximityOvershoot,
    LowCalorieThreshold,
    LowCaloriePenalty,
}

impl Knob {
    pub const ALL: [Knob; 6] = [
        Knob::SoftVarietyBias,
        Knob::TiebreakWindow,
        Knob::ProximityApproach,
        Knob::ProximityOvershoot,
        Knob::LowCalorieThreshold,
        Knob::LowCaloriePenalty,
    ];

    /// Short label used in summaries and CSV headers.
    pub fn label(self) -> &'static str {
        match self {
            Knob::SoftVarietyBias => "svb",
            Knob::TiebreakWindow => "tw",
            Knob::ProximityApproach => "pa",
            Knob::ProximityOvershoot => "po",
            Knob::LowCalorieThreshold => "lct",
            Knob::LowCaloriePenalty => "lcp",
        }
    }
}

/// Values for the six ranking coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TunerKnobs {
    pub soft_variety_bias_strength: f64,
    pub tiebreak_score_window_sp: f64,
    pub proximity_approach_weight: f64,
    pub proximity_overshoot_penalty: f64,
    pub low_calorie_threshold: f64,
    pub low_calorie_penalty_strength: f64,
}

impl Default for TunerKnobs {
    fn default() -> Self {
        Self {
            soft_variety_bias_strength: SOFT_VARIETY_BIAS_STRENGTH,
            tiebreak_score_window_sp: TIEBREAK_SCORE_WINDOW_SP,
            proximity_approach_weight: PROXIMITY_APPROACH_WEIGHT,
            proximity_overshoot_penalty: PROXIMITY_OVERSHOOT_PENALTY,
            low_calorie_threshold: LOW_CALORIE_THRESHOLD,
            low_calorie_penalty_strength: LOW_CALORIE_PENALTY_STRENGTH,
        }
    }
}

impl TunerKnobs {
    pub fn get(&self, knob: Knob) -> f64 {
        match knob {
            Knob::SoftVarietyBias => self.soft_variety_bias_strength,
            Knob::TiebreakWindow => self.tiebreak_score_window_sp,
            Knob::ProximityApproach => self.proximity_approach_weight,
            Knob::ProximityOvershoot => self.proximity_overshoot_penalty,
            Knob::LowCalorieThreshold => self.low_calorie_threshold,
            Knob::LowCaloriePenalty => self.low_calorie_penalty_strength,
        }
    }

    fn slot(&mut self, knob: Knob) -> &mut f64 {
        match knob {
            Knob::SoftVarietyBias => &mut self.soft_variety_bias_strength,
            Knob::TiebreakWindow => &mut self.tiebreak_score_window_sp,
            Knob::ProximityApproach => &mut self.proximity_approach_weight,
            Knob::ProximityOvershoot => &mut self.proximity_overshoot_penalty,
            Knob::LowCalorieThreshold => &mut self.low_calorie_threshold,
            Knob::LowCaloriePenalty => &mut self.low_calorie_penalty_strength,
        }
    }

    /// Current knob values from a config.
    pub fn from_config(config: &PlannerConfig) -> Self {
        let a = &config.algorithm;
        Self {
            soft_variety_bias_strength: a.soft_variety_bias_strength,
            tiebreak_score_window_sp: a.tiebreak_score_window_sp,
            proximity_approach_weight: a.proximity_approach_weight,
            proximity_overshoot_penalty: a.proximity_overshoot_penalty,
            low_calorie_threshold: a.low_calorie_threshold,
            low_calorie_penalty_strength: a.low_calorie_penalty_strength,
        }
    }

    /// A copy of `base` with these knob values. `base` is left untouched.
    pub fn apply_to(&self, base: &PlannerConfig) -> PlannerConfig {
        let mut config = base.clone();
        let a = &mut config.algorithm;
        a.soft_variety_bias_strength = self.soft_variety_bias_strength;
        a.tiebreak_score_window_sp = self.tiebreak_score_window_sp;
        a.proximity_approach_weight = self.proximity_approach_weight;
        a.proximity_overshoot_penalty = self.proximity_overshoot_penalty;
        a.low_calorie_threshold = self.low_calorie_threshold;
        a.low_calorie_penalty_strength = self.low_calorie_penalty_strength;
        config
    }

    /// Generate random knobs within the given ranges.
    pub fn random(rng: &mut impl Rng, ranges: &KnobRanges) -> Self {
        let mut knobs = Self::default();
        for knob in Knob::ALL {
            let (lo, hi) = ranges.get(knob);
            *knobs.slot(knob) = if hi > lo { rng.gen_range(lo..=hi) } else { lo };
        }
        knobs
    }

    /// Copy with one knob multiplied by `factor`, clamped to its range.
    pub fn perturb(&self, knob: Knob, factor: f64, ranges: &KnobRanges) -> Self {
        let mut new = self.clone();
        let (lo, hi) = ranges.get(knob);
        *new.slot(knob) = (self.get(knob) * factor).clamp(lo, hi);
        new
    }

    /// Format knobs as a compact string for display.
    pub fn display(&self) -> String {
        Knob::ALL
            .iter()
            .map(|k| format!("{}={:.3}", k.label(), self.get(*k)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Inclusive (min, max) search range per knob.
#[derive(Debug, Clone, PartialEq)]
pub struct KnobRanges {
    pub soft_variety_bias_strength: (f64, f64),
    pub tiebreak_score_window_sp: (f64, f64),
    pub proximity_approach_weight: (f64, f64),
    pub proximity_overshoot_penalty: (f64, f64),
    pub low_calorie_threshold: (f64, f64),
    pub low_calorie_penalty_strength: (f64, f64),
}

impl KnobRanges {
    pub fn get(&self, knob: Knob) -> (f64, f64) {
        match knob {
            Knob::SoftVarietyBias => self.soft_variety_bias_strength,
            Knob::TiebreakWindow => self.tiebreak_score_window_sp,
            Knob::ProximityApproach => self.proximity_approach_weight,
            Knob::ProximityOvershoot => self.proximity_overshoot_penalty,
            Knob::LowCalorieThreshold => self.low_calorie_threshold,
            Knob::LowCaloriePenalty => self.low_calorie_penalty_strength,
        }
    }
}

impl Default for KnobRanges {
    fn default() -> Self {
        Self {
            soft_variety_bias_strength: (0.0, 6.0),
            tiebreak_score_window_sp: (0.1, 1.0),
            proximity_approach_weight: (0.0, 1.0),
            proximity_overshoot_penalty: (0.0, 0.2),
            low_calorie_threshold: (200.0, 500.0),
            low_calorie_penalty_strength: (0.0, 4.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_knobs_match_config_defaults() {
        assert_eq!(
            TunerKnobs::default(),
            TunerKnobs::from_config(&PlannerConfig::default())
        );
    }

    #[test]
    fn test_random_knobs_within_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let ranges = KnobRanges::default();

        for _ in 0..20 {
            let knobs = TunerKnobs::random(&mut rng, &ranges);
            for knob in Knob::ALL {
                let (lo, hi) = ranges.get(knob);
                let value = knobs.get(knob);
                assert!(value >= lo && value <= hi, "{:?} = {}", knob, value);
            }
        }
    }

    #[test]
    fn test_perturb_modifies_single_knob() {
        let knobs = TunerKnobs::default();
        let ranges = KnobRanges::default();

        let perturbed = knobs.perturb(Knob::LowCalorieThreshold, 0.9, &ranges);
        assert!((perturbed.low_calorie_threshold - 355.5).abs() < 1e-9);
        for knob in Knob::ALL {
            if knob != Knob::LowCalorieThreshold {
                assert_eq!(perturbed.get(knob), knobs.get(knob));
            }
        }
    }

    #[test]
    fn test_perturb_clamps_to_range() {
        let knobs = TunerKnobs {
            soft_variety_bias_strength: 5.5,
            ..TunerKnobs::default()
        };
        let perturbed = knobs.perturb(Knob::SoftVarietyBias, 1.2, &KnobRanges::default());
        assert_eq!(perturbed.soft_variety_bias_strength, 6.0);
    }

    #[test]
    fn test_apply_to_leaves_base_untouched() {
        let base = PlannerConfig::default();
        let knobs = TunerKnobs {
            tiebreak_score_window_sp: 0.9,
            ..TunerKnobs::default()
        };

        let trial = knobs.apply_to(&base);
        assert_eq!(trial.algorithm.tiebreak_score_window_sp, 0.9);
        assert_eq!(
            base.algorithm.tiebreak_score_window_sp,
            TIEBREAK_SCORE_WINDOW_SP
        );
        assert_eq!(trial.game_rules, base.game_rules);
    }
}
