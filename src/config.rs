//! Tunable parameter set.
//!
//! Every coefficient used by the reward calculator and the bite planner lives
//! here. A YAML file may override any subset of keys; missing keys keep their
//! defaults. The value is validated once and then passed explicitly to the
//! planner, never stored globally.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EcoError, Result};
use crate::planner::constants::*;

/// Ranking and scoring coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlgorithmConfig {
    pub soft_variety_bias_strength: f64,
    pub tiebreak_score_window_sp: f64,
    pub proximity_approach_weight: f64,
    pub proximity_overshoot_penalty: f64,
    pub low_calorie_threshold: f64,
    pub low_calorie_penalty_strength: f64,
    pub variety_bonus_cap_pp: f64,
    pub tastiness_weight: f64,
}

impl Default for AlgorithmConfig {
    fn default() -> Self {
        Self {
            soft_variety_bias_strength: SOFT_VARIETY_BIAS_STRENGTH,
            tiebreak_score_window_sp: TIEBREAK_SCORE_WINDOW_SP,
            proximity_approach_weight: PROXIMITY_APPROACH_WEIGHT,
            proximity_overshoot_penalty: PROXIMITY_OVERSHOOT_PENALTY,
            low_calorie_threshold: LOW_CALORIE_THRESHOLD,
            low_calorie_penalty_strength: LOW_CALORIE_PENALTY_STRENGTH,
            variety_bonus_cap_pp: VARIETY_BONUS_CAP_PP,
            tastiness_weight: TASTINESS_WEIGHT,
        }
    }
}

/// Game mechanics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRulesConfig {
    pub variety_cal_threshold: f64,
    pub craving_satisfied_frac: f64,
}

impl Default for GameRulesConfig {
    fn default() -> Self {
        Self {
            variety_cal_threshold: VARIETY_CAL_THRESHOLD,
            craving_satisfied_frac: CRAVING_SATISFIED_FRAC,
        }
    }
}

/// Loop bounds and the base reward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    pub max_iterations: usize,
    pub base_skill_points: f64,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            max_iterations: MAX_ITERATIONS,
            base_skill_points: BASE_SKILL_POINTS,
        }
    }
}

/// Rendering noise floors (pp).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub variety_delta_threshold: f64,
    pub tastiness_delta_threshold: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            variety_delta_threshold: VARIETY_DELTA_THRESHOLD,
            tastiness_delta_threshold: TASTE_DELTA_THRESHOLD,
        }
    }
}

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub algorithm: AlgorithmConfig,
    pub game_rules: GameRulesConfig,
    pub safety: SafetyConfig,
    pub display: DisplayConfig,
}

impl PlannerConfig {
    /// Load and validate a config.
    ///
    /// `None` yields the defaults. A given path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            None => Self::default(),
            Some(path) => {
                if !path.exists() {
                    return Err(EcoError::InvalidInput(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                let content = fs::read_to_string(path)?;
                Self::from_yaml_str(&content)?
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML without validating. An empty document yields defaults.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Collect every rule violation; `Ok` only when there are none.
    pub fn validate(&self) -> Result<()> {
        let errors = self.violations();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(EcoError::InvalidConfig(errors))
        }
    }

    fn violations(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let a = &self.algorithm;
        let g = &self.game_rules;
        let s = &self.safety;

        let non_negative = [
            ("algorithm.soft_variety_bias_strength", a.soft_variety_bias_strength),
            ("algorithm.tiebreak_score_window_sp", a.tiebreak_score_window_sp),
            ("algorithm.proximity_approach_weight", a.proximity_approach_weight),
            ("algorithm.proximity_overshoot_penalty", a.proximity_overshoot_penalty),
            ("algorithm.low_calorie_threshold", a.low_calorie_threshold),
            ("algorithm.low_calorie_penalty_strength", a.low_calorie_penalty_strength),
            ("algorithm.tastiness_weight", a.tastiness_weight),
            ("safety.base_skill_points", s.base_skill_points),
            ("display.variety_delta_threshold", self.display.variety_delta_threshold),
            ("display.tastiness_delta_threshold", self.display.tastiness_delta_threshold),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                errors.push(format!("{name} must be >= 0"));
            }
        }

        if !a.variety_bonus_cap_pp.is_finite() || a.variety_bonus_cap_pp <= 0.0 {
            errors.push("algorithm.variety_bonus_cap_pp must be > 0".to_string());
        }
        if !g.variety_cal_threshold.is_finite() || g.variety_cal_threshold <= 0.0 {
            errors.push("game_rules.variety_cal_threshold must be > 0".to_string());
        }
        if !(0.0..=1.0).contains(&g.craving_satisfied_frac) {
            errors.push("game_rules.craving_satisfied_frac must be in [0, 1]".to_string());
        }
        if s.max_iterations < 1 {
            errors.push("safety.max_iterations must be >= 1".to_string());
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        let config = PlannerConfig::load(None).unwrap();
        assert_eq!(config, PlannerConfig::default());
        assert_eq!(config.safety.max_iterations, 100);
        assert_eq!(config.game_rules.variety_cal_threshold, 2000.0);
    }

    #[test]
    fn test_shipped_yaml_matches_defaults() {
        let config = PlannerConfig::from_yaml_str(include_str!("../config.default.yml")).unwrap();
        assert_eq!(config, PlannerConfig::default());
    }

    #[test]
    fn test_partial_yaml_overrides_only_given_keys() {
        let yaml = "algorithm:\n  tiebreak_score_window_sp: 0.9\nsafety:\n  max_iterations: 7\n";
        let config = PlannerConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.algorithm.tiebreak_score_window_sp, 0.9);
        assert_eq!(config.safety.max_iterations, 7);
        assert_eq!(config.algorithm.variety_bonus_cap_pp, VARIETY_BONUS_CAP_PP);
        assert_eq!(config.game_rules, GameRulesConfig::default());
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let mut config = PlannerConfig::default();
        config.game_rules.craving_satisfied_frac = 1.5;
        config.algorithm.low_calorie_threshold = -1.0;
        config.safety.max_iterations = 0;

        match config.validate() {
            Err(EcoError::InvalidConfig(errors)) => {
                assert_eq!(errors.len(), 3);
                assert!(errors.iter().any(|e| e.contains("craving_satisfied_frac")));
                assert!(errors.iter().any(|e| e.contains("low_calorie_threshold")));
                assert!(errors.iter().any(|e| e.contains("max_iterations")));
            }
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn test_load_from_file_validates() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"game_rules:\n  variety_cal_threshold: 0\n")
            .unwrap();
        assert!(matches!(
            PlannerConfig::load(Some(file.path())),
            Err(EcoError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = PlannerConfig::load(Some(Path::new("/nonexistent/config.yml")));
        assert!(result.is_err());
    }
}
