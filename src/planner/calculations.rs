use std::collections::BTreeSet;

use crate::config::PlannerConfig;
use crate::models::{Food, FoodKey, Stomach};
use crate::planner::constants::{
    tastiness_multiplier, DEFAULT_DINNER_PARTY_MULT, DEFAULT_SERVER_MULT,
};

/// Nutrient density breakdown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NutrientDensity {
    pub carbs: f64,
    pub protein: f64,
    pub fats: f64,
    pub vitamins: f64,
}

impl NutrientDensity {
    /// Sum of all nutrient densities.
    pub fn sum(&self) -> f64 {
        self.carbs + self.protein + self.fats + self.vitamins
    }

    /// Values in fixed order: carbs, protein, fats, vitamins.
    pub fn values(&self) -> [f64; 4] {
        [self.carbs, self.protein, self.fats, self.vitamins]
    }
}

/// Session-wide multipliers applied on top of the nutrition formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpMultipliers {
    pub server_mult: f64,
    pub dinner_party_mult: f64,
}

impl Default for SpMultipliers {
    fn default() -> Self {
        Self {
            server_mult: DEFAULT_SERVER_MULT,
            dinner_party_mult: DEFAULT_DINNER_PARTY_MULT,
        }
    }
}

/// Calorie-weighted nutrient density of a stomach.
///
/// Each food contributes its per-unit nutrients weighted by its share of
/// total calories. Returns (density, total_calories); all zero when the
/// stomach holds no calories.
pub fn sum_all_weighted_nutrients(stomach: &Stomach<'_>) -> (NutrientDensity, f64) {
    let total_cal = stomach.total_calories();
    if total_cal == 0.0 {
        return (NutrientDensity::default(), 0.0);
    }

    let mut density = NutrientDensity::default();
    for (food, qty) in stomach.iter() {
        let weight = (food.calories() * f64::from(qty)) / total_cal;
        density.carbs += food.carbs() * weight;
        density.protein += food.protein() * weight;
        density.fats += food.fats() * weight;
        density.vitamins += food.vitamins() * weight;
    }

    (density, total_cal)
}

/// `min / max` over the nutrient values; 0 when the maximum is not positive.
///
/// A single zero nutrient collapses the ratio to 0.
pub fn balance_ratio(nutrients: &[f64]) -> f64 {
    let max_val = nutrients.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max_val <= 0.0 {
        return 0.0;
    }
    let min_val = nutrients.iter().copied().fold(f64::INFINITY, f64::min);
    min_val / max_val
}

/// Balance bonus in `[-50, +50]` percentage points.
pub fn balance_bonus(nutrients: &[f64]) -> f64 {
    balance_ratio(nutrients) * 100.0 - 50.0
}

/// Balance ratio of a whole stomach.
pub fn stomach_balance_ratio(stomach: &Stomach<'_>) -> f64 {
    let (density, _) = sum_all_weighted_nutrients(stomach);
    balance_ratio(&density.values())
}

/// Component view of one SP evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct SpBreakdown {
    pub density: NutrientDensity,
    pub balance_pp: f64,
    pub variety_count: usize,
    pub variety_pp: f64,
    pub taste_pp: f64,
    pub craving_pp: f64,
    pub total_sp: f64,
}

/// Pure reward functions bound to one parameter set.
#[derive(Debug, Clone, Copy)]
pub struct RewardCalculator<'c> {
    config: &'c PlannerConfig,
}

impl<'c> RewardCalculator<'c> {
    pub fn new(config: &'c PlannerConfig) -> Self {
        Self { config }
    }

    /// Variety bonus (pp) for a qualifying count, hard or fractional.
    ///
    /// Each +20 qualifying foods halves the remaining gap to the cap.
    pub fn variety_bonus(&self, qualifying_count: f64) -> f64 {
        let cap = self.config.algorithm.variety_bonus_cap_pp;
        cap * (1.0 - 0.5_f64.powf(qualifying_count / 20.0))
    }

    /// Calorie-weighted taste bonus (pp), scaled by the taste weight.
    pub fn taste_bonus(&self, stomach: &Stomach<'_>) -> f64 {
        let total_cal = stomach.total_calories();
        if total_cal <= 0.0 {
            return 0.0;
        }

        let weighted_taste: f64 = stomach
            .iter()
            .map(|(food, qty)| {
                tastiness_multiplier(food.tastiness()) * food.calories() * f64::from(qty)
            })
            .sum();

        (weighted_taste / total_cal) * 100.0 * self.config.algorithm.tastiness_weight
    }

    /// Whether `quantity` units of a food alone meet the variety threshold.
    pub fn is_variety_qualifying(&self, food: &Food, quantity: u32) -> bool {
        food.calories() * f64::from(quantity) >= self.config.game_rules.variety_cal_threshold
    }

    /// Fractional progress of one food toward the variety threshold, in `[0, 1]`.
    pub fn variety_fraction(&self, food: &Food, quantity: u32) -> f64 {
        if quantity == 0 {
            return 0.0;
        }
        (food.calories() * f64::from(quantity) / self.config.game_rules.variety_cal_threshold)
            .min(1.0)
    }

    /// Names of foods that individually meet the variety threshold.
    pub fn qualifying_names(&self, stomach: &Stomach<'_>) -> BTreeSet<FoodKey> {
        stomach
            .iter()
            .filter(|(food, qty)| self.is_variety_qualifying(food, *qty))
            .map(|(food, _)| food.key().clone())
            .collect()
    }

    /// Count of foods that individually meet the variety threshold.
    pub fn variety_count(&self, stomach: &Stomach<'_>) -> usize {
        stomach
            .iter()
            .filter(|(food, qty)| self.is_variety_qualifying(food, *qty))
            .count()
    }

    /// Sum of fractional variety contributions.
    pub fn soft_variety_count(&self, stomach: &Stomach<'_>) -> f64 {
        stomach
            .iter()
            .map(|(food, qty)| self.variety_fraction(food, qty))
            .sum()
    }

    /// Combined bonus in percentage points: balance + variety + taste.
    ///
    /// Cravings do not enter here; they only count through the satisfied
    /// fraction in [`Self::sp`].
    pub fn nutrition_multiplier(
        &self,
        stomach: &Stomach<'_>,
        _cravings: &[String],
        variety_reference: &BTreeSet<FoodKey>,
    ) -> f64 {
        let (density, _) = sum_all_weighted_nutrients(stomach);
        let balance_pp = balance_bonus(&density.values());
        let variety_pp = self.variety_bonus(variety_reference.len() as f64);
        let taste_pp = self.taste_bonus(stomach);

        balance_pp + variety_pp + taste_pp
    }

    /// Total SP for a stomach.
    ///
    /// Formula: (density_sum * (1 + bonus) * dinner_party + base) * server
    pub fn sp(
        &self,
        stomach: &Stomach<'_>,
        cravings: &[String],
        cravings_satisfied: u32,
        variety_reference: &BTreeSet<FoodKey>,
        multipliers: SpMultipliers,
    ) -> f64 {
        let (density, _) = sum_all_weighted_nutrients(stomach);
        let density_sum = density.sum();

        let mut bonus = self.nutrition_multiplier(stomach, cravings, variety_reference) / 100.0;
        bonus += f64::from(cravings_satisfied) * self.config.game_rules.craving_satisfied_frac;

        let nutrition_sp = density_sum * (1.0 + bonus) * multipliers.dinner_party_mult;
        (nutrition_sp + self.config.safety.base_skill_points) * multipliers.server_mult
    }

    /// SP of a stomach using its own qualifying set.
    pub fn current_sp(
        &self,
        stomach: &Stomach<'_>,
        cravings: &[String],
        cravings_satisfied: u32,
        multipliers: SpMultipliers,
    ) -> f64 {
        let reference = self.qualifying_names(stomach);
        self.sp(stomach, cravings, cravings_satisfied, &reference, multipliers)
    }

    /// Change in SP from adding one unit of `food`.
    ///
    /// The qualifying set is derived separately for the before and after
    /// stomachs.
    pub fn sp_delta(
        &self,
        food: &Food,
        stomach: &Stomach<'_>,
        cravings: &[String],
        cravings_satisfied: u32,
    ) -> f64 {
        let after = stomach.with_added(food);
        let multipliers = SpMultipliers::default();

        self.current_sp(&after, cravings, cravings_satisfied, multipliers)
            - self.current_sp(stomach, cravings, cravings_satisfied, multipliers)
    }

    /// Change in taste bonus (pp) from adding one unit of `food`.
    pub fn taste_delta_for_added_unit(&self, stomach: &Stomach<'_>, food: &Food) -> f64 {
        self.taste_bonus(&stomach.with_added(food)) - self.taste_bonus(stomach)
    }

    /// Itemised SP for a stomach.
    ///
    /// `extra_variety` counts qualifying foods eaten earlier that are not
    /// part of `stomach`.
    pub fn breakdown(
        &self,
        stomach: &Stomach<'_>,
        cravings_satisfied: u32,
        extra_variety: usize,
        multipliers: SpMultipliers,
    ) -> SpBreakdown {
        let (density, _) = sum_all_weighted_nutrients(stomach);
        let variety_count = self.variety_count(stomach) + extra_variety;

        let balance_pp = balance_bonus(&density.values());
        let variety_pp = self.variety_bonus(variety_count as f64);
        let taste_pp = self.taste_bonus(stomach);
        let craving_pp =
            f64::from(cravings_satisfied) * self.config.game_rules.craving_satisfied_frac * 100.0;

        let bonus = (balance_pp + variety_pp + taste_pp + craving_pp) / 100.0;
        let nutrition_sp = density.sum() * (1.0 + bonus) * multipliers.dinner_party_mult;
        let total_sp =
            (nutrition_sp + self.config.safety.base_skill_points) * multipliers.server_mult;

        SpBreakdown {
            density,
            balance_pp,
            variety_count,
            variety_pp,
            taste_pp,
            craving_pp,
            total_sp,
        }
    }
}
