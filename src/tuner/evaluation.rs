use std::cmp::Ordering;

use crate::config::PlannerConfig;
use crate::models::Food;
use crate::planner::{stomach_balance_ratio, BitePlanner, SpMultipliers};
use crate::state::FoodStateManager;
use crate::tuner::knobs::TunerKnobs;

/// Units of every food on hand during a trial.
pub const TRIAL_AVAILABILITY: u32 = 999;

/// Result of evaluating a single budget.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetResult {
    pub budget: i64,
    pub final_sp: f64,
    pub total_calories: f64,
    pub variety_count: usize,
    pub balance_ratio: f64,
    pub bites: usize,
}

impl BudgetResult {
    /// SP per 100 kcal consumed.
    pub fn sp_per_100kcal(&self) -> f64 {
        if self.total_calories > 0.0 {
            (self.final_sp / self.total_calories) * 100.0
        } else {
            0.0
        }
    }
}

/// Knobs scored across several budgets.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationResult {
    pub knobs: TunerKnobs,
    pub avg_final_sp: f64,
    pub avg_sp_per_100kcal: f64,
    pub avg_variety_count: f64,
    pub avg_balance_ratio: f64,
    pub per_budget: Vec<BudgetResult>,
}

impl EvaluationResult {
    fn metrics(&self) -> [f64; 4] {
        [
            self.avg_final_sp,
            self.avg_sp_per_100kcal,
            self.avg_variety_count,
            self.avg_balance_ratio,
        ]
    }

    /// Lexicographic on (final SP, SP/100 kcal, variety, balance); higher wins.
    pub fn cmp_score(&self, other: &Self) -> Ordering {
        self.metrics()
            .iter()
            .zip(other.metrics().iter())
            .map(|(a, b)| a.partial_cmp(b).unwrap_or(Ordering::Equal))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }

    /// True when `other` is at least as good on every metric and strictly
    /// better on one.
    pub fn is_dominated_by(&self, other: &Self) -> bool {
        let mine = self.metrics();
        let theirs = other.metrics();
        let no_worse = mine.iter().zip(theirs.iter()).all(|(a, b)| b >= a);
        let better = mine.iter().zip(theirs.iter()).any(|(a, b)| b > a);
        no_worse && better
    }
}

/// Plan one budget from an empty stomach with ample stock.
pub fn evaluate_budget(foods: &[Food], budget: i64, config: &PlannerConfig) -> BudgetResult {
    let mut manager = FoodStateManager::new(
        foods
            .iter()
            .map(|food| (food.clone(), 0, TRIAL_AVAILABILITY)),
    );

    let planner = BitePlanner::new(config);
    let plan = planner.plan_meal(&mut manager, &[], 0, budget, SpMultipliers::default());

    let stomach = manager.stomach();
    BudgetResult {
        budget,
        final_sp: plan.final_sp,
        total_calories: stomach.total_calories(),
        variety_count: planner.calculator().variety_count(&stomach),
        balance_ratio: stomach_balance_ratio(&stomach),
        bites: plan.len(),
    }
}

/// Evaluate knobs across multiple budgets.
///
/// Each call builds its own config from `base`; nothing shared is mutated.
pub fn evaluate_knobs(
    knobs: &TunerKnobs,
    base: &PlannerConfig,
    foods: &[Food],
    budgets: &[i64],
) -> EvaluationResult {
    let config = knobs.apply_to(base);
    let per_budget: Vec<BudgetResult> = budgets
        .iter()
        .map(|&budget| evaluate_budget(foods, budget, &config))
        .collect();

    let n = per_budget.len().max(1) as f64;
    let avg = |f: fn(&BudgetResult) -> f64| per_budget.iter().map(f).sum::<f64>() / n;

    EvaluationResult {
        knobs: knobs.clone(),
        avg_final_sp: avg(|r| r.final_sp),
        avg_sp_per_100kcal: avg(BudgetResult::sp_per_100kcal),
        avg_variety_count: avg(|r| r.variety_count as f64),
        avg_balance_ratio: avg(|r| r.balance_ratio),
        per_budget,
    }
}
