use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use strsim::normalized_levenshtein;
use tracing::{debug, info, warn};

use crate::config::PlannerConfig;
use crate::models::{Food, MealPlan, MealPlanItem, StopReason, Stomach};
use crate::planner::calculations::{sum_all_weighted_nutrients, RewardCalculator, SpMultipliers};
use crate::state::FoodStateManager;

/// Minimum similarity for a craving suggestion.
const SUGGESTION_CUTOFF: f64 = 0.6;

/// Maximum suggestions per unknown craving.
const MAX_SUGGESTIONS: usize = 3;

/// Lowercase + trim for name matching.
pub fn normalize_name(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Cravings split into known and unknown names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CravingCheck {
    /// Normalized names that match a known food, in input order.
    pub valid: Vec<String>,
    /// Normalized names with no matching food.
    pub invalid: Vec<String>,
    /// Close known names for each invalid craving.
    pub suggestions: BTreeMap<String, Vec<String>>,
}

/// Filter cravings to known food names and suggest replacements for the rest.
pub fn validate_cravings(manager: &FoodStateManager, cravings: &[String]) -> CravingCheck {
    let known: Vec<String> = manager
        .all_foods()
        .iter()
        .map(|food| food.key().as_str().to_string())
        .collect();

    let mut check = CravingCheck::default();
    for craving in cravings {
        let name = normalize_name(craving);
        if name.is_empty() {
            continue;
        }
        if known.contains(&name) {
            check.valid.push(name);
            continue;
        }

        let mut guesses: Vec<(f64, &String)> = known
            .iter()
            .map(|candidate| (normalized_levenshtein(&name, candidate), candidate))
            .filter(|(score, _)| *score >= SUGGESTION_CUTOFF)
            .collect();
        guesses.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        if !guesses.is_empty() {
            check.suggestions.insert(
                name.clone(),
                guesses
                    .into_iter()
                    .take(MAX_SUGGESTIONS)
                    .map(|(_, candidate)| candidate.clone())
                    .collect(),
            );
        }
        check.invalid.push(name);
    }
    check
}

/// Candidate food with its computed scores.
#[derive(Debug)]
struct Candidate<'a> {
    food: &'a Food,
    raw_delta: f64,
    rank_score: f64,
}

/// Finalist after the near-tie filter.
#[derive(Debug)]
struct Finalist<'a> {
    food: &'a Food,
    raw_delta: f64,
    primary_rank: f64,
    proximity: f64,
}

/// Greedy bite selection bound to one parameter set.
#[derive(Debug, Clone, Copy)]
pub struct BitePlanner<'c> {
    config: &'c PlannerConfig,
    calc: RewardCalculator<'c>,
}

impl<'c> BitePlanner<'c> {
    pub fn new(config: &'c PlannerConfig) -> Self {
        Self {
            config,
            calc: RewardCalculator::new(config),
        }
    }

    pub fn calculator(&self) -> &RewardCalculator<'c> {
        &self.calc
    }

    /// Quadratic penalty for foods below the low-calorie threshold.
    ///
    /// Zero at or above the threshold, approaching `-strength` as calories
    /// approach zero.
    pub fn low_calorie_penalty(&self, food: &Food) -> f64 {
        let threshold = self.config.algorithm.low_calorie_threshold;
        if food.calories() >= threshold {
            return 0.0;
        }
        let x = 1.0 - (food.calories() / threshold);
        -self.config.algorithm.low_calorie_penalty_strength * (x * x)
    }

    /// Soft-variety bias: fractional variety-bonus delta scaled by the
    /// post-bite nutrient density.
    pub fn soft_variety_bias(&self, stomach: &Stomach<'_>, food: &Food) -> f64 {
        let after = stomach.with_added(food);

        let before_sv = self.calc.soft_variety_count(stomach);
        let after_sv = self.calc.soft_variety_count(&after);
        let delta_pp = self.calc.variety_bonus(after_sv) - self.calc.variety_bonus(before_sv);

        let (density, _) = sum_all_weighted_nutrients(&after);
        let ns_after = density.sum();

        self.config.algorithm.soft_variety_bias_strength * ns_after * (delta_pp / 100.0)
    }

    /// Progress of this food toward its own variety threshold, with a small
    /// malus for overshooting it.
    pub fn proximity_bias(&self, stomach: &Stomach<'_>, food: &Food) -> f64 {
        let threshold = self.config.game_rules.variety_cal_threshold;
        let count = f64::from(stomach.quantity_of(food));

        let p_before = (food.calories() * count) / threshold;
        let p_after = (food.calories() * (count + 1.0)) / threshold;

        let grow = (p_after.min(1.0) - p_before.min(1.0)).max(0.0);
        let over = (p_after - 1.0).max(0.0);

        self.config.algorithm.proximity_approach_weight * grow
            - self.config.algorithm.proximity_overshoot_penalty * over
    }

    /// Pick a feasible craving if one exists.
    ///
    /// Returns the available craving food within budget with the highest
    /// ΔSP; the first in key order wins ties.
    pub fn pick_feasible_craving<'m>(
        &self,
        manager: &'m FoodStateManager,
        cravings: &[String],
        remaining_calories: i64,
        cravings_satisfied: u32,
    ) -> Option<&'m Food> {
        if cravings.is_empty() {
            return None;
        }

        let craving_set: HashSet<String> = cravings.iter().map(|c| normalize_name(c)).collect();
        let stomach = manager.stomach();

        let mut best: Option<(&Food, f64)> = None;
        for food in manager.all_available() {
            if i64::from(food.calories_u32()) > remaining_calories
                || !craving_set.contains(food.key().as_str())
            {
                continue;
            }
            let delta = self.calc.sp_delta(food, &stomach, cravings, cravings_satisfied);
            if best.is_none_or(|(_, best_delta)| delta > best_delta) {
                best = Some((food, delta));
            }
        }
        best.map(|(food, _)| food)
    }

    /// Choose the next best bite by ranking.
    ///
    /// Uses multi-stage ranking:
    /// 1. Compute raw ΔSP + low-calorie penalty for foods within budget
    /// 2. Keep candidates within the tie-break window of the best
    /// 3. Re-rank by soft-variety bias, tie-break by proximity
    ///
    /// Returns the food and its raw ΔSP.
    pub fn choose_next_bite<'m>(
        &self,
        manager: &'m FoodStateManager,
        remaining_calories: i64,
        cravings: &[String],
        cravings_satisfied: u32,
    ) -> Option<(&'m Food, f64)> {
        let stomach = manager.stomach();

        // Stage 1: raw ΔSP + low-calorie penalty
        let candidates: Vec<Candidate> = manager
            .all_available()
            .into_iter()
            .filter(|food| i64::from(food.calories_u32()) <= remaining_calories)
            .map(|food| {
                let raw_delta = self.calc.sp_delta(food, &stomach, cravings, cravings_satisfied);
                let rank_score = raw_delta + self.low_calorie_penalty(food);
                Candidate {
                    food,
                    raw_delta,
                    rank_score,
                }
            })
            .collect();

        if candidates.is_empty() {
            return None;
        }

        let best_rank = candidates
            .iter()
            .map(|c| c.rank_score)
            .fold(f64::NEG_INFINITY, f64::max);

        // Stage 2: near-tie filter (absolute window)
        let window = self.config.algorithm.tiebreak_score_window_sp;
        let mut finalists: Vec<Finalist> = candidates
            .iter()
            .filter(|c| best_rank - c.rank_score <= window)
            .map(|c| Finalist {
                food: c.food,
                raw_delta: c.raw_delta,
                primary_rank: c.raw_delta
                    + self.low_calorie_penalty(c.food)
                    + self.soft_variety_bias(&stomach, c.food),
                proximity: self.proximity_bias(&stomach, c.food),
            })
            .collect();

        // Stage 3: ascending by (primary_rank, proximity); last wins
        finalists.sort_by(|a, b| {
            a.primary_rank
                .partial_cmp(&b.primary_rank)
                .unwrap_or(Ordering::Equal)
                .then_with(|| {
                    a.proximity
                        .partial_cmp(&b.proximity)
                        .unwrap_or(Ordering::Equal)
                })
        });

        for f in &finalists {
            debug!(
                food = f.food.name(),
                raw_delta = f.raw_delta,
                primary_rank = f.primary_rank,
                proximity = f.proximity,
                "finalist"
            );
        }

        finalists.last().map(|f| (f.food, f.raw_delta))
    }

    /// Plan a sequence of bites under the remaining calorie budget.
    ///
    /// Mutates `manager` as bites are applied. Unknown cravings are dropped
    /// with a warning.
    pub fn plan_meal(
        &self,
        manager: &mut FoodStateManager,
        cravings: &[String],
        cravings_satisfied: u32,
        remaining_calories: i64,
        multipliers: SpMultipliers,
    ) -> MealPlan {
        let check = validate_cravings(manager, cravings);
        if !check.invalid.is_empty() {
            warn!("Ignoring invalid cravings: {}", check.invalid.join(", "));
        }

        let current_sp =
            manager.current_sp(&self.calc, &check.valid, cravings_satisfied, multipliers);
        let mut session = PlanSession {
            cravings: check.valid,
            cravings_satisfied,
            remaining: remaining_calories,
            current_sp,
            items: Vec::new(),
            multipliers,
        };

        let mut stop_reason = StopReason::IterationCap;
        for _ in 0..self.config.safety.max_iterations {
            if session.remaining <= 0 {
                info!("Calorie budget exhausted ({} remaining)", session.remaining);
                stop_reason = StopReason::BudgetExhausted;
                break;
            }

            // Craving-first if feasible, else ranked best
            let selected = self
                .pick_feasible_craving(
                    manager,
                    &session.cravings,
                    session.remaining,
                    session.cravings_satisfied,
                )
                .or_else(|| {
                    self.choose_next_bite(
                        manager,
                        session.remaining,
                        &session.cravings,
                        session.cravings_satisfied,
                    )
                    .map(|(food, _)| food)
                })
                .cloned();

            let Some(food) = selected else {
                info!("No suitable food with {} remaining cal", session.remaining);
                stop_reason = StopReason::NoFeasibleFood;
                break;
            };

            info!("Consume {} | {} cal", food.name(), food.calories_u32());
            self.apply_bite(manager, &food, &mut session);
        }

        if stop_reason == StopReason::IterationCap {
            if session.remaining <= 0 {
                info!("Calorie budget exhausted on the last iteration");
                stop_reason = StopReason::BudgetExhausted;
            } else {
                warn!(
                    "Loop exited after max iterations ({}).",
                    self.config.safety.max_iterations
                );
            }
        }

        MealPlan {
            items: session.items,
            stop_reason,
            final_sp: session.current_sp,
            cravings_satisfied: session.cravings_satisfied,
        }
    }

    /// Consume `food`, recompute SP and bonuses, and append a log entry.
    fn apply_bite(&self, manager: &mut FoodStateManager, food: &Food, session: &mut PlanSession) {
        let before_sp = session.current_sp;
        let (variety_before, taste_delta) = {
            let stomach = manager.stomach();
            (
                self.calc.variety_count(&stomach),
                self.calc.taste_delta_for_added_unit(&stomach, food),
            )
        };

        if !manager.consume(food) {
            return;
        }
        session.remaining -= i64::from(food.calories_u32());

        // Remove one instance if duplicated
        let satisfied = match session
            .cravings
            .iter()
            .position(|c| c.as_str() == food.key().as_str())
        {
            Some(idx) => {
                session.cravings.remove(idx);
                session.cravings_satisfied += 1;
                true
            }
            None => false,
        };

        let stomach = manager.stomach();
        session.current_sp = self.calc.current_sp(
            &stomach,
            &session.cravings,
            session.cravings_satisfied,
            session.multipliers,
        );
        let variety_after = self.calc.variety_count(&stomach);
        let variety_delta = self.calc.variety_bonus(variety_after as f64)
            - self.calc.variety_bonus(variety_before as f64);

        session.items.push(MealPlanItem {
            food_name: food.name().to_string(),
            calories: food.calories_u32(),
            sp_gain: session.current_sp - before_sp,
            new_total_sp: session.current_sp,
            is_craving: satisfied,
            variety_delta,
            taste_delta,
        });
    }
}

/// Mutable bookkeeping for one planning run.
struct PlanSession {
    cravings: Vec<String>,
    cravings_satisfied: u32,
    remaining: i64,
    current_sp: f64,
    items: Vec<MealPlanItem>,
    multipliers: SpMultipliers,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_manager() -> FoodStateManager {
        FoodStateManager::new(vec![
            (Food::new("Apple", 100, 20, 1, 0, 5, 2).unwrap(), 0, 50),
            (Food::new("Bread", 500, 40, 8, 2, 1, 1).unwrap(), 0, 10),
            (Food::new("Cheese", 300, 1, 20, 25, 2, 3).unwrap(), 0, 8),
        ])
    }

    #[test]
    fn test_low_calorie_penalty() {
        let config = PlannerConfig::default();
        let planner = BitePlanner::new(&config);
        let big = Food::new("Big", 500, 1, 1, 1, 1, 0).unwrap();
        let floor = Food::new("Floor", 395, 1, 1, 1, 1, 0).unwrap();
        let zero = Food::new("Zero", 0, 1, 1, 1, 1, 0).unwrap();
        let small = Food::new("Small", 100, 1, 1, 1, 1, 0).unwrap();

        assert_eq!(planner.low_calorie_penalty(&big), 0.0);
        assert_eq!(planner.low_calorie_penalty(&floor), 0.0);
        assert!(planner.low_calorie_penalty(&small) < 0.0);
        assert!(
            (planner.low_calorie_penalty(&zero) + config.algorithm.low_calorie_penalty_strength)
                .abs()
                < 1e-12
        );
    }

    #[test]
    fn test_proximity_bias_growth_and_overshoot() {
        let config = PlannerConfig::default();
        let planner = BitePlanner::new(&config);
        let food = Food::new("Roast", 1500, 10, 10, 10, 10, 0).unwrap();
        let alpha = config.algorithm.proximity_approach_weight;
        let beta = config.algorithm.proximity_overshoot_penalty;

        // 0 -> 0.75 of the threshold
        let empty = Stomach::new();
        assert!((planner.proximity_bias(&empty, &food) - alpha * 0.75).abs() < 1e-12);

        // 0.75 -> 1.5: grows 0.25, overshoots 0.5
        let mut one = Stomach::new();
        one.set(&food, 1);
        let expected = alpha * 0.25 - beta * 0.5;
        assert!((planner.proximity_bias(&one, &food) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_soft_variety_bias_positive_when_progressing() {
        let config = PlannerConfig::default();
        let planner = BitePlanner::new(&config);
        let food = Food::new("Roast", 1000, 10, 10, 10, 10, 0).unwrap();
        assert!(planner.soft_variety_bias(&Stomach::new(), &food) > 0.0);

        // Already past the threshold: no further soft-variety progress.
        let mut full = Stomach::new();
        full.set(&food, 2);
        assert_eq!(planner.soft_variety_bias(&full, &food), 0.0);
    }

    #[test]
    fn test_choose_next_bite() {
        let config = PlannerConfig::default();
        let planner = BitePlanner::new(&config);
        let manager = sample_manager();
        let selected = planner.choose_next_bite(&manager, 2000, &[], 0);
        assert!(selected.is_some());
    }

    #[test]
    fn test_choose_next_bite_respects_budget() {
        let config = PlannerConfig::default();
        let planner = BitePlanner::new(&config);
        let manager = sample_manager();

        let (food, _) = planner.choose_next_bite(&manager, 150, &[], 0).unwrap();
        assert_eq!(food.name(), "Apple");
        assert!(planner.choose_next_bite(&manager, 50, &[], 0).is_none());
    }

    fn manager_of(foods: Vec<Food>) -> FoodStateManager {
        FoodStateManager::new(foods.into_iter().map(|food| (food, 0, 10)))
    }

    #[test]
    fn test_low_calorie_food_penalized_in_selection() {
        let mut config = PlannerConfig::default();
        config.algorithm.low_calorie_penalty_strength = 20.0;
        let planner = BitePlanner::new(&config);
        // Raw ΔSP on an empty stomach: Cracker 64, Stew 60
        let manager = manager_of(vec![
            Food::new("Cracker", 100, 10, 10, 10, 10, 1).unwrap(),
            Food::new("Stew", 400, 10, 10, 10, 10, 0).unwrap(),
        ]);
        let stomach = manager.stomach();
        let calc = planner.calculator();
        let cracker = manager.get_food("Cracker").unwrap();
        let stew = manager.get_food("Stew").unwrap();
        assert!(
            calc.sp_delta(cracker, &stomach, &[], 0) > calc.sp_delta(stew, &stomach, &[], 0)
        );

        let (food, raw_delta) = planner.choose_next_bite(&manager, 2000, &[], 0).unwrap();
        assert_eq!(food.name(), "Stew");
        assert!((raw_delta - 60.0).abs() < 1e-9);
    }

    // Roll: raw ΔSP 60, small soft-variety bias.
    // Roast: raw ΔSP 54, soft-variety bias about 19.5 above Roll's.
    fn window_pair() -> FoodStateManager {
        manager_of(vec![
            Food::new("Roll", 400, 10, 10, 10, 10, 0).unwrap(),
            Food::new("Roast", 1600, 9, 9, 9, 9, 0).unwrap(),
        ])
    }

    #[test]
    fn test_candidate_outside_tie_window_is_excluded() {
        let mut config = PlannerConfig::default();
        config.algorithm.soft_variety_bias_strength = 50.0;
        config.algorithm.tiebreak_score_window_sp = 5.9;
        let planner = BitePlanner::new(&config);
        let manager = window_pair();

        let stomach = manager.stomach();
        let roll = manager.get_food("Roll").unwrap();
        let roast = manager.get_food("Roast").unwrap();
        let bias_gap =
            planner.soft_variety_bias(&stomach, roast) - planner.soft_variety_bias(&stomach, roll);
        assert!(bias_gap > 6.0);

        let (food, _) = planner.choose_next_bite(&manager, 2000, &[], 0).unwrap();
        assert_eq!(food.name(), "Roll");
    }

    #[test]
    fn test_soft_variety_bias_reorders_finalists() {
        let mut config = PlannerConfig::default();
        config.algorithm.soft_variety_bias_strength = 50.0;
        config.algorithm.tiebreak_score_window_sp = 6.1;
        let planner = BitePlanner::new(&config);
        let manager = window_pair();

        let (food, raw_delta) = planner.choose_next_bite(&manager, 2000, &[], 0).unwrap();
        assert_eq!(food.name(), "Roast");
        assert!((raw_delta - 54.0).abs() < 1e-9);
    }

    #[test]
    fn test_equal_rank_uses_proximity() {
        let mut config = PlannerConfig::default();
        config.algorithm.soft_variety_bias_strength = 0.0;
        config.algorithm.low_calorie_penalty_strength = 0.0;
        let planner = BitePlanner::new(&config);
        // Same raw ΔSP; Apple covers half its threshold, Zucchini a fifth
        let manager = manager_of(vec![
            Food::new("Apple", 1000, 10, 10, 10, 10, 0).unwrap(),
            Food::new("Zucchini", 400, 10, 10, 10, 10, 0).unwrap(),
        ]);

        let (food, _) = planner.choose_next_bite(&manager, 2000, &[], 0).unwrap();
        assert_eq!(food.name(), "Apple");
    }

    #[test]
    fn test_full_tie_picks_last_in_key_order() {
        let config = PlannerConfig::default();
        let planner = BitePlanner::new(&config);
        let manager = manager_of(vec![
            Food::new("Beta", 500, 10, 10, 10, 10, 0).unwrap(),
            Food::new("Alpha", 500, 10, 10, 10, 10, 0).unwrap(),
        ]);

        let (food, _) = planner.choose_next_bite(&manager, 2000, &[], 0).unwrap();
        assert_eq!(food.name(), "Beta");
    }

    struct LogSink(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogSink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_budget_exhausted_is_logged() {
        let buffer = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || LogSink(sink.clone()))
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();

        let config = PlannerConfig::default();
        let planner = BitePlanner::new(&config);
        let mut manager = manager_of(vec![Food::new("Stew", 500, 10, 10, 10, 10, 0).unwrap()]);

        let plan = tracing::subscriber::with_default(subscriber, || {
            planner.plan_meal(&mut manager, &[], 0, 1000, SpMultipliers::default())
        });

        assert_eq!(plan.len(), 2);
        assert_eq!(plan.stop_reason, StopReason::BudgetExhausted);
        let logs = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("Calorie budget exhausted"));
    }

    #[test]
    fn test_pick_feasible_craving() {
        let config = PlannerConfig::default();
        let planner = BitePlanner::new(&config);
        let manager = sample_manager();
        let cravings = vec!["apple".to_string()];

        let selected = planner.pick_feasible_craving(&manager, &cravings, 1000, 0);
        assert_eq!(selected.unwrap().name(), "Apple");

        // Does not fit the budget
        let cravings = vec!["bread".to_string()];
        assert!(planner.pick_feasible_craving(&manager, &cravings, 400, 0).is_none());
    }

    #[test]
    fn test_validate_cravings_suggests_close_names() {
        let manager = sample_manager();
        let cravings = vec![" Apple ".to_string(), "chese".to_string(), "zzz".to_string()];
        let check = validate_cravings(&manager, &cravings);

        assert_eq!(check.valid, vec!["apple".to_string()]);
        assert_eq!(check.invalid, vec!["chese".to_string(), "zzz".to_string()]);
        assert_eq!(check.suggestions["chese"], vec!["cheese".to_string()]);
        assert!(!check.suggestions.contains_key("zzz"));
    }

    #[test]
    fn test_plan_meal_within_budget() {
        let config = PlannerConfig::default();
        let planner = BitePlanner::new(&config);
        let mut manager = sample_manager();
        let plan = planner.plan_meal(&mut manager, &[], 0, 1000, SpMultipliers::default());

        assert!(!plan.is_empty());
        assert!(plan.total_calories() <= 1000);
    }

    #[test]
    fn test_iteration_cap_is_reported() {
        let mut config = PlannerConfig::default();
        config.safety.max_iterations = 2;
        let planner = BitePlanner::new(&config);
        let mut manager = sample_manager();

        let plan = planner.plan_meal(&mut manager, &[], 0, 10_000, SpMultipliers::default());
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.stop_reason, StopReason::IterationCap);
    }

    #[test]
    fn test_craving_removed_once_satisfied() {
        let config = PlannerConfig::default();
        let planner = BitePlanner::new(&config);
        let mut manager = sample_manager();
        let cravings = vec!["Cheese".to_string()];

        let plan = planner.plan_meal(&mut manager, &cravings, 0, 600, SpMultipliers::default());
        assert!(plan.items[0].is_craving);
        assert_eq!(plan.items[0].food_name, "Cheese");
        assert_eq!(plan.items.iter().filter(|i| i.is_craving).count(), 1);
        assert_eq!(plan.cravings_satisfied, 1);
    }
}
