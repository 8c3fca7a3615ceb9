use std::cmp::Ordering;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::config::PlannerConfig;
use crate::models::Food;
use crate::tuner::evaluation::{evaluate_knobs, EvaluationResult};
use crate::tuner::knobs::{Knob, KnobRanges, TunerKnobs};

/// Local refinement settings.
#[derive(Debug, Clone, PartialEq)]
pub struct HillClimbConfig {
    /// Passes over all knobs; stops early after a pass with no gain.
    pub max_rounds: usize,
    /// Multiplicative steps tried on each knob.
    pub factors: Vec<f64>,
}

impl Default for HillClimbConfig {
    fn default() -> Self {
        Self {
            max_rounds: 3,
            factors: vec![0.9, 1.1],
        }
    }
}

/// Configuration for the tuner.
#[derive(Debug, Clone)]
pub struct TunerConfig {
    pub iterations: usize,
    pub seed: u64,
    pub budgets: Vec<i64>,
    pub ranges: KnobRanges,
    /// Non-knob parameters shared by every trial.
    pub base: PlannerConfig,
    /// Set to None to disable refinement.
    pub hill_climb: Option<HillClimbConfig>,
}

impl Default for TunerConfig {
    fn default() -> Self {
        Self {
            iterations: 300,
            seed: 123,
            budgets: vec![5000, 10000, 20000, 40000],
            ranges: KnobRanges::default(),
            base: PlannerConfig::default(),
            hill_climb: Some(HillClimbConfig::default()),
        }
    }
}

/// Results from a tuning run.
#[derive(Debug, Clone)]
pub struct TunerResults {
    /// Sorted best to worst by [`EvaluationResult::cmp_score`].
    pub results: Vec<EvaluationResult>,
    /// The knobs of the base config.
    pub baseline: EvaluationResult,
    /// Indices into `results` of non-dominated entries.
    pub pareto_indices: Vec<usize>,
    /// Frontier entry closest to the ideal point.
    pub balanced_idx: Option<usize>,
}

impl TunerResults {
    /// Balanced pick, falling back to the top result.
    pub fn best(&self) -> &EvaluationResult {
        self.balanced_idx
            .and_then(|idx| self.results.get(idx))
            .or_else(|| self.results.first())
            .unwrap_or(&self.baseline)
    }
}

/// Indices of results no other result dominates.
pub fn pareto_frontier(results: &[EvaluationResult]) -> Vec<usize> {
    (0..results.len())
        .filter(|&i| {
            !results
                .iter()
                .any(|other| results[i].is_dominated_by(other))
        })
        .collect()
}

/// Refine `start` by single-knob multiplicative steps.
///
/// A step is kept only when its result dominates the current best.
pub fn hill_climb(
    start: &EvaluationResult,
    base: &PlannerConfig,
    foods: &[Food],
    budgets: &[i64],
    ranges: &KnobRanges,
    settings: &HillClimbConfig,
) -> EvaluationResult {
    let mut best = start.clone();

    for round in 0..settings.max_rounds {
        let mut improved = false;
        for knob in Knob::ALL {
            for &factor in &settings.factors {
                let knobs = best.knobs.perturb(knob, factor, ranges);
                if knobs == best.knobs {
                    continue;
                }
                let candidate = evaluate_knobs(&knobs, base, foods, budgets);
                if best.is_dominated_by(&candidate) {
                    debug!(round, knob = knob.label(), factor, "hill climb step accepted");
                    best = candidate;
                    improved = true;
                }
            }
        }
        if !improved {
            break;
        }
    }
    best
}

fn normalize(value: f64, min: f64, max: f64) -> f64 {
    let range = max - min;
    if range < 1e-10 {
        1.0
    } else {
        (value - min) / range
    }
}

/// Frontier entry with the smallest normalized distance to the ideal point.
///
/// Each metric is scaled to `[0, 1]` across the frontier; the ideal point
/// is 1 on every axis.
pub fn select_balanced(results: &[EvaluationResult], frontier: &[usize]) -> Option<usize> {
    let metrics = |r: &EvaluationResult| {
        [
            r.avg_final_sp,
            r.avg_sp_per_100kcal,
            r.avg_variety_count,
            r.avg_balance_ratio,
        ]
    };

    let mut lo = [f64::INFINITY; 4];
    let mut hi = [f64::NEG_INFINITY; 4];
    for &idx in frontier {
        for (axis, value) in metrics(&results[idx]).into_iter().enumerate() {
            lo[axis] = lo[axis].min(value);
            hi[axis] = hi[axis].max(value);
        }
    }

    let distance = |idx: usize| -> f64 {
        metrics(&results[idx])
            .into_iter()
            .enumerate()
            .map(|(axis, value)| {
                let gap = 1.0 - normalize(value, lo[axis], hi[axis]);
                gap * gap
            })
            .sum::<f64>()
            .sqrt()
    };

    frontier
        .iter()
        .copied()
        .min_by(|&a, &b| distance(a).partial_cmp(&distance(b)).unwrap_or(Ordering::Equal))
}

/// Random search, frontier refinement and balanced selection.
pub fn run_tuner(config: &TunerConfig, foods: &[Food]) -> TunerResults {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut results = Vec::with_capacity(config.iterations);

    let baseline_knobs = TunerKnobs::from_config(&config.base);
    let baseline = evaluate_knobs(&baseline_knobs, &config.base, foods, &config.budgets);
    info!(
        "Baseline: SP={:.2} sp/100kcal={:.3} variety={:.1} balance={:.3}",
        baseline.avg_final_sp,
        baseline.avg_sp_per_100kcal,
        baseline.avg_variety_count,
        baseline.avg_balance_ratio
    );

    let mut best_sp = baseline.avg_final_sp;
    for i in 0..config.iterations {
        let knobs = TunerKnobs::random(&mut rng, &config.ranges);
        let result = evaluate_knobs(&knobs, &config.base, foods, &config.budgets);

        if result.avg_final_sp > best_sp {
            best_sp = result.avg_final_sp;
            info!(
                "[{}/{}] New best: SP={:.2} {}",
                i + 1,
                config.iterations,
                result.avg_final_sp,
                result.knobs.display()
            );
        }
        results.push(result);
    }

    results.sort_by(|a, b| b.cmp_score(a));
    let mut pareto_indices = pareto_frontier(&results);
    info!("Pareto frontier: {} solutions", pareto_indices.len());

    if let Some(settings) = &config.hill_climb {
        let refined: Vec<EvaluationResult> = pareto_indices
            .iter()
            .map(|&idx| &results[idx])
            .filter_map(|start| {
                let climbed = hill_climb(
                    start,
                    &config.base,
                    foods,
                    &config.budgets,
                    &config.ranges,
                    settings,
                );
                start.is_dominated_by(&climbed).then_some(climbed)
            })
            .collect();

        info!("{} frontier results improved by hill climbing", refined.len());
        if !refined.is_empty() {
            results.extend(refined);
            results.sort_by(|a, b| b.cmp_score(a));
            pareto_indices = pareto_frontier(&results);
        }
    }

    let balanced_idx = select_balanced(&results, &pareto_indices);

    TunerResults {
        results,
        baseline,
        pareto_indices,
        balanced_idx,
    }
}
