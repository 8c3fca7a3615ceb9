//! Parameter search over the ranking coefficients.

pub mod evaluation;
pub mod knobs;
pub mod output;
pub mod search;

pub use evaluation::{evaluate_budget, evaluate_knobs, BudgetResult, EvaluationResult};
pub use knobs::{Knob, KnobRanges, TunerKnobs};
pub use output::{print_comparison, print_pareto_frontier, print_topk, write_best_json, write_csv};
pub use search::{
    hill_climb, pareto_frontier, run_tuner, select_balanced, HillClimbConfig, TunerConfig,
    TunerResults,
};
