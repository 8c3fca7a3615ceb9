use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use eco_bite_planner::config::PlannerConfig;
use eco_bite_planner::error::{EcoError, Result};
use eco_bite_planner::logging;
use eco_bite_planner::models::{Food, FoodRecord};
use eco_bite_planner::state::load_foods;
use eco_bite_planner::tuner::{
    print_comparison, print_pareto_frontier, print_topk, run_tuner, write_best_json, write_csv,
    HillClimbConfig, KnobRanges, TunerConfig,
};

#[derive(Parser, Debug)]
#[command(name = "tuner")]
#[command(about = "Parameter search for the bite planner's ranking coefficients")]
struct Args {
    /// Number of random search iterations
    #[arg(long, default_value_t = 300)]
    iters: usize,

    /// Random seed for reproducibility
    #[arg(long, default_value_t = 123)]
    seed: u64,

    /// Calorie budgets to evaluate
    #[arg(long, value_delimiter = ',', default_value = "5000,10000,20000,40000")]
    budgets: Vec<i64>,

    /// Path to food_state.json
    #[arg(long, default_value = "food_state.json")]
    foods: PathBuf,

    /// YAML config supplying the non-knob parameters
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output CSV file for all results
    #[arg(long, default_value = "tuner_results.csv")]
    csv: PathBuf,

    /// Output JSON file for the balanced pick
    #[arg(long, default_value = "tuner_best.json")]
    json: PathBuf,

    /// Number of top results to display
    #[arg(long, default_value_t = 10)]
    topk: usize,

    /// Disable hill climbing refinement
    #[arg(long)]
    no_hill_climb: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose.max(1), None)?;

    let base = PlannerConfig::load(args.config.as_deref())?;
    let foods: Vec<Food> = load_foods(&args.foods)?
        .into_iter()
        .map(|record: FoodRecord| record.into_parts().map(|(food, _, _)| food))
        .collect::<Result<_>>()?;
    info!("Loaded {} foods from {}", foods.len(), args.foods.display());

    let budgets: Vec<i64> = args.budgets.into_iter().filter(|b| *b > 0).collect();
    if budgets.is_empty() {
        return Err(EcoError::InvalidInput("no valid budgets provided".to_string()));
    }
    info!("Testing budgets: {:?}", budgets);

    let config = TunerConfig {
        iterations: args.iters,
        seed: args.seed,
        budgets,
        ranges: KnobRanges::default(),
        base,
        hill_climb: (!args.no_hill_climb).then(HillClimbConfig::default),
    };

    let outcome = run_tuner(&config, &foods);

    print_pareto_frontier(&outcome.results, &outcome.pareto_indices, outcome.balanced_idx);
    print_topk(&outcome.results, args.topk);

    let best = outcome.best();
    print_comparison(&outcome.baseline, best);

    write_csv(&outcome.results, &args.csv)?;
    println!("Wrote all results to {}", args.csv.display());

    write_best_json(best, &args.json)?;
    println!("Wrote balanced result to {}", args.json.display());
    Ok(())
}
