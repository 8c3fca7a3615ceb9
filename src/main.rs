use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{info, warn};

use eco_bite_planner::cli::{Cli, Command, MultiplierArgs};
use eco_bite_planner::config::PlannerConfig;
use eco_bite_planner::error::{EcoError, Result};
use eco_bite_planner::interface::{
    collect_user_constraints, display_breakdown, display_food_list, display_meal_plan,
    prompt_tastiness, prompt_yes_no,
};
use eco_bite_planner::logging;
use eco_bite_planner::models::{Food, Stomach};
use eco_bite_planner::planner::{normalize_name, validate_cravings, BitePlanner};
use eco_bite_planner::state::{
    audit_records, load_foods, save_foods, write_issue_report, FoodStateManager,
};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_file.as_deref())?;

    let config = PlannerConfig::load(cli.config.as_deref())?;
    let command = cli.command.unwrap_or_default();

    match command {
        Command::Plan { multipliers } => cmd_plan(&cli.file, &config, multipliers),
        Command::Predict {
            food,
            quantity,
            cravings,
            satisfied,
            variety_count,
            multipliers,
        } => cmd_predict(
            &cli.file,
            &config,
            PredictArgs {
                food,
                quantity,
                cravings,
                satisfied,
                variety_count,
                multipliers,
            },
        ),
        Command::RateUnknowns => cmd_rate_unknowns(&cli.file),
        Command::Reset {
            stomach,
            availability,
            tastiness,
        } => cmd_reset(&cli.file, stomach, availability, tastiness),
    }
}

/// Load, audit and validate the food state.
fn load_state(path: &Path) -> Result<FoodStateManager> {
    if !path.exists() {
        return Err(EcoError::InvalidInput(format!(
            "Food state file not found: {}",
            path.display()
        )));
    }

    let records = load_foods(path)?;
    let issues = audit_records(&records);
    if !issues.is_empty() {
        let report = issue_report_path(path);
        write_issue_report(&report, &issues)?;
        warn!("Data issues written to {}", report.display());
    }

    let manager = FoodStateManager::from_records(records)?;
    info!("Loaded {} foods from {}", manager.len(), path.display());
    Ok(manager)
}

fn issue_report_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".issues.txt");
    path.with_file_name(name)
}

fn save_state(path: &Path, manager: &FoodStateManager) -> Result<()> {
    save_foods(path, &manager.to_records())?;
    println!("Food state saved.");
    Ok(())
}

/// Generate a meal plan based on user constraints.
fn cmd_plan(path: &Path, config: &PlannerConfig, multipliers: MultiplierArgs) -> Result<()> {
    let mut manager = load_state(path)?;

    let available = manager.all_available().len();
    if available == 0 {
        println!("No foods available. Use 'reset --availability' to set availability.");
        return Ok(());
    }
    println!("{} of {} foods available", available, manager.len());
    println!();

    let constraints = collect_user_constraints(&manager)?;
    if constraints.remaining_calories <= 0 {
        println!("No remaining calories to plan for.");
        return Ok(());
    }

    println!();
    println!(
        "Planning for {} remaining calories...",
        constraints.remaining_calories
    );
    if !constraints.cravings.is_empty() {
        println!("Cravings: {}", constraints.cravings.join(", "));
    }

    let planner = BitePlanner::new(config);
    let plan = planner.plan_meal(
        &mut manager,
        &constraints.cravings,
        constraints.cravings_satisfied,
        constraints.remaining_calories,
        multipliers.into(),
    );

    display_meal_plan(&plan, &config.display);

    if !plan.is_empty() && prompt_yes_no("Save updated food state?", true)? {
        save_state(path, &manager)?;
    }

    Ok(())
}

struct PredictArgs {
    food: String,
    quantity: u32,
    cravings: Vec<String>,
    satisfied: u32,
    variety_count: usize,
    multipliers: MultiplierArgs,
}

/// Print the SP breakdown for eating `quantity` units from an empty stomach.
fn cmd_predict(path: &Path, config: &PlannerConfig, args: PredictArgs) -> Result<()> {
    let manager = load_state(path)?;

    let Some(food) = manager.get_food(&args.food) else {
        let check = validate_cravings(&manager, std::slice::from_ref(&args.food));
        if let Some(guesses) = check.suggestions.values().next() {
            println!("Did you mean: {}", guesses.join(", "));
        }
        return Err(EcoError::FoodNotFound(args.food));
    };

    // Eating a craved food counts as one more satisfied craving.
    let is_craving = args
        .cravings
        .iter()
        .any(|c| normalize_name(c) == food.key().as_str());
    let satisfied = args.satisfied + u32::from(is_craving);

    let mut stomach = Stomach::new();
    stomach.set(food, args.quantity);

    let planner = BitePlanner::new(config);
    let parts = planner.calculator().breakdown(
        &stomach,
        satisfied,
        args.variety_count,
        args.multipliers.into(),
    );

    display_breakdown(&format!("{} x {}", food.name(), args.quantity), &parts);
    Ok(())
}

/// Rate foods with unknown tastiness.
fn cmd_rate_unknowns(path: &Path) -> Result<()> {
    let mut manager = load_state(path)?;

    let unknowns: Vec<String> = {
        let unrated: Vec<&Food> = manager
            .all_available()
            .into_iter()
            .filter(|f| f.tastiness().is_unknown())
            .collect();
        if unrated.is_empty() {
            println!("No available foods with unknown tastiness.");
            return Ok(());
        }
        display_food_list(&unrated, "Unknown tastiness");
        unrated.iter().map(|f| f.name().to_string()).collect()
    };

    let mut rated_count = 0;
    for (i, name) in unknowns.iter().enumerate() {
        let rating = prompt_tastiness(name)?;
        manager.set_tastiness(name, rating)?;
        rated_count += 1;

        if i + 1 < unknowns.len() && !prompt_yes_no("Continue rating?", true)? {
            break;
        }
    }

    save_state(path, &manager)?;
    println!("Rated {} foods.", rated_count);
    Ok(())
}

/// Reset various state values.
fn cmd_reset(path: &Path, stomach: bool, availability: bool, tastiness: bool) -> Result<()> {
    if !stomach && !availability && !tastiness {
        println!("Please specify at least one reset option:");
        println!("  --stomach      Reset stomach counts to 0");
        println!("  --availability Reset all availability to 0");
        println!("  --tastiness    Set all tastiness to unknown (99)");
        return Ok(());
    }

    let mut manager = load_state(path)?;

    if stomach {
        manager.reset_stomach();
        println!("Reset all stomach counts to 0.");
    }

    if availability {
        manager.reset_availability(0);
        println!("Reset all availability to 0.");
    }

    if tastiness {
        manager.reset_tastiness(true);
        println!("Reset all tastiness to unknown (99).");
    }

    save_state(path, &manager)
}
