use dialoguer::{Confirm, Input, Select};

use crate::error::{EcoError, Result};
use crate::models::Tastiness;
use crate::planner::constants::tastiness_name;
use crate::planner::validate_cravings;
use crate::state::FoodStateManager;

/// Inputs gathered before a planning run.
#[derive(Debug, Clone, PartialEq)]
pub struct UserConstraints {
    pub cravings: Vec<String>,
    pub cravings_satisfied: u32,
    pub remaining_calories: i64,
}

fn parse_number<T: std::str::FromStr>(input: &str) -> Result<T> {
    input
        .trim()
        .parse()
        .map_err(|_| EcoError::InvalidInput(format!("Invalid number: {input}")))
}

/// Prompt for current calories already consumed.
pub fn prompt_current_calories() -> Result<i64> {
    let input: String = Input::new()
        .with_prompt("How many calories have you already consumed today?")
        .default("0".to_string())
        .interact_text()?;

    let current: i64 = parse_number(&input)?;
    if current < 0 {
        return Err(EcoError::InvalidInput(
            "Calories consumed must be >= 0".to_string(),
        ));
    }
    Ok(current)
}

/// Prompt for maximum calorie limit.
pub fn prompt_max_calories(current: i64) -> Result<i64> {
    let input: String = Input::new()
        .with_prompt("What is your maximum calorie limit for today?")
        .default("2500".to_string())
        .interact_text()?;

    let max: i64 = parse_number(&input)?;
    if max < current {
        return Err(EcoError::InvalidInput(
            "Max calories must be >= current calories".to_string(),
        ));
    }

    Ok(max)
}

/// Prompt for number of cravings already satisfied today.
pub fn prompt_cravings_satisfied() -> Result<u32> {
    let input: String = Input::new()
        .with_prompt("How many cravings have you satisfied today?")
        .default("0".to_string())
        .interact_text()?;

    parse_number(&input)
}

/// Prompt for cravings one at a time, suggesting close names for typos.
///
/// Returns normalized names of known foods.
pub fn prompt_cravings(manager: &FoodStateManager) -> Result<Vec<String>> {
    let mut cravings = Vec::new();

    loop {
        let input: String = Input::new()
            .with_prompt("Enter a craving (or press Enter to finish)")
            .allow_empty(true)
            .interact_text()?;

        if input.trim().is_empty() {
            break;
        }

        let check = validate_cravings(manager, std::slice::from_ref(&input));
        if let Some(name) = check.valid.into_iter().next() {
            println!("Added: {name}");
            cravings.push(name);
            continue;
        }

        let Some(name) = check.invalid.first() else {
            continue;
        };
        let Some(options) = check.suggestions.get(name) else {
            println!("No matching food found for '{name}'");
            continue;
        };

        let mut items = options.clone();
        items.push("None of these".to_string());
        let selection = Select::new()
            .with_prompt(format!("'{name}' is not a known food. Did you mean"))
            .items(&items)
            .default(0)
            .interact()?;

        if let Some(choice) = options.get(selection) {
            println!("Added: {choice}");
            cravings.push(choice.clone());
        }
    }

    Ok(cravings)
}

/// Prompt for tastiness rating.
pub fn prompt_tastiness(food_name: &str) -> Result<Tastiness> {
    let options: Vec<String> = Tastiness::SCALE
        .iter()
        .map(|t| format!("{:>2} ({})", t.value(), tastiness_name(*t)))
        .collect();

    let selection = Select::new()
        .with_prompt(format!("Rate the tastiness of '{food_name}'"))
        .items(&options)
        .default(3) // ok (0)
        .interact()?;

    Ok(Tastiness::SCALE
        .get(selection)
        .copied()
        .unwrap_or(Tastiness::NEUTRAL))
}

/// Prompt for yes/no confirmation.
pub fn prompt_yes_no(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}

/// Collect all user constraints for meal planning.
pub fn collect_user_constraints(manager: &FoodStateManager) -> Result<UserConstraints> {
    let current = prompt_current_calories()?;
    let max = prompt_max_calories(current)?;
    let cravings_satisfied = prompt_cravings_satisfied()?;
    let cravings = prompt_cravings(manager)?;

    Ok(UserConstraints {
        cravings,
        cravings_satisfied,
        remaining_calories: max - current,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number::<i64>(" 1200 ").unwrap(), 1200);
        assert!(parse_number::<u32>("-1").is_err());
        assert!(matches!(
            parse_number::<i64>("lots"),
            Err(EcoError::InvalidInput(_))
        ));
    }
}
