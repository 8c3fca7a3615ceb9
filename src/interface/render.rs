use std::fmt::Write as _;

use crate::config::DisplayConfig;
use crate::models::{Food, MealPlan, MealPlanItem};
use crate::planner::constants::tastiness_name;
use crate::planner::SpBreakdown;

fn signed(value: f64) -> String {
    if value >= 0.0 {
        format!("+{value:.2}")
    } else {
        format!("{value:.2}")
    }
}

/// One plan line: number, food, calories, SP change and bonus tags.
///
/// Variety and taste tags are hidden when their delta is within the display
/// noise floor.
pub fn format_plan_item(
    index: usize,
    item: &MealPlanItem,
    width: usize,
    display: &DisplayConfig,
) -> String {
    let mut tags = Vec::new();

    if item.is_craving {
        tags.push("[Craving]".to_string());
    }
    if item.variety_delta.abs() > display.variety_delta_threshold {
        tags.push(format!("Variety {} pp", signed(item.variety_delta)));
    }
    if item.taste_delta.abs() > display.tastiness_delta_threshold {
        tags.push(format!("Taste {} pp", signed(item.taste_delta)));
    }

    let tags_str = if tags.is_empty() {
        String::new()
    } else {
        format!("  {}", tags.join(", "))
    };

    format!(
        "{:>3}. {:<width$} - {:>4} cal | SP {} => {:.2}{}",
        index + 1,
        item.food_name,
        item.calories,
        signed(item.sp_gain),
        item.new_total_sp,
        tags_str,
        width = width
    )
}

/// Full plan text including the summary block.
pub fn format_meal_plan(plan: &MealPlan, display: &DisplayConfig) -> String {
    let mut out = String::new();

    if plan.is_empty() {
        let _ = writeln!(out, "No meal plan generated ({}).", plan.stop_reason);
        return out;
    }

    let width = plan
        .items
        .iter()
        .map(|p| p.food_name.len())
        .max()
        .unwrap_or(10);
    let total_sp_gain: f64 = plan.items.iter().map(|p| p.sp_gain).sum();

    let _ = writeln!(out, "=== Meal Plan ===");
    let _ = writeln!(out);
    for (i, item) in plan.items.iter().enumerate() {
        let _ = writeln!(out, "{}", format_plan_item(i, item, width, display));
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "--- Summary ---");
    let _ = writeln!(out, "Total items: {}", plan.len());
    let _ = writeln!(out, "Total calories: {}", plan.total_calories());
    let _ = writeln!(out, "Total SP gain: {total_sp_gain:.2}");
    let _ = writeln!(out, "Final SP: {:.2}", plan.final_sp);
    let _ = writeln!(out, "Cravings satisfied: {}", plan.cravings_satisfied);
    let _ = writeln!(out, "Stopped: {}", plan.stop_reason);
    out
}

/// Display a meal plan in a formatted table.
pub fn display_meal_plan(plan: &MealPlan, display: &DisplayConfig) {
    println!();
    print!("{}", format_meal_plan(plan, display));
    println!();
}

/// Display a simple list of foods with their details.
pub fn display_food_list(foods: &[&Food], title: &str) {
    if foods.is_empty() {
        println!("{title}: (none)");
        return;
    }

    println!();
    println!("=== {} ({} items) ===", title, foods.len());
    for food in foods {
        println!(
            "  {} ({})",
            food.debug_string(),
            tastiness_name(food.tastiness())
        );
    }
    println!();
}

/// Display a prediction breakdown.
pub fn display_breakdown(label: &str, parts: &SpBreakdown) {
    let d = &parts.density;
    println!();
    println!("=== Prediction: {label} ===");
    println!(
        "Density  C:{:.2} P:{:.2} F:{:.2} V:{:.2} (sum {:.2})",
        d.carbs,
        d.protein,
        d.fats,
        d.vitamins,
        d.sum()
    );
    println!("Balance  {} pp", signed(parts.balance_pp));
    println!(
        "Variety  {} pp ({} qualifying)",
        signed(parts.variety_pp),
        parts.variety_count
    );
    println!("Taste    {} pp", signed(parts.taste_pp));
    println!("Cravings {} pp", signed(parts.craving_pp));
    println!("Total SP {:.2}", parts.total_sp);
    println!();
}
