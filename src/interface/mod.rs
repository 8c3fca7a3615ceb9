pub mod prompts;
pub mod render;

pub use prompts::{
    collect_user_constraints, prompt_cravings, prompt_cravings_satisfied, prompt_current_calories,
    prompt_max_calories, prompt_tastiness, prompt_yes_no, UserConstraints,
};
pub use render::{
    display_breakdown, display_food_list, display_meal_plan, format_meal_plan, format_plan_item,
};
