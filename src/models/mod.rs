pub mod food;
pub mod plan;
pub mod stomach;

pub use food::{Food, FoodKey, FoodRecord, Tastiness};
pub use plan::{MealPlan, MealPlanItem, StopReason};
pub use stomach::Stomach;
