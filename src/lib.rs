pub mod cli;
pub mod config;
pub mod error;
pub mod interface;
pub mod logging;
pub mod models;
pub mod planner;
pub mod state;
pub mod tuner;

pub use config::PlannerConfig;
pub use error::{EcoError, Result};
pub use models::{Food, FoodKey, MealPlan, MealPlanItem, StopReason, Tastiness};
