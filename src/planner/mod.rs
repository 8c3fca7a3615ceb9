pub mod calculations;
pub mod constants;
pub mod ranking;

pub use calculations::{
    balance_bonus, balance_ratio, stomach_balance_ratio, sum_all_weighted_nutrients,
    NutrientDensity, RewardCalculator, SpBreakdown, SpMultipliers,
};
pub use constants::*;
pub use ranking::{normalize_name, validate_cravings, BitePlanner, CravingCheck};
