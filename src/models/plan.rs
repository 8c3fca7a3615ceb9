use std::fmt;

/// Represents a single item (bite) in a meal plan.
#[derive(Debug, Clone, PartialEq)]
pub struct MealPlanItem {
    /// Name of the food consumed.
    pub food_name: String,

    /// Calories from this bite.
    pub calories: u32,

    /// SP gained from this bite.
    pub sp_gain: f64,

    /// New total SP after this bite.
    pub new_total_sp: f64,

    /// Whether this bite satisfied a craving.
    pub is_craving: bool,

    /// Change in variety bonus (percentage points).
    pub variety_delta: f64,

    /// Change in taste bonus (percentage points).
    pub taste_delta: f64,
}

/// Why the planning loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Remaining calories reached zero or below.
    BudgetExhausted,
    /// No available food fits the remaining budget.
    NoFeasibleFood,
    /// The safety iteration cap was hit before any other stop condition.
    IterationCap,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StopReason::BudgetExhausted => "calorie budget exhausted",
            StopReason::NoFeasibleFood => "no feasible food left",
            StopReason::IterationCap => "iteration cap reached",
        };
        f.write_str(text)
    }
}

/// Result of a planning run.
#[derive(Debug, Clone)]
pub struct MealPlan {
    /// Applied bites in order.
    pub items: Vec<MealPlanItem>,
    pub stop_reason: StopReason,
    /// SP of the final stomach (session multipliers applied).
    pub final_sp: f64,
    /// Satisfied-craving count after the run.
    pub cravings_satisfied: u32,
}

impl MealPlan {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn total_calories(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.calories)).sum()
    }
}
