use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::planner::SpMultipliers;

/// Eco bite planner: greedy meal planning for skill points from nutrition,
/// variety and taste.
#[derive(Parser, Debug)]
#[command(name = "eco_bite_planner")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to the food state JSON file.
    #[arg(short, long, default_value = "food_state.json")]
    pub file: PathBuf,

    /// YAML file overriding planner parameters.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write logs to this file instead of stderr.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Session multipliers shared by `plan` and `predict`.
#[derive(clap::Args, Debug, Clone, Copy, PartialEq)]
pub struct MultiplierArgs {
    /// Server skill gain multiplier.
    #[arg(short = 's', long = "server", default_value_t = 1.0)]
    pub server_mult: f64,

    /// Dinner party multiplier.
    #[arg(short = 'd', long = "dinner", default_value_t = 1.0)]
    pub dinner_party_mult: f64,
}

impl Default for MultiplierArgs {
    fn default() -> Self {
        Self {
            server_mult: 1.0,
            dinner_party_mult: 1.0,
        }
    }
}

impl From<MultiplierArgs> for SpMultipliers {
    fn from(args: MultiplierArgs) -> Self {
        SpMultipliers {
            server_mult: args.server_mult,
            dinner_party_mult: args.dinner_party_mult,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Generate a meal plan based on available foods and constraints.
    Plan {
        #[command(flatten)]
        multipliers: MultiplierArgs,
    },

    /// Show the SP breakdown for eating a food from an empty stomach.
    Predict {
        /// Food to evaluate.
        #[arg(long)]
        food: String,

        /// Units eaten.
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        /// Comma-separated cravings.
        #[arg(long, value_delimiter = ',')]
        cravings: Vec<String>,

        /// Cravings already satisfied today.
        #[arg(long, default_value_t = 0)]
        satisfied: u32,

        /// Qualifying variety foods eaten earlier.
        #[arg(long, default_value_t = 0)]
        variety_count: usize,

        #[command(flatten)]
        multipliers: MultiplierArgs,
    },

    /// Rate foods with unknown tastiness.
    RateUnknowns,

    /// Reset various state values.
    Reset {
        /// Reset stomach counts to 0.
        #[arg(long)]
        stomach: bool,

        /// Reset all availability to 0.
        #[arg(long)]
        availability: bool,

        /// Set all tastiness to unknown (99).
        #[arg(long)]
        tastiness: bool,
    },
}

impl Default for Command {
    fn default() -> Self {
        Command::Plan {
            multipliers: MultiplierArgs::default(),
        }
    }
}
