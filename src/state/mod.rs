mod manager;
mod persistence;

pub use manager::FoodStateManager;
pub use persistence::{audit_records, load_foods, save_foods, write_issue_report, DataIssues};
