use thiserror::Error;

#[derive(Debug, Error)]
pub enum EcoError {
    #[error("Food not found: {0}")]
    FoodNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid tastiness value {value} for '{food}' (expected -3..=3 or 99)")]
    InvalidTastiness { food: String, value: i64 },

    #[error("Config validation failed: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),
}

pub type Result<T> = std::result::Result<T, EcoError>;
