pub mod app_config;
pub mod business;
pub mod config;
pub mod sort;

pub use app_config::{AppConfig, Environment};
pub use business::{field_text, supplied_id, BusinessRecord, RecordError};
pub use config::{load_app_config, load_app_config_from_env};
pub use sort::{parse_search_date, SortKey, UnknownSortKey};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
