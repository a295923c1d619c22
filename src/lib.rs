//! Recipe-Harvest: a polite recipe crawler
//!
//! This crate pages through a recipe site's search listing, visits every linked
//! recipe page, extracts its structured fields and stores one record per recipe.

pub mod config;
pub mod crawler;
pub mod recipe;
pub mod storage;

use thiserror::Error;

/// Main error type for Recipe-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Navigation failed: {0}")]
    Navigation(#[from] crawler::FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector '{selector}' for {name}")]
    InvalidSelector { name: &'static str, selector: String },
}

/// Result type alias for Recipe-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl_session, Coordinator, FieldExtractor, Frontier, PageFetcher};
pub use recipe::{parse_nutrition, Nutrition, Recipe};
pub use storage::{persist, RecipeStore, SqliteRecipeStore};
