//! Algo-Harvest: a concurrent profile statistics harvester
//!
//! This crate queries competitive-programming and developer platforms (CodeChef,
//! Codeforces, HackerRank, Skillrack, GitHub, LeetCode) concurrently, with per-source
//! retry and backoff, and folds the results into a single ordered report.

pub mod config;
pub mod fetch;
pub mod harvest;
pub mod output;
pub mod sources;

use thiserror::Error;

/// Main error type for Algo-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] fetch::TransportError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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

    #[error("Invalid profile entry: {0}")]
    InvalidProfile(String),
}

/// Result type alias for Algo-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use harvest::Harvester;
pub use output::{ExtractionResult, Report};
pub use sources::{Platform, ProfileStats};
