//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Accrual batch configuration.
    #[serde(default)]
    pub accrual: AccrualConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Accrual batch configuration.
///
/// Only operational knobs live here. Business constants (accrual amounts,
/// balance cap, granularity) are fixed policy values in `staffline-core`.
#[derive(Debug, Clone, Deserialize)]
pub struct AccrualConfig {
    /// Maximum number of employees processed concurrently by the batch.
    #[serde(default = "default_accrual_concurrency")]
    pub concurrency: usize,
}

impl Default for AccrualConfig {
    fn default() -> Self {
        Self {
            concurrency: default_accrual_concurrency(),
        }
    }
}

fn default_accrual_concurrency() -> usize {
    8
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("STAFFLINE").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
