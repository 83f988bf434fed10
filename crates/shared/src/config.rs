//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Idempotency guard configuration.
    #[serde(default)]
    pub idempotency: IdempotencyConfig,
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

/// Idempotency guard configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IdempotencyConfig {
    /// Age after which an in-progress record is treated as abandoned.
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self {
            stale_after_secs: default_stale_after_secs(),
        }
    }
}

fn default_stale_after_secs() -> u64 {
    300 // 5 minutes
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
            .add_source(config::Environment::with_prefix("LARDER").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("LARDER__DATABASE__URL", Some("sqlite::memory:")),
                ("LARDER__DATABASE__MAX_CONNECTIONS", Some("4")),
                ("LARDER__IDEMPOTENCY__STALE_AFTER_SECS", None),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "sqlite::memory:");
                assert_eq!(config.database.max_connections, 4);
                assert_eq!(config.database.min_connections, 1);
                assert_eq!(config.idempotency.stale_after_secs, 300);
            },
        );
    }

    #[test]
    fn test_stale_threshold_override() {
        temp_env::with_vars(
            [
                ("LARDER__DATABASE__URL", Some("sqlite::memory:")),
                ("LARDER__IDEMPOTENCY__STALE_AFTER_SECS", Some("30")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.idempotency.stale_after_secs, 30);
            },
        );
    }
}
