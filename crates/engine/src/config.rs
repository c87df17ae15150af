use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

use persistence::db::PoolSettings;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_backend")]
    pub backend: StorageBackend,

    #[serde(default)]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl StorageConfig {
    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            url: self.url.clone(),
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            connect_timeout_secs: self.connect_timeout_secs,
            idle_timeout_secs: self.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, e.g. `info` or `info,sitetrack_engine=debug`.
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// Sampling and history settings.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackingConfig {
    /// Sampling interval for workers without an override.
    #[serde(default = "default_interval_minutes")]
    pub default_interval_minutes: u64,

    #[serde(default = "default_min_interval_minutes")]
    pub min_interval_minutes: u64,

    #[serde(default = "default_max_interval_minutes")]
    pub max_interval_minutes: u64,

    /// Upper bound on a single location lookup.
    #[serde(default = "default_location_timeout")]
    pub location_timeout_secs: u64,

    /// Bound on both the per-worker and the per-session location history.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// How long shutdown waits for samplers to exit.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

impl TrackingConfig {
    pub fn default_interval(&self) -> Duration {
        Duration::from_secs(self.default_interval_minutes * 60)
    }

    pub fn location_timeout(&self) -> Duration {
        Duration::from_secs(self.location_timeout_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    pub fn interval_in_bounds(&self, minutes: u64) -> bool {
        (self.min_interval_minutes..=self.max_interval_minutes).contains(&minutes)
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            default_interval_minutes: default_interval_minutes(),
            min_interval_minutes: default_min_interval_minutes(),
            max_interval_minutes: default_max_interval_minutes(),
            location_timeout_secs: default_location_timeout(),
            history_capacity: default_history_capacity(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

/// Reverse geocoding (address enrichment) settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Nominatim-compatible base URL (required if enabled)
    #[serde(default)]
    pub url: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_geocoding_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Number of failures before circuit breaker opens
    #[serde(default = "default_circuit_breaker_failures")]
    pub circuit_breaker_failures: u32,

    /// Seconds to keep circuit breaker open before retry
    #[serde(default = "default_circuit_breaker_reset_secs")]
    pub circuit_breaker_reset_secs: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: String::new(),
            timeout_ms: default_geocoding_timeout_ms(),
            user_agent: default_user_agent(),
            circuit_breaker_failures: default_circuit_breaker_failures(),
            circuit_breaker_reset_secs: default_circuit_breaker_reset_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_metrics_listen_addr")]
    pub listen_addr: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: default_metrics_listen_addr(),
        }
    }
}

// Default value functions
fn default_storage_backend() -> StorageBackend {
    StorageBackend::Memory
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_interval_minutes() -> u64 {
    5
}
fn default_min_interval_minutes() -> u64 {
    1
}
fn default_max_interval_minutes() -> u64 {
    60
}
fn default_location_timeout() -> u64 {
    10
}
fn default_history_capacity() -> usize {
    domain::models::DEFAULT_HISTORY_CAPACITY
}
fn default_shutdown_timeout() -> u64 {
    10
}
fn default_geocoding_timeout_ms() -> u64 {
    3000
}
fn default_user_agent() -> String {
    format!("sitetrack/{}", env!("CARGO_PKG_VERSION"))
}
fn default_circuit_breaker_failures() -> u32 {
    5
}
fn default_circuit_breaker_reset_secs() -> u64 {
    60
}
fn default_metrics_listen_addr() -> String {
    "0.0.0.0:9100".to_string()
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with SITETRACK__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("SITETRACK").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Defaults are embedded so tests never depend on config files.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [storage]
            backend = "memory"
            url = ""
            max_connections = 20
            min_connections = 5
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [logging]
            level = "info"
            format = "json"

            [tracking]
            default_interval_minutes = 5
            min_interval_minutes = 1
            max_interval_minutes = 60
            location_timeout_secs = 10
            history_capacity = 1000
            shutdown_timeout_secs = 10

            [geocoding]
            enabled = false
            url = ""
            timeout_ms = 3000

            [metrics]
            enabled = false
            listen_addr = "127.0.0.1:9100"
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        // Skip validation in tests to allow partial configs
        Ok(cfg)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.storage.backend == StorageBackend::Postgres && self.storage.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "SITETRACK__STORAGE__URL must be set for the postgres backend".to_string(),
            ));
        }

        if self.storage.min_connections > self.storage.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        let tracking = &self.tracking;
        if tracking.min_interval_minutes == 0
            || tracking.min_interval_minutes > tracking.max_interval_minutes
        {
            return Err(ConfigValidationError::InvalidValue(
                "tracking interval bounds must satisfy 1 <= min_interval_minutes <= max_interval_minutes"
                    .to_string(),
            ));
        }

        if !tracking.interval_in_bounds(tracking.default_interval_minutes) {
            return Err(ConfigValidationError::InvalidValue(format!(
                "default_interval_minutes must be between {} and {}",
                tracking.min_interval_minutes, tracking.max_interval_minutes
            )));
        }

        if tracking.history_capacity == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "history_capacity must be greater than 0".to_string(),
            ));
        }

        if self.geocoding.enabled && self.geocoding.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "geocoding.url must be set when geocoding is enabled".to_string(),
            ));
        }

        if self.metrics.enabled {
            self.metrics_addr()?;
        }

        Ok(())
    }

    pub fn metrics_addr(&self) -> Result<SocketAddr, ConfigValidationError> {
        self.metrics.listen_addr.parse().map_err(|_| {
            ConfigValidationError::InvalidValue(format!(
                "metrics.listen_addr is not a socket address: {}",
                self.metrics.listen_addr
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_load_with_defaults() {
        let config = Config::load_for_test(&[]).expect("Failed to load config");

        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.tracking.default_interval_minutes, 5);
        assert_eq!(config.tracking.history_capacity, 1000);
        assert_eq!(config.tracking.default_interval(), Duration::from_secs(300));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_override() {
        let config = Config::load_for_test(&[
            ("tracking.default_interval_minutes", "15"),
            ("logging.level", "debug"),
        ])
        .expect("Failed to load config");

        assert_eq!(config.tracking.default_interval_minutes, 15);
        assert_eq!(config.logging.level, "debug");

        let config = Config::load_for_test(&[("logging.format", "pretty")])
            .expect("Failed to load config");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_config_validation_postgres_requires_url() {
        let config = Config::load_for_test(&[("storage.backend", "postgres")])
            .expect("Failed to load config");
        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("SITETRACK__STORAGE__URL"));
    }

    #[test]
    fn test_config_validation_invalid_pool_settings() {
        let config = Config::load_for_test(&[
            ("storage.min_connections", "100"),
            ("storage.max_connections", "10"),
        ])
        .expect("Failed to load config");

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("min_connections"));
    }

    #[test]
    fn test_config_validation_default_interval_out_of_bounds() {
        let config = Config::load_for_test(&[("tracking.default_interval_minutes", "90")])
            .expect("Failed to load config");
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("default_interval_minutes"));
    }

    #[test]
    fn test_config_validation_zero_capacity() {
        let config = Config::load_for_test(&[("tracking.history_capacity", "0")])
            .expect("Failed to load config");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_geocoding_requires_url() {
        let config = Config::load_for_test(&[("geocoding.enabled", "true")])
            .expect("Failed to load config");
        assert!(config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("geocoding.url"));
    }

    #[test]
    fn test_metrics_addr() {
        let config = Config::load_for_test(&[("metrics.listen_addr", "127.0.0.1:9200")])
            .expect("Failed to load config");
        assert_eq!(config.metrics_addr().unwrap().to_string(), "127.0.0.1:9200");

        let config = Config::load_for_test(&[
            ("metrics.enabled", "true"),
            ("metrics.listen_addr", "not-an-addr"),
        ])
        .expect("Failed to load config");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tracking_interval_bounds() {
        let tracking = TrackingConfig::default();
        assert!(tracking.interval_in_bounds(1));
        assert!(tracking.interval_in_bounds(60));
        assert!(!tracking.interval_in_bounds(0));
        assert!(!tracking.interval_in_bounds(61));
    }
}
