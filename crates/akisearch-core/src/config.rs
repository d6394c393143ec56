//! Configuration management for AkiSearch
//!
//! This module provides a layered configuration system that supports:
//! - YAML/TOML configuration files
//! - Environment variable overrides
//! - Reasonable defaults
//! - Configuration validation

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Root configuration structure for AkiSearch
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AkisearchConfig {
    #[serde(default)]
    pub connection: ConnectionConfig,

    #[serde(default)]
    pub retry: RetryConfig,
}

impl AkisearchConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Environment variables (highest priority)
    /// 2. Config file specified by AKISEARCH_CONFIG env var
    /// 3. ./config/akisearch.{yaml,toml}
    /// 4. /etc/akisearch/akisearch.{yaml,toml}
    /// 5. Hardcoded defaults (lowest priority)
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var("AKISEARCH_CONFIG").ok();

        // Example: AKISEARCH__CONNECTION__ENDPOINT=http://search:9200/
        let environment = Environment::with_prefix("AKISEARCH")
            .separator("__")
            .try_parsing(true);

        Self::load_layered(
            &[SYSTEM_CONFIG_PATH, LOCAL_CONFIG_PATH],
            explicit.as_deref(),
            environment,
        )
    }

    /// Layer `search_paths` (lowest priority first), then the `explicit`
    /// file, then `environment` over the defaults.
    fn load_layered(
        search_paths: &[&str],
        explicit: Option<&str>,
        environment: Environment,
    ) -> Result<Self, ConfigError> {
        let mut builder = Self::set_defaults(Config::builder())?;

        // Later sources override earlier ones.
        for path in search_paths {
            builder = builder.add_source(File::with_name(path).required(false));
        }

        if let Some(path) = explicit {
            builder = builder.add_source(File::with_name(path).required(false));
        }

        builder = builder.add_source(environment);

        let config: AkisearchConfig = builder.build()?.try_deserialize()?;

        config.validate()?;

        debug!(
            endpoint = %config.connection.endpoint,
            index = ?config.connection.index,
            max_attempts = config.retry.max_attempts,
            "Loaded configuration"
        );

        Ok(config)
    }

    fn set_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            .set_default("connection.endpoint", DEFAULT_ENDPOINT)?
            .set_default("connection.timeout_ms", DEFAULT_TIMEOUT_MS as i64)?
            .set_default("connection.prefer_get_requests", false)?
            .set_default("retry.max_attempts", i64::from(DEFAULT_MAX_ATTEMPTS))?
            .set_default("retry.initial_backoff_ms", DEFAULT_INITIAL_BACKOFF_MS as i64)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.connection.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ConfigError::Message(
                "connection.endpoint must not be empty".to_string(),
            ));
        }

        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(ConfigError::Message(format!(
                "connection.endpoint must be an http(s) URL, got '{}'",
                endpoint
            )));
        }

        if let Some(index) = &self.connection.index {
            if index.trim().is_empty() {
                return Err(ConfigError::Message(
                    "connection.index must not be blank when set".to_string(),
                ));
            }
        }

        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Message(
                "retry.max_attempts must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Load configuration from a specific file path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config: AkisearchConfig = Self::set_defaults(Config::builder())?
            .add_source(File::from(path.as_ref()))
            .build()?
            .try_deserialize()?;

        config.validate()?;

        Ok(config)
    }
}

const SYSTEM_CONFIG_PATH: &str = "/etc/akisearch/akisearch";
const LOCAL_CONFIG_PATH: &str = "./config/akisearch";

const DEFAULT_ENDPOINT: &str = "http://localhost:9200/";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_MAX_ATTEMPTS: u32 = 10;
const DEFAULT_INITIAL_BACKOFF_MS: u64 = 100;

/// Search endpoint configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionConfig {
    /// Base URL of the search endpoint (e.g. "http://localhost:9200/")
    pub endpoint: String,

    /// Index to search; all indexes when absent
    #[serde(default)]
    pub index: Option<String>,

    /// Server-side search timeout in milliseconds (0 disables it in request bodies)
    pub timeout_ms: u64,

    /// Use compact query-string requests whenever the request allows it
    #[serde(default)]
    pub prefer_get_requests: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            index: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            prefer_get_requests: false,
        }
    }
}

impl ConnectionConfig {
    /// Convert timeout to Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Retry configuration for search execution
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,

    /// Delay before the first retry; doubles after every failed attempt
    pub initial_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff_ms: DEFAULT_INITIAL_BACKOFF_MS,
        }
    }
}

impl RetryConfig {
    /// Get initial backoff duration
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }
}
