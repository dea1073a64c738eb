use crate::cache::{DEFAULT_SWEEP_THRESHOLD, DEFAULT_TTL, TtlCache};
use std::{env, time::Duration};

pub const CACHE_ENABLED_VAR: &str = "RATEIO_CACHE_ENABLED";
pub const CACHE_TTL_SECS_VAR: &str = "RATEIO_CACHE_TTL_SECS";
pub const CACHE_SWEEP_THRESHOLD_VAR: &str = "RATEIO_CACHE_SWEEP_THRESHOLD";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} has invalid value '{value}': expected {expected}")]
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Engine settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub cache_enabled: bool,
    pub cache_ttl: Duration,
    pub cache_sweep_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_ttl: DEFAULT_TTL,
            cache_sweep_threshold: DEFAULT_SWEEP_THRESHOLD,
        }
    }
}

impl EngineConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through `lookup`; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let cache_enabled = match lookup(CACHE_ENABLED_VAR) {
            Some(value) => parse_bool(CACHE_ENABLED_VAR, &value)?,
            None => defaults.cache_enabled,
        };
        let cache_ttl = match lookup(CACHE_TTL_SECS_VAR) {
            Some(value) => Duration::from_secs(parse_number(CACHE_TTL_SECS_VAR, &value)?),
            None => defaults.cache_ttl,
        };
        let cache_sweep_threshold = match lookup(CACHE_SWEEP_THRESHOLD_VAR) {
            Some(value) => parse_number(CACHE_SWEEP_THRESHOLD_VAR, &value)?,
            None => defaults.cache_sweep_threshold,
        };

        let config = Self {
            cache_enabled,
            cache_ttl,
            cache_sweep_threshold,
        };
        tracing::debug!(
            cache_enabled = config.cache_enabled,
            cache_ttl_secs = config.cache_ttl.as_secs(),
            cache_sweep_threshold = config.cache_sweep_threshold,
            "Engine configuration loaded"
        );
        Ok(config)
    }

    /// The cache these settings describe, or `None` when caching is disabled.
    pub fn build_cache(&self) -> Option<TtlCache> {
        self.cache_enabled
            .then(|| TtlCache::new(self.cache_ttl, self.cache_sweep_threshold))
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            expected: "a boolean",
        }),
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            expected: "a non-negative integer",
        })
}
