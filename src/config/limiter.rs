//! Limiter configuration structures.

use std::env;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::{AppResult, Limit, LimiterError};

/// Environment variable holding the concurrency ceiling.
pub const MAX_RUNNING_ENV: &str = "LIMITER_MAX_RUNNING";
/// Environment variable selecting the signal backend.
pub const SIGNAL_BACKEND_ENV: &str = "LIMITER_SIGNAL_BACKEND";

/// Signal backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalBackendConfig {
    /// Probe the host runtime and pick whatever it supports.
    #[default]
    Auto,
    /// Synchronous in-process emitter.
    Inline,
    /// Listener task on the tokio runtime.
    Deferred,
}

impl std::str::FromStr for SignalBackendConfig {
    type Err = LimiterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "inline" => Ok(Self::Inline),
            "deferred" => Ok(Self::Deferred),
            other => Err(LimiterError::InvalidConfig(format!("unknown signal backend `{other}`"))),
        }
    }
}

/// Limiter configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimiterConfig {
    /// Maximum concurrently running tasks; one per CPU when absent.
    #[serde(default)]
    pub max_running: Option<i64>,
    /// Signal backend selection.
    #[serde(default)]
    pub signal: SignalBackendConfig,
}

impl LimiterConfig {
    /// Configuration with an explicit ceiling and probed signal backend.
    pub const fn with_max_running(max_running: i64) -> Self {
        Self {
            max_running: Some(max_running),
            signal: SignalBackendConfig::Auto,
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), LimiterError> {
        self.resolved_limit().map(|_| ())
    }

    /// The ceiling to build with, defaulting to the host's parallelism.
    pub fn resolved_limit(&self) -> Result<Limit, LimiterError> {
        self.max_running
            .map_or_else(|| Ok(Limit::available_parallelism()), Limit::try_from)
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, LimiterError> {
        let cfg: Self = serde_json::from_str(input)
            .map_err(|e| LimiterError::InvalidConfig(format!("parse error: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from the process environment, reading a `.env`
    /// file first when one is present.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let max_running = lookup(MAX_RUNNING_ENV)
            .map(|raw| {
                raw.trim()
                    .parse::<i64>()
                    .with_context(|| format!("{MAX_RUNNING_ENV} must be an integer, got `{raw}`"))
            })
            .transpose()?;
        let signal = lookup(SIGNAL_BACKEND_ENV)
            .map(|raw| raw.parse::<SignalBackendConfig>())
            .transpose()
            .context(SIGNAL_BACKEND_ENV)?
            .unwrap_or_default();

        let cfg = Self { max_running, signal };
        cfg.validate().context("limiter configuration from environment")?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_reads_both_keys() {
        let cfg = LimiterConfig::from_lookup(lookup(&[
            (MAX_RUNNING_ENV, "4"),
            (SIGNAL_BACKEND_ENV, "Deferred"),
        ]))
        .unwrap();
        assert_eq!(cfg.max_running, Some(4));
        assert_eq!(cfg.signal, SignalBackendConfig::Deferred);
    }

    #[test]
    fn test_from_lookup_defaults_when_unset() {
        let cfg = LimiterConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, LimiterConfig::default());
        assert!(cfg.resolved_limit().unwrap().get() >= 1);
    }

    #[test]
    fn test_from_lookup_rejects_garbage() {
        assert!(LimiterConfig::from_lookup(lookup(&[(MAX_RUNNING_ENV, "two")])).is_err());
        assert!(LimiterConfig::from_lookup(lookup(&[(MAX_RUNNING_ENV, "0")])).is_err());
        assert!(LimiterConfig::from_lookup(lookup(&[(SIGNAL_BACKEND_ENV, "carrier-pigeon")])).is_err());
    }
}
