//! Runtime configuration: defaults, environment overrides and roster files.

use crate::completion::ollama::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS};
use crate::completion::{OllamaConfig, RetryPolicy};
use crate::error::ConfigError;
use crate::orchestrator::OrchestratorConfig;
use crate::persona::Persona;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub const ENV_ENDPOINT: &str = "OLLAMA_HOST";
pub const ENV_RETRIES: &str = "ROUNDTABLE_RETRIES";
pub const ENV_RETRY_DELAY_MS: &str = "ROUNDTABLE_RETRY_DELAY_MS";
pub const ENV_ROUND_DELAY_MS: &str = "ROUNDTABLE_ROUND_DELAY_MS";
pub const ENV_TIMEOUT_SECS: &str = "ROUNDTABLE_TIMEOUT_SECS";

/// Everything needed to wire a backend, client and orchestrator together.
///
/// # Examples
///
/// ```ignore
/// use persona_roundtable::config::RoundtableConfig;
///
/// // Defaults, then whatever the environment overrides
/// let config = RoundtableConfig::from_env()?;
///
/// // Customize specific values
/// let config = RoundtableConfig {
///     endpoint: "http://gpu-box:11434".to_string(),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundtableConfig {
    /// Ollama base URL.
    ///
    /// **Default:** `http://localhost:11434`
    pub endpoint: String,

    /// Per-request HTTP timeout.
    ///
    /// **Default:** 120 seconds
    pub request_timeout: Duration,

    /// Attempts per completion and the wait between them.
    ///
    /// **Default:** 3 attempts, 1 second apart
    pub retry: RetryPolicy,

    /// Pause after each follow-up round.
    ///
    /// **Default:** 1 second
    pub round_delay: Duration,
}

impl Default for RoundtableConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
            round_delay: OrchestratorConfig::default().round_delay,
        }
    }
}

impl RoundtableConfig {
    /// Loads defaults overridden by the process environment.
    ///
    /// Environment variables:
    /// - `OLLAMA_HOST` (optional, defaults to `http://localhost:11434`)
    /// - `ROUNDTABLE_RETRIES` (optional, defaults to 3)
    /// - `ROUNDTABLE_RETRY_DELAY_MS` (optional, defaults to 1000)
    /// - `ROUNDTABLE_ROUND_DELAY_MS` (optional, defaults to 1000)
    /// - `ROUNDTABLE_TIMEOUT_SECS` (optional, defaults to 120)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            config.endpoint = normalize_endpoint(&endpoint);
        }
        if let Some(raw) = lookup(ENV_RETRIES) {
            config.retry.max_attempts = parse_value(ENV_RETRIES, &raw)?;
        }
        if let Some(raw) = lookup(ENV_RETRY_DELAY_MS) {
            config.retry.delay = Duration::from_millis(parse_value(ENV_RETRY_DELAY_MS, &raw)?);
        }
        if let Some(raw) = lookup(ENV_ROUND_DELAY_MS) {
            config.round_delay = Duration::from_millis(parse_value(ENV_ROUND_DELAY_MS, &raw)?);
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            config.request_timeout = Duration::from_secs(parse_value(ENV_TIMEOUT_SECS, &raw)?);
        }

        Ok(config)
    }

    pub fn ollama(&self) -> OllamaConfig {
        OllamaConfig {
            endpoint: self.endpoint.clone(),
            timeout: self.request_timeout,
        }
    }

    pub fn orchestrator(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            round_delay: self.round_delay,
            ..Default::default()
        }
    }
}

/// Reads a JSON array of personas, e.g.
/// `[{"name": "gemma", "instruction": "...", "model": "gemma:2b"}]`.
pub fn load_roster(path: impl AsRef<Path>) -> Result<Vec<Persona>, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Adds `http://` when the scheme is missing (`OLLAMA_HOST` is often
/// `0.0.0.0:11434`) and drops trailing slashes.
pub fn normalize_endpoint(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    })
}
