//! # Controller Configuration
//!
//! Controller-level settings loaded from environment variables.

use crate::constants::{
    DEFAULT_AGENTS, DEFAULT_API_BASE_URL, DEFAULT_HEALTH_PORT, DEFAULT_HTTP_TIMEOUT_SECS,
    DEFAULT_LABEL_SELECTOR, DEFAULT_METRICS_PORT, DEFAULT_NAMESPACE, DEFAULT_RETRY_BASE_DELAY_SECS,
    DEFAULT_RETRY_MAX_ATTEMPTS, DEFAULT_RETRY_MAX_DELAY_SECS, DEFAULT_RETRY_MULTIPLIER,
    DEFAULT_WATCH_RECONNECT_DELAY_SECS, DEFAULT_WATCH_TIMEOUT_SECS, MAX_WATCH_TIMEOUT_SECS,
};
use crate::controller::retry::RetryPolicy;
use std::time::Duration;
use thiserror::Error;

/// Rejected configuration values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("WATCH_TIMEOUT_SECS must be between 1 and {max}, got {value}")]
    WatchTimeout { value: u32, max: u32 },
    #[error("RETRY_MAX_ATTEMPTS must be at least 1")]
    NoAttempts,
    #[error("RETRY_MAX_DELAY_SECS ({max}) is lower than RETRY_BASE_DELAY_SECS ({base})")]
    RetryCap { base: u64, max: u64 },
    #[error("METRICS_PORT and HEALTH_PORT must differ (both {0})")]
    PortClash(u16),
}

/// Controller-level configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
/// The API token is read separately, see [`crate::config::ApiToken`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Namespace searched for test ConfigMaps
    pub namespace: String,
    /// Label selector shared by listing and watching
    pub label_selector: String,
    /// ThousandEyes API base URL
    pub api_base_url: String,
    /// Agents assigned to tests that do not name any
    pub default_agents: Vec<String>,
    /// Per-connection watch timeout (seconds)
    pub watch_timeout_secs: u32,
    /// Delay before reopening a failed watch (seconds)
    pub watch_reconnect_delay_secs: u64,
    pub retry_max_attempts: u32,
    pub retry_base_delay_secs: u64,
    pub retry_multiplier: u32,
    pub retry_max_delay_secs: u64,
    /// Timeout of a single API request (seconds)
    pub http_timeout_secs: u64,
    pub metrics_port: u16,
    pub health_port: u16,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            label_selector: DEFAULT_LABEL_SELECTOR.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            default_agents: DEFAULT_AGENTS.iter().map(|a| (*a).to_string()).collect(),
            watch_timeout_secs: DEFAULT_WATCH_TIMEOUT_SECS,
            watch_reconnect_delay_secs: DEFAULT_WATCH_RECONNECT_DELAY_SECS,
            retry_max_attempts: DEFAULT_RETRY_MAX_ATTEMPTS,
            retry_base_delay_secs: DEFAULT_RETRY_BASE_DELAY_SECS,
            retry_multiplier: DEFAULT_RETRY_MULTIPLIER,
            retry_max_delay_secs: DEFAULT_RETRY_MAX_DELAY_SECS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            metrics_port: DEFAULT_METRICS_PORT,
            health_port: DEFAULT_HEALTH_PORT,
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            namespace: env_var_or_default_str("NAMESPACE", &defaults.namespace),
            label_selector: env_var_or_default_str(
                "CONFIGMAP_LABEL_SELECTOR",
                &defaults.label_selector,
            ),
            api_base_url: env_var_or_default_str("THOUSANDEYES_API_URL", &defaults.api_base_url),
            default_agents: env_var_or_default_list("DEFAULT_AGENTS", defaults.default_agents),
            watch_timeout_secs: env_var_or_default(
                "WATCH_TIMEOUT_SECS",
                defaults.watch_timeout_secs,
            ),
            watch_reconnect_delay_secs: env_var_or_default(
                "WATCH_RECONNECT_DELAY_SECS",
                defaults.watch_reconnect_delay_secs,
            ),
            retry_max_attempts: env_var_or_default(
                "RETRY_MAX_ATTEMPTS",
                defaults.retry_max_attempts,
            ),
            retry_base_delay_secs: env_var_or_default(
                "RETRY_BASE_DELAY_SECS",
                defaults.retry_base_delay_secs,
            ),
            retry_multiplier: env_var_or_default("RETRY_MULTIPLIER", defaults.retry_multiplier),
            retry_max_delay_secs: env_var_or_default(
                "RETRY_MAX_DELAY_SECS",
                defaults.retry_max_delay_secs,
            ),
            http_timeout_secs: env_var_or_default("HTTP_TIMEOUT_SECS", defaults.http_timeout_secs),
            metrics_port: env_var_or_default("METRICS_PORT", defaults.metrics_port),
            health_port: env_var_or_default("HEALTH_PORT", defaults.health_port),
        }
    }

    /// Reject values the controller cannot run with
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace.trim().is_empty() {
            return Err(ConfigError::Empty("NAMESPACE"));
        }
        if self.label_selector.trim().is_empty() {
            return Err(ConfigError::Empty("CONFIGMAP_LABEL_SELECTOR"));
        }
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::Empty("THOUSANDEYES_API_URL"));
        }
        if self.default_agents.is_empty() {
            return Err(ConfigError::Empty("DEFAULT_AGENTS"));
        }
        if self.watch_timeout_secs == 0 || self.watch_timeout_secs > MAX_WATCH_TIMEOUT_SECS {
            return Err(ConfigError::WatchTimeout {
                value: self.watch_timeout_secs,
                max: MAX_WATCH_TIMEOUT_SECS,
            });
        }
        if self.retry_max_attempts == 0 {
            return Err(ConfigError::NoAttempts);
        }
        if self.retry_max_delay_secs < self.retry_base_delay_secs {
            return Err(ConfigError::RetryCap {
                base: self.retry_base_delay_secs,
                max: self.retry_max_delay_secs,
            });
        }
        if self.metrics_port == self.health_port {
            return Err(ConfigError::PortClash(self.metrics_port));
        }
        Ok(())
    }

    /// Retry policy applied to create and update calls
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_max_attempts,
            Duration::from_secs(self.retry_base_delay_secs),
            self.retry_multiplier,
            Duration::from_secs(self.retry_max_delay_secs),
        )
    }

    /// Get watch reconnect delay duration
    pub fn watch_reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.watch_reconnect_delay_secs)
    }

    /// Get API request timeout duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// Read environment variable or return default value
fn env_var_or_default<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Read environment variable as string or return default
fn env_var_or_default_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read a comma-separated environment variable, ignoring blank entries
fn env_var_or_default_list(key: &str, default: Vec<String>) -> Vec<String> {
    std::env::var(key)
        .ok()
        .map(|v| parse_list(&v))
        .filter(|items| !items.is_empty())
        .unwrap_or(default)
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}
