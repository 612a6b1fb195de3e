//! # Constants
//!
//! Shared constants used throughout the controller.
//!
//! These values represent reasonable defaults and can be overridden via
//! environment variables where applicable (see [`crate::config::ControllerConfig`]).

/// Default namespace searched for test ConfigMaps
pub const DEFAULT_NAMESPACE: &str = "default";

/// Label selector identifying ConfigMaps that carry test definitions
pub const DEFAULT_LABEL_SELECTOR: &str = "app=thousandeyes-tests";

/// ConfigMap data key holding the YAML payload
pub const CONFIG_DATA_KEY: &str = "config.yaml";

/// ThousandEyes API v7 base URL
pub const DEFAULT_API_BASE_URL: &str = "https://api.thousandeyes.com/v7";

/// Path of the HTTP server test collection, relative to the API base URL
pub const HTTP_SERVER_TESTS_PATH: &str = "/tests/http-server";

/// Agents assigned to a test that does not name any
pub const DEFAULT_AGENTS: &[&str] = &["32"];

/// Per-connection watch timeout (seconds)
/// The API server rejects watch timeouts of 295s or more
pub const DEFAULT_WATCH_TIMEOUT_SECS: u32 = 290;

/// Upper bound accepted for the watch timeout (seconds)
pub const MAX_WATCH_TIMEOUT_SECS: u32 = 294;

/// Delay before reopening a watch that failed (seconds)
pub const DEFAULT_WATCH_RECONNECT_DELAY_SECS: u64 = 10;

/// Attempts per create/update call, including the first one
pub const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 5;

/// Delay before the first retry (seconds)
pub const DEFAULT_RETRY_BASE_DELAY_SECS: u64 = 2;

/// Growth factor applied to the retry delay after each attempt
pub const DEFAULT_RETRY_MULTIPLIER: u32 = 2;

/// Cap on the delay between two attempts (seconds)
pub const DEFAULT_RETRY_MAX_DELAY_SECS: u64 = 10;

/// Timeout for a single ThousandEyes API request (seconds)
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Default port of the Prometheus metrics endpoint
pub const DEFAULT_METRICS_PORT: u16 = 8000;

/// Default port of the health endpoint
pub const DEFAULT_HEALTH_PORT: u16 = 5000;

/// Environment variable carrying the ThousandEyes bearer token
pub const API_TOKEN_ENV: &str = "TE_API_TOKEN";
