//! # Configuration
//!
//! Environment-driven controller settings and credentials.

mod controller;
mod credentials;

pub use controller::{ConfigError, ControllerConfig};
pub use credentials::{ApiToken, CredentialsError};
