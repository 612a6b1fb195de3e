//! # Credentials
//!
//! ThousandEyes bearer token, read once at startup.

use crate::constants::API_TOKEN_ENV;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("{0} is not set or empty")]
    Missing(&'static str),
}

/// Bearer token for the ThousandEyes API
///
/// The value is wiped from memory on drop and never shows up in `Debug` output.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Read the token from `TE_API_TOKEN`
    ///
    /// # Errors
    ///
    /// Returns [`CredentialsError::Missing`] when the variable is unset or blank.
    pub fn from_env() -> Result<Self, CredentialsError> {
        std::env::var(API_TOKEN_ENV)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(Self)
            .ok_or(CredentialsError::Missing(API_TOKEN_ENV))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiToken(***)")
    }
}
