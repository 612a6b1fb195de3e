//! ThousandEyes Sync Controller Library
//!
//! Reconciles ThousandEyes HTTP server tests with the tests declared in labeled
//! Kubernetes ConfigMaps. Missing tests are created, existing ones (matched by url)
//! are updated, and dry-run mode only logs what would happen.
//!
//! ## Quick Start
//!
//! ```rust
//! use thousandeyes_sync::prelude::*;
//! ```

pub mod config;
pub mod constants;
pub mod controller;
pub mod model;
pub mod observability;
pub mod prelude;
pub mod provider;
pub mod runtime;
pub mod source;
