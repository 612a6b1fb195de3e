//! # Controller
//!
//! Core controller modules.
//!
//! - `reconciler`: Desired versus existing test diffing and the sync pass
//! - `retry`: Exponential backoff policy for mutating API calls
//! - `server`: HTTP servers for metrics and health checks

pub mod reconciler;
pub mod retry;
pub mod server;
