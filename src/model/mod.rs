//! # Model
//!
//! Test records exchanged between the ConfigMap source, the reconciler and
//! the ThousandEyes API. All of them are rebuilt on every reconciliation pass.

mod desired;
mod existing;

pub use desired::{default_name, Agent, AgentRef, DesiredTest, DesiredTestError, RawHttpTest};
pub use existing::ExistingTest;
