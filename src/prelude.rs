//! # Prelude
//!
//! Re-exports commonly used types and traits for convenience.
//!
//! ```rust
//! use thousandeyes_sync::prelude::*;
//! ```

pub use crate::model::{Agent, DesiredTest, ExistingTest};

pub use crate::source::{
    ChangeEvent, ChangeKind, ConfigDocument, ConfigSource, ConfigWatch, DesiredState,
    DocumentSource, SourceError,
};

pub use crate::provider::{ApiResponse, CallOutcome, InventoryError, RemoteInventory, TestsApi};

pub use crate::controller::reconciler::{plan, Reconcile, Reconciler, SyncAction, SyncPlan};
pub use crate::controller::retry::RetryPolicy;

pub use crate::config::{ApiToken, ControllerConfig};
pub use crate::observability::{MetricsSnapshot, SyncMetrics};
pub use crate::runtime::{WatchLoop, WatchState};
