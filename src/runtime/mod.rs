//! # Runtime
//!
//! - `initialization`: Process bootstrap and component wiring
//! - `watch_loop`: ConfigMap watch state machine driving the reconciler

pub mod initialization;
pub mod watch_loop;

pub use watch_loop::{WatchLoop, WatchState};
