//! # Watch Loop
//!
//! Watches the labeled ConfigMaps and triggers a sync for every change.
//!
//! The loop is a three-state machine:
//!
//! ```text
//!            subscribe ok              event -> sync, stay
//! Connecting ------------> Streaming <-------------------+
//!     ^   |                  |   |                       |
//!     |   | subscribe error  |   +-----------------------+
//!     |   v                  |
//!     | Reconnecting <-------+ stream error
//!     |   | sleep(reconnect delay)
//!     +---+
//!     ^
//!     +---------- stream ended (per-connection timeout), no delay
//! ```
//!
//! Every event is handled to completion before the next one is read, so a sync
//! never overlaps another one.

use crate::controller::reconciler::Reconcile;
use crate::source::{ChangeStream, ConfigWatch, SourceError};
use futures::StreamExt;
use std::time::Duration;
use tracing::{error, info};

/// Current position of the watch loop
pub enum WatchState {
    /// About to open a new subscription
    Connecting,
    /// Reading events from an open subscription
    Streaming(ChangeStream),
    /// The subscription failed; wait before connecting again
    Reconnecting(SourceError),
}

impl WatchState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Streaming(_) => "streaming",
            Self::Reconnecting(_) => "reconnecting",
        }
    }
}

impl std::fmt::Debug for WatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reconnecting(e) => f.debug_tuple("Reconnecting").field(e).finish(),
            other => f.write_str(other.name()),
        }
    }
}

/// Watch loop driving a reconciler from change events
#[derive(Debug)]
pub struct WatchLoop<W, R> {
    watch: W,
    reconciler: R,
    reconnect_delay: Duration,
}

impl<W: ConfigWatch, R: Reconcile> WatchLoop<W, R> {
    pub fn new(watch: W, reconciler: R, reconnect_delay: Duration) -> Self {
        Self {
            watch,
            reconciler,
            reconnect_delay,
        }
    }

    /// Perform exactly one transition
    pub async fn step(&self, state: WatchState) -> WatchState {
        match state {
            WatchState::Connecting => match self.watch.subscribe().await {
                Ok(stream) => {
                    info!("Started watching for ConfigMap changes...");
                    WatchState::Streaming(stream)
                }
                Err(e) => WatchState::Reconnecting(e),
            },
            WatchState::Streaming(mut stream) => match stream.next().await {
                Some(Ok(event)) => {
                    info!(
                        event.r#type = event.kind.as_str(),
                        resource.name = event.name.as_str(),
                        "ConfigMap changed: {} - {}",
                        event.kind.as_str(),
                        event.name
                    );
                    self.reconciler.reconcile().await;
                    WatchState::Streaming(stream)
                }
                Some(Err(e)) => WatchState::Reconnecting(e),
                None => {
                    info!("ConfigMap watch stream ended, reopening");
                    WatchState::Connecting
                }
            },
            WatchState::Reconnecting(e) => {
                error!(
                    "ConfigMap watcher failed: {}. Reconnecting in {} seconds...",
                    e,
                    self.reconnect_delay.as_secs()
                );
                tokio::time::sleep(self.reconnect_delay).await;
                WatchState::Connecting
            }
        }
    }

    /// Run forever
    pub async fn run(self) {
        let mut state = WatchState::Connecting;
        loop {
            state = self.step(state).await;
        }
    }
}
