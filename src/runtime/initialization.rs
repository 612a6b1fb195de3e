//! # Initialization
//!
//! Process bootstrap: rustls setup, tracing, configuration, metrics,
//! HTTP servers, Kubernetes client and the reconciler wiring.

use crate::config::{ApiToken, ControllerConfig};
use crate::controller::reconciler::Reconciler;
use crate::controller::server::{health_router, metrics_router, start_server};
use crate::observability::SyncMetrics;
use crate::provider::{RemoteInventory, ThousandEyesClient};
use crate::runtime::watch_loop::WatchLoop;
use crate::source::{ConfigMapSource, ConfigSource};
use anyhow::{Context, Result};
use kube::Client;
use prometheus::Registry;
use tracing::{error, info, warn};

/// Reconciler wired to ConfigMaps and the ThousandEyes API
pub type ClusterReconciler = Reconciler<ConfigMapSource, ThousandEyesClient>;

/// Everything needed to run the controller after bootstrap
pub struct InitializationResult {
    pub config: ControllerConfig,
    pub reconciler: ClusterReconciler,
    /// Watch side of the ConfigMap collaborator
    pub watch: ConfigMapSource,
    pub metrics: SyncMetrics,
}

impl std::fmt::Debug for InitializationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitializationResult")
            .field("config", &self.config)
            .field("metrics", &self.metrics.snapshot())
            .finish_non_exhaustive()
    }
}

impl InitializationResult {
    /// Watch loop that owns the reconciler from here on
    pub fn into_watch_loop(self) -> WatchLoop<ConfigMapSource, ClusterReconciler> {
        let delay = self.config.watch_reconnect_delay();
        WatchLoop::new(self.watch, self.reconciler, delay)
    }
}

/// Set up tracing with `RUST_LOG`, defaulting to info for this crate
pub fn init_tracing() {
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "thousandeyes_sync=info".into()),
        )
        .try_init()
    {
        eprintln!("Tracing subscriber already initialized: {e}");
    }
}

/// Initialize the controller runtime
///
/// This function handles:
/// - rustls crypto provider setup
/// - Tracing subscriber setup
/// - Configuration and credential loading
/// - Metrics registration
/// - Metrics and health server startup
/// - Kubernetes client creation
/// - Reconciler setup
///
/// # Errors
///
/// Any failure here is unrecoverable and ends the process with a non-zero exit code.
pub async fn initialize() -> Result<InitializationResult> {
    // Required for rustls 0.23+ when more than one provider is compiled in
    let provider_installed = rustls::crypto::ring::default_provider()
        .install_default()
        .is_ok();

    init_tracing();
    if !provider_installed {
        warn!("rustls crypto provider was already installed");
    }

    info!("Starting ThousandEyes Sync Controller");
    info!(
        "Build info: timestamp={}, datetime={}, git_hash={}",
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_DATETIME"),
        env!("BUILD_GIT_HASH")
    );

    let config = ControllerConfig::from_env();
    config.validate().context("Invalid controller configuration")?;
    let token = ApiToken::from_env().context("Missing ThousandEyes credentials")?;
    info!(
        namespace = config.namespace.as_str(),
        label_selector = config.label_selector.as_str(),
        api_base_url = config.api_base_url.as_str(),
        "Configuration loaded"
    );

    let registry = Registry::new();
    let metrics = SyncMetrics::register(&registry).context("Failed to register metrics")?;

    let metrics_port = config.metrics_port;
    tokio::spawn(async move {
        if let Err(e) = start_server("Metrics", metrics_port, metrics_router(registry)).await {
            error!("Metrics server error: {}", e);
        }
    });
    let health_port = config.health_port;
    tokio::spawn(async move {
        if let Err(e) = start_server("Health", health_port, health_router()).await {
            error!("Health server error: {}", e);
        }
    });

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;
    let configmaps = ConfigMapSource::new(
        client,
        &config.namespace,
        &config.label_selector,
        config.watch_timeout_secs,
    );

    let api = ThousandEyesClient::new(&config.api_base_url, token, config.http_timeout())
        .context("Failed to create ThousandEyes client")?;
    let inventory = RemoteInventory::new(api, config.retry_policy(), metrics.clone());
    let source = ConfigSource::new(configmaps.clone(), config.default_agents.clone());
    let reconciler = Reconciler::new(source, inventory);

    Ok(InitializationResult {
        config,
        reconciler,
        watch: configmaps,
        metrics,
    })
}
