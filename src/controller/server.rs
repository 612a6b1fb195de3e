//! # HTTP Servers
//!
//! Passive endpoints exposed next to the sync loop:
//! - `/metrics` - Prometheus metrics in text format (metrics port, 8000 by default)
//! - `/health` - Static health status (health port, 5000 by default)
//!
//! Both read only process-wide state and never touch the reconciler.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use prometheus::{Encoder, Registry, TextEncoder};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Router serving `/metrics` from `registry`
pub fn metrics_router(registry: Registry) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(registry)
}

/// Router serving `/health`
pub fn health_router() -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
}

/// Bind `port` on all interfaces and serve `router` until the process exits
///
/// # Errors
///
/// Fails when the port cannot be bound or the server stops with an I/O error.
pub async fn start_server(name: &str, port: u16, router: Router) -> Result<(), anyhow::Error> {
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await?;
    serve(name, listener, router).await
}

/// Serve `router` on an already bound listener
///
/// # Errors
///
/// Fails when the server stops with an I/O error.
pub async fn serve(name: &str, listener: TcpListener, router: Router) -> Result<(), anyhow::Error> {
    info!("{} server listening on {}", name, listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}

async fn metrics_handler(State(registry): State<Registry>) -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain")],
            format!("Failed to encode metrics: {e}").into_bytes(),
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        buffer,
    )
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
