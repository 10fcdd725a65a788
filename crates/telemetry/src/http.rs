// Path: crates/telemetry/src/http.rs
//! Prometheus exposition endpoint.

use std::future::Future;
use std::net::SocketAddr;

use axum::{routing::get, Router};
use prometheus::{Encoder, TextEncoder};

/// Renders the default registry in the Prometheus text format.
fn render_metrics() -> String {
    let metric_families = prometheus::gather();
    let mut buf = Vec::new();
    let encoder = TextEncoder::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buf) {
        tracing::error!(target: "metrics", error = %e, "failed to encode metrics");
        return String::new();
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Serves the metrics endpoint on `addr` until `shutdown` resolves.
pub async fn serve_metrics(
    addr: SocketAddr,
    path: &str,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let path = if path.starts_with('/') {
        path.to_owned()
    } else {
        format!("/{path}")
    };
    let app = Router::new().route(&path, get(|| async { render_metrics() }));
    tracing::info!(target: "metrics", %addr, %path, "metrics endpoint listening");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
