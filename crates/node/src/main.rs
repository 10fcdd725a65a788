// Path: crates/node/src/main.rs
//! Scope checking service daemon.

#![forbid(unsafe_code)]

use std::net::SocketAddr;

use anyhow::Result;
use clap::Parser;
use scopesvc_engine::canonicalize;
use scopesvc_telemetry::http::serve_metrics;
use scopesvc_telemetry::init::{init_tracing, LogFormat, TracingOpts};
use scopesvc_telemetry::prometheus;

#[derive(Parser, Debug)]
#[clap(name = "scopesvc", about = "Scope checking service for a web crawler.")]
struct Opts {
    /// Interface the gRPC endpoint binds. Empty means all interfaces.
    #[clap(long, env = "INTERFACE", default_value = "")]
    interface: String,
    /// Port the gRPC endpoint binds.
    #[clap(long, env = "PORT", default_value_t = 8080)]
    port: u16,
    /// Keep URI fragments instead of stripping them during canonicalization.
    #[clap(long, env = "INCLUDE_FRAGMENT")]
    include_fragment: bool,
    /// Interface the metrics endpoint binds. Empty means all interfaces.
    #[clap(long, env = "METRICS_INTERFACE", default_value = "")]
    metrics_interface: String,
    /// Port the metrics endpoint binds.
    #[clap(long, env = "METRICS_PORT", default_value_t = 9153)]
    metrics_port: u16,
    /// HTTP path of the metrics endpoint.
    #[clap(long, env = "METRICS_PATH", default_value = "/metrics")]
    metrics_path: String,
    /// Log filter when RUST_LOG is unset (trace, debug, info, warn, error).
    #[clap(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
    /// Log line format (logfmt, json).
    #[clap(long, env = "LOG_FORMAT", default_value = "logfmt")]
    log_format: LogFormat,
    /// Record the source location of each log line.
    #[clap(long, env = "LOG_METHOD")]
    log_method: bool,
}

fn listen_addr(interface: &str, port: u16) -> Result<SocketAddr> {
    let host = if interface.is_empty() {
        "0.0.0.0"
    } else {
        interface
    };
    Ok(format!("{host}:{port}").parse()?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let opts = Opts::parse();
    init_tracing(&TracingOpts {
        level: opts.log_level.clone(),
        format: opts.log_format,
        with_location: opts.log_method,
    });

    canonicalize::init(canonicalize::Options {
        include_fragment: opts.include_fragment,
    })?;

    let sink = prometheus::install();
    scopesvc_engine::metrics::set_script_metrics(sink);
    scopesvc_server::metrics::set_rpc_metrics(sink);

    let metrics_addr = listen_addr(&opts.metrics_interface, opts.metrics_port)?;
    let metrics_path = opts.metrics_path.clone();
    tokio::spawn(async move {
        if let Err(err) = serve_metrics(metrics_addr, &metrics_path, std::future::pending()).await
        {
            tracing::error!(target: "metrics", error = %err, "metrics endpoint failed");
        }
    });

    let addr = listen_addr(&opts.interface, opts.port)?;
    scopesvc_server::serve(addr, async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for the shutdown signal");
            return;
        }
        tracing::info!("shutting down");
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_interface_binds_all() {
        assert_eq!(
            listen_addr("", 8080).unwrap(),
            "0.0.0.0:8080".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            listen_addr("127.0.0.1", 9153).unwrap(),
            "127.0.0.1:9153".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn bogus_interface_is_rejected() {
        assert!(listen_addr("not an address", 8080).is_err());
    }
}
