// Path: crates/server/src/metrics.rs
//! Request counter wiring.

use once_cell::sync::OnceCell;
use scopesvc_telemetry::sinks::{NopSink, ScopeCheckMetricsSink};

static RPC_SINK: OnceCell<&'static dyn ScopeCheckMetricsSink> = OnceCell::new();
static NOP_SINK: NopSink = NopSink;

/// Wires the process-wide request metrics sink. Later calls are ignored.
pub fn set_rpc_metrics(sink: &'static dyn ScopeCheckMetricsSink) {
    let _ = RPC_SINK.set(sink);
}

/// The wired sink, or a no-op before wiring.
pub fn rpc_metrics() -> &'static dyn ScopeCheckMetricsSink {
    RPC_SINK.get().copied().unwrap_or(&NOP_SINK)
}
