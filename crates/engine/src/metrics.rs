// Path: crates/engine/src/metrics.rs
//! Script runtime metrics wiring.

use once_cell::sync::OnceCell;
use scopesvc_telemetry::sinks::{NopSink, ScriptMetricsSink};

static SCRIPT_SINK: OnceCell<&'static dyn ScriptMetricsSink> = OnceCell::new();
static NOP_SINK: NopSink = NopSink;

/// Wires the process-wide script metrics sink. Later calls are ignored.
pub fn set_script_metrics(sink: &'static dyn ScriptMetricsSink) {
    let _ = SCRIPT_SINK.set(sink);
}

/// The wired sink, or a no-op before wiring.
pub fn script_metrics() -> &'static dyn ScriptMetricsSink {
    SCRIPT_SINK.get().copied().unwrap_or(&NOP_SINK)
}
