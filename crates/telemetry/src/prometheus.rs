// Path: crates/telemetry/src/prometheus.rs
//! A concrete implementation of the metrics sinks using the Prometheus crate.

use crate::sinks::*;
use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Histogram, IntCounter,
    IntCounterVec,
};

/// Latency buckets for script timings, in seconds. Scripts are usually
/// sub-millisecond; the long tail covers pathological ones.
const SCRIPT_SECONDS_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0, 20.0, 30.0,
    40.0, 50.0, 60.0, 120.0, 180.0, 240.0,
];

// --- Metric Definitions ---

static CANONICALIZATIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "scopesvc_canonicalizations_total",
        "Total number of URIs canonicalized."
    )
    .unwrap()
});
static SCOPECHECKS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "scopesvc_scopechecks_total",
        "Total number of scope check requests."
    )
    .unwrap()
});
static SCOPECHECK_RESPONSE_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "scopesvc_scopecheck_response_total",
        "Total number of scope check responses by decision code.",
        &["code"]
    )
    .unwrap()
});
static SCRIPT_COMPILE_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "scopesvc_script_compile_seconds",
        "Time spent compiling scope scripts.",
        SCRIPT_SECONDS_BUCKETS.to_vec()
    )
    .unwrap()
});
static SCRIPT_EXECUTE_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "scopesvc_script_execute_seconds",
        "Time spent executing scope scripts.",
        SCRIPT_SECONDS_BUCKETS.to_vec()
    )
    .unwrap()
});

#[derive(Debug, Clone, Copy)]
pub struct PrometheusSink;

impl ScopeCheckMetricsSink for PrometheusSink {
    fn inc_scopechecks(&self) {
        SCOPECHECKS_TOTAL.inc();
    }
    fn inc_scopecheck_response(&self, code: i32) {
        SCOPECHECK_RESPONSE_TOTAL
            .with_label_values(&[&code.to_string()])
            .inc();
    }
    fn inc_canonicalizations(&self) {
        CANONICALIZATIONS_TOTAL.inc();
    }
}
impl ScriptMetricsSink for PrometheusSink {
    fn observe_compile_seconds(&self, duration_secs: f64) {
        SCRIPT_COMPILE_SECONDS.observe(duration_secs);
    }
    fn observe_execute_seconds(&self, duration_secs: f64) {
        SCRIPT_EXECUTE_SECONDS.observe(duration_secs);
    }
}

/// Registers every collector and yields the process-wide sink. The concrete
/// type lets callers wire the sink into each per-trait cell.
pub fn install() -> &'static PrometheusSink {
    static SINK: PrometheusSink = PrometheusSink;
    Lazy::force(&CANONICALIZATIONS_TOTAL);
    Lazy::force(&SCOPECHECKS_TOTAL);
    Lazy::force(&SCOPECHECK_RESPONSE_TOTAL);
    Lazy::force(&SCRIPT_COMPILE_SECONDS);
    Lazy::force(&SCRIPT_EXECUTE_SECONDS);
    &SINK
}
