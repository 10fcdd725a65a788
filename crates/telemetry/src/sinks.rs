// Path: crates/telemetry/src/sinks.rs
//! Defines abstract traits for metrics reporting, decoupling core logic from the backend.

/// A no-op sink for use in tests where metrics are not needed.
#[derive(Debug, Clone, Copy)]
pub struct NopSink;

// --- Trait Definitions ---

/// Request-level counters for the gRPC surface.
pub trait ScopeCheckMetricsSink: Send + Sync + std::fmt::Debug {
    fn inc_scopechecks(&self);
    /// Counts one response, labeled by its decision code (0 for include).
    fn inc_scopecheck_response(&self, code: i32);
    fn inc_canonicalizations(&self);
}
impl ScopeCheckMetricsSink for NopSink {
    fn inc_scopechecks(&self) {}
    fn inc_scopecheck_response(&self, _code: i32) {}
    fn inc_canonicalizations(&self) {}
}

/// Timings for scope script compilation and execution.
pub trait ScriptMetricsSink: Send + Sync + std::fmt::Debug {
    fn observe_compile_seconds(&self, duration_secs: f64);
    fn observe_execute_seconds(&self, duration_secs: f64);
}
impl ScriptMetricsSink for NopSink {
    fn observe_compile_seconds(&self, _duration_secs: f64) {}
    fn observe_execute_seconds(&self, _duration_secs: f64) {}
}

// A unified sink that implements all domain-specific traits
pub trait MetricsSink: ScopeCheckMetricsSink + ScriptMetricsSink {}

// Blanket implementation
impl<T> MetricsSink for T where T: ScopeCheckMetricsSink + ScriptMetricsSink {}
