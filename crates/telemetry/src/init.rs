// Path: crates/telemetry/src/init.rs
use std::str::FromStr;

use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable key=value lines.
    Logfmt,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "logfmt" => Ok(LogFormat::Logfmt),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}' (logfmt, json)")),
        }
    }
}

/// Options for the global `tracing` subscriber.
#[derive(Debug, Clone)]
pub struct TracingOpts {
    /// Default filter directive when `RUST_LOG` is unset, e.g. "info".
    pub level: String,
    pub format: LogFormat,
    /// Record the source file and line of each event.
    pub with_location: bool,
}

impl Default for TracingOpts {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Logfmt,
            with_location: false,
        }
    }
}

/// Initializes the global `tracing` subscriber. Call once, at startup.
pub fn init_tracing(opts: &TracingOpts) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&opts.level));
    tracing_log::LogTracer::init().expect("Failed to set `log` to `tracing` bridge");
    match opts.format {
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_file(opts.with_location)
                .with_line_number(opts.with_location)
                .with_timer(fmt::time::UtcTime::rfc_3339());
            let subscriber = Registry::default().with(filter).with(fmt_layer);
            tracing::subscriber::set_global_default(subscriber)
                .expect("Failed to set global subscriber");
        }
        LogFormat::Logfmt => {
            let fmt_layer = fmt::layer()
                .with_target(true)
                .with_file(opts.with_location)
                .with_line_number(opts.with_location)
                .with_timer(fmt::time::UtcTime::rfc_3339());
            let subscriber = Registry::default().with(filter).with(fmt_layer);
            tracing::subscriber::set_global_default(subscriber)
                .expect("Failed to set global subscriber");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_parses_case_insensitively() {
        assert_eq!("LogFmt".parse::<LogFormat>().unwrap(), LogFormat::Logfmt);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
