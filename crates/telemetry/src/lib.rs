// Path: crates/telemetry/src/lib.rs
pub mod http;
pub mod init;
pub mod prometheus;
pub mod sinks;
