// Path: crates/server/src/lib.rs
//! gRPC surface of the scope checking service.
//!
//! Thin request/response mapping around [`scopesvc_engine`]: both endpoints
//! are stateless, so the service types are unit structs and all shared state
//! lives in the engine's process-wide profiles and metric sinks.
#![forbid(unsafe_code)]
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

pub mod grpc;
pub mod metrics;

pub use grpc::{serve, ScopeCheckerImpl, UriCanonicalizerImpl};
