// Path: crates/ipc/src/lib.rs
//! Wire types and gRPC stubs for the scope checking service.
//!
//! The `.proto` sources under `proto/` are the authoritative contract. The
//! prost/tonic output is committed under `src/gen/` so builds stay hermetic
//! and do not depend on a `protoc` install; regenerate with `tonic-build`
//! when the contract changes.
#![forbid(unsafe_code)]

/// Shared message types (`scopesvc.commons.v1`).
pub mod commons {
    pub mod v1 {
        include!("gen/scopesvc.commons.v1.rs");
    }
}

/// Service surface (`scopesvc.v1`).
pub mod v1 {
    include!("gen/scopesvc.v1.rs");
}
