// Path: crates/engine/src/lib.rs
//! Scope evaluation engine.
//!
//! Decides whether a discovered URI belongs in a crawl. The decision is made
//! by a small per-request script evaluated against the canonical form of the
//! URI and its crawl context (seed, referrer, discovery path, annotations).
//!
//! The crate has two halves: [`canonicalize`] normalizes URIs, and [`script`]
//! compiles and runs scope scripts in a sandboxed Starlark environment,
//! classifying every outcome into an include/exclude verdict with a fixed
//! numeric reason code.
// deny rather than forbid: derive(ProvidesStaticType) expands to `unsafe impl`,
// which the deriving items opt into with #[allow(unsafe_code)].
#![deny(unsafe_code)]
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

pub mod canonicalize;
pub mod metrics;
pub mod script;

pub use script::{check_scope, CheckRequest, ScopeCheckResult, ScopeStatus, StatusError, Verdict};
