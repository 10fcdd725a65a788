// Path: crates/engine/src/script/status.rs
//! Scope decision codes and their script-visible value type.

// derive(ProvidesStaticType) expands to `unsafe impl`; no hand-written unsafe here.
#![allow(unsafe_code)]

use std::fmt;
use std::hash::Hash;

use allocative::Allocative;
use anyhow::bail;
use starlark::collections::StarlarkHasher;
use starlark::environment::GlobalsBuilder;
use starlark::starlark_simple_value;
use starlark::values::{starlark_value, NoSerialize, ProvidesStaticType, StarlarkValue, Value};
use thiserror::Error;

/// A scope decision code.
///
/// Every named code is registered as a script global, so scripts write
/// `setStatus(Blocked)` or `isSameHost().then(Include)` directly. The numeric
/// values are shared with the rest of the crawler and never change:
///
/// *     0 Include                   in scope, fetch it
/// *    -5 RuntimeException          unexpected runtime failure
/// *    -7 IllegalUri                URI recognized as unsupported or illegal
/// * -4000 ChaffDetection            trap or negligible-value content
/// * -4001 TooManyHops               too many link hops away from the seed
/// * -4002 TooManyTransitiveHops     too many embed hops from the last URI in scope
/// * -5001 Blocked                   blocked from fetch by user setting
/// * -5002 BlockedByCustomProcessor  blocked by a custom processor
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ProvidesStaticType, NoSerialize, Allocative,
)]
pub struct ScopeStatus(i32);

starlark_simple_value!(ScopeStatus);

impl ScopeStatus {
    pub const INCLUDE: ScopeStatus = ScopeStatus(0);
    pub const RUNTIME_EXCEPTION: ScopeStatus = ScopeStatus(-5);
    pub const ILLEGAL_URI: ScopeStatus = ScopeStatus(-7);
    pub const CHAFF_DETECTION: ScopeStatus = ScopeStatus(-4000);
    pub const TOO_MANY_HOPS: ScopeStatus = ScopeStatus(-4001);
    pub const TOO_MANY_TRANSITIVE_HOPS: ScopeStatus = ScopeStatus(-4002);
    pub const BLOCKED: ScopeStatus = ScopeStatus(-5001);
    pub const BLOCKED_BY_CUSTOM_PROCESSOR: ScopeStatus = ScopeStatus(-5002);

    const NAMED: [(&'static str, ScopeStatus); 8] = [
        ("Include", Self::INCLUDE),
        ("RuntimeException", Self::RUNTIME_EXCEPTION),
        ("IllegalUri", Self::ILLEGAL_URI),
        ("ChaffDetection", Self::CHAFF_DETECTION),
        ("TooManyHops", Self::TOO_MANY_HOPS),
        ("TooManyTransitiveHops", Self::TOO_MANY_TRANSITIVE_HOPS),
        ("Blocked", Self::BLOCKED),
        ("BlockedByCustomProcessor", Self::BLOCKED_BY_CUSTOM_PROCESSOR),
    ];

    /// The numeric code carried on the wire.
    pub fn code(self) -> i32 {
        self.0
    }

    pub(crate) fn from_code(code: i32) -> ScopeStatus {
        ScopeStatus(code)
    }

    pub fn from_name(name: &str) -> Option<ScopeStatus> {
        Self::NAMED
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, s)| *s)
    }

    fn name(self) -> Option<&'static str> {
        Self::NAMED
            .iter()
            .find(|(_, s)| *s == self)
            .map(|(n, _)| *n)
    }

    /// Accepts either a status value or its registered name as a string.
    pub(crate) fn from_param(v: Value) -> anyhow::Result<ScopeStatus> {
        if let Some(status) = ScopeStatus::from_value(v) {
            return Ok(*status);
        }
        if let Some(name) = v.unpack_str() {
            return match ScopeStatus::from_name(name) {
                Some(status) => Ok(status),
                None => bail!("unknown status '{name}'"),
            };
        }
        bail!("illegal status type {}", v.get_type())
    }

    /// Registers every named code as a global.
    pub(crate) fn register(builder: &mut GlobalsBuilder) {
        for (name, status) in Self::NAMED {
            builder.set(name, status);
        }
    }
}

impl fmt::Display for ScopeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.0),
        }
    }
}

#[starlark_value(type = "status")]
impl<'v> StarlarkValue<'v> for ScopeStatus {
    fn equals(&self, other: Value<'v>) -> starlark::Result<bool> {
        Ok(ScopeStatus::from_value(other).is_some_and(|o| o == self))
    }

    fn to_bool(&self) -> bool {
        true
    }

    fn write_hash(&self, hasher: &mut StarlarkHasher) -> starlark::Result<()> {
        self.0.hash(hasher);
        Ok(())
    }
}

/// A decision carried through the script runtime's error channel, and the
/// error shape reported to callers: a numeric code, a short message, and a
/// human-readable detail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code} {msg}: {detail}")]
pub struct StatusError {
    pub code: i32,
    pub msg: String,
    pub detail: String,
}

impl StatusError {
    /// An error named after its decision code, as thrown by builtins that
    /// both decide and terminate.
    pub(crate) fn of(status: ScopeStatus, detail: impl Into<String>) -> StatusError {
        StatusError {
            code: status.code(),
            msg: status.to_string(),
            detail: detail.into(),
        }
    }

    pub(crate) fn with_msg(
        status: ScopeStatus,
        msg: impl Into<String>,
        detail: impl Into<String>,
    ) -> StatusError {
        StatusError {
            code: status.code(),
            msg: msg.into(),
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_codes_round_trip() {
        for (name, status) in ScopeStatus::NAMED {
            assert_eq!(ScopeStatus::from_name(name), Some(status));
            assert_eq!(status.to_string(), name);
        }
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert_eq!(ScopeStatus::from_name("NotAStatus"), None);
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(ScopeStatus::INCLUDE.code(), 0);
        assert_eq!(ScopeStatus::RUNTIME_EXCEPTION.code(), -5);
        assert_eq!(ScopeStatus::ILLEGAL_URI.code(), -7);
        assert_eq!(ScopeStatus::CHAFF_DETECTION.code(), -4000);
        assert_eq!(ScopeStatus::TOO_MANY_HOPS.code(), -4001);
        assert_eq!(ScopeStatus::TOO_MANY_TRANSITIVE_HOPS.code(), -4002);
        assert_eq!(ScopeStatus::BLOCKED.code(), -5001);
        assert_eq!(ScopeStatus::BLOCKED_BY_CUSTOM_PROCESSOR.code(), -5002);
    }

    #[test]
    fn status_error_display_carries_code_and_detail() {
        let err = StatusError::of(ScopeStatus::ILLEGAL_URI, "Could not parse seed 'x'");
        assert_eq!(err.to_string(), "-7 IllegalUri: Could not parse seed 'x'");
    }
}
