// Path: crates/engine/src/script/values.rs
//! Script value types: `match` results and the `url` handle.

// derive(ProvidesStaticType) expands to `unsafe impl`; no hand-written unsafe here.
#![allow(unsafe_code)]

use std::fmt;
use std::hash::Hash as _;
use std::sync::Arc;

use allocative::Allocative;
use starlark::collections::StarlarkHasher;
use starlark::environment::{Methods, MethodsBuilder, MethodsStatic};
use starlark::eval::Evaluator;
use starlark::starlark_module;
use starlark::starlark_simple_value;
use starlark::values::{starlark_value, NoSerialize, ProvidesStaticType, StarlarkValue, Value};

use crate::script::context::{EndOfComputation, ScriptContext, UriContext};
use crate::script::status::ScopeStatus;

/// Result of a matcher builtin. Truthy exactly when the matcher matched, and
/// carrying the rule combinators `then` and `abort`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ProvidesStaticType, NoSerialize, Allocative)]
pub(crate) struct ScopeMatch(pub(crate) bool);

starlark_simple_value!(ScopeMatch);

impl fmt::Display for ScopeMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.0 { "True" } else { "False" })
    }
}

#[starlark_value(type = "match")]
impl<'v> StarlarkValue<'v> for ScopeMatch {
    fn get_methods() -> Option<&'static Methods> {
        static RES: MethodsStatic = MethodsStatic::new();
        RES.methods(match_methods)
    }

    fn equals(&self, other: Value<'v>) -> starlark::Result<bool> {
        match ScopeMatch::from_value(other) {
            Some(o) => Ok(o.0 == self.0),
            None => Ok(other.unpack_bool() == Some(self.0)),
        }
    }

    fn to_bool(&self) -> bool {
        self.0
    }

    fn write_hash(&self, hasher: &mut StarlarkHasher) -> starlark::Result<()> {
        self.0.hash(hasher);
        Ok(())
    }
}

#[starlark_module]
fn match_methods(builder: &mut MethodsBuilder) {
    /// Sets the pending decision to `status` when the match is true. Returns
    /// the match either way, so rules chain as
    /// `isScheme('http').then(Include).abort()`.
    fn then<'v>(
        this: &ScopeMatch,
        status: Value<'v>,
        eval: &mut Evaluator<'v, '_, '_>,
    ) -> anyhow::Result<ScopeMatch> {
        if this.0 {
            let decided = ScopeStatus::from_param(status)?;
            let ctx = ScriptContext::from_eval(eval)?;
            ctx.set_decision(decided);
            ctx.debug_line(eval, "match.then", &status.to_repr(), &format!("status={decided}"));
        }
        Ok(*this)
    }

    /// Stops the script when the match is true. A false match falls through
    /// to the rules below it.
    fn abort(this: &ScopeMatch) -> anyhow::Result<ScopeMatch> {
        if this.0 {
            return Err(EndOfComputation.into());
        }
        Ok(*this)
    }
}

/// Script handle to the URI under evaluation. Reads the live canonical form,
/// so it reflects any `removeQuery` edits made earlier in the script.
#[derive(Debug, ProvidesStaticType, NoSerialize, Allocative)]
pub(crate) struct UrlValue(#[allocative(skip)] pub(crate) Arc<UriContext>);

starlark_simple_value!(UrlValue);

impl fmt::Display for UrlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.href())
    }
}

#[starlark_value(type = "url")]
impl<'v> StarlarkValue<'v> for UrlValue {
    fn get_methods() -> Option<&'static Methods> {
        static RES: MethodsStatic = MethodsStatic::new();
        RES.methods(url_methods)
    }
}

#[starlark_module]
fn url_methods(builder: &mut MethodsBuilder) {
    /// Host, with the port appended when the URI spells one out.
    fn host(this: &UrlValue) -> anyhow::Result<String> {
        Ok(this.0.host())
    }

    /// Explicit port, or an empty string for the scheme default.
    fn port(this: &UrlValue) -> anyhow::Result<String> {
        Ok(this.0.port())
    }
}
