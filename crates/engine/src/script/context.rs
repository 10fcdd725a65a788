// Path: crates/engine/src/script/context.rs
//! Per-evaluation state shared with the script runtime.
//!
//! One [`ScriptContext`] exists per scope check. It is handed to the
//! evaluator through `Evaluator::extra`, so every builtin reaches the same
//! URI handle, annotation map, decision slot, and console transcript without
//! the script ever passing them around. Nothing here outlives the check.

// derive(ProvidesStaticType) expands to `unsafe impl`; no hand-written unsafe here.
#![allow(unsafe_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::{Arc, PoisonError, RwLock};

use anyhow::anyhow;
use starlark::eval::Evaluator;
use starlark::values::ProvidesStaticType;
use starlark::PrintHandler;
use thiserror::Error;
use url::Url;

use crate::script::ScopeStatus;

/// Raised by `abort()` to stop the script. Not an error: the engine treats
/// it exactly like running off the end of the source.
#[derive(Debug, Error)]
#[error("end of computation")]
pub(crate) struct EndOfComputation;

/// Raised when an integer-like parameter holds no usable value (`None`, the
/// string `"None"`, or a non-numeric type).
#[derive(Debug, Error)]
#[error("None")]
pub(crate) struct NoValue;

/// The input URI bundled with its live scope-canonical form and the crawl
/// context it arrived with. Shared between the context and any `url` values
/// the script holds on to.
#[derive(Debug)]
pub(crate) struct UriContext {
    /// Scope-canonical URI. `removeQuery` mutates it in place, so later
    /// matchers see the reduced form.
    live: RwLock<Url>,
    seed: String,
    referrer: String,
    discovery_path: String,
}

impl UriContext {
    pub(crate) fn new(canonical: Url, seed: &str, referrer: &str, discovery_path: &str) -> Self {
        UriContext {
            live: RwLock::new(canonical),
            seed: seed.to_owned(),
            referrer: referrer.to_owned(),
            discovery_path: discovery_path.to_owned(),
        }
    }

    pub(crate) fn href(&self) -> String {
        self.read().as_str().to_owned()
    }

    /// Scheme with no trailing colon, already lower-cased by the parser.
    pub(crate) fn scheme(&self) -> String {
        self.read().scheme().to_owned()
    }

    /// Host catenated with the port when one is spelled out in the URI.
    pub(crate) fn host(&self) -> String {
        let url = self.read();
        let host = url.host_str().unwrap_or_default();
        match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_owned(),
        }
    }

    /// Host alone, for seed comparisons.
    pub(crate) fn host_only(&self) -> String {
        self.read().host_str().unwrap_or_default().to_owned()
    }

    /// Explicit port, or the empty string when the URI relies on the
    /// scheme default.
    pub(crate) fn port(&self) -> String {
        self.read().port().map(|p| p.to_string()).unwrap_or_default()
    }

    pub(crate) fn seed(&self) -> &str {
        &self.seed
    }

    pub(crate) fn referrer(&self) -> &str {
        self.referrer.trim()
    }

    pub(crate) fn discovery_path(&self) -> &str {
        &self.discovery_path
    }

    /// Drops every query pair whose key equals `name` from the live
    /// canonical form.
    pub(crate) fn remove_query(&self, name: &str) {
        let mut url = self
            .live
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let (kept, total) = {
            let Some(raw) = url.query() else {
                return;
            };
            let mut total = 0usize;
            let mut kept: Vec<String> = Vec::new();
            for pair in raw.split('&') {
                total += 1;
                let key = pair.split_once('=').map_or(pair, |(k, _)| k);
                if key != name {
                    kept.push(pair.to_owned());
                }
            }
            (kept, total)
        };
        if kept.len() == total {
            return;
        }
        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&kept.join("&")));
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Url> {
        self.live.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Mutable evaluation state for one scope check.
#[derive(ProvidesStaticType)]
pub(crate) struct ScriptContext {
    pub(crate) uri: Arc<UriContext>,
    annotations: HashMap<String, String>,
    decision: Cell<Option<ScopeStatus>>,
    debug: Cell<bool>,
    stacktrace: Cell<bool>,
    console: RefCell<String>,
}

impl ScriptContext {
    pub(crate) fn new(uri: Arc<UriContext>, annotations: &[(String, String)], debug: bool) -> Self {
        ScriptContext {
            uri,
            annotations: annotations.iter().cloned().collect(),
            decision: Cell::new(None),
            debug: Cell::new(debug),
            stacktrace: Cell::new(false),
            console: RefCell::new(String::new()),
        }
    }

    /// The context installed in `Evaluator::extra` by the engine.
    pub(crate) fn from_eval<'a>(eval: &Evaluator<'_, 'a, '_>) -> anyhow::Result<&'a ScriptContext> {
        eval.extra
            .and_then(|extra| extra.downcast_ref::<ScriptContext>())
            .ok_or_else(|| anyhow!("scope evaluation context not installed"))
    }

    pub(crate) fn annotation(&self, name: &str) -> Option<&str> {
        self.annotations.get(name).map(String::as_str)
    }

    pub(crate) fn decision(&self) -> Option<ScopeStatus> {
        self.decision.get()
    }

    pub(crate) fn set_decision(&self, status: ScopeStatus) {
        self.decision.set(Some(status));
    }

    pub(crate) fn set_debug(&self, debug: bool, stacktrace: bool) {
        self.debug.set(debug);
        self.stacktrace.set(stacktrace);
    }

    pub(crate) fn take_console(&self) -> String {
        std::mem::take(&mut *self.console.borrow_mut())
    }

    /// Appends one transcript line for a builtin call, prefixed with the call
    /// site when the runtime knows it. No-op unless the debug flag is on.
    pub(crate) fn debug_line(&self, eval: &Evaluator<'_, '_, '_>, func: &str, args: &str, msg: &str) {
        if !self.debug.get() {
            return;
        }
        let mut line = String::new();
        if let Some(span) = eval.call_stack_top_location() {
            let _ = write!(line, "{}:{} ", span.filename(), span.resolve_span().begin);
        }
        let _ = write!(line, "{func}({args}) {msg}");
        if self.stacktrace.get() {
            let stack = eval.call_stack().to_string();
            if !stack.is_empty() {
                let _ = write!(line, "\n{}", stack.trim_end());
            }
        }
        self.append_line(&line);
    }

    fn append_line(&self, line: &str) {
        let mut console = self.console.borrow_mut();
        console.push_str(line);
        console.push('\n');
        tracing::debug!(target: "script", "{line}");
    }
}

/// `print()` from scripts lands in the transcript too.
impl PrintHandler for ScriptContext {
    fn println(&self, text: &str) -> starlark::Result<()> {
        self.append_line(text);
        Ok(())
    }
}

/// Truthiness for bool-like script parameters: the strings `"true"`, `"yes"`
/// and `"ok"` (any case) are true, any other string is false, everything else
/// follows the language's own truth rule.
pub(crate) fn param_as_bool(v: starlark::values::Value) -> bool {
    match v.unpack_str() {
        Some(s) => matches!(s.to_lowercase().as_str(), "true" | "yes" | "ok"),
        None => v.to_bool(),
    }
}

/// Integer coercion for int-like script parameters. `Ok(None)` marks a
/// non-numeric string, which matchers treat as "no match" rather than an
/// error; a missing value propagates [`NoValue`].
pub(crate) fn param_as_i64(v: starlark::values::Value) -> anyhow::Result<Option<i64>> {
    if let Some(i) = v.unpack_i32() {
        return Ok(Some(i64::from(i)));
    }
    if let Some(s) = v.unpack_str() {
        if s == "None" {
            return Err(NoValue.into());
        }
        return Ok(s.parse::<i64>().ok());
    }
    Err(NoValue.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonicalize::{canonicalize, Profile};

    fn uri(input: &str) -> UriContext {
        UriContext::new(canonicalize(input, Profile::Scope).unwrap(), "", "", "")
    }

    #[test]
    fn host_includes_explicit_port_only() {
        assert_eq!(uri("http://foo.bar/aa").host(), "foo.bar");
        assert_eq!(uri("http://foo.bar:8080/aa").host(), "foo.bar:8080");
        assert_eq!(uri("http://foo.bar:8080/aa").port(), "8080");
        assert_eq!(uri("http://foo.bar/aa").port(), "");
    }

    #[test]
    fn remove_query_drops_every_pair_with_the_key() {
        let ctx = uri("http://foo.bar/cc?jsessionid=1&foo&jsessionid=2");
        ctx.remove_query("jsessionid");
        assert_eq!(ctx.href(), "http://foo.bar/cc?foo");
    }

    #[test]
    fn remove_query_of_last_pair_clears_the_query() {
        let ctx = uri("http://foo.bar/cc?foo");
        ctx.remove_query("foo");
        assert_eq!(ctx.href(), "http://foo.bar/cc");
    }

    #[test]
    fn remove_query_of_absent_key_is_a_no_op() {
        let ctx = uri("http://foo.bar/cc?foo&a=b");
        ctx.remove_query("bar");
        assert_eq!(ctx.href(), "http://foo.bar/cc?a=b&foo");
    }

    #[test]
    fn referrer_is_trimmed() {
        let ctx = UriContext::new(
            canonicalize("http://foo.bar/", Profile::Scope).unwrap(),
            "http://seed/",
            "  http://ref/ ",
            "RL",
        );
        assert_eq!(ctx.referrer(), "http://ref/");
        assert_eq!(ctx.discovery_path(), "RL");
    }
}
