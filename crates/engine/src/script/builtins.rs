// Path: crates/engine/src/script/builtins.rs
//! The scope-rule vocabulary registered as script globals.
//!
//! Matchers return a [`ScopeMatch`] so rules read as
//! `matcher(...).then(Status).abort()`. Every builtin reaches the current
//! evaluation through [`ScriptContext`]; scripts never pass state around.

// Builtin and parameter names follow the script-facing camelCase vocabulary.
#![allow(non_snake_case, non_camel_case_types)]

use anyhow::anyhow;
use starlark::environment::GlobalsBuilder;
use starlark::eval::Evaluator;
use starlark::starlark_module;
use starlark::values::none::{NoneOr, NoneType};
use starlark::values::Value;

use crate::canonicalize::{canonicalize, Profile};
use crate::script::context::{param_as_bool, param_as_i64, EndOfComputation, ScriptContext};
use crate::script::status::{ScopeStatus, StatusError};
use crate::script::values::{ScopeMatch, UrlValue};

fn expect_str<'v>(func: &str, v: Value<'v>) -> anyhow::Result<&'v str> {
    v.unpack_str()
        .ok_or_else(|| anyhow!("{func}: expected string, got {}", v.get_type()))
}

fn join_args(parts: &[Option<String>]) -> String {
    let mut out = String::new();
    for part in parts.iter().flatten() {
        if !out.is_empty() {
            out.push_str(", ");
        }
        out.push_str(part);
    }
    out
}

#[starlark_module]
pub(crate) fn register(builder: &mut GlobalsBuilder) {
    /// Looks up an annotation by name. Unbound names are an error, so a
    /// script cannot silently match on a missing parameter.
    fn param(name: &str, eval: &mut Evaluator) -> anyhow::Result<String> {
        let ctx = ScriptContext::from_eval(eval)?;
        match ctx.annotation(name) {
            Some(value) => Ok(value.to_owned()),
            None => Err(anyhow!("no value with name '{name}'")),
        }
    }

    /// Coerces any value to a match. Strings `"true"`, `"yes"` and `"ok"`
    /// (any case) are true, other strings false, everything else follows
    /// ordinary truthiness.
    fn test<'v>(
        value: Value<'v>,
        eval: &mut Evaluator<'v, '_, '_>,
    ) -> anyhow::Result<ScopeMatch> {
        let matched = ScopeMatch(param_as_bool(value));
        let ctx = ScriptContext::from_eval(eval)?;
        ctx.debug_line(eval, "test", &value.to_repr(), &format!("match={matched}"));
        Ok(matched)
    }

    /// Matches when the URI's scheme appears in the space-separated
    /// candidate list, ignoring case and any trailing colon.
    fn isScheme<'v>(
        #[starlark(require = pos)] scheme: Value<'v>,
        eval: &mut Evaluator<'v, '_, '_>,
    ) -> anyhow::Result<ScopeMatch> {
        let ctx = ScriptContext::from_eval(eval)?;
        let want = expect_str("isScheme", scheme)?.to_lowercase();
        let current = ctx.uri.scheme();
        let matched = ScopeMatch(
            want.split_whitespace()
                .any(|t| t.trim_end_matches(':') == current),
        );
        ctx.debug_line(
            eval,
            "isScheme",
            &scheme.to_repr(),
            &format!("scheme={current}, wantScheme={want}, match={matched}"),
        );
        Ok(matched)
    }

    /// Matches when the trimmed referrer equals one of the space-separated
    /// candidates. Comparison is case-sensitive.
    fn isReferrer<'v>(
        #[starlark(require = pos)] referrer: Value<'v>,
        eval: &mut Evaluator<'v, '_, '_>,
    ) -> anyhow::Result<ScopeMatch> {
        let ctx = ScriptContext::from_eval(eval)?;
        let want = expect_str("isReferrer", referrer)?;
        let current = ctx.uri.referrer();
        let matched = ScopeMatch(want.split_whitespace().any(|t| t == current));
        ctx.debug_line(
            eval,
            "isReferrer",
            &referrer.to_repr(),
            &format!("referrer={current}, wantReferrer={want}, match={matched}"),
        );
        Ok(matched)
    }

    /// Matches when the URI's host equals a seed's host, or is a subdomain
    /// of one when `includeSubdomains` is set. Alt seeds are tried before
    /// the primary seed; the first hit wins. A seed that fails to
    /// canonicalize decides `IllegalUri` and terminates.
    fn isSameHost<'v>(
        includeSubdomains: Option<Value<'v>>,
        altSeeds: Option<Value<'v>>,
        eval: &mut Evaluator<'v, '_, '_>,
    ) -> anyhow::Result<ScopeMatch> {
        let ctx = ScriptContext::from_eval(eval)?;
        let include_subdomains = includeSubdomains.map(param_as_bool).unwrap_or(false);
        let alt = match altSeeds {
            Some(v) => expect_str("isSameHost", v)?,
            None => "",
        };
        let args = join_args(&[
            includeSubdomains.map(|v| v.to_repr()),
            altSeeds.map(|v| v.to_repr()),
        ]);
        let host = ctx.uri.host_only();

        let mut matched = false;
        for seed in alt
            .split_whitespace()
            .chain(std::iter::once(ctx.uri.seed()))
        {
            match canonicalize(seed, Profile::Scope) {
                Ok(parsed) => {
                    let seed_host = parsed.host_str().unwrap_or_default();
                    matched = host == seed_host;
                    if !matched && include_subdomains {
                        matched = host.ends_with(&format!(".{seed_host}"));
                    }
                    ctx.debug_line(
                        eval,
                        "isSameHost",
                        &args,
                        &format!("host={host}, seedHost={seed_host}, match={}", ScopeMatch(matched)),
                    );
                    if matched {
                        break;
                    }
                }
                Err(_) => {
                    let detail = format!("Could not parse seed '{seed}'");
                    ctx.debug_line(eval, "isSameHost", &args, &detail);
                    return Err(StatusError::of(ScopeStatus::ILLEGAL_URI, detail).into());
                }
            }
        }
        Ok(ScopeMatch(matched))
    }

    /// Matches when the discovery path is strictly longer than `hops`.
    /// Redirect hops (`R`) are not counted unless `includeRedirects` is set.
    fn maxHopsFromSeed<'v>(
        hops: Value<'v>,
        includeRedirects: Option<Value<'v>>,
        eval: &mut Evaluator<'v, '_, '_>,
    ) -> anyhow::Result<ScopeMatch> {
        let ctx = ScriptContext::from_eval(eval)?;
        let include_redirects = includeRedirects.map(param_as_bool).unwrap_or(false);
        let mut path = ctx.uri.discovery_path().to_owned();
        if !include_redirects {
            path.retain(|hop| hop != 'R');
        }
        // An unparsable hop count never matches; a missing one is an error.
        let matched = match param_as_i64(hops)? {
            Some(max) => path.len() as i64 > max,
            None => false,
        };
        let args = join_args(&[
            Some(hops.to_repr()),
            includeRedirects.map(|v| v.to_repr()),
        ]);
        ctx.debug_line(
            eval,
            "maxHopsFromSeed",
            &args,
            &format!(
                "discoveryPath={path}, hops={}, match={}",
                path.len(),
                ScopeMatch(matched)
            ),
        );
        Ok(ScopeMatch(matched))
    }

    /// Matches when the URI's canonical form equals the canonical form of
    /// one of the space-separated candidates.
    fn isUrl<'v>(url: Value<'v>, eval: &mut Evaluator<'v, '_, '_>) -> anyhow::Result<ScopeMatch> {
        let ctx = ScriptContext::from_eval(eval)?;
        let want = expect_str("isUrl", url)?;
        let current = ctx.uri.href();
        let mut matched = ScopeMatch(false);
        for candidate in want.split_whitespace() {
            let canon = canonicalize(candidate, Profile::Scope)
                .map_err(|err| anyhow!("error parsing uri '{candidate}': {err}"))?;
            if canon.as_str() == current {
                matched = ScopeMatch(true);
                break;
            }
        }
        ctx.debug_line(
            eval,
            "isUrl",
            &url.to_repr(),
            &format!("test='{want}', url={current}, match={matched}"),
        );
        Ok(matched)
    }

    /// Deletes a named query parameter from the canonical URI, so every
    /// matcher below sees the reduced form.
    fn removeQuery(query: &str, eval: &mut Evaluator) -> anyhow::Result<NoneType> {
        let ctx = ScriptContext::from_eval(eval)?;
        ctx.uri.remove_query(query);
        Ok(NoneType)
    }

    /// Sets the pending decision unconditionally. Accepts a status value or
    /// its name.
    fn setStatus<'v>(
        status: Value<'v>,
        eval: &mut Evaluator<'v, '_, '_>,
    ) -> anyhow::Result<NoneType> {
        let decided = ScopeStatus::from_param(status)?;
        let ctx = ScriptContext::from_eval(eval)?;
        ctx.set_decision(decided);
        ctx.debug_line(eval, "setStatus", &status.to_repr(), &format!("status={decided}"));
        Ok(NoneType)
    }

    /// The pending decision, or `None` when no rule has decided yet.
    fn getStatus(eval: &mut Evaluator) -> anyhow::Result<NoneOr<ScopeStatus>> {
        let ctx = ScriptContext::from_eval(eval)?;
        Ok(match ctx.decision() {
            Some(status) => NoneOr::Other(status),
            None => NoneOr::None,
        })
    }

    /// The URI under evaluation.
    fn url(eval: &mut Evaluator) -> anyhow::Result<UrlValue> {
        let ctx = ScriptContext::from_eval(eval)?;
        Ok(UrlValue(ctx.uri.clone()))
    }

    /// Toggles the debug transcript and, optionally, per-line call stacks.
    fn debug<'v>(
        debug: Option<Value<'v>>,
        stacktrace: Option<Value<'v>>,
        eval: &mut Evaluator<'v, '_, '_>,
    ) -> anyhow::Result<NoneType> {
        let ctx = ScriptContext::from_eval(eval)?;
        ctx.set_debug(
            debug.map(param_as_bool).unwrap_or(true),
            stacktrace.map(param_as_bool).unwrap_or(false),
        );
        Ok(NoneType)
    }

    /// Stops the script. The decision stands as already set, or falls back
    /// to the default-deny.
    fn abort() -> anyhow::Result<NoneType> {
        Err(EndOfComputation.into())
    }
}
