// Path: crates/engine/src/script/mod.rs
//! Scope script compilation and evaluation.
//!
//! A scope script is a small Starlark program that decides whether one URI
//! belongs in a crawl. Each evaluation is hermetic: the script sees the
//! canonicalized URI, its crawl context, and the rule vocabulary from
//! [`builtins`], and leaves behind a decision plus a console transcript.
//!
//! Every way a script can end is folded into a [`ScopeCheckResult`]; callers
//! never see a raw evaluator error. The classification is:
//!
//! * unparsable input URI: exclude as `IllegalUri`,
//! * source that fails to compile: exclude as `RuntimeException`,
//! * a raised decision (an unparsable seed, for instance): exclude under
//!   that decision's code,
//! * any other raised error: exclude as `RuntimeException` with a traceback,
//! * clean completion: whatever the decision slot holds, where an empty slot
//!   means the default-deny `Blocked`.

mod builtins;
mod context;
mod status;
mod values;

pub use status::{ScopeStatus, StatusError};

use std::sync::Arc;
use std::time::Instant;

use once_cell::sync::Lazy;
use starlark::environment::{Globals, GlobalsBuilder, LibraryExtension, Module};
use starlark::eval::Evaluator;
use starlark::syntax::{AstModule, Dialect};
use url::Url;

use crate::canonicalize::{self, Profile};
use crate::metrics::script_metrics;
use crate::script::context::{EndOfComputation, ScriptContext, UriContext};

/// One scope-check invocation.
#[derive(Debug, Clone, Copy)]
pub struct CheckRequest<'a> {
    pub uri: &'a str,
    pub seed_uri: &'a str,
    pub referrer: &'a str,
    pub discovery_path: &'a str,
    pub annotations: &'a [(String, String)],
    pub script_name: &'a str,
    pub script: &'a str,
    pub debug: bool,
}

/// The scope decision for one URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Include,
    Exclude(ScopeStatus),
}

/// Everything a caller needs to report a scope check.
#[derive(Debug)]
pub struct ScopeCheckResult {
    pub verdict: Verdict,
    /// Scope-canonical form of the input URI as it was before the script
    /// ran. `None` when the input failed to parse.
    pub canonical: Option<Url>,
    /// Debug transcript and script `print` output.
    pub console: String,
    pub error: Option<StatusError>,
}

static GLOBALS: Lazy<Globals> = Lazy::new(|| {
    // `print` is a library extension, not part of the standard globals; it is
    // the one I/O builtin scripts get, captured by the context print handler.
    let mut builder =
        GlobalsBuilder::extended_by(&[LibraryExtension::Print]).with(builtins::register);
    ScopeStatus::register(&mut builder);
    builder.build()
});

/// Scope scripts are rule lists, so statements at the top level are the
/// norm rather than the exception.
fn dialect() -> Dialect {
    Dialect {
        enable_top_level_stmt: true,
        ..Dialect::Standard
    }
}

/// Evaluates a scope script against the canonicalized URI and its crawl
/// context.
///
/// Never fails: unparsable URIs, compile errors, and script bugs all fold
/// into the returned verdict and error classification.
pub fn check_scope(req: &CheckRequest) -> ScopeCheckResult {
    let canonical = match canonicalize::canonicalize(req.uri, Profile::Scope) {
        Ok(url) => url,
        Err(err) => {
            return ScopeCheckResult {
                verdict: Verdict::Exclude(ScopeStatus::ILLEGAL_URI),
                canonical: None,
                console: String::new(),
                error: Some(StatusError::with_msg(
                    ScopeStatus::ILLEGAL_URI,
                    "error parsing uri",
                    err.to_string(),
                )),
            };
        }
    };

    let compile_started = Instant::now();
    let parsed = AstModule::parse(req.script_name, req.script.to_owned(), &dialect());
    script_metrics().observe_compile_seconds(compile_started.elapsed().as_secs_f64());
    let ast = match parsed {
        Ok(ast) => ast,
        Err(err) => {
            return ScopeCheckResult {
                verdict: Verdict::Exclude(ScopeStatus::RUNTIME_EXCEPTION),
                canonical: Some(canonical),
                console: String::new(),
                error: Some(StatusError::with_msg(
                    ScopeStatus::RUNTIME_EXCEPTION,
                    "error parsing scope script",
                    one_line(&err),
                )),
            };
        }
    };

    let uri = Arc::new(UriContext::new(
        canonical.clone(),
        req.seed_uri,
        req.referrer,
        req.discovery_path,
    ));
    let ctx = ScriptContext::new(uri, req.annotations, req.debug);

    // Annotations are bound as module variables under their own names. They
    // may shadow builtins; that is accepted rather than guarded against.
    let module = Module::new();
    for (key, value) in req.annotations {
        module.set(key, module.heap().alloc(value.as_str()));
    }

    let end = {
        let mut eval = Evaluator::new(&module);
        eval.extra = Some(&ctx);
        eval.set_print_handler(&ctx);
        let execute_started = Instant::now();
        let outcome = eval.eval_module(ast, &GLOBALS).map(|_| ());
        script_metrics().observe_execute_seconds(execute_started.elapsed().as_secs_f64());
        classify(outcome)
    };

    let console = ctx.take_console();
    match end {
        ScriptEnd::Decided(err) => ScopeCheckResult {
            verdict: Verdict::Exclude(ScopeStatus::from_code(err.code)),
            canonical: Some(canonical),
            console,
            error: Some(err),
        },
        ScriptEnd::Failed(err) => ScopeCheckResult {
            verdict: Verdict::Exclude(ScopeStatus::RUNTIME_EXCEPTION),
            canonical: Some(canonical),
            console,
            error: Some(StatusError::with_msg(
                ScopeStatus::RUNTIME_EXCEPTION,
                "error executing scope script",
                traceback(&err),
            )),
        },
        ScriptEnd::Finished => match ctx.decision() {
            Some(status) if status == ScopeStatus::INCLUDE => ScopeCheckResult {
                verdict: Verdict::Include,
                canonical: Some(canonical),
                console,
                error: None,
            },
            Some(status) => ScopeCheckResult {
                verdict: Verdict::Exclude(status),
                canonical: Some(canonical),
                console,
                error: None,
            },
            None => ScopeCheckResult {
                verdict: Verdict::Exclude(ScopeStatus::BLOCKED),
                canonical: Some(canonical),
                console,
                error: Some(StatusError::of(ScopeStatus::BLOCKED, "no scope rule matched")),
            },
        },
    }
}

enum ScriptEnd {
    /// Ran to the end of the source, or stopped through `abort()`.
    Finished,
    /// A builtin decided and terminated in one step.
    Decided(StatusError),
    Failed(starlark::Error),
}

fn classify(outcome: starlark::Result<()>) -> ScriptEnd {
    let err = match outcome {
        Ok(()) => return ScriptEnd::Finished,
        Err(err) => err,
    };
    if let starlark::ErrorKind::Native(e) | starlark::ErrorKind::Other(e) = err.kind() {
        if e.downcast_ref::<EndOfComputation>().is_some() {
            return ScriptEnd::Finished;
        }
        if let Some(decided) = e.downcast_ref::<StatusError>() {
            return ScriptEnd::Decided(decided.clone());
        }
    }
    ScriptEnd::Failed(err)
}

/// Compiler diagnostics reduced to one `file:position: message` line.
fn one_line(err: &starlark::Error) -> String {
    match err.span() {
        Some(span) => format!("{span}: {}", err.without_diagnostic()),
        None => err.without_diagnostic().to_string(),
    }
}

/// Runtime failures keep their traceback when the script got far enough to
/// have one.
fn traceback(err: &starlark::Error) -> String {
    let stack = err.call_stack().to_string();
    if stack.is_empty() {
        return one_line(err);
    }
    format!("{stack}Error: {}", err.without_diagnostic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Check {
        uri: String,
        seed: String,
        referrer: String,
        discovery_path: String,
        annotations: Vec<(String, String)>,
        debug: bool,
    }

    impl Check {
        fn uri(uri: &str) -> Check {
            Check {
                uri: uri.to_owned(),
                ..Check::default()
            }
        }

        fn seed(mut self, seed: &str) -> Check {
            self.seed = seed.to_owned();
            self
        }

        fn referrer(mut self, referrer: &str) -> Check {
            self.referrer = referrer.to_owned();
            self
        }

        fn path(mut self, path: &str) -> Check {
            self.discovery_path = path.to_owned();
            self
        }

        fn annotation(mut self, key: &str, value: &str) -> Check {
            self.annotations.push((key.to_owned(), value.to_owned()));
            self
        }

        fn debug(mut self) -> Check {
            self.debug = true;
            self
        }

        fn run(&self, script: &str) -> ScopeCheckResult {
            check_scope(&CheckRequest {
                uri: &self.uri,
                seed_uri: &self.seed,
                referrer: &self.referrer,
                discovery_path: &self.discovery_path,
                annotations: &self.annotations,
                script_name: "scope_script",
                script,
                debug: self.debug,
            })
        }
    }

    fn base() -> Check {
        Check::uri("http://foo.bar/aa bb/cc?jsessionid=1&foo#bar").seed("http://foo.bar")
    }

    fn canonical(result: &ScopeCheckResult) -> &str {
        result.canonical.as_ref().map(Url::as_str).unwrap_or("")
    }

    #[test]
    fn same_host_includes() {
        let result = base().run("isSameHost().then(Include).abort()");
        assert_eq!(result.verdict, Verdict::Include);
        assert_eq!(canonical(&result), "http://foo.bar/aa%20bb/cc?foo&jsessionid=1");
        assert_eq!(result.console, "");
        assert_eq!(result.error, None);
    }

    #[test]
    fn subdomain_is_not_the_same_host() {
        let result = Check::uri("http://sub.foo.bar/aa bb/cc?jsessionid=1&foo#bar")
            .seed("http://foo.bar")
            .run("isSameHost().then(Include).abort()");
        assert_eq!(result.verdict, Verdict::Exclude(ScopeStatus::BLOCKED));
        assert_eq!(
            canonical(&result),
            "http://sub.foo.bar/aa%20bb/cc?foo&jsessionid=1"
        );
        assert_eq!(
            result.error,
            Some(StatusError {
                code: -5001,
                msg: "Blocked".to_owned(),
                detail: "no scope rule matched".to_owned(),
            })
        );
    }

    #[test]
    fn subdomains_match_when_included() {
        let result = Check::uri("http://sub.foo.bar/aa bb/cc?jsessionid=1&foo#bar")
            .seed("http://foo.bar")
            .run("isSameHost(True).then(Include).abort()");
        assert_eq!(result.verdict, Verdict::Include);
    }

    #[test]
    fn subdomain_flag_accepts_an_annotation_string() {
        let result = Check::uri("http://sub.foo.bar/aa bb/cc?jsessionid=1&foo#bar")
            .seed("http://foo.bar")
            .annotation("IncludeSubdomain", "True")
            .run("isSameHost(param('IncludeSubdomain')).then(Include).abort()");
        assert_eq!(result.verdict, Verdict::Include);
    }

    #[test]
    fn alt_seeds_are_tried_before_the_primary_seed() {
        let result = Check::uri("http://other.example/page")
            .seed("http://foo.bar")
            .run("isSameHost(False, 'http://other.example').then(Include).abort()");
        assert_eq!(result.verdict, Verdict::Include);
    }

    #[test]
    fn unparsable_seed_decides_illegal_uri() {
        let result = Check::uri("http://foo.bar/aa")
            .seed("")
            .run("isSameHost().then(Include).abort()");
        assert_eq!(result.verdict, Verdict::Exclude(ScopeStatus::ILLEGAL_URI));
        assert_eq!(
            result.error,
            Some(StatusError {
                code: -7,
                msg: "IllegalUri".to_owned(),
                detail: "Could not parse seed ''".to_owned(),
            })
        );
    }

    #[test]
    fn matching_scheme_includes() {
        let result = base().run("isScheme('http').then(Include).abort()");
        assert_eq!(result.verdict, Verdict::Include);
        assert_eq!(result.error, None);
    }

    #[test]
    fn non_matching_scheme_falls_through_to_default_deny() {
        let result = base().run("isScheme('https').then(Include).abort()");
        assert_eq!(result.verdict, Verdict::Exclude(ScopeStatus::BLOCKED));
        assert_eq!(
            result.error.map(|e| e.detail),
            Some("no scope rule matched".to_owned())
        );
    }

    #[test]
    fn scheme_comparison_ignores_case() {
        let result = Check::uri("HttP://foo.bar/aa bb/cc?jsessionid=1&foo#bar")
            .annotation("scheme", "hTtp")
            .run("isScheme(param('scheme')).then(Include).abort()");
        assert_eq!(result.verdict, Verdict::Include);
        assert_eq!(canonical(&result), "http://foo.bar/aa%20bb/cc?foo&jsessionid=1");
    }

    #[test]
    fn scheme_list_matches_file_uris() {
        let result = Check::uri("file:c|/foo/bar/aa bb/")
            .annotation("scheme", "hTtp https file ftp")
            .run("isScheme(param('scheme')).then(Blocked).abort()");
        assert_eq!(result.verdict, Verdict::Exclude(ScopeStatus::BLOCKED));
        assert_eq!(canonical(&result), "file:///c:/foo/bar/aa%20bb/");
        assert_eq!(result.error, None);
    }

    #[test]
    fn schemeless_input_defaults_to_http() {
        let result = Check::uri("foo.bar/aa bb/cc?jsessionid=1&foo#bar")
            .run("isScheme('http').then(Include).abort()");
        assert_eq!(result.verdict, Verdict::Include);
        assert_eq!(canonical(&result), "http://foo.bar/aa%20bb/cc?foo&jsessionid=1");
    }

    #[test]
    fn missing_annotation_is_a_runtime_error() {
        let result = base().run("isScheme(param('scheme')).then(Include).abort()");
        assert_eq!(
            result.verdict,
            Verdict::Exclude(ScopeStatus::RUNTIME_EXCEPTION)
        );
        let error = result.error.unwrap();
        assert_eq!(error.code, -5);
        assert_eq!(error.msg, "error executing scope script");
        assert!(
            error.detail.contains("no value with name 'scheme'"),
            "detail: {}",
            error.detail
        );
    }

    #[test]
    fn matching_referrer_includes() {
        let result = base()
            .referrer(" http://foo.bar/ ")
            .run("isReferrer('http://foo.bar/ http://other.example/').then(Include).abort()");
        assert_eq!(result.verdict, Verdict::Include);
    }

    #[test]
    fn referrer_comparison_is_case_sensitive() {
        let result = base()
            .referrer("http://FOO.bar/")
            .run("isReferrer('http://foo.bar/').then(Include).abort()");
        assert_eq!(result.verdict, Verdict::Exclude(ScopeStatus::BLOCKED));
    }

    #[test]
    fn url_matches_its_canonical_spelling_variants() {
        let result = Check::uri("http://foo.bar/aa//bb/cc?jsessionid=1&foo#bar")
            .run("isUrl('http://foo.bar/aa//bb/cc?jsessionid=1&foo#bar').then(Include).abort()");
        assert_eq!(result.verdict, Verdict::Include);
        assert_eq!(canonical(&result), "http://foo.bar/aa/bb/cc?foo&jsessionid=1");
    }

    #[test]
    fn url_match_sorts_query_keys_stably() {
        let result = Check::uri("http://foo.bar/aa//bb/cc?jsessionid=1&foo&a=c&a=b#bar")
            .run("isUrl('http://foo.bar/aa//bb/cc?foo&a=c&jsessionid=1&a=b').then(Include).abort()");
        assert_eq!(result.verdict, Verdict::Include);
        assert_eq!(
            canonical(&result),
            "http://foo.bar/aa/bb/cc?a=c&a=b&foo&jsessionid=1"
        );
    }

    #[test]
    fn url_match_resolves_dot_segments_and_default_scheme() {
        let result = Check::uri("http://foo.bar/aa//bb/cc?jsessionid=1&foo&a=c&a=b#bar")
            .run("isUrl('foo.bar/aa/ff/../bb/cc?foo&a=c&jsessionid=1&a=b').then(Include).abort()");
        assert_eq!(result.verdict, Verdict::Include);
    }

    #[test]
    fn url_list_without_a_hit_does_not_match() {
        let result = Check::uri("http://foo.bar/aa/")
            .run("isUrl('foo.bar/aa/ example.com').then(Blocked).abort()");
        assert_eq!(result.verdict, Verdict::Exclude(ScopeStatus::BLOCKED));
        assert_eq!(
            result.error.map(|e| e.detail),
            Some("no scope rule matched".to_owned())
        );
    }

    #[test]
    fn hop_count_beyond_the_limit_matches() {
        let result = base()
            .path("RLERLR")
            .run("maxHopsFromSeed(2).then(TooManyHops).abort()");
        assert_eq!(result.verdict, Verdict::Exclude(ScopeStatus::TOO_MANY_HOPS));
        assert_eq!(result.error, None);
    }

    #[test]
    fn hop_count_at_the_limit_does_not_match() {
        // "RLERLR" holds three non-redirect hops.
        let result = base()
            .path("RLERLR")
            .run("maxHopsFromSeed(3).then(TooManyHops).abort()");
        assert_eq!(result.verdict, Verdict::Exclude(ScopeStatus::BLOCKED));
    }

    #[test]
    fn hop_limit_accepts_numeric_annotation_strings() {
        let result = base()
            .path("RLERLR")
            .annotation("depth", "2")
            .run("maxHopsFromSeed(param('depth')).then(TooManyHops).abort()");
        assert_eq!(result.verdict, Verdict::Exclude(ScopeStatus::TOO_MANY_HOPS));
    }

    #[test]
    fn redirect_hops_count_when_included() {
        let result = base()
            .path("RLERLR")
            .annotation("depth", "5")
            .annotation("includeRedirects", "yeS")
            .run("maxHopsFromSeed(param('depth'), param('includeRedirects')).then(TooManyHops).abort()");
        assert_eq!(result.verdict, Verdict::Exclude(ScopeStatus::TOO_MANY_HOPS));
    }

    #[test]
    fn hop_limit_of_none_is_a_runtime_error() {
        let result = base()
            .path("RL")
            .run("maxHopsFromSeed(None).then(TooManyHops).abort()");
        assert_eq!(
            result.verdict,
            Verdict::Exclude(ScopeStatus::RUNTIME_EXCEPTION)
        );
    }

    #[test]
    fn non_numeric_hop_limit_never_matches() {
        let result = base()
            .path("RL")
            .run("maxHopsFromSeed('plenty').then(TooManyHops).abort()");
        assert_eq!(result.verdict, Verdict::Exclude(ScopeStatus::BLOCKED));
    }

    #[test]
    fn decision_without_abort_still_counts() {
        let result = base().run("test(True).then(ChaffDetection)");
        assert_eq!(
            result.verdict,
            Verdict::Exclude(ScopeStatus::CHAFF_DETECTION)
        );
        assert_eq!(result.console, "");
        assert_eq!(result.error, None);
    }

    #[test]
    fn debug_transcript_records_calls_and_positions() {
        let result = base()
            .annotation("testValue", "True")
            .debug()
            .run("test(param(\"testValue\")).then(ChaffDetection).abort()");
        assert_eq!(
            result.verdict,
            Verdict::Exclude(ScopeStatus::CHAFF_DETECTION)
        );
        let lines: Vec<&str> = result.console.lines().collect();
        assert_eq!(lines.len(), 2, "console: {}", result.console);
        assert!(lines[0].starts_with("scope_script:1:"), "line: {}", lines[0]);
        assert!(lines[0].ends_with("test(\"True\") match=True"), "line: {}", lines[0]);
        assert!(lines[1].starts_with("scope_script:1:"), "line: {}", lines[1]);
        assert!(
            lines[1].ends_with("match.then(ChaffDetection) status=ChaffDetection"),
            "line: {}",
            lines[1]
        );
    }

    #[test]
    fn transcript_is_empty_without_the_debug_flag() {
        let result = base()
            .annotation("testValue", "True")
            .run("test(param(\"testValue\")).then(ChaffDetection).abort()");
        assert_eq!(result.console, "");
    }

    #[test]
    fn scripts_can_turn_the_transcript_on() {
        let result = base().run("debug()\nisScheme('http').then(Include).abort()");
        assert_eq!(result.verdict, Verdict::Include);
        let lines: Vec<&str> = result.console.lines().collect();
        assert_eq!(lines.len(), 2, "console: {}", result.console);
        assert!(lines[0].contains("isScheme(\"http\")"), "line: {}", lines[0]);
        assert!(lines[0].contains("match=True"), "line: {}", lines[0]);
        assert!(lines[1].contains("match.then(Include)"), "line: {}", lines[1]);
    }

    #[test]
    fn stacktraces_append_to_transcript_lines() {
        let result = base().run("debug(True, True)\nisScheme('http').then(Include).abort()");
        assert_eq!(result.verdict, Verdict::Include);
        assert!(
            result.console.contains("Traceback (most recent call last):"),
            "console: {}",
            result.console
        );
    }

    #[test]
    fn syntax_errors_report_the_compile_diagnostic() {
        let result = base().run("test(");
        assert_eq!(
            result.verdict,
            Verdict::Exclude(ScopeStatus::RUNTIME_EXCEPTION)
        );
        assert_eq!(canonical(&result), "http://foo.bar/aa%20bb/cc?foo&jsessionid=1");
        assert_eq!(result.console, "");
        let error = result.error.unwrap();
        assert_eq!(error.msg, "error parsing scope script");
        assert!(
            error.detail.starts_with("scope_script:1:"),
            "detail: {}",
            error.detail
        );
    }

    #[test]
    fn unparsable_uris_skip_evaluation() {
        let result = Check::uri("http://exa mple.com/").run("setStatus(Include)");
        assert_eq!(result.verdict, Verdict::Exclude(ScopeStatus::ILLEGAL_URI));
        assert_eq!(result.canonical, None);
        let error = result.error.unwrap();
        assert_eq!(error.code, -7);
        assert_eq!(error.msg, "error parsing uri");
        assert!(!error.detail.is_empty());
    }

    #[test]
    fn bare_abort_stops_the_script() {
        let result = base().run("abort()\nsetStatus(Include)");
        assert_eq!(result.verdict, Verdict::Exclude(ScopeStatus::BLOCKED));
    }

    #[test]
    fn abort_on_a_false_match_falls_through() {
        let result = base().run("isScheme('https').abort()\nsetStatus(Include)");
        assert_eq!(result.verdict, Verdict::Include);
    }

    #[test]
    fn statuses_are_addressable_by_name() {
        let result = base().run("setStatus('ChaffDetection')");
        assert_eq!(
            result.verdict,
            Verdict::Exclude(ScopeStatus::CHAFF_DETECTION)
        );
        let by_name = base().run("isScheme('http').then('TooManyHops').abort()");
        assert_eq!(by_name.verdict, Verdict::Exclude(ScopeStatus::TOO_MANY_HOPS));
    }

    #[test]
    fn unknown_status_names_are_runtime_errors() {
        let result = base().run("setStatus('Nope')");
        assert_eq!(
            result.verdict,
            Verdict::Exclude(ScopeStatus::RUNTIME_EXCEPTION)
        );
        assert!(
            result.error.unwrap().detail.contains("unknown status 'Nope'"),
            "expected the unknown name in the detail"
        );
    }

    #[test]
    fn get_status_reads_the_pending_decision() {
        let result = base().run("setStatus(Include)\ntest(getStatus() == Include).then(ChaffDetection)");
        assert_eq!(
            result.verdict,
            Verdict::Exclude(ScopeStatus::CHAFF_DETECTION)
        );
        let unset = base().run("test(getStatus() == None).then(Blocked)");
        assert_eq!(unset.verdict, Verdict::Exclude(ScopeStatus::BLOCKED));
        assert_eq!(unset.error, None);
    }

    #[test]
    fn remove_query_affects_matching_but_not_the_reported_uri() {
        let result = Check::uri("http://foo.bar/cc?jsessionid=1&foo")
            .run("removeQuery('jsessionid')\nisUrl('http://foo.bar/cc?foo').then(Include).abort()");
        assert_eq!(result.verdict, Verdict::Include);
        assert_eq!(canonical(&result), "http://foo.bar/cc?foo&jsessionid=1");
    }

    #[test]
    fn url_value_exposes_host_and_port() {
        let with_port = Check::uri("http://foo.bar:8080/aa")
            .run("test(url().host() == 'foo.bar:8080').then(Include).abort()");
        assert_eq!(with_port.verdict, Verdict::Include);
        let default_port = Check::uri("http://foo.bar/aa")
            .run("test(url().host() == 'foo.bar' and url().port() == '').then(Include).abort()");
        assert_eq!(default_port.verdict, Verdict::Include);
    }

    #[test]
    fn annotations_bind_as_script_variables() {
        let result = base()
            .annotation("testValue", "True")
            .run("test(testValue).then(ChaffDetection)");
        assert_eq!(
            result.verdict,
            Verdict::Exclude(ScopeStatus::CHAFF_DETECTION)
        );
    }

    #[test]
    fn print_output_lands_in_the_console() {
        let result = base().run("print('hello from the scope script')");
        assert_eq!(result.console, "hello from the scope script\n");
        assert_eq!(result.verdict, Verdict::Exclude(ScopeStatus::BLOCKED));
    }
}
