// Path: crates/server/src/grpc.rs
//! gRPC endpoints for scope checking and canonicalization.

use std::future::Future;
use std::net::SocketAddr;

use scopesvc_engine::canonicalize::{self, Profile};
use scopesvc_engine::{check_scope, CheckRequest, StatusError, Verdict};
use scopesvc_ipc::commons::v1::{Error, ParsedUri};
use scopesvc_ipc::v1::scope_check_response::Evaluation;
use scopesvc_ipc::v1::scope_checker_service_server::{
    ScopeCheckerService, ScopeCheckerServiceServer,
};
use scopesvc_ipc::v1::uri_canonicalizer_service_server::{
    UriCanonicalizerService, UriCanonicalizerServiceServer,
};
use scopesvc_ipc::v1::{
    CanonicalizeRequest, CanonicalizeResponse, ScopeCheckRequest, ScopeCheckResponse,
};
use tonic::transport::Server;
use tonic::{Request, Response, Status};
use url::Url;

use crate::metrics::rpc_metrics;

/// Scope decisions for queued URIs.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScopeCheckerImpl;

/// Crawl-profile canonicalization for harvesters.
#[derive(Debug, Default, Clone, Copy)]
pub struct UriCanonicalizerImpl;

#[tonic::async_trait]
impl ScopeCheckerService for ScopeCheckerImpl {
    async fn scope_check(
        &self,
        request: Request<ScopeCheckRequest>,
    ) -> Result<Response<ScopeCheckResponse>, Status> {
        rpc_metrics().inc_scopechecks();
        let req = request.into_inner();
        let queued = req
            .queued_uri
            .ok_or_else(|| Status::invalid_argument("queued_uri is required"))?;
        let annotations: Vec<(String, String)> = queued
            .annotation
            .into_iter()
            .map(|a| (a.key, a.value))
            .collect();

        let result = check_scope(&CheckRequest {
            uri: &queued.uri,
            seed_uri: &queued.seed_uri,
            referrer: &queued.referrer,
            discovery_path: &queued.discovery_path,
            annotations: &annotations,
            script_name: &req.scope_script_name,
            script: &req.scope_script,
            debug: req.debug,
        });

        let (evaluation, exclude_reason) = match result.verdict {
            Verdict::Include => (Evaluation::Include, 0),
            Verdict::Exclude(status) => (Evaluation::Exclude, status.code()),
        };
        rpc_metrics().inc_scopecheck_response(exclude_reason);
        tracing::debug!(
            target: "rpc",
            uri = %queued.uri,
            evaluation = evaluation.as_str_name(),
            code = exclude_reason,
            "scope check"
        );

        let include_check_uri = match &result.canonical {
            Some(url) => parsed_uri(url),
            // The URI never parsed, so it is reported back unchanged.
            None => ParsedUri {
                href: queued.uri.clone(),
                ..ParsedUri::default()
            },
        };

        Ok(Response::new(ScopeCheckResponse {
            evaluation: evaluation as i32,
            exclude_reason,
            include_check_uri: Some(include_check_uri),
            console: result.console,
            error: result.error.map(wire_error),
        }))
    }
}

#[tonic::async_trait]
impl UriCanonicalizerService for UriCanonicalizerImpl {
    async fn canonicalize(
        &self,
        request: Request<CanonicalizeRequest>,
    ) -> Result<Response<CanonicalizeResponse>, Status> {
        rpc_metrics().inc_canonicalizations();
        let req = request.into_inner();
        let url = canonicalize::canonicalize(&req.uri, Profile::Crawl).map_err(|err| {
            Status::invalid_argument(format!("error parsing uri '{}': {err}", req.uri))
        })?;
        Ok(Response::new(CanonicalizeResponse {
            uri: Some(parsed_uri(&url)),
        }))
    }
}

fn wire_error(err: StatusError) -> Error {
    Error {
        code: err.code,
        msg: err.msg,
        detail: err.detail,
    }
}

/// Splits a canonical URL into the wire form. The port falls back to the
/// scheme default, and zero when the scheme has none.
fn parsed_uri(url: &Url) -> ParsedUri {
    ParsedUri {
        href: url.as_str().to_owned(),
        scheme: url.scheme().to_owned(),
        host: url.host_str().unwrap_or_default().to_owned(),
        port: url.port_or_known_default().map_or(0, i32::from),
        username: url.username().to_owned(),
        password: url.password().unwrap_or_default().to_owned(),
        path: url.path().to_owned(),
        query: url.query().unwrap_or_default().to_owned(),
        fragment: url.fragment().unwrap_or_default().to_owned(),
    }
}

/// Serves both services on `addr` until `shutdown` resolves.
pub async fn serve(addr: SocketAddr, shutdown: impl Future<Output = ()>) -> anyhow::Result<()> {
    tracing::info!(target: "rpc", %addr, "gRPC endpoint listening");
    Server::builder()
        .add_service(ScopeCheckerServiceServer::new(ScopeCheckerImpl))
        .add_service(UriCanonicalizerServiceServer::new(UriCanonicalizerImpl))
        .serve_with_shutdown(addr, shutdown)
        .await?;
    Ok(())
}
