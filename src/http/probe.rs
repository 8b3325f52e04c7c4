//! Probe triage.
//!
//! # Responsibilities
//! - Classify requests as infrastructure probes (kubelet health/readiness checks)
//! - Route probes to the configured checker instead of the application handler
//! - Report not-ready to probes once the receiver is draining
//!
//! # Design Decisions
//! - Classification is header-only; bodies are never read
//! - The checker's response fully replaces the handler's, no fallback chaining
//! - Probes without a checker fall through to the handler unmodified

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::Checker;
use crate::lifecycle::DrainState;

/// User-Agent prefix sent by kubelet probes.
pub const KUBE_PROBE_UA_PREFIX: &str = "kube-probe/";

/// Header kubelet attaches to probes whose User-Agent was overridden.
pub const KUBELET_PROBE_HEADER: &str = "k-kubelet-probe";

/// Whether `headers` identify an infrastructure probe.
pub fn is_probe(headers: &HeaderMap) -> bool {
    let ua_match = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ua| ua.starts_with(KUBE_PROBE_UA_PREFIX));

    let header_match = headers
        .get(KUBELET_PROBE_HEADER)
        .is_some_and(|v| !v.is_empty());

    ua_match || header_match
}

/// Where a request goes.
pub enum Route<'a> {
    /// Probe during drain: answer 503.
    NotReady,
    /// Probe with a checker installed.
    Checker(&'a Checker),
    /// Everything else.
    Handler,
}

/// Per-request dispatch between the checker and the application handler.
#[derive(Clone)]
pub struct ProbeRouter {
    checker: Option<Checker>,
    drain: DrainState,
}

impl ProbeRouter {
    pub fn new(checker: Option<Checker>, drain: DrainState) -> Self {
        Self { checker, drain }
    }

    pub fn route(&self, request: &Request) -> Route<'_> {
        if !is_probe(request.headers()) {
            return Route::Handler;
        }
        if self.drain.is_draining() {
            return Route::NotReady;
        }
        match &self.checker {
            Some(checker) => Route::Checker(checker),
            None => Route::Handler,
        }
    }
}

/// Middleware applying [`ProbeRouter::route`] in front of the application handler.
pub async fn probe_triage(
    State(router): State<ProbeRouter>,
    request: Request,
    next: Next,
) -> Response {
    match router.route(&request) {
        Route::NotReady => {
            tracing::debug!(path = %request.uri().path(), "Probe while draining, reporting not ready");
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
        Route::Checker(checker) => {
            tracing::trace!(path = %request.uri().path(), "Probe routed to checker");
            checker(&request)
        }
        Route::Handler => next.run(request).await,
    }
}
