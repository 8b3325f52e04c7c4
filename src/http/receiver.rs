//! The receiver facade.
//!
//! # Responsibilities
//! - Apply configuration options
//! - Wrap the application handler behind probe triage and request middleware
//! - Bind, publish the bound address, then hand over to the lifecycle controller

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use axum::{
    extract::Request,
    middleware::from_fn_with_state,
    response::IntoResponse,
    Router,
};
use tower::Service;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{ReceiverConfig, ReceiverOption};
use crate::error::ReceiverError;
use crate::http::probe::{probe_triage, ProbeRouter};
use crate::lifecycle::{DrainState, LifecycleController, ShutdownSignal};
use crate::net::{Listener, ListenerError};

/// HTTP ingestion endpoint for structured messages.
///
/// Single-use: one [`start_listen`](Self::start_listen) per receiver. Share it
/// through an `Arc` to read [`local_addr`](Self::local_addr) while it serves.
///
/// ```no_run
/// # use std::sync::Arc;
/// # use std::time::Duration;
/// # use axum::{routing::post, Router};
/// # use message_receiver::{MessageReceiver, Shutdown, config::with_drain_quiet_period};
/// # async fn run() -> Result<(), message_receiver::ReceiverError> {
/// let receiver = Arc::new(MessageReceiver::new(8080, [with_drain_quiet_period(Duration::from_secs(45))]));
/// let shutdown = Shutdown::new();
/// let handler = Router::new().route("/", post(|| async { "accepted" }));
///
/// let serving = tokio::spawn({
///     let receiver = receiver.clone();
///     let signal = shutdown.signal().with_shutdown_timeout(Duration::from_secs(60));
///     async move { receiver.start_listen(signal, handler).await }
/// });
///
/// // ... later
/// shutdown.trigger();
/// # serving.await.unwrap()
/// # }
/// ```
#[derive(Debug)]
pub struct MessageReceiver {
    config: ReceiverConfig,
    local_addr: OnceLock<SocketAddr>,
    started: AtomicBool,
}

impl MessageReceiver {
    /// Create a receiver for `port` (0 = ephemeral), applying `options` in order.
    pub fn new<I>(port: u16, options: I) -> Self
    where
        I: IntoIterator<Item = ReceiverOption>,
    {
        Self::from_config(ReceiverConfig::new(port).apply(options))
    }

    pub fn from_config(config: ReceiverConfig) -> Self {
        Self {
            config,
            local_addr: OnceLock::new(),
            started: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &ReceiverConfig {
        &self.config
    }

    /// The bound address, once the socket has been acquired.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr.get().copied()
    }

    /// Bind, serve `handler` until `signal` fires, then drain.
    ///
    /// Returns `Ok(())` on a clean shutdown, [`ReceiverError::DeadlineExceeded`]
    /// when the shutdown timeout forced connections closed, and
    /// [`ReceiverError::Bind`] when the socket could not be acquired.
    ///
    /// A timeout carried by `signal` overrides the configured one.
    pub async fn start_listen<H>(&self, signal: ShutdownSignal, handler: H) -> Result<(), ReceiverError>
    where
        H: Service<Request, Error = Infallible> + Clone + Send + Sync + 'static,
        H::Response: IntoResponse,
        H::Future: Send + 'static,
    {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(ReceiverError::AlreadyStarted);
        }

        let listener = Listener::bind(&self.config).await?;
        let addr = listener.local_addr().map_err(ListenerError::LocalAddr)?;
        let _ = self.local_addr.set(addr);

        let drain = DrainState::new();
        let probes = ProbeRouter::new(self.config.checker().cloned(), drain.clone());
        let app = build_app(handler, probes);

        let shutdown_timeout = signal.shutdown_timeout().or(self.config.shutdown_timeout());
        tracing::info!(
            address = %addr,
            quiet_period = ?self.config.drain_quiet_period(),
            shutdown_timeout = ?shutdown_timeout,
            checker = self.config.checker().is_some(),
            "Message receiver listening"
        );

        let result = LifecycleController::new(self.config.drain_quiet_period(), shutdown_timeout, drain)
            .run(listener, app, signal)
            .await;

        match &result {
            Ok(()) => tracing::info!(address = %addr, "Message receiver stopped"),
            Err(e) => tracing::warn!(address = %addr, error = %e, "Message receiver stopped"),
        }
        result
    }
}

/// Wrap the application handler with probe triage and request middleware.
fn build_app<H>(handler: H, probes: ProbeRouter) -> Router
where
    H: Service<Request, Error = Infallible> + Clone + Send + Sync + 'static,
    H::Response: IntoResponse,
    H::Future: Send + 'static,
{
    Router::new()
        .fallback_service(handler)
        .layer(from_fn_with_state(probes, probe_triage))
        .layer(CatchPanicLayer::new())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
