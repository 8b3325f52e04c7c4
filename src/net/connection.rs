//! Connection lifecycle tracking.
//!
//! # Responsibilities
//! - Serve each accepted connection on its own task
//! - Generate unique connection IDs for tracing
//! - Stop connections gracefully on drain, or abort them on deadline

use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::Router;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder;
use hyper_util::server::graceful::GracefulShutdown;
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpStream;
use tokio::task::JoinSet;

// Ids only need to be distinct, so relaxed increments are enough.
static NEXT_CONNECTION: AtomicU64 = AtomicU64::new(1);

/// Process-wide sequence number tagging a connection's log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Take the next id in the sequence.
    pub fn next() -> Self {
        Self(NEXT_CONNECTION.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// The set of live connections owned by one receiver run.
///
/// Every connection is registered with a graceful-shutdown watcher and runs
/// on a task in a `JoinSet`, so the owner can either ask all of them to
/// finish their in-flight requests or abort them outright.
pub struct ConnectionSet {
    tasks: JoinSet<()>,
    graceful: GracefulShutdown,
    builder: Builder<TokioExecutor>,
}

impl ConnectionSet {
    pub fn new() -> Self {
        Self {
            tasks: JoinSet::new(),
            graceful: GracefulShutdown::new(),
            builder: Builder::new(TokioExecutor::new()),
        }
    }

    /// Serve `stream` with `app` on a new task.
    pub fn serve(&mut self, stream: TcpStream, peer_addr: SocketAddr, app: Router) {
        let id = ConnectionId::next();
        let io = TokioIo::new(stream);
        let service = TowerToHyperService::new(app);
        let watcher = self.graceful.watcher();
        let builder = self.builder.clone();

        tracing::debug!(connection_id = %id, peer_addr = %peer_addr, "Serving connection");

        self.tasks.spawn(async move {
            let conn = builder.serve_connection_with_upgrades(io, service);
            if let Err(e) = watcher.watch(conn).await {
                tracing::debug!(connection_id = %id, error = %e, "Connection ended with error");
            }
            tracing::trace!(connection_id = %id, "Connection closed");
        });
    }

    /// Number of connection tasks not yet reaped.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait for one connection task to finish and release it.
    ///
    /// Resolves immediately when the set is empty.
    pub async fn reap_one(&mut self) {
        if let Some(Err(e)) = self.tasks.join_next().await {
            if e.is_panic() {
                tracing::error!(error = %e, "Connection task panicked");
            }
        }
    }

    /// Ask every connection to finish its in-flight requests, then wait for all of them.
    pub async fn drain(&mut self) {
        let graceful = std::mem::replace(&mut self.graceful, GracefulShutdown::new());
        graceful.shutdown().await;
        while !self.tasks.is_empty() {
            self.reap_one().await;
        }
    }

    /// Abort every connection task, closing their sockets.
    pub async fn abort(&mut self) {
        self.tasks.shutdown().await;
    }
}

impl Default for ConnectionSet {
    fn default() -> Self {
        Self::new()
    }
}
