//! Serve, drain, terminate.
//!
//! ```text
//! Listening ──cancel──▶ Draining (quiet period, still accepting)
//!                           │
//!                           ▼
//!                       listener closed, graceful stop sent to every connection
//!                           │
//!            ┌──────────────┴───────────────┐
//!     all connections done           deadline elapsed
//!            ▼                              ▼
//!        Ok(())                 abort connections, DeadlineExceeded
//! ```
//!
//! The deadline starts when cancellation is observed and covers the quiet
//! period too, so a timeout shorter than the quiet period fires while the
//! listener is still accepting.

use std::future::Future;
use std::time::Duration;

use axum::Router;
use tokio::time::Instant;

use crate::error::ReceiverError;
use crate::lifecycle::{DrainState, ShutdownSignal};
use crate::net::{ConnectionSet, Listener};

/// Absolute shutdown deadline, plus the timeout it was derived from.
#[derive(Debug, Clone, Copy)]
struct Deadline {
    at: Instant,
    timeout: Duration,
}

/// Owns one listener for one start/stop cycle.
#[derive(Debug)]
pub struct LifecycleController {
    drain_quiet_period: Duration,
    shutdown_timeout: Option<Duration>,
    drain: DrainState,
}

impl LifecycleController {
    pub fn new(drain_quiet_period: Duration, shutdown_timeout: Option<Duration>, drain: DrainState) -> Self {
        Self {
            drain_quiet_period,
            shutdown_timeout,
            drain,
        }
    }

    /// Serve `app` on `listener` until `signal` fires, then drain.
    pub async fn run(
        self,
        listener: Listener,
        app: Router,
        mut signal: ShutdownSignal,
    ) -> Result<(), ReceiverError> {
        let mut connections = ConnectionSet::new();

        serve_until(&listener, &app, &mut connections, signal.cancelled()).await;

        let deadline = self.shutdown_timeout.map(|timeout| Deadline {
            at: Instant::now() + timeout,
            timeout,
        });
        self.drain.start();
        tracing::info!(
            quiet_period = ?self.drain_quiet_period,
            shutdown_timeout = ?self.shutdown_timeout,
            open_connections = connections.len(),
            "Shutdown observed, draining"
        );

        let quiet_period = tokio::time::sleep(self.drain_quiet_period);
        let outcome = within(
            deadline,
            serve_until(&listener, &app, &mut connections, quiet_period),
        )
        .await;
        if let Err(deadline) = outcome {
            return force_close(&mut connections, deadline).await;
        }

        drop(listener);
        tracing::info!(
            open_connections = connections.len(),
            "Listener closed, waiting for connections to finish"
        );

        let outcome = within(deadline, connections.drain()).await;
        if let Err(deadline) = outcome {
            return force_close(&mut connections, deadline).await;
        }

        tracing::info!("All connections drained");
        Ok(())
    }
}

/// Accept and serve connections until `stop` resolves.
async fn serve_until<F>(listener: &Listener, app: &Router, connections: &mut ConnectionSet, stop: F)
where
    F: Future,
{
    tokio::pin!(stop);
    loop {
        tokio::select! {
            _ = &mut stop => return,
            (stream, peer_addr) = listener.accept() => {
                connections.serve(stream, peer_addr, app.clone());
            }
            _ = connections.reap_one(), if !connections.is_empty() => {}
        }
    }
}

/// Run `future` to completion, or give up at the deadline if there is one.
async fn within<F>(deadline: Option<Deadline>, future: F) -> Result<F::Output, Deadline>
where
    F: Future,
{
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline.at, future)
            .await
            .map_err(|_| deadline),
        None => Ok(future.await),
    }
}

async fn force_close(connections: &mut ConnectionSet, deadline: Deadline) -> Result<(), ReceiverError> {
    tracing::warn!(
        timeout = ?deadline.timeout,
        open_connections = connections.len(),
        "Shutdown deadline exceeded, closing remaining connections"
    );
    connections.abort().await;
    Err(ReceiverError::DeadlineExceeded {
        timeout: deadline.timeout,
    })
}
