//! Shutdown coordination for the receiver.

use std::time::Duration;

use tokio::sync::watch;

/// Cancellation handle for a running receiver.
///
/// Triggering is idempotent. Dropping the handle counts as triggering it, so a
/// receiver never outlives the code that owns its shutdown.
#[derive(Debug)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    /// Create a new, untriggered shutdown handle.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Hand out a signal that resolves once this handle is triggered.
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
            shutdown_timeout: None,
        }
    }

    /// Trigger the shutdown. Repeated calls are no-ops.
    pub fn trigger(&self) {
        let already = self.tx.send_replace(true);
        if already {
            tracing::debug!("Shutdown already triggered");
        } else {
            tracing::info!("Shutdown triggered");
        }
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// The receiving side of a [`Shutdown`], optionally carrying a shutdown timeout.
///
/// The timeout is relative: the deadline is computed when cancellation is
/// observed, not when the signal is created.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
    shutdown_timeout: Option<Duration>,
}

impl ShutdownSignal {
    /// Decorate this signal with a hard shutdown timeout.
    ///
    /// Overrides any timeout set on the receiver's config.
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = Some(timeout);
        self
    }

    pub fn shutdown_timeout(&self) -> Option<Duration> {
        self.shutdown_timeout
    }

    /// Whether the paired handle has been triggered or dropped.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Wait until the paired handle is triggered or dropped.
    pub async fn cancelled(&mut self) {
        // Err means the handle was dropped.
        let _ = self.rx.wait_for(|cancelled| *cancelled).await;
    }
}

/// Wrap `signal` so the receiver derives a deadline `timeout` after cancellation.
pub fn with_shutdown_timeout(signal: ShutdownSignal, timeout: Duration) -> ShutdownSignal {
    signal.with_shutdown_timeout(timeout)
}
