//! Drain state shared between the controller and the probe router.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Flag raised once shutdown has been observed.
///
/// While it is raised, probe requests report not-ready so upstream load
/// balancers stop routing new traffic during the quiet period.
#[derive(Debug, Clone, Default)]
pub struct DrainState {
    draining: Arc<AtomicBool>,
}

impl DrainState {
    /// Create a new drain state (initially serving).
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the receiver as draining. Returns `false` if it already was.
    pub fn start(&self) -> bool {
        !self.draining.swap(true, Ordering::SeqCst)
    }

    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::SeqCst)
    }
}
