//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Cancellation (shutdown.rs):
//!     Shutdown::trigger() / drop → ShutdownSignal resolves (once)
//!
//! Drain flag (drain.rs):
//!     raised when cancellation is observed → probes answer 503
//!
//! Controller (controller.rs):
//!     Listening → quiet period (still accepting) → stop accepting
//!     → graceful stop ∥ deadline → Terminated
//! ```
//!
//! # Design Decisions
//! - Cancellation is caller-driven; the controller never stops on its own
//! - Shutdown timeout is measured from the moment cancellation is observed
//! - Deadline forces connections closed and is reported as an error

pub mod controller;
pub mod drain;
pub mod shutdown;

pub use controller::LifecycleController;
pub use drain::DrainState;
pub use shutdown::{with_shutdown_timeout, Shutdown, ShutdownSignal};
