//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ReceiverConfig
//!     → listener.rs (adopt pre-bound socket, or bind 0.0.0.0:port)
//!     → accept loop (transient accept errors retried)
//!     → connection.rs (one task per connection, graceful watcher, abort on force)
//!     → Hand off to HTTP layer (hyper auto: HTTP/1.1 + HTTP/2)
//!
//! Connection States:
//!     Active → Draining (graceful stop sent) → Closed
//!                      ↘ Aborted (deadline exceeded)
//! ```
//!
//! # Design Decisions
//! - Bind failures are fatal and surfaced immediately
//! - Each connection tracked so the controller can drain or abort it

pub mod connection;
pub mod listener;

pub use connection::{ConnectionId, ConnectionSet};
pub use listener::{Listener, ListenerError};
