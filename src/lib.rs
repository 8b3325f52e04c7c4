//! HTTP ingestion endpoint for structured messages (CloudEvents-style envelopes).
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ net::Listener ──▶ net::ConnectionSet (task per connection)
//!                                              │
//!                                              ▼
//!                      request-id / trace / catch-panic layers
//!                                              │
//!                                              ▼
//!                      http::probe ── probe? ──▶ checker (or 503 while draining)
//!                                              │
//!                                              ▼
//!                      application handler (caller supplied)
//!
//!     lifecycle::controller:
//!         Listening ──cancel──▶ quiet period ──▶ stop accepting
//!             ──▶ graceful stop ∥ shutdown deadline ──▶ Terminated
//! ```
//!
//! The entry point is [`MessageReceiver::start_listen`], which blocks until
//! the [`Shutdown`] handle paired with its [`ShutdownSignal`] is triggered
//! and the drain has finished or timed out.

// Core subsystems
pub mod config;
pub mod http;
pub mod net;

// Cross-cutting concerns
pub mod error;
pub mod lifecycle;
pub mod observability;

pub use config::{ReceiverConfig, ReceiverOption};
pub use error::ReceiverError;
pub use http::MessageReceiver;
pub use lifecycle::{with_shutdown_timeout, Shutdown, ShutdownSignal};
