//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields (address, connection_id, ...)
//!     → request spans from tower-http TraceLayer, tagged with x-request-id
//!
//! Consumers:
//!     → logging.rs (fmt subscriber filtered by RUST_LOG)
//! ```
//!
//! # Design Decisions
//! - Library code only emits events; installing a subscriber is the caller's choice
//! - Lifecycle transitions at info, per-connection detail at debug/trace

pub mod logging;

pub use logging::init_tracing;
