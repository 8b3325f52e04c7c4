//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! Programmatic:
//!     port + [ReceiverOption, ...]
//!     → options.rs (applied left to right)
//!     → ReceiverConfig (immutable)
//!
//! From a file (TOML):
//!     → loader.rs (parse & deserialize into ReceiverSettings)
//!     → validation.rs (warnings only, every combination is legal)
//!     → ReceiverConfig::from(settings)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once handed to a receiver
//! - Options are pure `ReceiverConfig -> ReceiverConfig` transformations
//! - Checker and pre-bound listener are code-only; files carry plain values

pub mod loader;
pub mod options;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use options::{
    with_checker, with_drain_quiet_period, with_listener, with_shutdown_timeout, Checker,
    PreBoundListener, ReceiverConfig, ReceiverOption,
};
pub use schema::ReceiverSettings;
