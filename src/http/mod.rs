//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! hyper connection (net layer)
//!     → SetRequestId / Trace / PropagateRequestId / CatchPanic layers
//!     → probe.rs (probe? → checker or 503 while draining)
//!     → application handler (decodes the message envelope itself)
//!     → Send to client
//! ```

pub mod probe;
pub mod receiver;

pub use probe::{is_probe, ProbeRouter, KUBELET_PROBE_HEADER, KUBE_PROBE_UA_PREFIX};
pub use receiver::MessageReceiver;
