//! Errors surfaced by the blocking receiver call.

use std::time::Duration;

use thiserror::Error;

use crate::net::ListenerError;

/// Why [`MessageReceiver::start_listen`](crate::MessageReceiver::start_listen) returned early or with an error.
///
/// A clean shutdown is `Ok(())`. Request-level failures never show up here;
/// they are answered with HTTP status codes.
#[derive(Debug, Error)]
pub enum ReceiverError {
    /// The socket could not be acquired. Not retried.
    #[error(transparent)]
    Bind(#[from] ListenerError),

    /// The shutdown timeout elapsed before connections drained; they were closed forcibly.
    #[error("shutdown deadline of {timeout:?} exceeded before connections drained")]
    DeadlineExceeded { timeout: Duration },

    /// `start_listen` was called on a receiver that already ran.
    #[error("receiver already started")]
    AlreadyStarted,
}

impl ReceiverError {
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, ReceiverError::DeadlineExceeded { .. })
    }
}
