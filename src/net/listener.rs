//! TCP listener acquisition and accept loop.
//!
//! # Responsibilities
//! - Adopt a pre-bound socket, or bind to the configured port
//! - Accept incoming TCP connections
//! - Ride out transient accept errors without stopping the server

use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};

use crate::config::ReceiverConfig;

/// Error type for listener acquisition.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    /// Failed to hand a pre-bound socket over to the runtime.
    #[error("failed to adopt pre-bound listener: {0}")]
    Adopt(#[source] io::Error),
    /// The pre-bound socket was already handed to another receiver.
    #[error("pre-bound listener was already taken by another receiver")]
    Taken,
    /// The socket was acquired but its address could not be read.
    #[error("failed to read bound address: {0}")]
    LocalAddr(#[source] io::Error),
}

/// A bound TCP listener.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
}

impl Listener {
    /// Acquire the socket described by `config`.
    ///
    /// A pre-bound listener wins over the port and is moved out of the
    /// config, so dropping the returned listener closes it. Port 0 lets the OS pick.
    pub async fn bind(config: &ReceiverConfig) -> Result<Self, ListenerError> {
        let inner = match config.listener() {
            Some(pre_bound) => {
                let std_listener = pre_bound.take().ok_or(ListenerError::Taken)?;
                std_listener
                    .set_nonblocking(true)
                    .map_err(ListenerError::Adopt)?;
                TcpListener::from_std(std_listener).map_err(ListenerError::Adopt)?
            }
            None => {
                let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port()));
                TcpListener::bind(addr)
                    .await
                    .map_err(|source| ListenerError::Bind { addr, source })?
            }
        };

        let listener = Self { inner };
        if let Ok(local_addr) = listener.local_addr() {
            tracing::info!(address = %local_addr, "Listener bound");
        }
        Ok(listener)
    }

    /// Accept the next connection.
    ///
    /// Per-connection failures are skipped; other errors (e.g. fd exhaustion)
    /// back off for a second and retry.
    pub async fn accept(&self) -> (TcpStream, SocketAddr) {
        loop {
            match self.inner.accept().await {
                Ok((stream, peer_addr)) => {
                    tracing::trace!(peer_addr = %peer_addr, "Connection accepted");
                    return (stream, peer_addr);
                }
                Err(e) if is_connection_error(&e) => {
                    tracing::debug!(error = %e, "Connection failed before accept");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Accept error, backing off");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, io::Error> {
        self.inner.local_addr()
    }
}

fn is_connection_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
    )
}
