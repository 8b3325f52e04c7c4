//! Receiver configuration and the options that build it.

use std::fmt;
use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::extract::Request;
use axum::response::{IntoResponse, Response};

use crate::config::schema::ReceiverSettings;

/// Callback answering requests classified as infrastructure probes.
///
/// Its response replaces the application handler's for that request.
pub type Checker = Arc<dyn Fn(&Request) -> Response + Send + Sync>;

/// A socket bound by the caller, handed over to the first receiver that starts on it.
///
/// Clones of a config share the slot, so the socket has exactly one owner
/// once taken and is closed when that owner stops.
#[derive(Clone)]
pub struct PreBoundListener(Arc<Mutex<Option<StdTcpListener>>>);

impl PreBoundListener {
    fn new(listener: StdTcpListener) -> Self {
        Self(Arc::new(Mutex::new(Some(listener))))
    }

    /// Move the socket out. `None` once a receiver has taken it.
    pub fn take(&self) -> Option<StdTcpListener> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    /// Address of the socket while it is still waiting to be taken.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(|listener| listener.local_addr().ok())
    }
}

/// Immutable receiver configuration.
///
/// Built from a port and a list of [`ReceiverOption`]s, or through the
/// `with_*` methods, each of which consumes the config and returns a new one.
#[derive(Clone, Default)]
pub struct ReceiverConfig {
    port: u16,
    drain_quiet_period: Duration,
    shutdown_timeout: Option<Duration>,
    checker: Option<Checker>,
    listener: Option<PreBoundListener>,
}

impl ReceiverConfig {
    /// Create a config for `port` with every option at its default.
    pub fn new(port: u16) -> Self {
        Self {
            port,
            ..Self::default()
        }
    }

    /// Keep accepting for `period` after cancellation before closing the listener.
    pub fn with_drain_quiet_period(mut self, period: Duration) -> Self {
        self.drain_quiet_period = period;
        self
    }

    /// Bound the whole shutdown, measured from the moment cancellation is observed.
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = Some(timeout);
        self
    }

    /// Answer probe requests with `checker` instead of the application handler.
    pub fn with_checker<F, R>(mut self, checker: F) -> Self
    where
        F: Fn(&Request) -> R + Send + Sync + 'static,
        R: IntoResponse,
    {
        self.checker = Some(Arc::new(move |request: &Request| {
            checker(request).into_response()
        }));
        self
    }

    /// Serve on an already bound socket. Takes precedence over the port.
    pub fn with_listener(mut self, listener: StdTcpListener) -> Self {
        self.listener = Some(PreBoundListener::new(listener));
        self
    }

    /// Apply `options` in order.
    pub fn apply<I>(self, options: I) -> Self
    where
        I: IntoIterator<Item = ReceiverOption>,
    {
        options
            .into_iter()
            .fold(self, |config, option| option.apply(config))
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn drain_quiet_period(&self) -> Duration {
        self.drain_quiet_period
    }

    pub fn shutdown_timeout(&self) -> Option<Duration> {
        self.shutdown_timeout
    }

    pub fn checker(&self) -> Option<&Checker> {
        self.checker.as_ref()
    }

    pub fn listener(&self) -> Option<&PreBoundListener> {
        self.listener.as_ref()
    }
}

impl fmt::Debug for ReceiverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReceiverConfig")
            .field("port", &self.port)
            .field("drain_quiet_period", &self.drain_quiet_period)
            .field("shutdown_timeout", &self.shutdown_timeout)
            .field("checker", &self.checker.is_some())
            .field("listener", &self.listener.as_ref().and_then(PreBoundListener::local_addr))
            .finish()
    }
}

impl From<ReceiverSettings> for ReceiverConfig {
    fn from(settings: ReceiverSettings) -> Self {
        let config = ReceiverConfig::new(settings.port)
            .with_drain_quiet_period(Duration::from_millis(settings.drain_quiet_period_ms));
        match settings.shutdown_timeout_ms {
            Some(ms) => config.with_shutdown_timeout(Duration::from_millis(ms)),
            None => config,
        }
    }
}

/// A single configuration toggle, applied at construction time.
pub enum ReceiverOption {
    DrainQuietPeriod(Duration),
    ShutdownTimeout(Duration),
    Checker(Checker),
    Listener(StdTcpListener),
}

impl ReceiverOption {
    /// Apply this option, producing the derived config.
    pub fn apply(self, config: ReceiverConfig) -> ReceiverConfig {
        match self {
            ReceiverOption::DrainQuietPeriod(period) => config.with_drain_quiet_period(period),
            ReceiverOption::ShutdownTimeout(timeout) => config.with_shutdown_timeout(timeout),
            ReceiverOption::Checker(checker) => ReceiverConfig {
                checker: Some(checker),
                ..config
            },
            ReceiverOption::Listener(listener) => config.with_listener(listener),
        }
    }
}

impl fmt::Debug for ReceiverOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReceiverOption::DrainQuietPeriod(d) => f.debug_tuple("DrainQuietPeriod").field(d).finish(),
            ReceiverOption::ShutdownTimeout(d) => f.debug_tuple("ShutdownTimeout").field(d).finish(),
            ReceiverOption::Checker(_) => f.write_str("Checker(..)"),
            ReceiverOption::Listener(l) => f.debug_tuple("Listener").field(l).finish(),
        }
    }
}

pub fn with_drain_quiet_period(period: Duration) -> ReceiverOption {
    ReceiverOption::DrainQuietPeriod(period)
}

pub fn with_shutdown_timeout(timeout: Duration) -> ReceiverOption {
    ReceiverOption::ShutdownTimeout(timeout)
}

pub fn with_checker<F, R>(checker: F) -> ReceiverOption
where
    F: Fn(&Request) -> R + Send + Sync + 'static,
    R: IntoResponse,
{
    ReceiverOption::Checker(Arc::new(move |request: &Request| {
        checker(request).into_response()
    }))
}

pub fn with_listener(listener: StdTcpListener) -> ReceiverOption {
    ReceiverOption::Listener(listener)
}
