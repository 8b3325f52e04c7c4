//! Shared utilities for receiver integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use message_receiver::{MessageReceiver, ReceiverError, ShutdownSignal};
use tokio::task::JoinHandle;

/// Send receiver logs to the test output.
pub fn init_tracing() {
    message_receiver::observability::init_tracing("message_receiver=debug");
}

/// HTTP client that never goes through an environment proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Poll `check` every `tick` until it returns true or `within` elapses.
pub async fn eventually<F, Fut>(within: Duration, tick: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + within;
    loop {
        if check().await {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(tick).await;
    }
}

/// Run `start_listen` on its own task, the way callers wanting a non-blocking start do.
pub fn spawn_receiver<H>(
    receiver: &Arc<MessageReceiver>,
    signal: ShutdownSignal,
    handler: H,
) -> JoinHandle<Result<(), ReceiverError>>
where
    H: tower::Service<axum::extract::Request, Error = std::convert::Infallible>
        + Clone
        + Send
        + Sync
        + 'static,
    H::Response: axum::response::IntoResponse,
    H::Future: Send + 'static,
{
    let receiver = Arc::clone(receiver);
    tokio::spawn(async move { receiver.start_listen(signal, handler).await })
}

/// Wait until the receiver has bound its socket; returns a loopback address for it.
pub async fn bound_addr(receiver: &MessageReceiver) -> SocketAddr {
    let bound = eventually(Duration::from_secs(2), Duration::from_millis(5), || async move {
        receiver.local_addr().is_some()
    })
    .await;
    assert!(bound, "receiver never bound its socket");

    let port = receiver.local_addr().unwrap().port();
    SocketAddr::from(([127, 0, 0, 1], port))
}

/// Await the receiver task's result, failing the test if it hangs.
pub async fn join(handle: JoinHandle<Result<(), ReceiverError>>) -> Result<(), ReceiverError> {
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("receiver did not terminate")
        .expect("receiver task panicked")
}
