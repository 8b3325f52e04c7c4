//! CloudEvents pass through the receiver untouched, in structured and binary mode.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use cloudevents::{AttributesReader, Event, EventBuilder, EventBuilderV10};
use message_receiver::config::with_drain_quiet_period;
use message_receiver::{MessageReceiver, Shutdown};
use serde_json::json;
use tokio::sync::mpsc;

mod common;

/// Decodes structured-mode CloudEvents and forwards them to the test.
fn event_handler(received: mpsc::UnboundedSender<Event>) -> Router {
    Router::new().route(
        "/",
        post(move |body: Bytes| {
            let received = received.clone();
            async move {
                match serde_json::from_slice::<Event>(&body) {
                    Ok(event) => {
                        let _ = received.send(event);
                        StatusCode::OK
                    }
                    Err(_) => StatusCode::BAD_REQUEST,
                }
            }
        }),
    )
}

/// Rebuild a binary-mode event: attributes from `ce-*` headers, data from the body.
fn decode_binary(headers: &HeaderMap, body: &[u8]) -> Option<Event> {
    let attr = |name: &str| headers.get(name)?.to_str().ok().map(str::to_owned);
    if attr("ce-specversion")? != "1.0" {
        return None;
    }
    let data: serde_json::Value = serde_json::from_slice(body).ok()?;
    EventBuilderV10::new()
        .id(attr("ce-id")?)
        .ty(attr("ce-type")?)
        .source(attr("ce-source")?)
        .data(attr("content-type")?, data)
        .build()
        .ok()
}

fn binary_event_handler(received: mpsc::UnboundedSender<Event>) -> Router {
    Router::new().route(
        "/",
        post(move |headers: HeaderMap, body: Bytes| {
            let received = received.clone();
            async move {
                match decode_binary(&headers, &body) {
                    Some(event) => {
                        let _ = received.send(event);
                        StatusCode::ACCEPTED
                    }
                    None => StatusCode::BAD_REQUEST,
                }
            }
        }),
    )
}

#[tokio::test]
async fn structured_event_round_trip() {
    common::init_tracing();
    let (received_tx, mut received_rx) = mpsc::unbounded_channel();
    let receiver = Arc::new(MessageReceiver::new(
        0,
        [with_drain_quiet_period(Duration::from_millis(10))],
    ));
    let shutdown = Shutdown::new();
    let handle = common::spawn_receiver(&receiver, shutdown.signal(), event_handler(received_tx));

    let event = EventBuilderV10::new()
        .id("8b2d5a0e-5c4b-4f0e-9a61-3f1f6c2b7d10")
        .ty("dev.message-receiver.test.sent")
        .source("message-receiver/tests/roundtrip")
        .data("application/json", json!({ "message": "Hi World!" }))
        .build()
        .unwrap();

    let addr = common::bound_addr(&receiver).await;
    let response = common::client()
        .post(format!("http://{addr}/"))
        .header(header::CONTENT_TYPE, "application/cloudevents+json")
        .body(serde_json::to_vec(&event).unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let received = received_rx.recv().await.unwrap();
    assert_eq!(received.ty(), event.ty());
    assert_eq!(received.source(), event.source());
    assert_eq!(received.id(), event.id());
    assert_eq!(received.data(), event.data());

    shutdown.trigger();
    assert!(common::join(handle).await.is_ok());
}

#[tokio::test]
async fn malformed_envelope_is_a_handler_concern() {
    let (received_tx, mut received_rx) = mpsc::unbounded_channel();
    let receiver = Arc::new(MessageReceiver::new(0, []));
    let shutdown = Shutdown::new();
    let handle = common::spawn_receiver(&receiver, shutdown.signal(), event_handler(received_tx));

    let addr = common::bound_addr(&receiver).await;
    let response = common::client()
        .post(format!("http://{addr}/"))
        .header(header::CONTENT_TYPE, "application/cloudevents+json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    shutdown.trigger();
    assert!(common::join(handle).await.is_ok());
    assert!(received_rx.try_recv().is_err());
}

#[tokio::test]
async fn binary_event_round_trip() {
    let (received_tx, mut received_rx) = mpsc::unbounded_channel();
    let receiver = Arc::new(MessageReceiver::new(
        0,
        [with_drain_quiet_period(Duration::from_millis(10))],
    ));
    let shutdown = Shutdown::new();
    let handle = common::spawn_receiver(
        &receiver,
        shutdown.signal(),
        binary_event_handler(received_tx),
    );

    let data = json!({ "message": "Hi World!", "count": 3 });
    let addr = common::bound_addr(&receiver).await;
    let response = common::client()
        .post(format!("http://{addr}/"))
        .header("ce-specversion", "1.0")
        .header("ce-id", "0c4f3a52-6f1e-4b8e-8d3f-2a7e9b1c5d44")
        .header("ce-type", "dev.message-receiver.test.binary")
        .header("ce-source", "message-receiver/tests/binary")
        .header(header::CONTENT_TYPE, "application/json")
        .body(serde_json::to_vec(&data).unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert!(response.headers().contains_key("x-request-id"));

    let received = received_rx.recv().await.unwrap();
    let expected = EventBuilderV10::new()
        .id("0c4f3a52-6f1e-4b8e-8d3f-2a7e9b1c5d44")
        .ty("dev.message-receiver.test.binary")
        .source("message-receiver/tests/binary")
        .data("application/json", data)
        .build()
        .unwrap();
    assert_eq!(received.id(), expected.id());
    assert_eq!(received.ty(), expected.ty());
    assert_eq!(received.source(), expected.source());
    assert_eq!(received.datacontenttype(), Some("application/json"));
    assert_eq!(received.data(), expected.data());

    shutdown.trigger();
    assert!(common::join(handle).await.is_ok());
}
