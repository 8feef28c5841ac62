//! Integration tests against `Bridge` directly, with a fake extension peer
//! over a real loopback WebSocket connection (spec 8: timeout,
//! disconnect-during-flight draining, single-connection rejection).
//!
//! Run with:
//! ```sh
//! cargo test --features integration -p supersurf-mcp --test bridge_protocol
//! ```
#![cfg(feature = "integration")]

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use serde_json::json;
use supersurf_mcp::bridge::Bridge;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

#[tokio::test]
async fn send_cmd_times_out_promptly_when_extension_never_replies() {
    let bridge = Bridge::new(58910);
    bridge.start().await.unwrap();
    let (_ws, _) = connect_async("ws://127.0.0.1:58910/").await.unwrap();

    let started = tokio::time::Instant::now();
    let result = bridge.send_cmd("neverReplies", None, Some(Duration::from_millis(100))).await;
    let elapsed = started.elapsed();

    assert!(result.is_err());
    assert!(elapsed < Duration::from_millis(900), "timeout waited far longer than its deadline: {elapsed:?}");
}

#[tokio::test]
async fn send_cmd_drains_promptly_when_extension_disconnects_mid_flight() {
    let bridge = Arc::new(Bridge::new(58911));
    bridge.start().await.unwrap();
    let (ws, _) = connect_async("ws://127.0.0.1:58911/").await.unwrap();

    let pending = tokio::spawn({
        let bridge = bridge.clone();
        async move { bridge.send_cmd("neverReplies", None, Some(Duration::from_secs(30))).await }
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    drop(ws);

    let started = tokio::time::Instant::now();
    let result = pending.await.unwrap();
    let elapsed = started.elapsed();

    assert!(result.is_err(), "disconnect should resolve the pending call with an error, not a result");
    assert!(elapsed < Duration::from_secs(2), "disconnect-drain should resolve well before the 30s deadline: {elapsed:?}");
}

#[tokio::test]
async fn second_connection_is_rejected_with_single_connection_error() {
    let bridge = Bridge::new(58912);
    bridge.start().await.unwrap();
    let (_first, _) = connect_async("ws://127.0.0.1:58912/").await.unwrap();

    let (mut second, _) = connect_async("ws://127.0.0.1:58912/").await.unwrap();
    let frame = second.next().await.expect("second connection receives a frame before closing");
    let Ok(Message::Text(text)) = frame else {
        panic!("expected a text frame rejecting the second connection");
    };
    let payload: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(payload["error"]["code"], json!(-32001));
}
