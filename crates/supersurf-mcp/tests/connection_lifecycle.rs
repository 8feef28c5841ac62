//! Integration tests for the connection-manager lifecycle with a fake
//! in-process extension peer (spec 8: startup, tool-rejection-while-passive,
//! enable+handshake happy path).
//!
//! Run with:
//! ```sh
//! cargo test --features integration -p supersurf-mcp --test connection_lifecycle
//! ```
#![cfg(feature = "integration")]

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use supersurf_mcp::config::ServerConfig;
use supersurf_mcp::connection::ConnectionManager;
use supersurf_mcp::logger::{LogFormat, LogRegistry};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

fn manager_on(port: u16) -> Arc<ConnectionManager> {
    let log_dir = tempfile::tempdir().unwrap().into_path();
    let config = Arc::new(ServerConfig::new(Some(port), false, LogFormat::Truncate, Some(log_dir)));
    let logger = Arc::new(LogRegistry::new(config.log_dir.clone(), LogFormat::Truncate).unwrap());
    ConnectionManager::new(config, logger)
}

#[tokio::test]
async fn browser_tool_rejected_while_passive() {
    let manager = manager_on(58901);
    let outcome = manager
        .call_tool("browser_navigate", json!({ "action": "url", "url": "https://example.com" }), true)
        .await;
    assert_eq!(outcome.raw["success"], Value::Bool(false));
    let error = outcome.raw["error"].as_str().unwrap();
    assert!(error.contains("not active"), "unexpected error: {error}");
}

#[tokio::test]
async fn enable_then_handshake_reaches_connected() {
    let manager = manager_on(58902);

    let enabled = manager.call_tool("enable", json!({}), true).await;
    assert!(enabled.raw.as_str().is_some(), "enable should not report an error: {:?}", enabled.raw);

    let (mut ws, _) = connect_async("ws://127.0.0.1:58902/").await.expect("extension connects");
    ws.send(Message::Text(
        json!({ "type": "handshake", "browser": "Chrome", "buildTimestamp": "2026-01-01T00:00:00Z" })
            .to_string()
            .into(),
    ))
    .await
    .unwrap();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    let mut connected = false;
    while tokio::time::Instant::now() < deadline {
        let status = manager.call_tool("status", json!({}), true).await;
        if status.raw.as_str().is_some_and(|header| header.contains("Chrome")) {
            connected = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(connected, "manager never observed the handshake within the deadline");

    drop(ws);
}

#[tokio::test]
async fn navigate_round_trips_through_fake_extension() {
    let manager = manager_on(58903);
    manager.call_tool("enable", json!({}), true).await;

    let (mut ws, _) = connect_async("ws://127.0.0.1:58903/").await.expect("extension connects");
    ws.send(Message::Text(
        json!({ "type": "handshake", "browser": "Chrome", "buildTimestamp": "2026-01-01T00:00:00Z" })
            .to_string()
            .into(),
    ))
    .await
    .unwrap();

    let responder = tokio::spawn(async move {
        while let Some(Ok(Message::Text(text))) = ws.next().await {
            let request: Value = serde_json::from_str(&text).unwrap();
            if request["method"] == "navigate" {
                let response = json!({ "jsonrpc": "2.0", "id": request["id"], "result": { "ok": true } });
                ws.send(Message::Text(response.to_string().into())).await.unwrap();
                break;
            }
        }
    });

    let outcome = manager
        .call_tool("browser_navigate", json!({ "action": "url", "url": "https://example.com" }), true)
        .await;

    responder.await.unwrap();
    assert!(
        outcome.raw.as_str().is_some_and(|s| s.contains("Navigated")),
        "navigate failed: {:?}",
        outcome.raw
    );
}
