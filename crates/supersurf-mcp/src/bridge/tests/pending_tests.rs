//! Tests for the inflight correlation-id map.

use tokio::sync::oneshot;
use serde_json::Value;

use crate::bridge::BridgeError;
use crate::bridge::pending::{InflightMap, PendingCall};

#[tokio::test]
async fn drain_rejects_all_pending_and_empties_map() {
    let map = InflightMap::new();
    let (tx1, rx1) = oneshot::channel();
    let (tx2, rx2) = oneshot::channel();
    map.insert(
        "a".into(),
        PendingCall {
            method: "forwardCDPCommand".into(),
            sender: tx1,
        },
    )
    .await;
    map.insert(
        "b".into(),
        PendingCall {
            method: "navigate".into(),
            sender: tx2,
        },
    )
    .await;
    assert_eq!(map.len().await, 2);
    map.drain().await;
    assert_eq!(map.len().await, 0);
    assert!(matches!(rx1.await.unwrap(), Err(BridgeError::Drained)));
    assert!(matches!(rx2.await.unwrap(), Err(BridgeError::Drained)));
}

#[tokio::test]
async fn resolve_removes_entry_and_delivers_result() {
    let map = InflightMap::new();
    let (tx, rx) = oneshot::channel();
    map.insert(
        "a".into(),
        PendingCall {
            method: "navigate".into(),
            sender: tx,
        },
    )
    .await;
    map.resolve("a", Ok(Value::Bool(true))).await;
    assert_eq!(map.len().await, 0);
    assert_eq!(rx.await.unwrap().unwrap(), Value::Bool(true));
}
