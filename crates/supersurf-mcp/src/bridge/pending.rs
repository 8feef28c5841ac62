//! The inflight map: correlation id → waiting caller (spec 4.B, P5/P6).

use std::collections::HashMap;

use tokio::sync::oneshot;

use super::error::BridgeError;
use serde_json::Value;

/// One outstanding `sendCmd`, keyed by its correlation id in the map.
pub struct PendingCall {
    pub method: String,
    pub sender: oneshot::Sender<Result<Value, BridgeError>>,
}

/// Guards the correlation-id → `PendingCall` table. All mutation goes
/// through this type so the disconnect-drain ordering (P6) is a single
/// code path rather than duplicated at each call site.
#[derive(Default)]
pub struct InflightMap {
    calls: tokio::sync::Mutex<HashMap<String, PendingCall>>,
}

impl InflightMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new pending call. Caller owns pairing this with a
    /// timeout future.
    pub async fn insert(&self, id: String, call: PendingCall) {
        self.calls.lock().await.insert(id, call);
    }

    /// Resolve (or drop, if already removed by a timeout) the call for `id`.
    pub async fn resolve(&self, id: &str, result: Result<Value, BridgeError>) {
        if let Some(call) = self.calls.lock().await.remove(id) {
            let _ = call.sender.send(result);
        }
    }

    /// Remove and return the call for `id`, used by the timeout path so it
    /// can reject without racing a late response.
    pub async fn take(&self, id: &str) -> Option<PendingCall> {
        self.calls.lock().await.remove(id)
    }

    /// Reject every pending call and empty the map. Spec 4.B disconnect
    /// draining: step 2 (reject each) then step 3 (empty) happen under one
    /// lock acquisition so no concurrent `insert` can observe a
    /// half-drained map.
    pub async fn drain(&self) {
        let mut calls = self.calls.lock().await;
        for (_, call) in calls.drain() {
            let _ = call.sender.send(Err(BridgeError::Drained));
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.calls.lock().await.len()
    }
}
