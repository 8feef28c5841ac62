//! Wire shapes exchanged with the browser extension (spec 4.B, 6).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outbound request: broker → extension.
#[derive(Debug, Serialize)]
pub struct OutgoingRequest {
    pub jsonrpc: &'static str,
    pub id: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl OutgoingRequest {
    #[must_use]
    pub fn new(id: String, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method: method.into(),
            params,
        }
    }
}

/// A JSON-RPC error object as returned by the extension peer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PeerErrorObject {
    pub code: i64,
    pub message: String,
}

/// Every frame shape the broker may receive is disambiguated here rather
/// than with a `#[serde(tag = ...)]` discriminant, because the extension's
/// three shapes (response / notification / handshake) don't share one.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IncomingFrame {
    /// Unsolicited handshake, exactly once per connected session.
    Handshake {
        #[serde(rename = "type")]
        kind: HandshakeTag,
        browser: String,
        #[serde(rename = "buildTimestamp")]
        build_timestamp: String,
    },
    /// Response to a prior `sendCmd`, success or error.
    Response {
        jsonrpc: String,
        id: String,
        #[serde(default)]
        result: Option<Value>,
        #[serde(default)]
        error: Option<PeerErrorObject>,
    },
    /// Unsolicited notification, e.g. `notifications/tab_info_update`.
    Notification {
        jsonrpc: String,
        method: String,
        #[serde(default)]
        params: Option<Value>,
    },
}

/// Marker so `IncomingFrame::Handshake` only matches `{"type":"handshake"}`.
#[derive(Debug, Clone, Deserialize)]
pub enum HandshakeTag {
    #[serde(rename = "handshake")]
    Handshake,
}

/// A browser tab as reported by `notifications/tab_info_update` or tab
/// tool responses.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TabInfo {
    pub index: u32,
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
}
