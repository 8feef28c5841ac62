//! The mutable state a tool handler actually touches (spec 4.C, 4.F).

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::bridge::{Bridge, TabInfo};
use crate::config::ServerConfig;
use crate::connection::error::BrokerError;
use crate::connection::state::ConnectionState;
use crate::connection::status::StatusSnapshot;
use crate::logger::LogRegistry;

/// Everything a tool handler can read, and the only things it may mutate —
/// and only ever through these setters, per spec 5's "explicit setter
/// calls" shared-resource policy.
pub struct BrokerContext {
    pub(crate) state: ConnectionState,
    pub(crate) bridge: Option<Arc<Bridge>>,
    pub config: Arc<ServerConfig>,
    pub logger: Arc<LogRegistry>,
    pub(crate) client_id: Option<String>,
    pub(crate) connected_browser_name: Option<String>,
    pub(crate) attached_tab: Option<TabInfo>,
    pub(crate) stealth: bool,
    pub debug_mode: bool,
}

impl BrokerContext {
    #[must_use]
    pub fn new(config: Arc<ServerConfig>, logger: Arc<LogRegistry>, debug_mode: bool) -> Self {
        Self {
            state: ConnectionState::Passive,
            bridge: None,
            config,
            logger,
            client_id: None,
            connected_browser_name: None,
            attached_tab: None,
            stealth: false,
            debug_mode,
        }
    }

    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    #[must_use]
    pub fn bridge(&self) -> Option<&Arc<Bridge>> {
        self.bridge.as_ref()
    }

    #[must_use]
    pub fn attached_tab(&self) -> Option<&TabInfo> {
        self.attached_tab.as_ref()
    }

    #[must_use]
    pub const fn stealth(&self) -> bool {
        self.stealth
    }

    pub fn set_attached_tab(&mut self, tab: Option<TabInfo>) {
        self.attached_tab = tab;
    }

    pub fn set_connected_browser_name(&mut self, name: Option<String>) {
        self.connected_browser_name = name;
    }

    pub fn set_stealth(&mut self, stealth: bool) {
        self.stealth = stealth;
    }

    pub(crate) fn set_state(&mut self, state: ConnectionState) {
        self.state = state;
    }

    pub(crate) fn set_bridge(&mut self, bridge: Option<Arc<Bridge>>) {
        self.bridge = bridge;
    }

    pub(crate) fn set_client_id(&mut self, client_id: Option<String>) {
        self.client_id = client_id;
    }

    /// Copy out the fields the status header needs, without exposing
    /// mutable access.
    #[must_use]
    pub fn status_snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            state: self.state,
            version: self.config.version,
            debug_mode: self.debug_mode,
            connected_browser_name: self.connected_browser_name.clone(),
            attached_tab_url: self.attached_tab.as_ref().map(|t| t.url.clone()),
            stealth: self.stealth,
            debug_timestamp: self.debug_mode.then(|| chrono::Local::now().format("%H:%M:%S").to_string()),
        }
    }

    /// Forward a CDP call verbatim through the bridge (spec 4.D).
    pub async fn cdp(&self, method: &str, params: Value) -> Result<Value, BrokerError> {
        let bridge = self.bridge.as_ref().ok_or(BrokerError::NotConnected)?;
        bridge
            .send_cmd(
                "forwardCDPCommand",
                Some(serde_json::json!({ "method": method, "params": params })),
                None,
            )
            .await
            .map_err(Into::into)
    }

    /// Send any extension-facing command, not wrapped in CDP framing.
    pub async fn send_cmd(
        &self,
        method: &str,
        params: Option<Value>,
        timeout: Option<Duration>,
    ) -> Result<Value, BrokerError> {
        let bridge = self.bridge.as_ref().ok_or(BrokerError::NotConnected)?;
        bridge.send_cmd(method, params, timeout).await.map_err(Into::into)
    }

    /// `eval(expression, awaitPromise)` (spec 4.D).
    pub async fn eval(&self, expression: &str, await_promise: bool) -> Result<Value, BrokerError> {
        let response = self
            .cdp(
                "Runtime.evaluate",
                serde_json::json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": await_promise,
                    "userGesture": true,
                }),
            )
            .await?;

        if let Some(exception) = response.get("exceptionDetails") {
            let message = exception
                .get("exception")
                .and_then(|e| e.get("description"))
                .and_then(Value::as_str)
                .or_else(|| exception.get("text").and_then(Value::as_str))
                .or_else(|| {
                    exception
                        .get("exception")
                        .and_then(|e| e.get("className"))
                        .and_then(Value::as_str)
                })
                .unwrap_or("JavaScript execution error")
                .to_string();
            return Err(BrokerError::ScriptError(message));
        }

        Ok(response
            .get("result")
            .and_then(|r| r.get("value"))
            .cloned()
            .unwrap_or(Value::Null))
    }

    /// `sleep(ms)`.
    pub async fn sleep(&self, ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}
