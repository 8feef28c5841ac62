//! The error taxonomy every tool handler's failure is mapped into (spec 7).

use crate::bridge::BridgeError;

/// Broker-wide error kinds. The dispatcher turns every one of these into
/// either an `isError=true` content result or, in script mode, a
/// `{success:false, error:"…"}` object / JSON-RPC error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BrokerError {
    /// Browser tool called while `Passive`.
    #[error("Browser automation not active. You must call `enable` first.")]
    NotEnabled,
    /// Bridge present but no extension socket open yet.
    #[error("Extension not connected yet. Waiting for the browser extension to connect on this port.")]
    NotConnected,
    /// JSON-Schema validation failure or missing required field.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    /// Selector resolved to null; may carry a "Did you mean?" list.
    #[error("{0}")]
    ElementNotFound(String),
    /// `sendCmd` exceeded its deadline.
    #[error("Request timeout: {0}")]
    Timeout(String),
    /// Extension returned a JSON-RPC error object.
    #[error("{0}")]
    PeerError(String),
    /// Extension socket closed while awaiting a response.
    #[error("Extension disconnected")]
    Disconnected,
    /// `Runtime.evaluate` raised an exception.
    #[error("{0}")]
    ScriptError(String),
    /// `secure_eval` layers rejected the code.
    #[error("blocked by secure_eval: {0}")]
    Blocked(String),
    /// Output path escaped `$HOME`.
    #[error("Permission denied")]
    Sandbox,
    /// A CDP error that looks like a debugger-attachment conflict,
    /// decorated with a troubleshooting hint.
    #[error("{0}\n\nThis may mean another debugger session is attached to this tab; try closing other DevTools panels or automation tools and retry.")]
    ExtensionConflict(String),
}

impl BrokerError {
    /// JSON-RPC error code used by script mode / `formatResult` raw errors.
    #[must_use]
    pub const fn error_code(&self) -> i64 {
        -32000
    }

    /// Heuristic used by the dispatcher: some CDP peer errors mention
    /// attachment/debugger conflicts and get decorated rather than passed
    /// through verbatim.
    #[must_use]
    pub fn looks_like_extension_conflict(message: &str) -> bool {
        let lower = message.to_ascii_lowercase();
        lower.contains("already attached") || lower.contains("debugger is already")
    }
}

impl From<BridgeError> for BrokerError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::NotConnected => Self::NotConnected,
            BridgeError::Timeout { method } => Self::Timeout(method),
            BridgeError::PeerError { message } => {
                if Self::looks_like_extension_conflict(&message) {
                    Self::ExtensionConflict(message)
                } else {
                    Self::PeerError(message)
                }
            }
            BridgeError::Drained => Self::Disconnected,
            BridgeError::Bind { addr, source } => {
                Self::PeerError(format!("failed to bind {addr}: {source}"))
            }
            BridgeError::Write(_) => Self::Disconnected,
        }
    }
}
