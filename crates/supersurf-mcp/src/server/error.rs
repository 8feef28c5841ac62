//! Server-level error types (JSON-RPC framing only; tool failures are
//! rendered as content results by the connection manager, not exceptions).

use thiserror::Error;

/// Errors surfaced while handling a single JSON-RPC request.
#[derive(Debug, Error)]
pub enum ServerError {
    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Method name not recognized by `handle_request`.
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// `tools/call` params failed to deserialize.
    #[error("Invalid params: {0}")]
    InvalidParams(String),
}

impl ServerError {
    /// JSON-RPC error code for this failure.
    #[must_use]
    pub const fn error_code(&self) -> i32 {
        match self {
            Self::Json(_) => -32700,
            Self::MethodNotFound(_) => -32601,
            Self::InvalidParams(_) => -32602,
        }
    }
}
