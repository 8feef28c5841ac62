//! Errors surfaced by `sendCmd` and the bridge lifecycle.

/// Failure modes for a single `sendCmd` call or the bridge itself.
#[derive(Debug, thiserror::Error, Clone)]
pub enum BridgeError {
    /// No extension socket is currently open.
    #[error("not connected")]
    NotConnected,
    /// The call's deadline elapsed before a response arrived.
    #[error("Request timeout: {method}")]
    Timeout {
        /// The outbound method that timed out.
        method: String,
    },
    /// The extension answered with a JSON-RPC error object.
    #[error("{message}")]
    PeerError {
        /// Peer-supplied error message.
        message: String,
    },
    /// The socket closed while this call was in flight.
    #[error("Extension disconnected")]
    Drained,
    /// The loopback listener could not bind.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address the bridge attempted to bind.
        addr: std::net::SocketAddr,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A write to the socket failed.
    #[error("write failed: {0}")]
    Write(String),
}
