//! Transport-level I/O errors (spec 4.G).

use thiserror::Error;

/// Errors surfaced by the stdio/script-mode read-eval-print loops.
#[derive(Debug, Error)]
pub enum TransportError {
    /// I/O error reading stdin or writing stdout.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error while writing a response.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
