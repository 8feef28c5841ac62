//! Durable, redacted, per-session logging (spec 4.A).
//!
//! Complements `tracing`: `tracing` covers process diagnostics on stderr,
//! this module covers the flush-on-write, redacted trail that must survive
//! a crashed process.

mod format;
mod registry;

pub use format::{redact_base64, truncate_string, LogFormat};
pub use registry::{LogRegistry, Logger};

#[cfg(test)]
mod tests;
