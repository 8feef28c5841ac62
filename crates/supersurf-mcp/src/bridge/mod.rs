//! The extension bridge (spec 4.B): a single-connection loopback WebSocket
//! server with correlated request/response dispatch.

mod error;
mod pending;
mod server;
mod types;

pub use error::BridgeError;
pub use server::{Bridge, HandshakeInfo};
pub use types::TabInfo;

#[cfg(test)]
mod tests;
