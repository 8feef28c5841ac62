//! # Supersurf MCP Server Library
//!
//! Supersurf is the server-side broker of a browser-automation bridge: an
//! MCP (Model Context Protocol) stdio server that drives a single browser
//! through a companion extension connected over a loopback WebSocket.
//!
//! ## Overview
//!
//! Unlike a broker that launches and drives a browser process directly,
//! Supersurf never touches a browser binary. It listens on
//! `127.0.0.1:<port>` for a single extension connection, and every browser
//! tool call is translated into a JSON-RPC command sent across that
//! connection. The extension is the only thing that ever talks CDP to the
//! real browser.
//!
//! - **[`logger`]**: durable, redacted, per-session file logging
//! - **[`bridge`]**: the single-connection extension WebSocket server
//! - **[`connection`]**: the Passive/Active/Connected state machine and
//!   the shared context every tool handler runs against
//! - **[`primitives`]**: CDP/eval helpers layered over the bridge
//! - **[`tools`]**: the ~28-tool catalog and its dispatcher
//! - **[`server`]**: MCP JSON-RPC request/response plumbing
//! - **[`transport`]**: stdio MCP and line-delimited script-mode adapters
//! - **[`config`]**: process-wide configuration and the `$HOME` sandbox
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use supersurf_mcp::config::ServerConfig;
//! use supersurf_mcp::connection::ConnectionManager;
//! use supersurf_mcp::logger::{LogFormat, LogRegistry};
//! use supersurf_mcp::server::McpServer;
//! use supersurf_mcp::transport::StdioTransport;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(ServerConfig::new(None, false, LogFormat::Truncate, None));
//!     let logger = Arc::new(LogRegistry::new(config.log_dir.clone(), LogFormat::Truncate)?);
//!     let manager = ConnectionManager::new(config, logger);
//!     let server = McpServer::new(manager);
//!     StdioTransport::new(server).run().await?;
//!     Ok(())
//! }
//! ```

pub mod bridge;
pub mod config;
pub mod connection;
pub mod logger;
pub mod primitives;
pub mod server;
pub mod tools;
pub mod transport;

#[cfg(test)]
mod tests;
