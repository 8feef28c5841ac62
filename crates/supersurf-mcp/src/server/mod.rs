//! Agent-facing JSON-RPC/MCP plumbing: request/response types and the
//! `initialize`/`tools/list`/`tools/call` dispatch (spec 4.G "MCP stdio").

mod error;
mod protocol;

pub use error::ServerError;
pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, McpServer};
