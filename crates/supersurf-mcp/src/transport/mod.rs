//! Agent transports: MCP stdio, and the line-delimited JSON-RPC 2.0
//! "script mode" alternative (spec 4.G). Mutually exclusive per process
//! invocation; selected by the CLI's `--script-mode` flag.

mod error;
mod script;
mod stdio;

pub use error::TransportError;
pub use script::ScriptModeTransport;
pub use stdio::StdioTransport;
