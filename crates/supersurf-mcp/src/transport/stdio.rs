//! MCP stdio transport (spec 4.G): line-delimited JSON-RPC over
//! stdin/stdout, the default when `--script-mode` is not passed.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::server::{JsonRpcRequest, JsonRpcResponse, McpServer};

use super::TransportError;

/// Reads one JSON-RPC request per line from stdin, dispatches it through
/// `McpServer`, and writes one response per line to stdout. Notifications
/// (no `id`) get no response, matching the MCP stdio contract.
pub struct StdioTransport {
    server: McpServer,
}

impl StdioTransport {
    #[must_use]
    pub fn new(server: McpServer) -> Self {
        Self { server }
    }

    /// Runs until stdin closes (EOF), per spec 4.G.
    ///
    /// # Errors
    /// Returns a `TransportError` if reading stdin or writing stdout fails.
    pub async fn run(&self) -> Result<(), TransportError> {
        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let mut reader = BufReader::new(stdin);
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;
            if bytes_read == 0 {
                tracing::info!("stdin closed, shutting down");
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let request: JsonRpcRequest = match serde_json::from_str(trimmed) {
                Ok(req) => req,
                Err(e) => {
                    let response = JsonRpcResponse::error(serde_json::Value::Null, -32700, format!("Parse error: {e}"));
                    write_line(&mut stdout, &response).await?;
                    continue;
                }
            };

            let request_id = request.id.clone().unwrap_or(serde_json::Value::Null);
            let response = match self.server.handle_request(&request).await {
                Ok(result) => JsonRpcResponse::success(request_id, result),
                Err(e) => JsonRpcResponse::from_server_error(request_id, &e),
            };

            if request.id.is_some() {
                write_line(&mut stdout, &response).await?;
            }
        }

        Ok(())
    }
}

async fn write_line(
    stdout: &mut tokio::io::Stdout,
    response: &JsonRpcResponse,
) -> Result<(), TransportError> {
    let json = serde_json::to_string(response)?;
    stdout.write_all(json.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}
