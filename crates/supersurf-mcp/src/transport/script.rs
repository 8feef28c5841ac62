//! Line-delimited JSON-RPC 2.0 "script mode" (spec 4.G/§8 scenario 6): an
//! alternative to MCP stdio for agents that talk raw JSON-RPC, with batch
//! (array-of-requests-per-line) support and `rawResult: true` dispatch.

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::server::{JsonRpcRequest, JsonRpcResponse, McpServer};

use super::TransportError;

pub struct ScriptModeTransport {
    server: McpServer,
}

impl ScriptModeTransport {
    #[must_use]
    pub fn new(server: McpServer) -> Self {
        Self { server }
    }

    /// Runs until stdin closes (EOF triggers a graceful shutdown, per spec).
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

            let parsed: Result<Value, _> = serde_json::from_str(trimmed);
            let Ok(value) = parsed else {
                let response = JsonRpcResponse::error(Value::Null, -32700, "Parse error".to_string());
                write_line(&mut stdout, &response).await?;
                continue;
            };

            let responses = if let Value::Array(batch) = value {
                let mut out = Vec::with_capacity(batch.len());
                for item in batch {
                    out.push(self.dispatch_one(item).await);
                }
                serde_json::to_value(out)?
            } else {
                serde_json::to_value(self.dispatch_one(value).await)?
            };

            let json = serde_json::to_string(&responses)?;
            stdout.write_all(json.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }

        Ok(())
    }

    /// Validates and dispatches a single request object, per spec 4.G:
    /// missing/wrong `jsonrpc` or missing/non-string `method` → `-32600`.
    async fn dispatch_one(&self, value: Value) -> JsonRpcResponse {
        let id = value.get("id").cloned().unwrap_or(Value::Null);

        let jsonrpc_ok = value.get("jsonrpc").and_then(Value::as_str) == Some("2.0");
        if !jsonrpc_ok {
            return JsonRpcResponse::error(id, -32600, "Invalid Request: missing or wrong `jsonrpc`".to_string());
        }
        let Some(method) = value.get("method").and_then(Value::as_str) else {
            return JsonRpcResponse::error(id, -32600, "Invalid Request: missing or non-string `method`".to_string());
        };

        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(req) => req,
            Err(e) => return JsonRpcResponse::error(id, -32600, format!("Invalid Request: {e}")),
        };

        let params = request.params.clone();
        let result = self.server.call_tool_raw(method, params).await;
        JsonRpcResponse::success(id, result)
    }
}

async fn write_line(stdout: &mut tokio::io::Stdout, response: &JsonRpcResponse) -> Result<(), TransportError> {
    let json = serde_json::to_string(response)?;
    stdout.write_all(json.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}
