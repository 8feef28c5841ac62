//! MCP protocol implementation: JSON-RPC request/response types, the
//! `initialize`/`tools/list`/`tools/call` handshake, and `McpServer` itself
//! (spec 4.G "MCP stdio").

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::connection::ConnectionManager;
use crate::tools::ContentBlock;

use super::error::ServerError;

/// JSON-RPC request, shared by both the MCP stdio transport and script mode.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// JSON-RPC response.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    #[must_use]
    pub fn success(id: Value, result: Value) -> Self {
        Self { jsonrpc: "2.0", id, result: Some(result), error: None }
    }

    #[must_use]
    pub fn error(id: Value, code: i32, message: String) -> Self {
        Self { jsonrpc: "2.0", id, result: None, error: Some(JsonRpcError { code, message, data: None }) }
    }

    #[must_use]
    pub fn from_server_error(id: Value, err: &ServerError) -> Self {
        Self::error(id, err.error_code(), err.to_string())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ServerCapabilities {
    tools: ToolCapabilities,
    logging: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolCapabilities {
    list_changed: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InitializeResult {
    protocol_version: String,
    capabilities: ServerCapabilities,
    server_info: ServerInfo,
}

#[derive(Debug, Serialize)]
struct ServerInfo {
    name: String,
    version: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolDefinition {
    name: String,
    description: String,
    input_schema: Value,
}

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum McpContentItem {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image")]
    Image {
        data: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
}

impl From<&ContentBlock> for McpContentItem {
    fn from(block: &ContentBlock) -> Self {
        match block {
            ContentBlock::Text(text) => Self::Text { text: text.clone() },
            ContentBlock::Image { data, mime_type } => Self::Image { data: data.clone(), mime_type: mime_type.clone() },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolCallResult {
    content: Vec<McpContentItem>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    is_error: bool,
}

/// Ties `ConnectionManager` to the MCP JSON-RPC surface. Cheaply clonable;
/// every transport holds one `Arc<ConnectionManager>` underneath.
pub struct McpServer {
    name: &'static str,
    version: &'static str,
    manager: Arc<ConnectionManager>,
}

impl McpServer {
    #[must_use]
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        Self { name: "supersurf-mcp", version: env!("CARGO_PKG_VERSION"), manager }
    }

    /// Handle one JSON-RPC request, dispatching to `ConnectionManager`.
    ///
    /// # Errors
    /// Returns a `ServerError` for unrecognized methods or malformed
    /// `tools/call` params. Tool-level failures are not errors here — they
    /// come back as `ToolCallResult { isError: true }`.
    pub async fn handle_request(&self, request: &JsonRpcRequest) -> Result<Value, ServerError> {
        match request.method.as_str() {
            "initialize" => Ok(self.handle_initialize()),
            "initialized" | "notifications/initialized" => Ok(Value::Null),
            "tools/list" => self.handle_tools_list().await,
            "tools/call" => self.handle_tools_call(&request.params).await,
            other => Err(ServerError::MethodNotFound(other.to_string())),
        }
    }

    fn handle_initialize(&self) -> Value {
        let result = InitializeResult {
            protocol_version: "2024-11-05".to_string(),
            capabilities: ServerCapabilities {
                tools: ToolCapabilities { list_changed: true },
                logging: serde_json::json!({}),
            },
            server_info: ServerInfo { name: self.name.to_string(), version: self.version.to_string() },
        };
        serde_json::to_value(result).unwrap_or(Value::Null)
    }

    async fn handle_tools_list(&self) -> Result<Value, ServerError> {
        let tools: Vec<ToolDefinition> = self
            .manager
            .list_tools()
            .await
            .into_iter()
            .map(|(name, description, input_schema)| ToolDefinition { name, description, input_schema })
            .collect();
        Ok(serde_json::json!({ "tools": tools }))
    }

    async fn handle_tools_call(&self, params: &Value) -> Result<Value, ServerError> {
        let call_params: ToolCallParams =
            serde_json::from_value(params.clone()).map_err(|e| ServerError::InvalidParams(e.to_string()))?;

        let outcome = self.manager.call_tool(&call_params.name, call_params.arguments, false).await;
        let content: Vec<McpContentItem> = outcome.content.iter().map(McpContentItem::from).collect();
        let is_error = outcome.raw.get("success").and_then(Value::as_bool) == Some(false);

        Ok(serde_json::to_value(ToolCallResult { content, is_error }).unwrap_or(Value::Null))
    }

    /// Run one raw tool call with `rawResult: true`, for script mode.
    pub async fn call_tool_raw(&self, method: &str, params: Value) -> Value {
        self.manager.call_tool(method, params, true).await.raw
    }

    /// Subscribes to `tools/list_changed`, exposed for the transport layer
    /// to push an unsolicited notification if it chooses to (stdio MCP
    /// clients that don't support it silently ignore unknown methods).
    #[must_use]
    pub fn subscribe_tools_changed(&self) -> tokio::sync::watch::Receiver<u64> {
        self.manager.subscribe_tools_changed()
    }
}
