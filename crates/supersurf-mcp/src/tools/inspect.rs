//! `browser_console_messages` and `browser_network_requests` (spec 4.F.7).

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::connection::{BrokerContext, BrokerError};

use super::traits::{Tool, ToolOutcome};

fn paginate(items: Vec<Value>, limit: u64, offset: u64) -> Vec<Value> {
    items.into_iter().skip(offset as usize).take(limit as usize).collect()
}

/// `browser_console_messages {level?, text?, url?, limit=50, offset=0}`.
pub struct BrowserConsoleMessages;

#[async_trait]
impl Tool for BrowserConsoleMessages {
    fn name(&self) -> &'static str {
        "browser_console_messages"
    }

    fn description(&self) -> &'static str {
        "Return captured console messages, optionally filtered by level or text."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "level": { "type": "string", "enum": ["log", "info", "warn", "error", "debug"] },
                "text": { "type": "string" },
                "url": { "type": "string" },
                "limit": { "type": "integer" },
                "offset": { "type": "integer" },
            },
            "required": [],
        })
    }

    async fn execute(&self, ctx: &mut BrokerContext, args: Value, _raw_result: bool) -> Result<ToolOutcome, BrokerError> {
        let limit = args.get("limit").and_then(Value::as_u64).unwrap_or(50);
        let offset = args.get("offset").and_then(Value::as_u64).unwrap_or(0);
        let level = args.get("level").and_then(Value::as_str);
        let text = args.get("text").and_then(Value::as_str);
        let url = args.get("url").and_then(Value::as_str);

        let result = ctx.send_cmd("getConsoleMessages", None, None).await?;
        let mut messages = result.get("messages").and_then(Value::as_array).cloned().unwrap_or_default();

        if let Some(level) = level {
            messages.retain(|m| m.get("level").and_then(Value::as_str) == Some(level));
        }
        if let Some(text) = text {
            messages.retain(|m| {
                m.get("text")
                    .and_then(Value::as_str)
                    .is_some_and(|t| t.contains(text))
            });
        }
        if let Some(url) = url {
            messages.retain(|m| {
                m.get("url")
                    .and_then(Value::as_str)
                    .is_some_and(|u| u.contains(url))
            });
        }

        let total = messages.len();
        let page = paginate(messages, limit, offset);
        Ok(ToolOutcome::json(json!({ "messages": page, "total": total })))
    }
}

/// `browser_network_requests {action: list|details|replay|clear, urlPattern?,
/// method?, status?, resourceType?, limit=20, offset=0, requestId?, jsonPath?}`.
pub struct BrowserNetworkRequests;

#[async_trait]
impl Tool for BrowserNetworkRequests {
    fn name(&self) -> &'static str {
        "browser_network_requests"
    }

    fn description(&self) -> &'static str {
        "List, filter, clear, inspect, or replay captured network requests."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "action": { "type": "string", "enum": ["list", "details", "replay", "clear"] },
                "urlPattern": { "type": "string" },
                "method": { "type": "string" },
                "status": { "type": "integer" },
                "resourceType": { "type": "string" },
                "limit": { "type": "integer" },
                "offset": { "type": "integer" },
                "requestId": { "type": "string" },
                "jsonPath": { "type": "string" },
            },
            "required": ["action"],
        })
    }

    async fn execute(&self, ctx: &mut BrokerContext, args: Value, _raw_result: bool) -> Result<ToolOutcome, BrokerError> {
        let action = args.get("action").and_then(Value::as_str).unwrap_or("list");

        match action {
            "list" => {
                let limit = args.get("limit").and_then(Value::as_u64).unwrap_or(20);
                let offset = args.get("offset").and_then(Value::as_u64).unwrap_or(0);
                let url_pattern = args.get("urlPattern").and_then(Value::as_str);
                let method = args.get("method").and_then(Value::as_str);
                let status = args.get("status").and_then(Value::as_u64);
                let resource_type = args.get("resourceType").and_then(Value::as_str);

                let result = ctx.send_cmd("getNetworkRequests", None, None).await?;
                let mut requests = result.get("requests").and_then(Value::as_array).cloned().unwrap_or_default();
                if let Some(pattern) = url_pattern {
                    requests.retain(|r| {
                        r.get("url")
                            .and_then(Value::as_str)
                            .is_some_and(|url| url.contains(pattern))
                    });
                }
                if let Some(method) = method {
                    requests.retain(|r| r.get("method").and_then(Value::as_str) == Some(method));
                }
                if let Some(status) = status {
                    requests.retain(|r| r.get("status").and_then(Value::as_u64) == Some(status));
                }
                if let Some(resource_type) = resource_type {
                    requests.retain(|r| r.get("resourceType").and_then(Value::as_str) == Some(resource_type));
                }
                let total = requests.len();
                let page = paginate(requests, limit, offset);
                Ok(ToolOutcome::json(json!({ "requests": page, "total": total })))
            }
            "details" => {
                let request_id = args
                    .get("requestId")
                    .and_then(Value::as_str)
                    .ok_or_else(|| BrokerError::InvalidArguments("`details` requires `requestId`".to_string()))?;
                let result = ctx
                    .send_cmd("getNetworkRequestDetails", Some(json!({ "requestId": request_id })), None)
                    .await?;
                let result = match args.get("jsonPath").and_then(Value::as_str) {
                    Some(path) => extract_json_path(&result, path),
                    None => result,
                };
                Ok(ToolOutcome::json(result))
            }
            "replay" => {
                let request_id = args
                    .get("requestId")
                    .and_then(Value::as_str)
                    .ok_or_else(|| BrokerError::InvalidArguments("`replay` requires `requestId`".to_string()))?;
                let details = ctx
                    .send_cmd("getNetworkRequestDetails", Some(json!({ "requestId": request_id })), None)
                    .await?;
                let url = details
                    .get("url")
                    .and_then(Value::as_str)
                    .ok_or_else(|| BrokerError::PeerError("no `url` for requestId".to_string()))?;
                let method = details.get("method").and_then(Value::as_str).unwrap_or("GET");
                let script = format!(
                    "(async () => {{ const r = await fetch({url:?}, {{ method: {method:?} }}); \
                     return {{ status: r.status, body: await r.text() }}; }})()"
                );
                let replayed = ctx.eval(&script, true).await?;
                Ok(ToolOutcome::json(replayed))
            }
            "clear" => {
                ctx.send_cmd("clearNetworkRequests", None, None).await?;
                Ok(ToolOutcome::text("Cleared captured network requests."))
            }
            other => Err(BrokerError::InvalidArguments(format!("unknown browser_network_requests action: {other}"))),
        }
    }
}

/// Resolves a `.`-delimited dotted path (e.g. `headers.content-type`) against
/// a JSON value, returning `null` when any segment is absent.
fn extract_json_path(value: &Value, path: &str) -> Value {
    path.split('.')
        .try_fold(value.clone(), |acc, segment| acc.get(segment).cloned())
        .unwrap_or(Value::Null)
}
