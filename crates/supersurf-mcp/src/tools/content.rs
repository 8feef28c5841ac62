//! `browser_snapshot`, `browser_lookup`, `browser_extract_content` (spec 4.F.3).

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::connection::{BrokerContext, BrokerError};
use crate::primitives::selector::find_alternatives;

use super::traits::{Tool, ToolOutcome};

/// `browser_snapshot`: forwards to the extension's accessibility-tree dump.
pub struct BrowserSnapshot;

#[async_trait]
impl Tool for BrowserSnapshot {
    fn name(&self) -> &'static str {
        "browser_snapshot"
    }

    fn description(&self) -> &'static str {
        "Return an accessibility-tree-derived snapshot of the current page."
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": {}, "required": [] })
    }

    async fn execute(&self, ctx: &mut BrokerContext, _args: Value, _raw_result: bool) -> Result<ToolOutcome, BrokerError> {
        let result = ctx.send_cmd("snapshot", None, None).await?;
        let text = result
            .get("snapshot")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| result.to_string());
        Ok(ToolOutcome { content: vec![super::traits::ContentBlock::Text(text)], raw: result, pre_captured_screenshot: None })
    }
}

/// `browser_lookup {text, limit=10}`: always runs the did-you-mean scan.
pub struct BrowserLookup;

#[async_trait]
impl Tool for BrowserLookup {
    fn name(&self) -> &'static str {
        "browser_lookup"
    }

    fn description(&self) -> &'static str {
        "Find elements on the page whose visible text contains a substring."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "text": { "type": "string" }, "limit": { "type": "integer" } },
            "required": ["text"],
        })
    }

    async fn execute(&self, ctx: &mut BrokerContext, args: Value, _raw_result: bool) -> Result<ToolOutcome, BrokerError> {
        let text = args
            .get("text")
            .and_then(Value::as_str)
            .ok_or_else(|| BrokerError::InvalidArguments("missing `text`".to_string()))?;
        let limit = args.get("limit").and_then(Value::as_u64).unwrap_or(10) as usize;

        let mut candidates = find_alternatives(ctx, text).await?;
        candidates.sort_by_key(|c| !c.visible);
        candidates.truncate(limit);

        let raw = json!({ "matches": candidates.iter().map(|c| json!({
            "selector": c.selector, "visible": c.visible, "text": c.text,
        })).collect::<Vec<_>>() });
        Ok(ToolOutcome::json(raw))
    }
}

/// `browser_extract_content {mode: auto|full|selector, selector?, max_lines=500, offset=0}`.
pub struct BrowserExtractContent;

#[async_trait]
impl Tool for BrowserExtractContent {
    fn name(&self) -> &'static str {
        "browser_extract_content"
    }

    fn description(&self) -> &'static str {
        "Extract the page's content as markdown, paginated by line."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "mode": { "type": "string", "enum": ["auto", "full", "selector"] },
                "selector": { "type": "string" },
                "max_lines": { "type": "integer" },
                "offset": { "type": "integer" },
            },
            "required": ["mode"],
        })
    }

    async fn execute(&self, ctx: &mut BrokerContext, args: Value, _raw_result: bool) -> Result<ToolOutcome, BrokerError> {
        let mode = args.get("mode").and_then(Value::as_str).unwrap_or("auto");
        let max_lines = args.get("max_lines").and_then(Value::as_u64).unwrap_or(500);
        let offset = args.get("offset").and_then(Value::as_u64).unwrap_or(0);
        let selector = args.get("selector").and_then(Value::as_str);

        let params = json!({ "mode": mode, "selector": selector, "max_lines": max_lines, "offset": offset });
        let result = ctx.send_cmd("extractContent", Some(params), None).await?;
        let content = result
            .get("content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_default();
        Ok(ToolOutcome { content: vec![super::traits::ContentBlock::Text(content)], raw: result, pre_captured_screenshot: None })
    }
}
