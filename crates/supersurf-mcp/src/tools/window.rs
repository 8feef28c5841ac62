//! `browser_window` and `browser_handle_dialog` (spec 4.F.11).

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::connection::{BrokerContext, BrokerError};

use super::traits::{Tool, ToolOutcome};

/// `browser_window {action: resize|close|minimize|maximize, width?, height?}`.
pub struct BrowserWindow;

#[async_trait]
impl Tool for BrowserWindow {
    fn name(&self) -> &'static str {
        "browser_window"
    }

    fn description(&self) -> &'static str {
        "Resize, close, minimize, or maximize the browser window."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "action": { "type": "string", "enum": ["resize", "close", "minimize", "maximize"] },
                "width": { "type": "integer" },
                "height": { "type": "integer" },
            },
            "required": ["action"],
        })
    }

    async fn execute(&self, ctx: &mut BrokerContext, args: Value, _raw_result: bool) -> Result<ToolOutcome, BrokerError> {
        let action = args.get("action").and_then(Value::as_str).unwrap_or("resize");
        if !matches!(action, "resize" | "close" | "minimize" | "maximize") {
            return Err(BrokerError::InvalidArguments(format!("unknown browser_window action: {action}")));
        }
        let result = ctx.send_cmd("window", Some(args.clone()), None).await?;
        Ok(ToolOutcome::json(result))
    }
}

/// `browser_handle_dialog {accept, text?}`: forwarded to the extension,
/// which resolves the next pending `window.alert`/`confirm`/`prompt`.
pub struct BrowserHandleDialog;

#[async_trait]
impl Tool for BrowserHandleDialog {
    fn name(&self) -> &'static str {
        "browser_handle_dialog"
    }

    fn description(&self) -> &'static str {
        "Accept or dismiss the next JavaScript dialog, optionally supplying prompt text."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "accept": { "type": "boolean" }, "text": { "type": "string" } },
            "required": ["accept"],
        })
    }

    async fn execute(&self, ctx: &mut BrokerContext, args: Value, _raw_result: bool) -> Result<ToolOutcome, BrokerError> {
        let result = ctx.send_cmd("handleDialog", Some(args.clone()), None).await?;
        Ok(ToolOutcome::json(result))
    }
}
