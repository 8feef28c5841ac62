//! `browser_list_extensions` and `browser_reload_extensions` (spec 4.F.11).

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::connection::{BrokerContext, BrokerError};

use super::traits::{Tool, ToolOutcome};

/// `browser_list_extensions {}`: forwarded to the extension's own
/// `chrome.management.getAll` wrapper.
pub struct BrowserListExtensions;

#[async_trait]
impl Tool for BrowserListExtensions {
    fn name(&self) -> &'static str {
        "browser_list_extensions"
    }

    fn description(&self) -> &'static str {
        "List installed browser extensions."
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": {}, "required": [] })
    }

    async fn execute(&self, ctx: &mut BrokerContext, _args: Value, _raw_result: bool) -> Result<ToolOutcome, BrokerError> {
        let result = ctx.send_cmd("listExtensions", None, None).await?;
        Ok(ToolOutcome::json(result))
    }
}

/// `browser_reload_extensions {extensionName?}`: reloads one extension, or
/// all of them when `extensionName` is omitted.
pub struct BrowserReloadExtensions;

#[async_trait]
impl Tool for BrowserReloadExtensions {
    fn name(&self) -> &'static str {
        "browser_reload_extensions"
    }

    fn description(&self) -> &'static str {
        "Reload one or all installed browser extensions."
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": { "extensionName": { "type": "string" } }, "required": [] })
    }

    async fn execute(&self, ctx: &mut BrokerContext, args: Value, _raw_result: bool) -> Result<ToolOutcome, BrokerError> {
        let result = ctx.send_cmd("reloadExtensions", Some(args.clone()), None).await?;
        Ok(ToolOutcome::json(result))
    }
}
