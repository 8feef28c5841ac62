//! `browser_tabs` and `browser_navigate` (spec 4.F.1).

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::bridge::TabInfo;
use crate::connection::{BrokerContext, BrokerError};

use super::traits::{Tool, ToolOutcome};

/// `browser_tabs {action: list|new|attach|close, url?, index?, activate?, stealth?}`.
pub struct BrowserTabs;

#[async_trait]
impl Tool for BrowserTabs {
    fn name(&self) -> &'static str {
        "browser_tabs"
    }

    fn description(&self) -> &'static str {
        "List, create, attach to, or close browser tabs."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "action": { "type": "string", "enum": ["list", "new", "attach", "close"] },
                "url": { "type": "string" },
                "index": { "type": "integer" },
                "activate": { "type": "boolean" },
                "stealth": { "type": "boolean" },
            },
            "required": ["action"],
        })
    }

    async fn execute(&self, ctx: &mut BrokerContext, args: Value, _raw_result: bool) -> Result<ToolOutcome, BrokerError> {
        let action = args.get("action").and_then(Value::as_str).unwrap_or("list");
        let method = match action {
            "list" => "getTabs",
            "new" => "createTab",
            "attach" => "selectTab",
            "close" => "closeTab",
            other => return Err(BrokerError::InvalidArguments(format!("unknown browser_tabs action: {other}"))),
        };
        let result = ctx.send_cmd(method, Some(args.clone()), None).await?;

        if matches!(action, "new" | "attach") {
            if let Some(tab) = serde_json::from_value::<TabInfo>(result.clone()).ok() {
                ctx.set_attached_tab(Some(tab));
            }
        }
        if action == "close" {
            ctx.set_attached_tab(None);
        }
        if let Some(stealth) = args.get("stealth").and_then(Value::as_bool) {
            ctx.set_stealth(stealth);
        }

        Ok(ToolOutcome::json(result))
    }
}

/// `browser_navigate {action: url|back|forward|reload|test_page, url?, screenshot?}`.
pub struct BrowserNavigate;

#[async_trait]
impl Tool for BrowserNavigate {
    fn name(&self) -> &'static str {
        "browser_navigate"
    }

    fn description(&self) -> &'static str {
        "Navigate the attached tab: go to a URL, go back/forward, reload, or load the test page."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "action": { "type": "string", "enum": ["url", "back", "forward", "reload", "test_page"] },
                "url": { "type": "string" },
                "screenshot": { "type": "boolean" },
            },
            "required": ["action"],
        })
    }

    async fn execute(&self, ctx: &mut BrokerContext, args: Value, _raw_result: bool) -> Result<ToolOutcome, BrokerError> {
        let action = args.get("action").and_then(Value::as_str).unwrap_or("url");

        match action {
            "back" => {
                ctx.eval("history.back()", false).await?;
            }
            "forward" => {
                ctx.eval("history.forward()", false).await?;
            }
            "reload" | "url" | "test_page" => {
                ctx.send_cmd("navigate", Some(args.clone()), None).await?;
            }
            other => return Err(BrokerError::InvalidArguments(format!("unknown browser_navigate action: {other}"))),
        }

        if ctx.config.experiment("smart_waiting") {
            let _ = ctx
                .send_cmd("waitForReady", None, Some(std::time::Duration::from_secs(10)))
                .await;
        } else {
            ctx.sleep(1500).await;
        }

        if action == "url" {
            if let Some(url) = args.get("url").and_then(Value::as_str) {
                let mut tab = ctx.attached_tab().cloned().unwrap_or(TabInfo { index: 0, url: String::new(), title: None });
                tab.url = url.to_string();
                ctx.set_attached_tab(Some(tab));
            }
        }

        Ok(ToolOutcome::text(format!("Navigated ({action}).")))
    }
}
