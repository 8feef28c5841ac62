//! `browser_interact`: the largest handler (spec 4.F.2).

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::connection::{BrokerContext, BrokerError};
use crate::primitives::{cdp, eval, selector};

use super::traits::{Tool, ToolOutcome};

/// One step of a `browser_interact` action list.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum Action {
    Click {
        selector: Option<String>,
        x: Option<i64>,
        y: Option<i64>,
        #[serde(default = "default_button")]
        button: String,
        #[serde(default = "default_click_count")]
        click_count: u32,
    },
    Type {
        selector: Option<String>,
        text: String,
    },
    Clear {
        selector: String,
    },
    PressKey {
        key: String,
    },
    Hover {
        selector: String,
    },
    Wait {
        selector: Option<String>,
        #[serde(default = "default_wait_timeout")]
        timeout: u64,
    },
    MouseMove {
        x: i64,
        y: i64,
    },
    MouseClick {
        x: i64,
        y: i64,
        #[serde(default = "default_button")]
        button: String,
        #[serde(default = "default_click_count")]
        click_count: u32,
    },
    ScrollTo {
        x: Option<i64>,
        y: Option<i64>,
    },
    ScrollBy {
        #[serde(default)]
        x: i64,
        #[serde(default)]
        y: i64,
    },
    ScrollIntoView {
        selector: String,
    },
    SelectOption {
        selector: String,
        option: String,
    },
    FileUpload {
        selector: String,
        files: Vec<String>,
    },
    ForcePseudoState {
        selector: String,
        #[serde(default)]
        states: Vec<String>,
    },
}

fn default_button() -> String {
    "left".to_string()
}
fn default_click_count() -> u32 {
    1
}
fn default_wait_timeout() -> u64 {
    30_000
}

#[derive(Debug, Deserialize)]
struct Input {
    actions: Vec<Value>,
    #[serde(default = "default_on_error")]
    on_error: String,
    #[serde(default)]
    screenshot: bool,
}

fn default_on_error() -> String {
    "stop".to_string()
}

/// One action's result, used to render `{succeeded: [...], stoppedAt: n}`.
#[derive(Debug, serde::Serialize)]
struct ActionResult {
    index: usize,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
}

pub struct BrowserInteract;

#[async_trait]
impl Tool for BrowserInteract {
    fn name(&self) -> &'static str {
        "browser_interact"
    }

    fn description(&self) -> &'static str {
        "Execute an ordered list of click/type/scroll/form interactions against the page."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "actions": { "type": "array" },
                "onError": { "type": "string", "enum": ["stop", "ignore"] },
                "screenshot": { "type": "boolean" },
            },
            "required": ["actions"],
        })
    }

    async fn execute(&self, ctx: &mut BrokerContext, args: Value, _raw_result: bool) -> Result<ToolOutcome, BrokerError> {
        let input: Input = serde_json::from_value(rename_on_error(args))
            .map_err(|e| BrokerError::InvalidArguments(e.to_string()))?;

        let mut results = Vec::with_capacity(input.actions.len());
        for (index, raw) in input.actions.iter().enumerate() {
            let action: Action = serde_json::from_value(raw.clone())
                .map_err(|e| BrokerError::InvalidArguments(format!("action {index}: {e}")))?;
            match run_action(ctx, &action).await {
                Ok(value) => results.push(ActionResult { index, ok: true, error: None, value }),
                Err(err) => {
                    results.push(ActionResult {
                        index,
                        ok: false,
                        error: Some(err.to_string()),
                        value: None,
                    });
                    if input.on_error == "stop" {
                        break;
                    }
                }
            }
        }

        let all_ok = results.iter().all(|r| r.ok);
        let raw = json!({ "results": results });
        let outcome = ToolOutcome::json(raw);
        // `args.screenshot` is honored centrally by the dispatcher for the
        // inline-screenshot tool set (spec 4.F); no per-handler capture here.
        let _ = input.screenshot;

        if !all_ok {
            let failed = results.iter().find(|r| !r.ok);
            if let Some(failed) = failed {
                return Err(BrokerError::ElementNotFound(
                    failed.error.clone().unwrap_or_else(|| "action failed".to_string()),
                ));
            }
        }
        Ok(outcome)
    }
}

/// `args` as delivered over JSON-RPC uses `onError`; our `Input` struct
/// uses `on_error` per `serde(rename_all = "camelCase")` convention used
/// elsewhere in this crate — normalize here since `actions` is untyped.
pub(crate) fn rename_on_error(mut args: Value) -> Value {
    if let Some(obj) = args.as_object_mut() {
        if let Some(v) = obj.remove("onError") {
            obj.insert("on_error".to_string(), v);
        }
    }
    args
}

async fn run_action(ctx: &BrokerContext, action: &Action) -> Result<Option<Value>, BrokerError> {
    match action {
        Action::Click { selector: sel, x, y, button, click_count } => {
            let (cx, cy) = resolve_point(ctx, sel.as_deref(), *x, *y).await?;
            cdp::click_at(ctx, cx, cy, button, *click_count).await?;
            Ok(None)
        }
        Action::Type { selector: sel, text } => {
            if let Some(sel) = sel {
                let expr = selector::to_expression(sel);
                let focus = format!("(() => {{ const el = {expr}; if (el) el.focus(); return !!el; }})()");
                ctx.eval(&focus, false).await?;
            }
            cdp::type_text(ctx, text).await?;
            let value = if let Some(sel) = sel {
                Some(Value::String(eval::read_value(ctx, sel).await?))
            } else {
                None
            };
            Ok(value)
        }
        Action::Clear { selector: sel } => {
            eval::clear_field(ctx, sel).await?;
            Ok(None)
        }
        Action::PressKey { key } => {
            cdp::press_key(ctx, key).await?;
            Ok(None)
        }
        Action::Hover { selector: sel } => {
            let (cx, cy) = selector::get_element_center(ctx, sel).await?;
            cdp::move_cursor_to(ctx, cx, cy).await?;
            Ok(None)
        }
        Action::Wait { selector: sel, timeout } => {
            wait_for(ctx, sel.as_deref(), *timeout).await?;
            Ok(None)
        }
        Action::MouseMove { x, y } => {
            cdp::move_cursor_to(ctx, *x, *y).await?;
            Ok(None)
        }
        Action::MouseClick { x, y, button, click_count } => {
            cdp::click_at(ctx, *x, *y, button, *click_count).await?;
            Ok(None)
        }
        Action::ScrollTo { x, y } => {
            let script = format!("window.scrollTo({}, {})", x.unwrap_or(0), y.unwrap_or(0));
            ctx.eval(&script, false).await?;
            Ok(None)
        }
        Action::ScrollBy { x, y } => {
            let script = format!("window.scrollBy({x}, {y})");
            ctx.eval(&script, false).await?;
            Ok(None)
        }
        Action::ScrollIntoView { selector: sel } => {
            let expr = selector::to_expression(sel);
            let script = format!(
                "(() => {{ const el = {expr}; if (el) el.scrollIntoView({{block:'center', behavior:'smooth'}}); return !!el; }})()"
            );
            ctx.eval(&script, false).await?;
            Ok(None)
        }
        Action::SelectOption { selector: sel, option } => {
            let text = eval::select_option(ctx, sel, option).await?;
            Ok(Some(Value::String(text)))
        }
        Action::FileUpload { selector: sel, files } => {
            file_upload(ctx, sel, files).await?;
            Ok(None)
        }
        Action::ForcePseudoState { selector: sel, states } => {
            let node_id = cdp::query_node_id(ctx, sel).await?;
            ctx.cdp(
                "CSS.forcePseudoState",
                json!({ "nodeId": node_id, "forcedPseudoClasses": states }),
            )
            .await?;
            Ok(None)
        }
    }
}

async fn resolve_point(
    ctx: &BrokerContext,
    sel: Option<&str>,
    x: Option<i64>,
    y: Option<i64>,
) -> Result<(i64, i64), BrokerError> {
    if let Some(sel) = sel {
        selector::get_element_center(ctx, sel).await
    } else if let (Some(x), Some(y)) = (x, y) {
        Ok((x, y))
    } else {
        Err(BrokerError::InvalidArguments("click requires either a selector or (x, y)".to_string()))
    }
}

async fn wait_for(ctx: &BrokerContext, sel: Option<&str>, timeout_ms: u64) -> Result<(), BrokerError> {
    let Some(sel) = sel else {
        ctx.sleep(timeout_ms).await;
        return Ok(());
    };
    let expr = selector::to_expression(sel);
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_millis(timeout_ms);
    loop {
        let present = ctx.eval(&format!("!!({expr})"), false).await?;
        if present.as_bool() == Some(true) {
            return Ok(());
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(BrokerError::Timeout(format!("wait for selector {sel}")));
        }
        ctx.sleep(100).await;
    }
}

async fn file_upload(ctx: &BrokerContext, sel: &str, files: &[String]) -> Result<(), BrokerError> {
    let expr = selector::to_expression(sel);
    let object = ctx
        .cdp(
            "Runtime.evaluate",
            json!({ "expression": expr, "returnByValue": false }),
        )
        .await?;
    let object_id = object
        .get("result")
        .and_then(|r| r.get("objectId"))
        .and_then(Value::as_str)
        .ok_or_else(|| BrokerError::ElementNotFound(format!("Element not found for selector: {sel}")))?;
    let described = ctx.cdp("DOM.describeNode", json!({ "objectId": object_id })).await?;
    let node_id = described
        .get("node")
        .and_then(|n| n.get("nodeId"))
        .and_then(Value::as_i64)
        .ok_or_else(|| BrokerError::ScriptError("DOM.describeNode returned no nodeId".to_string()))?;
    ctx.cdp("DOM.setFileInputFiles", json!({ "nodeId": node_id, "files": files }))
        .await?;
    Ok(())
}
