//! Input-event helpers layered over `BrokerContext::cdp` (spec 4.F.2).

use rand::Rng;
use serde_json::{json, Value};

use crate::connection::{BrokerContext, BrokerError};

/// Teleport the mouse to `(x, y)` via a direct `Input.dispatchMouseEvent`.
/// A humanization plugin could intercept this in the future; the default
/// (and only implementation here) is a direct move (spec 9).
pub async fn move_cursor_to(ctx: &BrokerContext, x: i64, y: i64) -> Result<(), BrokerError> {
    ctx.cdp(
        "Input.dispatchMouseEvent",
        json!({ "type": "mouseMoved", "x": x, "y": y }),
    )
    .await?;
    Ok(())
}

/// A uniform-random press-hold duration in the 78–141 ms range (spec
/// 4.F.2, Balabit-dataset-inspired).
#[must_use]
pub fn press_hold_millis() -> u64 {
    rand::thread_rng().gen_range(78..=141)
}

/// Click at `(x, y)`: move, press, hold, release. `button` is `"left"`,
/// `"middle"`, or `"right"`; `click_count` is usually 1 or 2.
pub async fn click_at(ctx: &BrokerContext, x: i64, y: i64, button: &str, click_count: u32) -> Result<(), BrokerError> {
    move_cursor_to(ctx, x, y).await?;
    ctx.cdp(
        "Input.dispatchMouseEvent",
        json!({ "type": "mousePressed", "x": x, "y": y, "button": button, "clickCount": click_count }),
    )
    .await?;
    ctx.sleep(press_hold_millis()).await;
    ctx.cdp(
        "Input.dispatchMouseEvent",
        json!({ "type": "mouseReleased", "x": x, "y": y, "button": button, "clickCount": click_count }),
    )
    .await?;
    Ok(())
}

/// One `{key, code, keyCode, text}` tuple for `Input.dispatchKeyEvent`.
#[derive(Debug, Clone)]
pub struct KeyEvent {
    pub key: String,
    pub code: String,
    pub key_code: i32,
    pub text: String,
}

/// Maps a symbolic key name to its CDP key-event fields; single characters
/// pass through unchanged (spec 4.F.2 `press_key`).
#[must_use]
pub fn resolve_key(name: &str) -> KeyEvent {
    let entry = |key: &str, code: &str, key_code: i32, text: &str| KeyEvent {
        key: key.to_string(),
        code: code.to_string(),
        key_code,
        text: text.to_string(),
    };
    match name {
        "Enter" => entry("Enter", "Enter", 13, "\r"),
        "Tab" => entry("Tab", "Tab", 9, "\t"),
        "Escape" => entry("Escape", "Escape", 27, ""),
        "Backspace" => entry("Backspace", "Backspace", 8, ""),
        "Delete" => entry("Delete", "Delete", 46, ""),
        "ArrowUp" => entry("ArrowUp", "ArrowUp", 38, ""),
        "ArrowDown" => entry("ArrowDown", "ArrowDown", 40, ""),
        "ArrowLeft" => entry("ArrowLeft", "ArrowLeft", 37, ""),
        "ArrowRight" => entry("ArrowRight", "ArrowRight", 39, ""),
        "Space" => entry("Space", "Space", 32, " "),
        "Home" => entry("Home", "Home", 36, ""),
        "End" => entry("End", "End", 35, ""),
        "PageUp" => entry("PageUp", "PageUp", 33, ""),
        "PageDown" => entry("PageDown", "PageDown", 34, ""),
        single if single.chars().count() == 1 => entry(single, single, single.chars().next().unwrap() as i32, single),
        other => entry(other, other, 0, other),
    }
}

/// Dispatch `keyDown` then `keyUp` for the resolved key.
pub async fn press_key(ctx: &BrokerContext, name: &str) -> Result<(), BrokerError> {
    let key = resolve_key(name);
    let down = json!({ "type": "keyDown", "key": key.key, "code": key.code, "windowsVirtualKeyCode": key.key_code, "text": key.text });
    let up = json!({ "type": "keyUp", "key": key.key, "code": key.code, "windowsVirtualKeyCode": key.key_code });
    ctx.cdp("Input.dispatchKeyEvent", down).await?;
    ctx.cdp("Input.dispatchKeyEvent", up).await?;
    Ok(())
}

/// Type a string one character at a time via `{type:"char"}` events.
pub async fn type_text(ctx: &BrokerContext, text: &str) -> Result<(), BrokerError> {
    for ch in text.chars() {
        ctx.cdp(
            "Input.dispatchKeyEvent",
            json!({ "type": "char", "text": ch.to_string() }),
        )
        .await?;
    }
    Ok(())
}

/// `DOM.getDocument` → `DOM.querySelector`, returning the resolved
/// `nodeId`. Used by handlers that need raw CDP node identity rather than
/// a `Runtime.evaluate` object reference (styles, file upload, pseudo
/// state).
pub async fn query_node_id(ctx: &BrokerContext, selector: &str) -> Result<i64, BrokerError> {
    let document = ctx.cdp("DOM.getDocument", json!({})).await?;
    let root_id = document
        .get("root")
        .and_then(|r| r.get("nodeId"))
        .and_then(Value::as_i64)
        .ok_or_else(|| BrokerError::ScriptError("DOM.getDocument returned no root".to_string()))?;
    let result = ctx
        .cdp("DOM.querySelector", json!({ "nodeId": root_id, "selector": selector }))
        .await?;
    result
        .get("nodeId")
        .and_then(Value::as_i64)
        .filter(|id| *id != 0)
        .ok_or_else(|| BrokerError::ElementNotFound(format!("Element not found for selector: {selector}")))
}
