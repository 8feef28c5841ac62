//! `browser_fill_form` and `browser_drag` (spec 4.F.9).

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::connection::{BrokerContext, BrokerError};
use crate::primitives::cdp;
use crate::primitives::selector::{get_element_center, to_expression};

use super::traits::{Tool, ToolOutcome};

/// `browser_fill_form {fields: [{selector, value}]}`: sets each field via
/// the native prototype setter, so framework-bound inputs (React/Vue)
/// observe the change the same way they would a real keystroke.
pub struct BrowserFillForm;

#[async_trait]
impl Tool for BrowserFillForm {
    fn name(&self) -> &'static str {
        "browser_fill_form"
    }

    fn description(&self) -> &'static str {
        "Fill multiple form fields in one call using native property setters."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "fields": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": { "selector": { "type": "string" }, "value": { "type": "string" } },
                        "required": ["selector", "value"],
                    },
                },
                "screenshot": { "type": "boolean" },
            },
            "required": ["fields"],
        })
    }

    async fn execute(&self, ctx: &mut BrokerContext, args: Value, _raw_result: bool) -> Result<ToolOutcome, BrokerError> {
        let fields = args
            .get("fields")
            .and_then(Value::as_array)
            .ok_or_else(|| BrokerError::InvalidArguments("missing `fields`".to_string()))?;

        let mut filled = Vec::with_capacity(fields.len());
        for field in fields {
            let selector = field
                .get("selector")
                .and_then(Value::as_str)
                .ok_or_else(|| BrokerError::InvalidArguments("field missing `selector`".to_string()))?;
            let value = field
                .get("value")
                .and_then(Value::as_str)
                .ok_or_else(|| BrokerError::InvalidArguments("field missing `value`".to_string()))?;
            fill_one(ctx, selector, value).await?;
            filled.push(json!({ "selector": selector }));
        }

        Ok(ToolOutcome::json(json!({ "filled": filled })))
    }
}

async fn fill_one(ctx: &BrokerContext, selector: &str, value: &str) -> Result<(), BrokerError> {
    let expr = to_expression(selector);
    let script = format!(
        "(() => {{ const el = {expr}; if (!el) return false; \
         const tag = el.tagName; \
         const proto = tag === 'TEXTAREA' ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype; \
         const setter = Object.getOwnPropertyDescriptor(proto, 'value').set; \
         setter.call(el, {value:?}); \
         el.dispatchEvent(new Event('input', {{bubbles:true}})); \
         el.dispatchEvent(new Event('change', {{bubbles:true}})); \
         return true; }})()"
    );
    let result = ctx.eval(&script, false).await?;
    if result.as_bool() == Some(false) {
        return Err(BrokerError::ElementNotFound(format!("Element not found for selector: {selector}")));
    }
    Ok(())
}

/// `browser_drag {fromSelector, toSelector}`: interpolates 10 waypoints
/// between start and end so drag-sensitive listeners (sortable lists,
/// canvas editors) see intermediate `mousemove` events rather than a
/// single teleporting jump.
pub struct BrowserDrag;

const DRAG_WAYPOINTS: u32 = 10;

#[async_trait]
impl Tool for BrowserDrag {
    fn name(&self) -> &'static str {
        "browser_drag"
    }

    fn description(&self) -> &'static str {
        "Drag from one element to another with interpolated mouse movement."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "fromSelector": { "type": "string" },
                "toSelector": { "type": "string" },
                "screenshot": { "type": "boolean" },
            },
            "required": ["fromSelector", "toSelector"],
        })
    }

    async fn execute(&self, ctx: &mut BrokerContext, args: Value, _raw_result: bool) -> Result<ToolOutcome, BrokerError> {
        let from_selector = args
            .get("fromSelector")
            .and_then(Value::as_str)
            .ok_or_else(|| BrokerError::InvalidArguments("missing `fromSelector`".to_string()))?;
        let to_selector = args
            .get("toSelector")
            .and_then(Value::as_str)
            .ok_or_else(|| BrokerError::InvalidArguments("missing `toSelector`".to_string()))?;

        let (fx, fy) = get_element_center(ctx, from_selector).await?;
        let (tx, ty) = get_element_center(ctx, to_selector).await?;

        ctx.cdp(
            "Input.dispatchMouseEvent",
            json!({ "type": "mousePressed", "x": fx, "y": fy, "button": "left", "clickCount": 1 }),
        )
        .await?;

        for step in 1..=DRAG_WAYPOINTS {
            let t = f64::from(step) / f64::from(DRAG_WAYPOINTS);
            let ix = fx + ((tx - fx) as f64 * t) as i64;
            let iy = fy + ((ty - fy) as f64 * t) as i64;
            cdp::move_cursor_to(ctx, ix, iy).await?;
            ctx.sleep(16).await;
        }

        ctx.cdp(
            "Input.dispatchMouseEvent",
            json!({ "type": "mouseReleased", "x": tx, "y": ty, "button": "left", "clickCount": 1 }),
        )
        .await?;

        Ok(ToolOutcome::text("Dragged."))
    }
}
