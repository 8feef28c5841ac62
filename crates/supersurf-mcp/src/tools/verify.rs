//! `browser_verify_text_visible` and `browser_verify_element_visible` (spec 4.F.8).

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::connection::{BrokerContext, BrokerError};
use crate::primitives::eval::{element_visible, text_visible};

use super::traits::{ContentBlock, Tool, ToolOutcome};

/// `browser_verify_text_visible {text}`: returns an error outcome rather
/// than `Ok(false)` on failure so the result surfaces as `isError=true`
/// (spec 4.F.8 — verification failures are tool errors, not data).
pub struct BrowserVerifyTextVisible;

#[async_trait]
impl Tool for BrowserVerifyTextVisible {
    fn name(&self) -> &'static str {
        "browser_verify_text_visible"
    }

    fn description(&self) -> &'static str {
        "Assert that the page's visible text contains a substring."
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": { "text": { "type": "string" } }, "required": ["text"] })
    }

    async fn execute(&self, ctx: &mut BrokerContext, args: Value, _raw_result: bool) -> Result<ToolOutcome, BrokerError> {
        let text = args
            .get("text")
            .and_then(Value::as_str)
            .ok_or_else(|| BrokerError::InvalidArguments("missing `text`".to_string()))?;
        if text_visible(ctx, text).await? {
            Ok(ToolOutcome {
                content: vec![ContentBlock::Text(format!("Text \"{text}\" is visible."))],
                raw: json!({ "visible": true }),
                pre_captured_screenshot: None,
            })
        } else {
            Err(BrokerError::ElementNotFound(format!("Text \"{text}\" was not found on the page.")))
        }
    }
}

/// `browser_verify_element_visible {selector}`.
pub struct BrowserVerifyElementVisible;

#[async_trait]
impl Tool for BrowserVerifyElementVisible {
    fn name(&self) -> &'static str {
        "browser_verify_element_visible"
    }

    fn description(&self) -> &'static str {
        "Assert that an element matching a selector is present and visible."
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": { "selector": { "type": "string" } }, "required": ["selector"] })
    }

    async fn execute(&self, ctx: &mut BrokerContext, args: Value, _raw_result: bool) -> Result<ToolOutcome, BrokerError> {
        let selector = args
            .get("selector")
            .and_then(Value::as_str)
            .ok_or_else(|| BrokerError::InvalidArguments("missing `selector`".to_string()))?;
        if element_visible(ctx, selector).await? {
            Ok(ToolOutcome {
                content: vec![ContentBlock::Text(format!("Element \"{selector}\" is visible."))],
                raw: json!({ "visible": true }),
                pre_captured_screenshot: None,
            })
        } else {
            Err(BrokerError::ElementNotFound(format!("Element \"{selector}\" is not visible or not present.")))
        }
    }
}
