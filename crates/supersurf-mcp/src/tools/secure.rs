//! `secure_fill` (spec 4.F.9): types a credential without it ever
//! appearing in tool arguments, return values, or logs.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::connection::{BrokerContext, BrokerError};
use crate::primitives::selector::to_expression;

use super::traits::{Tool, ToolOutcome};

/// `secure_fill {selector, credential_env}`: reads `credential_env` from the
/// server process's own environment — never from the tool call — and
/// sends it to the extension for char-by-char typing with randomized
/// inter-keystroke delay. The value itself never reaches `ToolOutcome`.
pub struct SecureFill;

#[async_trait]
impl Tool for SecureFill {
    fn name(&self) -> &'static str {
        "secure_fill"
    }

    fn description(&self) -> &'static str {
        "Type a secret read from a server-side environment variable into a field, without exposing its value."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "selector": { "type": "string" },
                "credential_env": { "type": "string" },
            },
            "required": ["selector", "credential_env"],
        })
    }

    async fn execute(&self, ctx: &mut BrokerContext, args: Value, _raw_result: bool) -> Result<ToolOutcome, BrokerError> {
        let selector = args
            .get("selector")
            .and_then(Value::as_str)
            .ok_or_else(|| BrokerError::InvalidArguments("missing `selector`".to_string()))?;
        let env_name = args
            .get("credential_env")
            .and_then(Value::as_str)
            .ok_or_else(|| BrokerError::InvalidArguments("missing `credential_env`".to_string()))?;

        let secret = std::env::var(env_name)
            .map_err(|_| BrokerError::InvalidArguments(format!("environment variable `{env_name}` is not set")))?;

        let expr = to_expression(selector);
        let focus = format!("(() => {{ const el = {expr}; if (el) el.focus(); return !!el; }})()");
        if ctx.eval(&focus, false).await?.as_bool() != Some(true) {
            return Err(BrokerError::ElementNotFound(format!("Element not found for selector: {selector}")));
        }

        // The secret crosses the wire exactly once, inside this one
        // command's params — never echoed back, never logged verbatim by
        // the logger (the extension side is responsible for not echoing
        // it in its own diagnostics).
        ctx.send_cmd("secureType", Some(json!({ "text": secret })), None).await?;

        Ok(ToolOutcome::text(format!("Filled \"{selector}\" with a secret value.")))
    }
}
