//! `browser_performance_metrics` (spec 4.F.11).

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::connection::{BrokerContext, BrokerError};
use crate::primitives::eval::page_timing_metrics;

use super::traits::{Tool, ToolOutcome};

/// Merges page-side `performance` timings with the extension's CDP
/// `Performance.getMetrics` snapshot into one result.
pub struct BrowserPerformanceMetrics;

#[async_trait]
impl Tool for BrowserPerformanceMetrics {
    fn name(&self) -> &'static str {
        "browser_performance_metrics"
    }

    fn description(&self) -> &'static str {
        "Return page timing and CDP performance metrics for the attached tab."
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": {}, "required": [] })
    }

    async fn execute(&self, ctx: &mut BrokerContext, _args: Value, _raw_result: bool) -> Result<ToolOutcome, BrokerError> {
        let timing = page_timing_metrics(ctx).await?;
        let cdp_metrics = ctx.cdp("Performance.getMetrics", json!({})).await?;

        Ok(ToolOutcome::json(json!({
            "timing": timing,
            "cdpMetrics": cdp_metrics.get("metrics").cloned().unwrap_or(Value::Null),
        })))
    }
}
