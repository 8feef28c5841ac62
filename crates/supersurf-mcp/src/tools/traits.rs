//! The shape every tool handler implements (spec 4.E/4.F).

use async_trait::async_trait;
use serde_json::Value;

use crate::connection::{BrokerContext, BrokerError};

/// One block of an MCP content result.
#[derive(Debug, Clone)]
pub enum ContentBlock {
    /// Plain text, e.g. the status header or a handler's textual result.
    Text(String),
    /// Inline base64-encoded image data.
    Image {
        /// Base64-encoded bytes.
        data: String,
        /// e.g. `image/png`.
        mime_type: String,
    },
}

/// A handler's result before the dispatcher decorates it. Handlers
/// populate both fields explicitly: `content` is what an MCP client sees
/// (status header prepended by the dispatcher); `raw` is what script mode
/// passes through untouched.
#[derive(Debug, Clone)]
pub struct ToolOutcome {
    pub content: Vec<ContentBlock>,
    pub raw: Value,
    /// Set by handlers that already captured a screenshot atomically, so
    /// the dispatcher's inline-screenshot step reuses it instead of
    /// re-capturing (spec 4.F "Inline screenshot composition").
    pub pre_captured_screenshot: Option<ContentBlock>,
}

impl ToolOutcome {
    /// A plain text content result with raw mirroring the text.
    #[must_use]
    pub fn text(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            raw: Value::String(message.clone()),
            content: vec![ContentBlock::Text(message)],
            pre_captured_screenshot: None,
        }
    }

    /// A structured raw result, rendered as pretty JSON for the content
    /// block (handlers that have a natural JSON shape use this).
    #[must_use]
    pub fn json(raw: Value) -> Self {
        let text = serde_json::to_string_pretty(&raw).unwrap_or_else(|_| raw.to_string());
        Self {
            content: vec![ContentBlock::Text(text)],
            raw,
            pre_captured_screenshot: None,
        }
    }

    #[must_use]
    pub fn with_pre_captured_screenshot(mut self, block: ContentBlock) -> Self {
        self.pre_captured_screenshot = Some(block);
        self
    }
}

/// A named, JSON-Schema-described operation invocable by the agent.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name as it appears in `tools/list` and `tools/call`.
    fn name(&self) -> &'static str;

    /// One-line human description.
    fn description(&self) -> &'static str;

    /// JSON-Schema for `args`, used to validate before dispatch.
    fn input_schema(&self) -> Value;

    /// Run the tool. `raw_result` mirrors script mode's `{rawResult:true}`
    /// and is passed through so a handler's `ToolOutcome::raw` can skip
    /// work (e.g. status-header formatting) that only content results need.
    async fn execute(
        &self,
        ctx: &mut BrokerContext,
        args: Value,
        raw_result: bool,
    ) -> Result<ToolOutcome, BrokerError>;
}
