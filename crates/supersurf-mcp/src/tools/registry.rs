//! Static table of browser-tool descriptors (spec 4.E), grouped by theme
//! the way the teacher's `register_all_tools` groups its registrations.

use std::collections::HashMap;

use serde_json::Value;

use crate::connection::{BrokerContext, BrokerError};

use super::traits::{Tool, ToolOutcome};

use super::content::{BrowserExtractContent, BrowserLookup, BrowserSnapshot};
use super::download::BrowserDownload;
use super::evaluate::BrowserEvaluate;
use super::extensions::{BrowserListExtensions, BrowserReloadExtensions};
use super::forms::{BrowserDrag, BrowserFillForm};
use super::inspect::{BrowserConsoleMessages, BrowserNetworkRequests};
use super::interaction::BrowserInteract;
use super::navigation::{BrowserNavigate, BrowserTabs};
use super::perf::BrowserPerformanceMetrics;
use super::screenshot::{BrowserPdfSave, BrowserTakeScreenshot};
use super::secure::SecureFill;
use super::styles::BrowserGetElementStyles;
use super::verify::{BrowserVerifyElementVisible, BrowserVerifyTextVisible};
use super::window::{BrowserHandleDialog, BrowserWindow};

/// Tools whose `screenshot: true` argument triggers the dispatcher's
/// inline-screenshot composition step (spec 4.F).
pub const INLINE_SCREENSHOT_TOOLS: &[&str] = &[
    "browser_interact",
    "browser_navigate",
    "browser_fill_form",
    "browser_drag",
    "browser_handle_dialog",
    "browser_window",
];

/// Holds every browser tool keyed by name. Connection tools (`enable`,
/// `disable`, `status`, `experimental_features`, `reload_mcp`) are not
/// registered here — the connection manager dispatches those itself.
pub struct ToolRegistry {
    pub(crate) tools: HashMap<&'static str, Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Build the full ~28-tool catalog.
    #[must_use]
    pub fn with_all_tools() -> Self {
        let mut tools: HashMap<&'static str, Box<dyn Tool>> = HashMap::new();

        // Tabs / navigation
        register(&mut tools, BrowserTabs);
        register(&mut tools, BrowserNavigate);

        // Interaction
        register(&mut tools, BrowserInteract);

        // Content
        register(&mut tools, BrowserSnapshot);
        register(&mut tools, BrowserLookup);
        register(&mut tools, BrowserExtractContent);

        // Styles
        register(&mut tools, BrowserGetElementStyles);

        // Screenshot / PDF
        register(&mut tools, BrowserTakeScreenshot);
        register(&mut tools, BrowserPdfSave);

        // Evaluation
        register(&mut tools, BrowserEvaluate);

        // Console / network
        register(&mut tools, BrowserConsoleMessages);
        register(&mut tools, BrowserNetworkRequests);

        // Forms
        register(&mut tools, BrowserFillForm);
        register(&mut tools, BrowserDrag);

        // Window / dialogs
        register(&mut tools, BrowserWindow);
        register(&mut tools, BrowserHandleDialog);

        // Verify
        register(&mut tools, BrowserVerifyTextVisible);
        register(&mut tools, BrowserVerifyElementVisible);

        // Extensions
        register(&mut tools, BrowserListExtensions);
        register(&mut tools, BrowserReloadExtensions);

        // Perf
        register(&mut tools, BrowserPerformanceMetrics);

        // Download
        register(&mut tools, BrowserDownload);

        // Secure
        register(&mut tools, SecureFill);

        Self { tools }
    }

    /// Look up a handler by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(std::convert::AsRef::as_ref)
    }

    /// `(name, description, schema)` triples for every registered tool.
    /// `_debug_mode` is accepted for symmetry with the connection
    /// manager's debug-tool gating; every browser tool here is always
    /// listed per spec 4.C ("always, even in Passive").
    #[must_use]
    pub fn list_schemas(&self, _debug_mode: bool) -> Vec<(String, String, Value)> {
        let mut entries: Vec<_> = self
            .tools
            .values()
            .map(|t| (t.name().to_string(), t.description().to_string(), t.input_schema()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Validate args against the schema's required-field list, then run.
    pub async fn execute(
        &self,
        name: &str,
        ctx: &mut BrokerContext,
        args: Value,
        raw_result: bool,
    ) -> Result<ToolOutcome, BrokerError> {
        let Some(tool) = self.get(name) else {
            return Err(BrokerError::InvalidArguments(format!("unknown tool: {name}")));
        };
        validate_required(&tool.input_schema(), &args)?;
        tool.execute(ctx, args, raw_result).await
    }
}

fn register<T: Tool + 'static>(tools: &mut HashMap<&'static str, Box<dyn Tool>>, tool: T) {
    tools.insert(tool.name(), Box::new(tool));
}

/// Minimal JSON-Schema enforcement: every name in `required` must be
/// present in `args`. Full schema validation (types, enums) is left to
/// each handler's own `serde` deserialization, whose errors are mapped to
/// `InvalidArguments` at the call site.
pub(crate) fn validate_required(schema: &Value, args: &Value) -> Result<(), BrokerError> {
    let Some(required) = schema.get("required").and_then(Value::as_array) else {
        return Ok(());
    };
    for field in required {
        let Some(field_name) = field.as_str() else { continue };
        if args.get(field_name).is_none() {
            return Err(BrokerError::InvalidArguments(format!("missing required field `{field_name}`")));
        }
    }
    Ok(())
}
