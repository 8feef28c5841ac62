//! The connection manager: owns `BrokerContext`, dispatches tool calls,
//! and drives the Passive/Active/Connected state machine (spec 4.C).

use std::sync::{Arc, OnceLock, Weak};

use serde_json::{json, Value};
use tokio::sync::{watch, RwLock};

use crate::bridge::Bridge;
use crate::config::ServerConfig;
use crate::logger::LogRegistry;
use crate::tools::{capture_viewport_block, ContentBlock, ToolOutcome, ToolRegistry, INLINE_SCREENSHOT_TOOLS};

use super::context::BrokerContext;
use super::error::BrokerError;
use super::state::ConnectionState;
use super::status::format_status_header;

const RELOAD_EXIT_CODE: i32 = 42;

/// Connection-tool names; always routed to this manager rather than the
/// tool registry, and always available regardless of state.
const CONNECTION_TOOLS: &[&str] = &["enable", "disable", "status", "experimental_features", "reload_mcp"];

/// Owns the single `BrokerContext` and the static tool registry, enforcing
/// the state machine's availability rules and the shared status header.
pub struct ConnectionManager {
    context: RwLock<BrokerContext>,
    tools: ToolRegistry,
    tools_changed_tx: watch::Sender<u64>,
    generation: std::sync::atomic::AtomicU64,
    self_weak: OnceLock<Weak<ConnectionManager>>,
}

impl ConnectionManager {
    /// Constructs the manager behind an `Arc`, since background watchers
    /// (handshake, tab-info, disconnect) spawned from `enable` need a
    /// `'static` handle back to `self`.
    #[must_use]
    pub fn new(config: Arc<ServerConfig>, logger: Arc<LogRegistry>) -> Arc<Self> {
        let debug_mode = config.debug;
        let (tools_changed_tx, _) = watch::channel(0);
        let manager = Arc::new(Self {
            context: RwLock::new(BrokerContext::new(config, logger, debug_mode)),
            tools: ToolRegistry::with_all_tools(),
            tools_changed_tx,
            generation: std::sync::atomic::AtomicU64::new(0),
            self_weak: OnceLock::new(),
        });
        let _ = manager.self_weak.set(Arc::downgrade(&manager));
        manager
    }

    /// Subscribe to `tools/list_changed` notifications.
    #[must_use]
    pub fn subscribe_tools_changed(&self) -> watch::Receiver<u64> {
        self.tools_changed_tx.subscribe()
    }

    fn notify_tools_changed(&self) {
        let next = self.generation.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
        let _ = self.tools_changed_tx.send(next);
    }

    /// `listTools()`: connection-tool schemas ∪ browser-tool schemas
    /// (always present) ∪ debug tools when debug mode is active.
    pub async fn list_tools(&self) -> Vec<(String, String, Value)> {
        let ctx = self.context.read().await;
        self.tools.list_schemas(ctx.debug_mode)
    }

    /// `callTool(name, args, {rawResult})`.
    pub async fn call_tool(&self, name: &str, args: Value, raw_result: bool) -> ToolOutcome {
        let wants_inline_screenshot =
            INLINE_SCREENSHOT_TOOLS.contains(&name) && args.get("screenshot").and_then(Value::as_bool) == Some(true);

        let result = if CONNECTION_TOOLS.contains(&name) {
            self.dispatch_connection_tool(name, args).await
        } else {
            self.dispatch_browser_tool(name, args, raw_result).await
        };

        match result {
            Ok(outcome) => {
                let outcome = if wants_inline_screenshot {
                    self.compose_inline_screenshot(outcome).await
                } else {
                    outcome
                };
                self.decorate(outcome, raw_result).await
            }
            Err(err) => self.error_outcome(&err, raw_result).await,
        }
    }

    /// Appends the current viewport as an inline image block for the
    /// `INLINE_SCREENSHOT_TOOLS` set, reusing a handler's pre-captured
    /// screenshot if one is already present (spec 4.F). Capture failures
    /// are swallowed — the underlying action already succeeded and a
    /// screenshot is a convenience, not part of the action's contract.
    async fn compose_inline_screenshot(&self, mut outcome: ToolOutcome) -> ToolOutcome {
        let block = if let Some(block) = outcome.pre_captured_screenshot.take() {
            Some(block)
        } else {
            let ctx = self.context.read().await;
            capture_viewport_block(&ctx).await.ok()
        };
        if let Some(block) = block {
            outcome.content.push(block);
        }
        outcome
    }

    async fn dispatch_browser_tool(
        &self,
        name: &str,
        args: Value,
        raw_result: bool,
    ) -> Result<ToolOutcome, BrokerError> {
        let mut ctx = self.context.write().await;
        if ctx.state() == ConnectionState::Passive {
            return Err(BrokerError::NotEnabled);
        }
        if self.tools.get(name).is_none() {
            return Err(BrokerError::InvalidArguments(format!("unknown tool: {name}")));
        }
        if ctx.state() == ConnectionState::Active {
            return Err(BrokerError::NotConnected);
        }
        let before_tab = ctx.attached_tab().cloned();
        let before_browser = ctx.bridge().is_some();
        let outcome = self.tools.execute(name, &mut ctx, args, raw_result).await?;
        let _ = (before_tab, before_browser);
        Ok(outcome)
    }

    async fn dispatch_connection_tool(&self, name: &str, args: Value) -> Result<ToolOutcome, BrokerError> {
        match name {
            "enable" => self.enable(args).await,
            "disable" => self.disable().await,
            "status" => self.status().await,
            "experimental_features" => self.experimental_features(args).await,
            "reload_mcp" => self.reload_mcp().await,
            _ => unreachable!("dispatch_connection_tool only called for CONNECTION_TOOLS"),
        }
    }

    async fn enable(&self, args: Value) -> Result<ToolOutcome, BrokerError> {
        let client_id = args
            .get("client_id")
            .and_then(Value::as_str)
            .unwrap_or("default")
            .to_string();

        let mut ctx = self.context.write().await;
        if ctx.state() != ConnectionState::Passive {
            return Ok(ToolOutcome::text("Already enabled."));
        }

        let bridge = Arc::new(Bridge::new(ctx.config.port));
        bridge.start().await.map_err(BrokerError::from)?;

        ctx.set_bridge(Some(bridge.clone()));
        ctx.set_client_id(Some(client_id));
        ctx.set_state(ConnectionState::Active);
        drop(ctx);

        self.spawn_watchers(bridge);
        self.notify_tools_changed();

        Ok(ToolOutcome::text("Browser automation enabled."))
    }

    /// Watches the bridge's observable hooks for the lifetime of this
    /// bridge instance. A stale watcher from a superseded bridge becomes a
    /// no-op once `watch`/`mpsc` senders drop, since `changed()` then
    /// returns an error and the loop exits.
    fn spawn_watchers(&self, bridge: Arc<Bridge>) {
        let Some(weak) = self.self_weak.get().cloned() else {
            return;
        };

        let mut handshake_rx = bridge.subscribe_handshake();
        let handshake_weak = weak.clone();
        tokio::spawn(async move {
            while handshake_rx.changed().await.is_ok() {
                let Some(info) = handshake_rx.borrow_and_update().clone() else {
                    continue;
                };
                let Some(manager) = handshake_weak.upgrade() else {
                    break;
                };
                manager.on_handshake(info.browser).await;
            }
        });

        let mut tab_info_rx = bridge.subscribe_tab_info();
        let tab_info_weak = weak.clone();
        tokio::spawn(async move {
            while tab_info_rx.changed().await.is_ok() {
                let Some(tab) = tab_info_rx.borrow_and_update().clone() else {
                    continue;
                };
                let Some(manager) = tab_info_weak.upgrade() else {
                    break;
                };
                manager.on_tab_info_update(tab).await;
            }
        });

        let mut disconnect_rx = bridge.subscribe_disconnect();
        tokio::spawn(async move {
            if disconnect_rx.changed().await.is_ok() {
                if let Some(manager) = weak.upgrade() {
                    manager.on_extension_disconnect().await;
                }
            }
        });
    }

    /// Called by the transport layer whenever it observes a fresh
    /// handshake or tab-info update on the active bridge, since the
    /// manager owns the only `RwLock<BrokerContext>` and handler tasks
    /// can't reach it directly from inside the bridge's connection task.
    pub async fn on_handshake(&self, browser: String) {
        let mut ctx = self.context.write().await;
        if ctx.state() == ConnectionState::Active {
            ctx.set_state(ConnectionState::Connected);
            ctx.set_connected_browser_name(Some(browser));
            drop(ctx);
            self.notify_tools_changed();
        }
    }

    /// Updates the attached tab from a piggybacked `currentTab` field or a
    /// `notifications/tab_info_update` frame.
    pub async fn on_tab_info_update(&self, tab: crate::bridge::TabInfo) {
        self.context.write().await.set_attached_tab(Some(tab));
    }

    /// Called when the bridge reports the extension socket has closed.
    pub async fn on_extension_disconnect(&self) {
        let mut ctx = self.context.write().await;
        if ctx.state() == ConnectionState::Connected {
            ctx.set_state(ConnectionState::Active);
            ctx.set_connected_browser_name(None);
            drop(ctx);
            self.notify_tools_changed();
        }
    }

    async fn disable(&self) -> Result<ToolOutcome, BrokerError> {
        let mut ctx = self.context.write().await;
        if let Some(bridge) = ctx.bridge().cloned() {
            bridge.stop().await;
        }
        ctx.set_bridge(None);
        ctx.set_client_id(None);
        ctx.set_connected_browser_name(None);
        ctx.set_attached_tab(None);
        ctx.set_stealth(false);
        ctx.set_state(ConnectionState::Passive);
        drop(ctx);
        self.notify_tools_changed();
        Ok(ToolOutcome::text("Browser automation disabled."))
    }

    async fn status(&self) -> Result<ToolOutcome, BrokerError> {
        let ctx = self.context.read().await;
        let header = format_status_header(&ctx.status_snapshot());
        Ok(ToolOutcome::text(header))
    }

    async fn experimental_features(&self, args: Value) -> Result<ToolOutcome, BrokerError> {
        let ctx = self.context.read().await;
        let requested = args.get("enable").and_then(Value::as_array);
        let enabled: Vec<&str> = ctx.config.experiments.iter().map(String::as_str).collect();
        match requested {
            Some(names) => {
                let names: Vec<String> = names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect();
                Ok(ToolOutcome::json(json!({
                    "requested": names,
                    "currentlyEnabled": enabled,
                    "note": "experiments are fixed at process startup via SUPERSURF_EXPERIMENTS",
                })))
            }
            None => Ok(ToolOutcome::json(json!({ "enabled": enabled }))),
        }
    }

    async fn reload_mcp(&self) -> Result<ToolOutcome, BrokerError> {
        let ctx = self.context.read().await;
        if !ctx.debug_mode {
            return Err(BrokerError::InvalidArguments(
                "reload_mcp is only available in debug mode".to_string(),
            ));
        }
        drop(ctx);
        std::process::exit(RELOAD_EXIT_CODE);
    }

    async fn decorate(&self, outcome: ToolOutcome, raw_result: bool) -> ToolOutcome {
        if raw_result {
            return outcome;
        }
        let header = {
            let ctx = self.context.read().await;
            format_status_header(&ctx.status_snapshot())
        };
        let mut content = vec![ContentBlock::Text(header)];
        content.extend(outcome.content);
        ToolOutcome {
            content,
            raw: outcome.raw,
            pre_captured_screenshot: outcome.pre_captured_screenshot,
        }
    }

    async fn error_outcome(&self, err: &BrokerError, raw_result: bool) -> ToolOutcome {
        if raw_result {
            return ToolOutcome {
                content: vec![ContentBlock::Text(err.to_string())],
                raw: json!({ "success": false, "error": err.to_string() }),
                pre_captured_screenshot: None,
            };
        }
        let header = {
            let ctx = self.context.read().await;
            format_status_header(&ctx.status_snapshot())
        };
        ToolOutcome {
            content: vec![ContentBlock::Text(header), ContentBlock::Text(err.to_string())],
            raw: json!({ "success": false, "error": err.to_string() }),
            pre_captured_screenshot: None,
        }
    }
}
