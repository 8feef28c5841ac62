//! The extension bridge: a single-connection WebSocket server (spec 4.B).

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::routing::get;
use axum::Router;
use rand::RngCore;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tokio::task::JoinHandle;

use super::error::BridgeError;
use super::pending::{InflightMap, PendingCall};
use super::types::{HandshakeTag, IncomingFrame, OutgoingRequest, TabInfo};

const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(10);
const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);
const CLOSE_SETTLE: Duration = Duration::from_millis(100);

/// Browser identity and build stamp captured from the handshake frame.
#[derive(Debug, Clone)]
pub struct HandshakeInfo {
    pub browser: String,
    pub build_timestamp: String,
}

struct ConnectionSlot {
    outbound: mpsc::UnboundedSender<Message>,
    generation: u64,
}

struct Shared {
    inflight: InflightMap,
    slot: Mutex<Option<ConnectionSlot>>,
    generation: AtomicU64,
    reconnect_tx: watch::Sender<u64>,
    tab_info_tx: watch::Sender<Option<TabInfo>>,
    handshake_tx: watch::Sender<Option<HandshakeInfo>>,
    raw_connection_tx: watch::Sender<u64>,
    disconnect_tx: watch::Sender<u64>,
}

/// The extension-facing WebSocket bridge. Owns at most one open socket at a
/// time; a second inbound upgrade is rejected per the single-connection
/// policy.
pub struct Bridge {
    port: u16,
    shared: Arc<Shared>,
    server_handle: Mutex<Option<JoinHandle<()>>>,
}

impl Bridge {
    /// Construct a bridge bound to `port`, not yet listening.
    #[must_use]
    pub fn new(port: u16) -> Self {
        let (reconnect_tx, _) = watch::channel(0);
        let (tab_info_tx, _) = watch::channel(None);
        let (handshake_tx, _) = watch::channel(None);
        let (raw_connection_tx, _) = watch::channel(0);
        let (disconnect_tx, _) = watch::channel(0);
        Self {
            port,
            shared: Arc::new(Shared {
                inflight: InflightMap::new(),
                slot: Mutex::new(None),
                generation: AtomicU64::new(0),
                reconnect_tx,
                tab_info_tx,
                handshake_tx,
                raw_connection_tx,
                disconnect_tx,
            }),
            server_handle: Mutex::new(None),
        }
    }

    /// Subscribe to reconnect events (`onReconnect`). Fires when a stale
    /// socket is replaced by a fresh inbound connection.
    #[must_use]
    pub fn subscribe_reconnect(&self) -> watch::Receiver<u64> {
        self.shared.reconnect_tx.subscribe()
    }

    /// Subscribe to tab-info updates piggybacked on responses or delivered
    /// via `notifications/tab_info_update`.
    #[must_use]
    pub fn subscribe_tab_info(&self) -> watch::Receiver<Option<TabInfo>> {
        self.shared.tab_info_tx.subscribe()
    }

    /// Subscribe to handshake completion (`connectedBrowserName`).
    #[must_use]
    pub fn subscribe_handshake(&self) -> watch::Receiver<Option<HandshakeInfo>> {
        self.shared.handshake_tx.subscribe()
    }

    /// `onRawConnection`: fires once per accepted upgrade, for future
    /// multiplexers. Not required for a conforming core.
    #[must_use]
    pub fn subscribe_raw_connection(&self) -> watch::Receiver<u64> {
        self.shared.raw_connection_tx.subscribe()
    }

    /// Fires once the extension socket has closed and disconnect-draining
    /// has completed, so a watcher can safely transition the connection
    /// manager back to `Active`.
    #[must_use]
    pub fn subscribe_disconnect(&self) -> watch::Receiver<u64> {
        self.shared.disconnect_tx.subscribe()
    }

    /// True while an extension socket is open.
    pub async fn is_connected(&self) -> bool {
        self.shared.slot.lock().await.is_some()
    }

    /// Open the loopback listener and begin accepting upgrades.
    pub async fn start(&self) -> Result<(), BridgeError> {
        let addr: SocketAddr = format!("127.0.0.1:{}", self.port)
            .parse()
            .expect("loopback address always parses");
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| BridgeError::Bind { addr, source })?;

        let shared = self.shared.clone();
        let app = Router::new()
            .route("/", get(upgrade_handler))
            .with_state(shared)
            .layer(tower_http::trace::TraceLayer::new_for_http());

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        *self.server_handle.lock().await = Some(handle);
        Ok(())
    }

    /// Gracefully drain pending calls, close the socket, stop the listener.
    pub async fn stop(&self) {
        self.shared.inflight.drain().await;
        *self.shared.slot.lock().await = None;
        if let Some(handle) = self.server_handle.lock().await.take() {
            handle.abort();
        }
    }

    /// Send a correlated request to the extension and await its response,
    /// rejecting with `NotConnected`, `Timeout`, `PeerError`, or `Drained`.
    pub async fn send_cmd(
        &self,
        method: &str,
        params: Option<Value>,
        timeout: Option<Duration>,
    ) -> Result<Value, BridgeError> {
        let outbound = {
            let slot = self.shared.slot.lock().await;
            slot.as_ref().map(|s| s.outbound.clone())
        };
        let Some(outbound) = outbound else {
            return Err(BridgeError::NotConnected);
        };

        let id = new_correlation_id();
        let request = OutgoingRequest::new(id.clone(), method, params);
        let text = serde_json::to_string(&request).expect("request always serializes");

        let (tx, rx) = oneshot::channel();
        self.shared
            .inflight
            .insert(
                id.clone(),
                PendingCall {
                    method: method.to_string(),
                    sender: tx,
                },
            )
            .await;

        if outbound.send(Message::Text(text.into())).is_err() {
            self.shared.inflight.take(&id).await;
            return Err(BridgeError::Write("socket closed".to_string()));
        }

        let deadline = timeout.unwrap_or(DEFAULT_TIMEOUT);
        match tokio::time::timeout(deadline, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(BridgeError::Drained),
            Err(_) => {
                self.shared.inflight.take(&id).await;
                Err(BridgeError::Timeout {
                    method: method.to_string(),
                })
            }
        }
    }
}

fn new_correlation_id() -> String {
    let mut bytes = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

async fn upgrade_handler(
    ws: WebSocketUpgrade,
    State(shared): State<Arc<Shared>>,
) -> axum::response::Response {
    ws.on_upgrade(move |socket| handle_socket(socket, shared))
}

async fn handle_socket(mut socket: WebSocket, shared: Arc<Shared>) {
    let generation = shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
    let _ = shared.raw_connection_tx.send(generation);

    // A tracked slot whose outbound sender still accepts messages belongs to
    // a live peer; reject the newcomer under the single-connection policy.
    // A tracked slot whose sender is closed belongs to a peer whose task
    // exited without yet clearing the slot — stale, per spec's reconnect
    // semantics: drop it and let the newcomer take over, firing onReconnect.
    let existing_is_live = {
        let slot = shared.slot.lock().await;
        slot.as_ref()
            .is_some_and(|s| s.outbound.send(Message::Ping(Vec::new().into())).is_ok())
    };

    if existing_is_live {
        reject_second_connection(&mut socket).await;
        return;
    }

    let had_stale_slot = shared.slot.lock().await.take().is_some();
    if had_stale_slot {
        let _ = shared.reconnect_tx.send(generation);
    }

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();
    *shared.slot.lock().await = Some(ConnectionSlot {
        outbound: outbound_tx,
        generation,
    });

    let mut keepalive = tokio::time::interval(KEEPALIVE_INTERVAL);
    keepalive.tick().await; // first tick fires immediately; skip it

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => handle_incoming_text(&text, &shared).await,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
            outgoing = outbound_rx.recv() => {
                match outgoing {
                    Some(msg) => {
                        if socket.send(msg).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
            _ = keepalive.tick() => {
                if socket.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
            }
        }
    }

    let still_current = shared
        .slot
        .lock()
        .await
        .as_ref()
        .is_some_and(|s| s.generation == generation);
    if still_current {
        *shared.slot.lock().await = None;
        shared.inflight.drain().await;
        let _ = shared.disconnect_tx.send(generation);
    }
}

async fn handle_incoming_text(text: &str, shared: &Arc<Shared>) {
    let Ok(frame) = serde_json::from_str::<IncomingFrame>(text) else {
        tracing::debug!(%text, "dropping unparseable frame from extension");
        return;
    };
    match frame {
        IncomingFrame::Handshake {
            kind: HandshakeTag::Handshake,
            browser,
            build_timestamp,
        } => {
            let _ = shared.handshake_tx.send(Some(HandshakeInfo {
                browser,
                build_timestamp,
            }));
        }
        IncomingFrame::Response { id, result, error, .. } => {
            let current_tab = result
                .as_ref()
                .and_then(|v| v.get("currentTab").cloned())
                .and_then(|v| serde_json::from_value::<TabInfo>(v).ok());
            if let Some(tab) = current_tab {
                let _ = shared.tab_info_tx.send(Some(tab));
            }
            let resolved = match error {
                Some(peer_error) => Err(BridgeError::PeerError {
                    message: peer_error.message,
                }),
                None => Ok(result.unwrap_or(Value::Null)),
            };
            shared.inflight.resolve(&id, resolved).await;
        }
        IncomingFrame::Notification { method, params, .. } => {
            if method == "notifications/tab_info_update" {
                if let Some(tab) = params
                    .and_then(|p| p.get("currentTab").cloned())
                    .and_then(|v| serde_json::from_value::<TabInfo>(v).ok())
                {
                    let _ = shared.tab_info_tx.send(Some(tab));
                }
            }
        }
    }
}

/// For the single-connection-rejection path: send the `-32001` error frame
/// then close with status 1008 after a brief settle.
async fn reject_second_connection(socket: &mut WebSocket) {
    let error = serde_json::json!({
        "jsonrpc": "2.0",
        "error": {
            "code": -32001,
            "message": "Another browser is already connected. Only one browser at a time."
        }
    });
    let _ = socket.send(Message::Text(error.to_string().into())).await;
    tokio::time::sleep(CLOSE_SETTLE).await;
    let _ = socket
        .send(Message::Close(Some(CloseFrame {
            code: 1008,
            reason: "only one browser at a time".into(),
        })))
        .await;
}
