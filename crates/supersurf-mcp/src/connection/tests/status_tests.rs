//! Tests for status header formatting.

use crate::connection::ConnectionState;
use crate::connection::status::{format_status_header, StatusSnapshot};

fn base() -> StatusSnapshot {
    StatusSnapshot {
        state: ConnectionState::Passive,
        version: "0.1.0",
        debug_mode: false,
        connected_browser_name: None,
        attached_tab_url: None,
        stealth: false,
        debug_timestamp: None,
    }
}

#[test]
fn passive_header_shows_disabled() {
    let header = format_status_header(&base());
    assert!(header.starts_with("🔴 Free v0.1.0"));
    assert!(header.contains("Disabled"));
}

#[test]
fn active_header_shows_waiting() {
    let mut snap = base();
    snap.state = ConnectionState::Active;
    let header = format_status_header(&snap);
    assert!(header.starts_with("🟡 Free v0.1.0"));
    assert!(header.contains("Waiting for extension"));
}

#[test]
fn connected_header_includes_browser_name() {
    let mut snap = base();
    snap.state = ConnectionState::Connected;
    snap.connected_browser_name = Some("Chrome".to_string());
    let header = format_status_header(&snap);
    assert!(header.starts_with("🟢 Free v0.1.0"));
    assert!(header.contains("🌐 Chrome"));
}

#[test]
fn stealth_and_tab_tokens_appear_in_order() {
    let mut snap = base();
    snap.state = ConnectionState::Connected;
    snap.connected_browser_name = Some("Chrome".to_string());
    snap.attached_tab_url = Some("https://example.com/".to_string());
    snap.stealth = true;
    let header = format_status_header(&snap);
    let tab_idx = header.find("📄").unwrap();
    let stealth_idx = header.find("🥷").unwrap();
    assert!(tab_idx < stealth_idx);
}
