//! Tests for `browser_interact` action parsing.

use serde_json::json;

use crate::tools::interaction::{rename_on_error, Action};

#[test]
fn parses_click_with_selector() {
    let raw = json!({ "type": "click", "selector": "#go" });
    let action: Action = serde_json::from_value(raw).unwrap();
    assert!(matches!(action, Action::Click { .. }));
}

#[test]
fn parses_wait_with_default_timeout() {
    let raw = json!({ "type": "wait", "selector": "#ready" });
    let action: Action = serde_json::from_value(raw).unwrap();
    match action {
        Action::Wait { timeout, .. } => assert_eq!(timeout, 30_000),
        _ => panic!("expected Wait"),
    }
}

#[test]
fn rename_on_error_normalizes_camel_case() {
    let args = json!({ "actions": [], "onError": "ignore" });
    let renamed = rename_on_error(args);
    assert_eq!(renamed["on_error"], "ignore");
}
