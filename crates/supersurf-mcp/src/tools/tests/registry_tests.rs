//! Tests for the tool catalog registry.

use crate::tools::registry::validate_required;
use crate::tools::ToolRegistry;

#[test]
fn registers_every_catalog_tool() {
    let registry = ToolRegistry::with_all_tools();
    let expected = [
        "browser_tabs",
        "browser_navigate",
        "browser_interact",
        "browser_snapshot",
        "browser_lookup",
        "browser_extract_content",
        "browser_get_element_styles",
        "browser_take_screenshot",
        "browser_pdf_save",
        "browser_evaluate",
        "browser_console_messages",
        "browser_network_requests",
        "browser_fill_form",
        "browser_drag",
        "browser_window",
        "browser_handle_dialog",
        "browser_verify_text_visible",
        "browser_verify_element_visible",
        "browser_list_extensions",
        "browser_reload_extensions",
        "browser_performance_metrics",
        "browser_download",
        "secure_fill",
    ];
    for name in expected {
        assert!(registry.get(name).is_some(), "missing tool: {name}");
    }
    assert_eq!(registry.tools.len(), expected.len());
}

#[test]
fn validate_required_rejects_missing_field() {
    let schema = serde_json::json!({ "required": ["selector"] });
    let err = validate_required(&schema, &serde_json::json!({}));
    assert!(err.is_err());
}
