//! Tests for selector-to-JS translation and did-you-mean rendering.

use crate::primitives::selector::{format_did_you_mean, to_expression, Candidate};

#[test]
fn plain_css_selector_becomes_query_selector() {
    let expr = to_expression("#submit");
    assert_eq!(expr, "document.querySelector(\"#submit\")");
}

#[test]
fn has_text_suffix_produces_scan_expression() {
    let expr = to_expression("button:has-text(\"Submit\")");
    assert!(expr.contains("querySelectorAll"));
    assert!(expr.contains("Submit"));
}

#[test]
fn did_you_mean_marks_hidden_entries() {
    let candidates = vec![
        Candidate { selector: "#a".into(), visible: true, text: "Submit".into() },
        Candidate { selector: ".b".into(), visible: false, text: "Submit (modal)".into() },
    ];
    let rendered = format_did_you_mean(&candidates);
    assert!(rendered.contains("1. `#a`"));
    assert!(rendered.contains("(hidden)"));
}

#[test]
fn empty_candidates_render_empty_string() {
    assert_eq!(format_did_you_mean(&[]), "");
}
