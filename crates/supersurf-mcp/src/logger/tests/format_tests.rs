//! Tests for log line truncation and base64 redaction.

use crate::logger::format::{redact_base64, truncate_string};

#[test]
fn truncates_long_strings() {
    let s = "a".repeat(200);
    let truncated = truncate_string(&s, 120);
    assert!(truncated.contains('…'));
    assert!(truncated.len() < s.len());
}

#[test]
fn leaves_short_strings_alone() {
    assert_eq!(truncate_string("hello", 120), "hello");
}

#[test]
fn redacts_long_base64_runs() {
    let blob = "A".repeat(250);
    let text = format!("payload={blob} tail");
    let redacted = redact_base64(&text);
    assert!(redacted.contains("[base64 250 chars]"));
    assert!(redacted.contains("tail"));
}

#[test]
fn leaves_short_base64_like_runs_alone() {
    let text = "token=abcDEF123+/=";
    assert_eq!(redact_base64(text), text);
}
