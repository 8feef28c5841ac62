//! Tests for the `secure_eval` static pattern check.

use crate::tools::evaluate::static_pattern_check;

#[test]
fn static_check_rejects_cookie_access() {
    assert!(static_pattern_check("return document.cookie").is_err());
}

#[test]
fn static_check_allows_plain_code() {
    assert!(static_pattern_check("return 1 + 1").is_ok());
}
