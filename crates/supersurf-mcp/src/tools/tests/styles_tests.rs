//! Tests for stylesheet basename derivation.

use crate::tools::styles::basename_without_hash;

#[test]
fn strips_content_hash_from_basename() {
    assert_eq!(basename_without_hash("/assets/frontend-abc123.css"), "frontend.css");
}

#[test]
fn keeps_basename_without_hash_unchanged() {
    assert_eq!(basename_without_hash("/assets/frontend.css?v=2"), "frontend.css");
}

#[test]
fn short_suffix_is_not_treated_as_hash() {
    assert_eq!(basename_without_hash("main-v2.css"), "main-v2.css");
}
