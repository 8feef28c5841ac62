//! Tests for screenshot clip-argument parsing.

use serde_json::json;

use crate::tools::screenshot::clip_from_args;

#[test]
fn clip_requires_all_four_fields() {
    let args = json!({ "clip_x": 1, "clip_y": 2 });
    assert!(clip_from_args(&args).is_none());
    let full = json!({ "clip_x": 1, "clip_y": 2, "clip_width": 3, "clip_height": 4 });
    assert!(clip_from_args(&full).is_some());
}
