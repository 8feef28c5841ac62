//! Tests for `browser_download` destination resolution.

use std::path::PathBuf;

use crate::tools::download::resolve_destination_name;

#[test]
fn trailing_slash_is_treated_as_directory() {
    let dest = PathBuf::from("/home/user/downloads/");
    let resolved = resolve_destination_name(&dest, "/tmp/abc.png", Some("report.png"));
    assert_eq!(resolved, PathBuf::from("/home/user/downloads/report.png"));
}

#[test]
fn extensioned_destination_is_used_verbatim() {
    let dest = PathBuf::from("/home/user/renamed.png");
    let resolved = resolve_destination_name(&dest, "/tmp/abc.png", Some("report.png"));
    assert_eq!(resolved, dest);
}
