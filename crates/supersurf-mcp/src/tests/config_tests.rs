//! Tests for `$HOME` sandboxing and experiment-list parsing.

use std::path::PathBuf;

use crate::config::{parse_experiments, sandbox_path, SandboxError};

#[test]
fn relative_path_stays_inside_home() {
    let home = PathBuf::from("/home/user");
    let resolved = sandbox_path(&home, "downloads/file.png").unwrap();
    assert_eq!(resolved, PathBuf::from("/home/user/downloads/file.png"));
}

#[test]
fn absolute_path_is_reinterpreted_as_relative() {
    let home = PathBuf::from("/home/user");
    let resolved = sandbox_path(&home, "/etc/foo").unwrap();
    assert_eq!(resolved, PathBuf::from("/home/user/etc/foo"));
}

#[test]
fn traversal_is_rejected() {
    let home = PathBuf::from("/home/user");
    let result = sandbox_path(&home, "../../etc/passwd");
    assert!(matches!(result, Err(SandboxError::Escaped)), "traversal past home must be rejected, got {result:?}");
}

#[test]
fn parses_experiment_list() {
    let set = parse_experiments(Some("smart_waiting, secure_eval"));
    assert!(set.contains("smart_waiting"));
    assert!(set.contains("secure_eval"));
}
