//! Tests for the server/session log registry.

use std::fs;

use crate::logger::{LogFormat, LogRegistry};

#[test]
fn creates_log_dir_and_writes_server_log() {
    let dir = tempfile::tempdir().unwrap();
    let log_dir = dir.path().join("logs");
    let registry = LogRegistry::new(log_dir.clone(), LogFormat::Truncate).unwrap();
    registry.server().log_str("hello");
    let contents = fs::read_to_string(log_dir.join("server.log")).unwrap();
    assert!(contents.contains("hello"));
}

#[test]
fn session_logger_is_distinct_from_server() {
    let dir = tempfile::tempdir().unwrap();
    let log_dir = dir.path().join("logs");
    let registry = LogRegistry::new(log_dir.clone(), LogFormat::Truncate).unwrap();
    registry.session("abc").log_str("session line");
    let contents = fs::read_to_string(log_dir.join("sessions").join("abc.log")).unwrap();
    assert!(contents.contains("session line"));
}
