//! Integration tests for the CLI's line-delimited JSON-RPC "script mode"
//! (spec 4.G / spec 8 scenario 6): batch requests on one line, and a
//! malformed line producing a `-32700` parse-error response.
//!
//! Run with:
//! ```sh
//! cargo test --features integration -p supersurf-mcp --test script_mode
//! ```
#![cfg(feature = "integration")]

use std::io::{BufRead, BufReader, Write};
use std::process::{Command, Stdio};

use serde_json::{json, Value};

fn spawn_script_mode() -> (std::process::Child, std::process::ChildStdin, BufReader<std::process::ChildStdout>) {
    let status = Command::new("cargo")
        .args(["build", "-p", "supersurf-mcp-cli"])
        .status()
        .expect("failed to build supersurf-mcp-cli");
    assert!(status.success());

    let mut child = Command::new("cargo")
        .args(["run", "-p", "supersurf-mcp-cli", "--", "--script-mode"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to start supersurf-mcp-cli");

    let stdin = child.stdin.take().unwrap();
    let stdout = BufReader::new(child.stdout.take().unwrap());
    (child, stdin, stdout)
}

#[test]
fn batch_array_yields_one_array_response_line() {
    let (mut child, mut stdin, mut stdout) = spawn_script_mode();

    let batch = json!([
        { "jsonrpc": "2.0", "id": 1, "method": "status", "params": {} },
        { "jsonrpc": "2.0", "id": 2, "method": "status", "params": {} },
    ]);
    writeln!(stdin, "{batch}").unwrap();
    stdin.flush().unwrap();

    let mut line = String::new();
    stdout.read_line(&mut line).unwrap();
    let responses: Vec<Value> = serde_json::from_str(&line).expect("response line is a JSON array");

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["id"], json!(1));
    assert_eq!(responses[1]["id"], json!(2));
    assert!(responses[0]["result"].is_string() || responses[0]["result"].is_object());
    assert!(responses[1]["result"].is_string() || responses[1]["result"].is_object());

    writeln!(stdin, "not valid json").unwrap();
    stdin.flush().unwrap();

    let mut parse_error_line = String::new();
    stdout.read_line(&mut parse_error_line).unwrap();
    let response: Value = serde_json::from_str(&parse_error_line).expect("response line is JSON");
    assert_eq!(response["error"]["code"], json!(-32700));

    drop(stdin);
    let _ = child.wait();
}
