//! Integration tests for the ruleflow CLI

use std::fs;
use std::process::Command;

/// Helper to get the path to a compiled binary
fn get_binary_path(name: &str) -> String {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // Remove test executable name
    path.pop(); // Remove "deps"
    path.push(name);
    path.to_str().unwrap().to_string()
}

/// Helper to create a temporary test file
fn create_temp_file(dir: &tempfile::TempDir, name: &str, content: &str) -> String {
    let file_path = dir.path().join(name);
    fs::write(&file_path, content).expect("Failed to write temp file");
    file_path.to_str().unwrap().to_string()
}

const TREE: &str = r#"{
    "kind": "block",
    "children": [
        {"kind": "statement", "label": "total = order.amount"},
        {"kind": "block", "children": [{"kind": "statement", "label": "discount = 5"}]}
    ]
}"#;

#[test]
fn test_trace_prints_finished_record() {
    let dir = tempfile::tempdir().unwrap();
    let tree = create_temp_file(&dir, "pricing.json", TREE);

    let output = Command::new(get_binary_path("ruleflow"))
        .arg("trace")
        .arg(&tree)
        .arg("--arg")
        .arg(r#"order={"amount": 42}"#)
        .output()
        .expect("Failed to execute ruleflow trace");

    assert!(output.status.success(), "ruleflow trace should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let record: serde_json::Value =
        serde_json::from_str(&stdout).expect("stdout should be the record JSON");
    assert_eq!(record["program"], "pricing");
    assert!(!record["finish_time"].is_null());
    assert_eq!(record["arguments"][0]["name"], "order");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("2 statements in 4 nodes"));
    assert!(stderr.contains("total = order.amount"));
}

#[test]
fn test_trace_quiet_skips_statement_lines() {
    let dir = tempfile::tempdir().unwrap();
    let tree = create_temp_file(&dir, "quiet.json", TREE);

    let output = Command::new(get_binary_path("ruleflow"))
        .arg("trace")
        .arg("--quiet")
        .arg(&tree)
        .output()
        .expect("Failed to execute ruleflow trace");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("-> statement"));
}

#[test]
fn test_trace_rejects_bad_tree() {
    let dir = tempfile::tempdir().unwrap();
    let tree = create_temp_file(&dir, "bad.json", r#"{"kind": "loop"}"#);

    let output = Command::new(get_binary_path("ruleflow"))
        .arg("trace")
        .arg(&tree)
        .output()
        .expect("Failed to execute ruleflow trace");

    assert!(!output.status.success(), "invalid tree should fail");
}

#[test]
fn test_records_listing() {
    let dir = tempfile::tempdir().unwrap();
    let tree = create_temp_file(&dir, "stored.json", TREE);
    let records = dir.path().join("records");

    let output = Command::new(get_binary_path("ruleflow"))
        .arg("trace")
        .arg("--quiet")
        .arg("--records")
        .arg(&records)
        .arg(&tree)
        .output()
        .expect("Failed to execute ruleflow trace");
    assert!(output.status.success());

    let output = Command::new(get_binary_path("ruleflow"))
        .arg("records")
        .arg(&records)
        .output()
        .expect("Failed to execute ruleflow records");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("stored"));
    assert!(stdout.contains("finished"));
}
