// Tests for the crawldiff binary's output streams

use std::fs;
use std::process::Command;
use tempfile::TempDir;

const PAGES: &str = r#"{"results": [
    {"url": "https://example.com/", "status": 200, "contentType": "text/html"},
    {"url": "https://example.com/about", "status": 200, "contentType": "text/html"}
]}"#;

#[test]
fn test_json_report_on_stdout_is_valid_json() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let reference = dir.path().join("reference.json");
    let candidate = dir.path().join("candidate.json");
    fs::write(&reference, PAGES)?;
    fs::write(&candidate, PAGES)?;

    // No --quiet: the banner is printed, but not into the report stream
    let output = Command::new(env!("CARGO_BIN_EXE_crawldiff"))
        .arg("compare")
        .arg("--reference-pages")
        .arg(&reference)
        .arg("--candidate-pages")
        .arg(&candidate)
        .args(["-f", "json"])
        .output()?;

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["report"]["data"]["summary"]["common"], 2);
    assert!(String::from_utf8_lossy(&output.stderr).contains("CRAWLDIFF"));
    Ok(())
}

#[test]
fn test_failure_exits_nonzero_without_report() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let missing = dir.path().join("missing.json");

    let output = Command::new(env!("CARGO_BIN_EXE_crawldiff"))
        .arg("-q")
        .arg("compare")
        .arg("--reference-pages")
        .arg(&missing)
        .arg("--candidate-pages")
        .arg(&missing)
        .output()?;

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    Ok(())
}
