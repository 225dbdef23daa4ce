//! Integration tests for the explore CLI binary.
//!
//! Each test writes a recorded session (and optionally a config) to a temp
//! directory and runs the built `explore` binary against it.

use std::fs;
use std::process::Command;

use tempfile::TempDir;

const SESSION: &str = r#"{
    "initial": "f(a, a)",
    "search": {
        "states": [
            {"id": 0, "term": "f(a, a)"},
            {"id": 1, "parent": 0, "rule": "R1", "term": "f(c, a)"},
            {"id": 2, "parent": 1, "rule": "R2", "term": "f(c, c)"}
        ],
        "solutions": [
            {"state": 1, "substitution": {"X:Symbol": "a"}, "rewrites": 1},
            {"state": 2, "substitution": {"X:Symbol": "c"}, "rewrites": 2, "terminal": true}
        ]
    }
}"#;

fn explore(args: &[&str]) -> (bool, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_explore"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run explore binary");
    (
        output.status.success(),
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    )
}

/// `search --paths` prints each solution with its path.
#[test]
fn test_search_with_paths() {
    let tmp = TempDir::new().unwrap();
    let session = tmp.path().join("session.json");
    fs::write(&session, SESSION).unwrap();

    let (ok, stdout, _) = explore(&["search", "--session", session.to_str().unwrap(), "--paths"]);
    assert!(ok);
    assert_eq!(
        stdout,
        "f(c, a) with X:Symbol --> a by [f(a, a), R1, f(c, a)]\n\
         f(c, c) with X:Symbol --> c by [f(a, a), R1, f(c, a), R2, f(c, c)]\n"
    );
}

/// Config file sets the search type; a flag overrides it.
#[test]
fn test_search_config_and_override() {
    let tmp = TempDir::new().unwrap();
    let session = tmp.path().join("session.json");
    let config = tmp.path().join("explore.toml");
    fs::write(&session, SESSION).unwrap();
    fs::write(&config, "[explore]\nsearch_type = \"normal_form\"\n").unwrap();

    let session = session.to_str().unwrap();
    let config = config.to_str().unwrap();

    let (ok, stdout, _) = explore(&["search", "--session", session, "--config", config]);
    assert!(ok);
    assert_eq!(stdout, "f(c, c) with X:Symbol --> c in 2 rewrites\n");

    let (ok, stdout, _) = explore(&[
        "search", "--session", session, "--config", config, "--search-type", "one-step",
    ]);
    assert!(ok);
    assert_eq!(stdout, "f(c, a) with X:Symbol --> a in 1 rewrites\n");
}

/// `--limit` stops after that many solutions.
#[test]
fn test_search_limit() {
    let tmp = TempDir::new().unwrap();
    let session = tmp.path().join("session.json");
    fs::write(&session, SESSION).unwrap();

    let (ok, stdout, _) = explore(&["search", "--session", session.to_str().unwrap(), "--limit", "1"]);
    assert!(ok);
    assert_eq!(stdout, "f(c, a) with X:Symbol --> a in 1 rewrites\n");
}

/// Unknown search types are rejected by argument parsing.
#[test]
fn test_bad_search_type() {
    let tmp = TempDir::new().unwrap();
    let session = tmp.path().join("session.json");
    fs::write(&session, SESSION).unwrap();

    let (ok, _, stderr) = explore(&[
        "search", "--session", session.to_str().unwrap(), "--search-type", "sideways",
    ]);
    assert!(!ok);
    assert!(stderr.contains("unknown search type"));
}

/// A missing session file is a clean error, not a panic.
#[test]
fn test_missing_session() {
    let (ok, stdout, _) = explore(&["graph", "--session", "/nonexistent/session.json"]);
    assert!(!ok);
    assert!(stdout.is_empty());
}
