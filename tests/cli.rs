//! Integration tests for the solemn-css CLI

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

const CLEAN_CSS: &str = "/* layout */\n.header { color: red; margin: 0 auto; }\n";
const DIRTY_CSS: &str = "/* damn */\n.a { top: 0 }\n";

fn solemn_css(dir: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_solemn-css"));
    command
        .current_dir(dir)
        .env_remove("SOLEMN_CSS_DICTIONARY")
        .env_remove("RUST_LOG");
    command
}

fn workspace(files: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    for (name, content) in files {
        fs::write(temp.path().join(name), content).unwrap();
    }
    temp
}

fn run(dir: &Path, args: &[&str]) -> Output {
    solemn_css(dir)
        .args(args)
        .output()
        .expect("Failed to run command")
}

#[test]
fn test_no_arguments_is_usage_error() {
    let temp = workspace(&[]);
    let output = run(temp.path(), &[]);

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"));
}

#[test]
fn test_clean_file_exits_zero() {
    let temp = workspace(&[("clean.css", CLEAN_CSS)]);
    let output = run(temp.path(), &["clean.css"]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "SUCCESS: No issues found in clean.css\n"
    );
}

#[test]
fn test_violations_exit_one() {
    let temp = workspace(&[("dirty.css", DIRTY_CSS)]);
    let output = run(temp.path(), &["dirty.css"]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "VIOLATION (issues: [profanity=1], type: comment, file: dirty.css, line: 1, col: 1) = damn\n"
    );
}

#[test]
fn test_failing_file_does_not_hide_other_results() {
    let temp = workspace(&[
        ("broken.css", ".a { color: red;"),
        ("clean.css", CLEAN_CSS),
        ("dirty.css", DIRTY_CSS),
    ]);
    let output = run(temp.path(), &["broken.css", "clean.css", "dirty.css"]);

    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "SUCCESS: No issues found in clean.css");
    assert!(lines[1].starts_with("VIOLATION (issues: [profanity=1], type: comment, file: dirty.css"));
    assert!(!stdout.contains("broken.css"));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to scan broken.css"));
    assert!(stderr.contains("missing '}'"));
}

#[test]
fn test_missing_file_exits_two() {
    let temp = workspace(&[]);
    let output = run(temp.path(), &["nope.css"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("nope.css"));
}

#[test]
fn test_stdin_is_labelled() {
    let temp = workspace(&[]);
    let mut child = solemn_css(temp.path())
        .args(["-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn process");

    {
        let stdin = child.stdin.as_mut().unwrap();
        stdin.write_all(DIRTY_CSS.as_bytes()).unwrap();
    }

    let output = child.wait_with_output().expect("Failed to read output");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("file: <stdin>, line: 1, col: 1) = damn"));
}

#[test]
fn test_json_format() {
    let temp = workspace(&[("clean.css", CLEAN_CSS), ("dirty.css", DIRTY_CSS)]);
    let output = run(temp.path(), &["--format", "json", "clean.css", "dirty.css"]);

    assert_eq!(output.status.code(), Some(1));
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["summary"]["files"], 2);
    assert_eq!(parsed["summary"]["violations"], 1);
    assert_eq!(parsed["files"][0]["file"], "clean.css");
    assert_eq!(parsed["files"][1]["violations"][0]["type"], "comment");
    assert_eq!(parsed["files"][1]["violations"][0]["issues"]["profanity"], 1);
}

#[test]
fn test_allow_flag_suppresses_word() {
    let temp = workspace(&[("dirty.css", DIRTY_CSS)]);
    let output = run(temp.path(), &["--allow", "damn", "dirty.css"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("SUCCESS"));
}

#[test]
fn test_discovered_config_is_applied() {
    let temp = workspace(&[
        ("dirty.css", DIRTY_CSS),
        (".solemncssrc.json", r#"{ "allow": ["damn"] }"#),
    ]);
    let output = run(temp.path(), &["dirty.css"]);

    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_broken_discovered_config_exits_two() {
    let temp = workspace(&[
        ("dirty.css", DIRTY_CSS),
        (".solemncssrc.json", r#"{ "allow": ["damn"], broken"#),
    ]);
    let output = run(temp.path(), &["dirty.css"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to parse JSON config"));
}

#[test]
fn test_custom_dictionary_flag() {
    let temp = workspace(&[
        ("words.json", r#"{ "bad": ["inappropriate"] }"#),
        ("widget.css", ".inappropriate-widget { color: red; }\n/* damn */\n"),
    ]);
    let output = run(temp.path(), &["--dictionary", "words.json", "widget.css"]);

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout,
        "VIOLATION (issues: [bad=1], type: selector, file: widget.css, line: 1, col: 1) = .inappropriate-widget\n"
    );
}

#[test]
fn test_excluded_file_is_skipped() {
    let temp = workspace(&[("dirty.min.css", DIRTY_CSS)]);
    let output = run(temp.path(), &["--exclude", "*.min.css", "dirty.min.css"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
}
