//! Integration tests for the `tn` CLI.
//!
//! Each test creates a temp notes folder, runs `tn` as a subprocess,
//! and verifies stdout and/or file contents.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Get the path to the built `tn` binary.
fn tn_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("tn");
    path
}

/// Create a small notes folder in the given directory.
fn create_test_notes(root: &Path) {
    fs::create_dir_all(root.join("projects")).unwrap();
    fs::create_dir_all(root.join("Archive")).unwrap();

    fs::write(
        root.join("today.md"),
        "\
# Today

- [ ] Buy milk @due(2025-01-16) #errand
- [ ] Call Alice @priority(high)
  - [ ] Find number
- [>] Write report
",
    )
    .unwrap();

    fs::write(
        root.join("projects/site.md"),
        "\
# Site

- [ ] Fix header
- [x] Deploy @completed(2025-01-02)
",
    )
    .unwrap();

    fs::write(root.join("Archive/old.md"), "- [ ] Ancient task\n").unwrap();
    fs::write(root.join("image.png"), "not markdown").unwrap();
}

fn read(root: &Path, file: &str) -> String {
    fs::read_to_string(root.join(file)).unwrap()
}

/// Run `tn` with args in the given directory. Returns (stdout, stderr, success).
fn run_tn(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(tn_bin())
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run tn");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `tn` expecting success, return stdout.
fn run_tn_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_tn(dir, args);
    if !success {
        panic!(
            "tn {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

// ---------------------------------------------------------------------------
// Read command tests
// ---------------------------------------------------------------------------

#[test]
fn test_list_default() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_notes(tmp.path());

    let out = run_tn_ok(tmp.path(), &["list"]);
    assert!(out.contains("today.md:2  [ ] Buy milk #errand due=2025-01-16"));
    assert!(out.contains("today.md:4    [ ] Find number"));
    assert!(out.contains("projects/site.md:3  [x] Deploy"));
    assert!(!out.contains("Ancient task"));
}

#[test]
fn test_list_json() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_notes(tmp.path());

    let out = run_tn_ok(tmp.path(), &["list", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    let tasks = parsed.as_array().unwrap();
    assert_eq!(tasks.len(), 5);

    let call = tasks.iter().find(|t| t["text"] == "Call Alice").unwrap();
    assert_eq!(call["file"], "today.md");
    assert_eq!(call["line"], 3);
    assert_eq!(call["status"], "todo");
    assert_eq!(call["attributes"]["priority"], "high");
    assert_eq!(call["subtasks"][0]["text"], "Find number");
}

#[test]
fn test_dir_flag() {
    let tmp = tempfile::TempDir::new().unwrap();
    let notes = tmp.path().join("notes");
    fs::create_dir_all(&notes).unwrap();
    create_test_notes(&notes);

    let out = run_tn_ok(tmp.path(), &["-C", "notes", "list"]);
    assert!(out.contains("Buy milk"));
}

#[test]
fn test_structured_config() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".tasknote.toml"),
        "attribute_syntax = \"structured\"\n",
    )
    .unwrap();
    fs::write(tmp.path().join("a.md"), "- [ ] Read [due:: 2025-03-01]\n").unwrap();

    let out = run_tn_ok(tmp.path(), &["list"]);
    assert!(out.contains("a.md:0  [ ] Read due=2025-03-01"));
}

#[test]
fn test_bad_config_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(tmp.path().join(".tasknote.toml"), "ignored_folders = 3\n").unwrap();

    let (_, stderr, success) = run_tn(tmp.path(), &["list"]);
    assert!(!success);
    assert!(stderr.contains("invalid settings"));
}

// ---------------------------------------------------------------------------
// Write command tests
// ---------------------------------------------------------------------------

#[test]
fn test_status_in_progress() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_notes(tmp.path());

    let out = run_tn_ok(tmp.path(), &["status", "today.md", "3", "in-progress"]);
    assert!(out.contains("today.md:3 → in-progress"));

    let content = read(tmp.path(), "today.md");
    assert!(content.contains("\n- [>] Call Alice @priority(high)\n"));
    assert!(content.contains("\n- [ ] Buy milk @due(2025-01-16) #errand\n"));
}

#[test]
fn test_status_reopen_removes_completed() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_notes(tmp.path());

    run_tn_ok(tmp.path(), &["status", "projects/site.md", "3", "todo"]);
    let content = read(tmp.path(), "projects/site.md");
    assert_eq!(content, "# Site\n\n- [ ] Fix header\n- [ ] Deploy\n");
}

#[test]
fn test_status_unknown_value() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_notes(tmp.path());

    let (_, stderr, success) = run_tn(tmp.path(), &["status", "today.md", "3", "later"]);
    assert!(!success);
    assert!(stderr.contains("unknown status: later"));
}

#[test]
fn test_done_multiple() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_notes(tmp.path());

    run_tn_ok(tmp.path(), &["done", "today.md", "3", "4"]);
    let content = read(tmp.path(), "today.md");
    let lines: Vec<&str> = content.lines().collect();
    assert!(lines[3].starts_with("- [x] Call Alice @priority(high) @completed("));
    assert!(lines[4].starts_with("  - [x] Find number @completed("));
    assert_eq!(lines[5], "- [>] Write report");
}

#[test]
fn test_done_missing_task() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_notes(tmp.path());

    let (_, stderr, success) = run_tn(tmp.path(), &["done", "today.md", "0"]);
    assert!(!success);
    assert!(stderr.contains("no task at today.md:0"));
    assert!(read(tmp.path(), "today.md").starts_with("# Today\n\n- [ ] Buy milk"));
}

#[test]
fn test_set_and_unset() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_notes(tmp.path());

    run_tn_ok(tmp.path(), &["set", "projects/site.md", "2", "due", "2025-02-01"]);
    run_tn_ok(tmp.path(), &["set", "projects/site.md", "2", "urgent"]);
    assert!(
        read(tmp.path(), "projects/site.md")
            .contains("- [ ] Fix header @due(2025-02-01) @urgent\n")
    );

    run_tn_ok(tmp.path(), &["unset", "projects/site.md", "2", "due"]);
    assert!(read(tmp.path(), "projects/site.md").contains("- [ ] Fix header @urgent\n"));
}

#[test]
fn test_archived_task_not_found() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_notes(tmp.path());

    let (_, stderr, success) = run_tn(tmp.path(), &["done", "Archive/old.md", "0"]);
    assert!(!success);
    assert!(stderr.contains("no task at Archive/old.md:0"));
}

#[test]
fn test_follow_up_with_due_and_complete() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_notes(tmp.path());

    let out = run_tn_ok(
        tmp.path(),
        &["follow-up", "today.md", "3", "--due", "2025-02-01", "--complete"],
    );
    assert!(out.contains("today.md:5 follow-up added"));

    let content = read(tmp.path(), "today.md");
    let lines: Vec<&str> = content.lines().collect();
    assert!(lines[3].starts_with("- [x] Call Alice @priority(high) @completed("));
    assert_eq!(lines[4], "  - [ ] Find number");
    assert_eq!(
        lines[5],
        "- [ ] Follow up: Call Alice @priority(high) @due(2025-02-01)"
    );
    assert_eq!(lines[6], "- [>] Write report");
}

#[test]
fn test_follow_up_bad_date() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_notes(tmp.path());

    let (_, stderr, success) = run_tn(tmp.path(), &["follow-up", "today.md", "3", "--due", "soon"]);
    assert!(!success);
    assert!(stderr.contains("invalid date 'soon'"));
}

#[test]
fn test_rust_log_sets_global_level() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_notes(tmp.path());

    let output = Command::new(tn_bin())
        .args(["list"])
        .current_dir(tmp.path())
        .env("RUST_LOG", "info")
        .output()
        .expect("failed to run tn");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("parsed documents"));

    let quiet = Command::new(tn_bin())
        .args(["list"])
        .current_dir(tmp.path())
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run tn");
    assert!(!String::from_utf8_lossy(&quiet.stderr).contains("parsed documents"));
}
