//! Basic CLI E2E tests.
//!
//! Tests invoke the built `opsroom` binary against a throwaway data
//! directory and verify outputs.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_opsroom"))
        .args(args)
        .env("OPSROOM_DATA_DIR", data_dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_cli_success(data_dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "CLI command failed: {args:?}\n{stderr}");
    stdout
}

#[test]
fn test_reminder_classify_reference_table() {
    let dir = tempfile::tempdir().unwrap();
    let table = [
        ("08:59", "upcoming"),
        ("09:00", "can_start"),
        ("09:59", "can_start"),
        ("10:00", "due_now"),
        ("10:09", "due_now"),
        ("10:10", "almost_late"),
        ("10:15", "almost_late"),
        ("10:16", "overdue"),
    ];
    for (at, expected) in table {
        let stdout = run_cli_success(
            dir.path(),
            &[
                "reminder", "classify", "--date", "2026-10-19", "--start", "09:00", "--due",
                "10:00", "--end", "10:15", "--today", "2026-10-19", "--at", at,
            ],
        );
        assert_eq!(stdout.trim(), expected, "at {at}");
    }
}

#[test]
fn test_reminder_classify_other_day_is_upcoming() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(
        dir.path(),
        &[
            "reminder", "classify", "--date", "2026-10-18", "--start", "09:00", "--due", "10:00",
            "--end", "10:15", "--today", "2026-10-19", "--at", "12:00", "--title", "Leak test",
        ],
    );
    assert_eq!(stdout.trim(), "upcoming: Leak test is scheduled for 10:00");
}

#[test]
fn test_reminder_classify_rejects_bad_time() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(
        dir.path(),
        &[
            "reminder", "classify", "--date", "2026-10-19", "--start", "9am", "--due", "10:00",
            "--end", "10:15",
        ],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("window_start"), "stderr: {stderr}");
}

#[test]
fn test_task_create_and_status_json() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(
        dir.path(),
        &[
            "task", "create", "Weld inspection", "--date", "2026-10-19", "--start", "09:00",
            "--due", "10:00", "--end", "10:15",
        ],
    );
    assert!(stdout.contains("Task created:"));

    let stdout = run_cli_success(
        dir.path(),
        &["reminder", "status", "--date", "2026-10-19", "--at", "10:12", "--json"],
    );
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["counts"]["almost_late"], 1);
    assert_eq!(report["reminders"][0]["phase"], "almost_late");
    assert_eq!(
        report["reminders"][0]["message"],
        "Weld inspection is almost late, it was due at 10:00"
    );
}

#[test]
fn test_task_create_rejects_reversed_window() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(
        dir.path(),
        &[
            "task", "create", "Backwards", "--date", "2026-10-19", "--start", "11:00", "--due",
            "10:00", "--end", "09:00",
        ],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("Inconsistent window"), "stderr: {stderr}");
}

#[test]
fn test_task_complete_hides_from_board() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(
        dir.path(),
        &[
            "task", "create", "Torque audit", "--date", "2026-10-19", "--start", "07:30", "--due",
            "08:00", "--end", "08:15",
        ],
    );
    let list = run_cli_success(dir.path(), &["task", "list", "--date", "2026-10-19"]);
    let tasks: serde_json::Value = serde_json::from_str(&list).unwrap();
    let id = tasks[0]["id"].as_str().unwrap().to_string();

    run_cli_success(dir.path(), &["task", "complete", &id]);
    let stdout = run_cli_success(
        dir.path(),
        &["reminder", "status", "--date", "2026-10-19", "--at", "09:00"],
    );
    assert_eq!(stdout.trim(), "No open tasks.");
}

#[test]
fn test_config_set_and_get() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["config", "set", "reminders.almost_late_minutes", "10"]);
    let stdout = run_cli_success(dir.path(), &["config", "get", "reminders.almost_late_minutes"]);
    assert_eq!(stdout.trim(), "10");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "reminders.bogus", "1"]);
    assert_eq!(code, 1);
}

#[test]
fn test_get_unknown_id_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["task", "get", "qt-missing"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("task not found: qt-missing"), "stderr: {stderr}");

    let (_, stderr, code) = run_cli(dir.path(), &["schedule", "get", "qs-missing"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("schedule not found: qs-missing"), "stderr: {stderr}");
}

#[test]
fn test_task_times_are_stored_padded() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(
        dir.path(),
        &[
            "task", "create", "Late shift", "--date", "2026-10-19", "--start", "09:30", "--due",
            "10:00", "--end", "10:15",
        ],
    );
    run_cli_success(
        dir.path(),
        &[
            "task", "create", "Early shift", "--date", "2026-10-19", "--start", "7:30", "--due",
            "8:00", "--end", "8:15",
        ],
    );
    let list = run_cli_success(dir.path(), &["task", "list", "--date", "2026-10-19"]);
    let tasks: serde_json::Value = serde_json::from_str(&list).unwrap();
    assert_eq!(tasks[0]["title"], "Early shift");
    assert_eq!(tasks[0]["due_time"], "08:00");

    let late_id = tasks[1]["id"].as_str().unwrap().to_string();
    run_cli_success(dir.path(), &["task", "update", &late_id, "--due", "9:45"]);
    let stdout = run_cli_success(dir.path(), &["task", "get", &late_id]);
    let task: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(task["due_time"], "09:45");
}
