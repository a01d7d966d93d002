//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary home directory.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_velocity"))
        .arg("--home")
        .arg(home)
        .args(args)
        .env_remove("VELOCITY_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_status_on_fresh_home() {
    let home = tempfile::tempdir().unwrap();
    let (out, _, code) = run_cli(home.path(), &["status"]);
    assert_eq!(code, 0);
    assert!(out.contains("Zap:LeadTriage"));
    assert!(out.contains("Value created: $0"));
}

#[test]
fn test_allocate_persists_between_runs() {
    let home = tempfile::tempdir().unwrap();
    let (out, _, code) = run_cli(home.path(), &["allocate", "t1", "4"]);
    assert_eq!(code, 0);
    assert!(out.contains("Allocated 4.0h of 4.0h to t1"));

    let (out, _, code) = run_cli(home.path(), &["task", "list"]);
    assert_eq!(code, 0);
    let t1 = out.lines().find(|l| l.starts_with("t1")).unwrap();
    assert!(t1.contains("4.0"));
    assert!(home.path().join("state").join("vx_pool.json").exists());
}

#[test]
fn test_allocate_unknown_task_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, err, code) = run_cli(home.path(), &["allocate", "nope", "1"]);
    assert_ne!(code, 0);
    assert!(err.contains("'nope' not found"));
}

#[test]
fn test_harvest_twice_fails() {
    let home = tempfile::tempdir().unwrap();
    let (out, _, code) = run_cli(home.path(), &["harvest", "service"]);
    assert_eq!(code, 0);
    assert!(out.contains("$2,600"));

    let (_, _, code) = run_cli(home.path(), &["harvest", "service"]);
    assert_ne!(code, 0);
}

#[test]
fn test_simulate_off_removes_rpa() {
    let home = tempfile::tempdir().unwrap();
    let (out, _, code) = run_cli(home.path(), &["simulate", "--rpa", "off"]);
    assert_eq!(code, 0);
    assert!(out.contains("RPA simulation: off"));

    let (out, _, _) = run_cli(home.path(), &["status"]);
    assert!(!out.contains("RPA Bot (Block)"));
    let (_, _, code) = run_cli(home.path(), &["harvest", "rpa"]);
    assert_ne!(code, 0);
}

#[test]
fn test_close_and_export_evidence() {
    let home = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(home.path(), &["close", "t2"]);
    assert_eq!(code, 0);

    let csv_path = home.path().join("evidence.csv");
    let (_, _, code) = run_cli(
        home.path(),
        &["evidence", "--csv", csv_path.to_str().unwrap()],
    );
    assert_eq!(code, 0);
    let body = std::fs::read_to_string(&csv_path).unwrap();
    assert!(body.starts_with("tier,task_id,label,days_saved,value,details"));
    assert!(body.contains("t2"));
}

#[test]
fn test_task_add_rejects_unknown_predecessor() {
    let home = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(
        home.path(),
        &[
            "task", "add", "t9", "Launch", "--start", "2026-03-01", "--due", "2026-03-08",
            "--after", "t42",
        ],
    );
    assert_ne!(code, 0);

    let (out, _, code) = run_cli(
        home.path(),
        &[
            "task", "add", "t9", "Launch", "--start", "2026-03-01", "--due", "2026-03-08",
            "--after", "t4",
        ],
    );
    assert_eq!(code, 0);
    assert!(out.contains("Added t9 (5 tasks)"));
}

#[test]
fn test_gantt_and_reset() {
    let home = tempfile::tempdir().unwrap();
    let (out, _, code) = run_cli(home.path(), &["gantt"]);
    assert_eq!(code, 0);
    assert!(out.contains("t3 -> t4"));

    let _ = run_cli(home.path(), &["close", "t1"]);
    let (out, _, code) = run_cli(home.path(), &["reset"]);
    assert_eq!(code, 0);
    assert!(out.contains("4 tasks"));
    let (out, _, _) = run_cli(home.path(), &["evidence"]);
    assert!(out.contains("No evidence recorded yet."));
}

#[test]
fn test_config_init_and_show() {
    let home = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(home.path(), &["config", "init"]);
    assert_eq!(code, 0);
    assert!(home.path().join("config.toml").exists());
    let (out, _, code) = run_cli(home.path(), &["config", "show"]);
    assert_eq!(code, 0);
    assert!(out.contains("min_weeks = 5"));
}
