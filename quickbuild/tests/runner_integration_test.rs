//! Integration tests for the process runner
//!
//! Drives real `sh` processes through `ProcessRunner` to check output capture,
//! deadline enforcement and launch failures.

#![cfg(unix)]

use quickbuild_mcp::{CommandSpec, ProcessRunner, RunnerError};
use std::time::Duration;

fn sh(script: &str) -> CommandSpec {
    CommandSpec::new("sh").arg("-c").arg(script)
}

/// Test: stdout and stderr both land in the captured output
#[tokio::test]
async fn test_captures_both_streams() {
    let temp = tempfile::TempDir::new().unwrap();
    let result = ProcessRunner::new()
        .run(
            &sh("echo compiling; echo 'Build FAILED.' >&2; exit 1"),
            temp.path(),
            Duration::from_secs(10),
        )
        .await
        .unwrap();

    assert_eq!(result.exit_code, Some(1));
    assert!(!result.timed_out);
    assert!(result.output.contains("compiling"));
    assert!(result.output.contains("Build FAILED."));
}

/// Test: a large burst of output is read completely
#[tokio::test]
async fn test_large_output_is_not_truncated() {
    let temp = tempfile::TempDir::new().unwrap();
    let result = ProcessRunner::new()
        .run(
            &sh("i=0; while [ $i -lt 5000 ]; do echo \"line $i\"; i=$((i+1)); done"),
            temp.path(),
            Duration::from_secs(30),
        )
        .await
        .unwrap();

    assert_eq!(result.exit_code, Some(0));
    assert_eq!(result.output.lines().count(), 5000);
    assert!(result.output.contains("line 4999"));
}

/// Test: the deadline fires, partial output survives, and the whole process
/// group is gone afterwards
#[tokio::test]
async fn test_timeout_kills_process_group() {
    let temp = tempfile::TempDir::new().unwrap();
    let late = temp.path().join("late.txt");

    let result = ProcessRunner::new()
        .run(
            &sh("(sleep 2; touch late.txt) & echo started; sleep 30"),
            temp.path(),
            Duration::from_millis(500),
        )
        .await
        .unwrap();

    assert!(result.timed_out);
    assert_eq!(result.exit_code, None);
    assert!(result.output.contains("started"));
    assert!(result.duration < Duration::from_secs(10));

    // The background job would have written the file had it survived the kill
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(!late.exists(), "grandchild outlived the timeout");
}

/// Test: a build that exits before the deadline keeps its exit code even when
/// a background job holds the pipes open past the deadline
#[tokio::test]
async fn test_exit_before_deadline_is_not_a_timeout() {
    let temp = tempfile::TempDir::new().unwrap();
    let result = ProcessRunner::new()
        .run(
            &sh("echo done; sleep 5 & exit 0"),
            temp.path(),
            Duration::from_secs(1),
        )
        .await
        .unwrap();

    assert!(!result.timed_out);
    assert_eq!(result.exit_code, Some(0));
    assert!(result.output.contains("done"));
    assert!(result.duration < Duration::from_secs(3));
}

/// Test: when a background job keeps the pipes open after the build exits,
/// the runner stops reading after its grace period and returns the real code
#[tokio::test]
async fn test_lingering_pipe_holder_does_not_block_result() {
    let temp = tempfile::TempDir::new().unwrap();
    let result = ProcessRunner::new()
        .run(
            &sh("echo 'Build FAILED.'; sleep 10 & exit 3"),
            temp.path(),
            Duration::from_secs(60),
        )
        .await
        .unwrap();

    assert!(!result.timed_out);
    assert_eq!(result.exit_code, Some(3));
    assert!(result.output.contains("Build FAILED."));
    assert!(result.duration >= Duration::from_millis(1500));
    assert!(result.duration < Duration::from_secs(8));
}

/// Test: output written in a burst right before the deadline survives the kill
#[tokio::test]
async fn test_timeout_keeps_output_burst() {
    let temp = tempfile::TempDir::new().unwrap();
    let result = ProcessRunner::new()
        .run(
            &sh("i=0; while [ $i -lt 2000 ]; do echo \"line $i\"; i=$((i+1)); done; sleep 30"),
            temp.path(),
            Duration::from_secs(2),
        )
        .await
        .unwrap();

    assert!(result.timed_out);
    assert!(result.output.contains("line 0"));
    assert!(result.output.contains("line 1999"));
}

/// Test: a missing working directory fails before anything is spawned
#[tokio::test]
async fn test_missing_directory_spawns_nothing() {
    let temp = tempfile::TempDir::new().unwrap();
    let marker = temp.path().join("ran.txt");
    let missing = temp.path().join("does-not-exist");

    let command = sh(&format!("touch '{}'", marker.display()));
    let err = ProcessRunner::new()
        .run(&command, &missing, Duration::from_secs(10))
        .await
        .unwrap_err();

    assert!(matches!(err, RunnerError::DirectoryNotFound { .. }));
    assert!(!marker.exists());
}

/// Test: an unknown program is reported as a missing tool
#[tokio::test]
async fn test_unknown_program_is_tool_not_found() {
    let temp = tempfile::TempDir::new().unwrap();
    let err = ProcessRunner::new()
        .run(
            &CommandSpec::new("quickbuild-definitely-not-installed").arg("-debug"),
            temp.path(),
            Duration::from_secs(10),
        )
        .await
        .unwrap_err();

    assert!(err.is_launch_error());
    assert_eq!(
        err.to_string(),
        "quickbuild-definitely-not-installed command not found"
    );
}

/// Test: concurrent runs on one runner do not interfere
#[tokio::test]
async fn test_concurrent_runs_are_independent() {
    let temp = tempfile::TempDir::new().unwrap();
    let runner = ProcessRunner::new();

    let first = sh("echo first; exit 0");
    let second = sh("echo second; exit 4");
    let (a, b) = tokio::join!(
        runner.run(&first, temp.path(), Duration::from_secs(10)),
        runner.run(&second, temp.path(), Duration::from_secs(10)),
    );

    let (a, b) = (a.unwrap(), b.unwrap());
    assert_eq!(a.output.trim(), "first");
    assert_eq!(a.exit_code, Some(0));
    assert_eq!(b.output.trim(), "second");
    assert_eq!(b.exit_code, Some(4));
}
