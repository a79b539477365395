//! Integration tests for the QuickBuild tool
//!
//! Runs the full request → process → classification flow with `sh` scripts
//! standing in for the build tool.

#![cfg(unix)]

use quickbuild_mcp::{
    BuildLogEntry, BuildRequest, CommandSpec, ErrorRecord, FailureKind, QuickBuildConfig,
    QuickBuildTool, ReportSink,
};
use std::sync::{Arc, Mutex};

/// Keeps every entry it is handed
#[derive(Default)]
struct RecordingSink {
    entries: Mutex<Vec<BuildLogEntry>>,
}

impl ReportSink for RecordingSink {
    fn record(&self, entry: &BuildLogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn tool_running(script: &str) -> QuickBuildTool {
    let config = QuickBuildConfig {
        command: CommandSpec::new("sh").arg("-c").arg(script),
        ..Default::default()
    };
    QuickBuildTool::new(config)
}

/// Test: a clean build reports success with the raw output
#[tokio::test]
async fn test_clean_build_succeeds() {
    let temp = tempfile::TempDir::new().unwrap();
    let report = tool_running("echo 'Build succeeded.'; echo '    0 Error(s)'; exit 0")
        .execute(BuildRequest::new(temp.path().to_string_lossy()))
        .await;

    assert!(report.success);
    assert!(report.errors.is_empty());
    assert_eq!(report.status, "✅ Build completed successfully - No errors found");
    assert!(report.raw_output.contains("Build succeeded."));
    assert_eq!(report.failure_kind, None);
}

/// Test: compiler errors are extracted in order
#[tokio::test]
async fn test_compiler_errors_are_extracted() {
    let temp = tempfile::TempDir::new().unwrap();
    let script = r#"
echo "Program.cs(10,5): error CS1002: ; expected"
echo "MyProject.cs(15): error CS0103: The name 'invalidVariable' does not exist"
echo "Build FAILED."
exit 1
"#;
    let report = tool_running(script)
        .execute(BuildRequest::new(temp.path().to_string_lossy()))
        .await;

    assert!(!report.success);
    assert_eq!(
        report.errors,
        vec![
            ErrorRecord::located("Program.cs", Some(10), "; expected"),
            ErrorRecord::located(
                "MyProject.cs",
                Some(15),
                "The name 'invalidVariable' does not exist"
            ),
        ]
    );
    assert_eq!(report.status, "❌ Build failed with 2 error(s)");
}

/// Test: the build runs inside the requested directory
#[tokio::test]
async fn test_build_runs_in_project_directory() {
    let temp = tempfile::TempDir::new().unwrap();
    std::fs::write(temp.path().join("App.csproj"), "<Project />").unwrap();

    let report = tool_running("test -f App.csproj || { echo 'error MSB1003: no project'; exit 1; }")
        .execute(BuildRequest::new(temp.path().to_string_lossy()))
        .await;

    assert!(report.success, "unexpected report: {:?}", report);
}

/// Test: non-zero exit with unrecognizable output still fails with a record
#[tokio::test]
async fn test_unrecognized_failure_gets_synthetic_error() {
    let temp = tempfile::TempDir::new().unwrap();
    let report = tool_running("echo 'something went sideways'; exit 7")
        .execute(BuildRequest::new(temp.path().to_string_lossy()))
        .await;

    assert!(!report.success);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].message.contains("code 7"));
    assert_eq!(report.raw_output.trim(), "something went sideways");
}

/// Test: missing and non-directory paths never launch the build
#[tokio::test]
async fn test_bad_project_directory() {
    let temp = tempfile::TempDir::new().unwrap();
    let marker = temp.path().join("ran.txt");
    let tool = tool_running(&format!("touch '{}'", marker.display()));

    let missing = tool
        .execute(BuildRequest::new(
            temp.path().join("missing").to_string_lossy(),
        ))
        .await;
    assert_eq!(missing.failure_kind, Some(FailureKind::DirectoryNotFound));
    assert_eq!(missing.status, "❌ Project directory not found");

    let file = temp.path().join("App.csproj");
    std::fs::write(&file, "<Project />").unwrap();
    let not_dir = tool
        .execute(BuildRequest::new(file.to_string_lossy()))
        .await;
    assert_eq!(not_dir.failure_kind, Some(FailureKind::NotADirectory));
    assert_eq!(not_dir.status, "❌ Invalid project directory");

    assert!(!marker.exists());
}

/// Test: a missing build tool is reported, not raised
#[tokio::test]
async fn test_missing_build_tool() {
    let temp = tempfile::TempDir::new().unwrap();
    let config = QuickBuildConfig {
        command: CommandSpec::new("quickbuild-definitely-not-installed").arg("-debug"),
        ..Default::default()
    };
    let report = QuickBuildTool::new(config)
        .execute(BuildRequest::new(temp.path().to_string_lossy()))
        .await;

    assert!(!report.success);
    assert_eq!(report.status, "❌ QuickBuild tool not found");
    assert_eq!(report.failure_kind, Some(FailureKind::ToolNotFound));
    assert!(report.raw_output.is_empty());
}

/// Test: every build, including failed launches, reaches the sink
#[tokio::test]
async fn test_sink_records_each_build() {
    let temp = tempfile::TempDir::new().unwrap();
    let sink = Arc::new(RecordingSink::default());
    let tool = tool_running("echo 'Build FAILED.'; exit 1").with_sink(sink.clone());

    tool.execute(BuildRequest::new(temp.path().to_string_lossy()))
        .await;
    tool.execute(BuildRequest::new(
        temp.path().join("missing").to_string_lossy(),
    ))
    .await;

    let entries = sink.entries.lock().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].failure_kind, Some(FailureKind::BuildFailed));
    assert_eq!(entries[0].error_count, 1);
    assert_eq!(entries[1].failure_kind, Some(FailureKind::DirectoryNotFound));
    assert_ne!(entries[0].run_id, entries[1].run_id);
}
