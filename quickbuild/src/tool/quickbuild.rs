//! The `azure_net_quickbuild` tool
//!
//! Validates and defaults the request, runs the build, classifies the output
//! and maps every launch failure onto a report. `execute` never fails.

use crate::diagnostics::{classify_execution, BuildReport, FailureKind};
use crate::runner::{CommandSpec, ExecutionResult, ProcessRunner, RunnerError, RunnerResult};
use crate::tool::config::QuickBuildConfig;
use crate::tool::sink::{sink_for, BuildLogEntry, ReportSink};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Tool input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRequest {
    /// Absolute path of the directory containing the .NET project
    pub project_directory: String,
    /// Build limit in minutes; the configured default when absent
    #[serde(default)]
    pub timeout_minutes: Option<u64>,
}

impl BuildRequest {
    pub fn new(project_directory: impl Into<String>) -> Self {
        Self {
            project_directory: project_directory.into(),
            timeout_minutes: None,
        }
    }

    pub fn with_timeout_minutes(mut self, minutes: u64) -> Self {
        self.timeout_minutes = Some(minutes);
        self
    }
}

/// Executes a build command. Implemented by [`ProcessRunner`]; tests swap in
/// fakes.
#[async_trait]
pub trait BuildRunner: Send + Sync {
    async fn run_build(
        &self,
        command: &CommandSpec,
        working_dir: &Path,
        timeout: Duration,
    ) -> RunnerResult<ExecutionResult>;
}

#[async_trait]
impl BuildRunner for ProcessRunner {
    async fn run_build(
        &self,
        command: &CommandSpec,
        working_dir: &Path,
        timeout: Duration,
    ) -> RunnerResult<ExecutionResult> {
        self.run(command, working_dir, timeout).await
    }
}

/// Runs QuickBuild for a project and reports structured errors
#[derive(Clone)]
pub struct QuickBuildTool {
    config: QuickBuildConfig,
    runner: Arc<dyn BuildRunner>,
    sink: Arc<dyn ReportSink>,
}

impl QuickBuildTool {
    /// Tool backed by real processes; logging per `config.enable_logging`.
    pub fn new(config: QuickBuildConfig) -> Self {
        let sink = sink_for(config.enable_logging);
        Self {
            config,
            runner: Arc::new(ProcessRunner::new()),
            sink,
        }
    }

    pub fn with_runner(mut self, runner: Arc<dyn BuildRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &QuickBuildConfig {
        &self.config
    }

    /// Run one build. Every outcome, including launch failures and
    /// unexpected faults, is returned as a [`BuildReport`].
    pub async fn execute(&self, request: BuildRequest) -> BuildReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let start = Instant::now();

        let report = self.build(&request).await;

        self.sink.record(&BuildLogEntry::new(
            run_id,
            started_at,
            request.project_directory.as_str(),
            self.config.command.to_string(),
            start.elapsed(),
            &report,
        ));
        report
    }

    async fn build(&self, request: &BuildRequest) -> BuildReport {
        let project_directory = request.project_directory.trim();
        if project_directory.is_empty() {
            return invalid_request("project_directory must not be empty");
        }

        let minutes = match self.config.resolve_timeout_minutes(request.timeout_minutes) {
            Ok(minutes) => minutes,
            Err(message) => return invalid_request(&message),
        };
        let timeout = Duration::from_secs(minutes.saturating_mul(60));

        tracing::info!(
            project_directory,
            timeout_minutes = minutes,
            command = %self.config.command,
            "Running QuickBuild"
        );

        match self
            .runner
            .run_build(&self.config.command, Path::new(project_directory), timeout)
            .await
        {
            Ok(execution) if execution.timed_out => BuildReport::timed_out(
                format!("❌ Build timed out after {} minutes", minutes),
                execution.output,
            ),
            Ok(execution) => classify_execution(&execution),
            Err(e) => {
                tracing::warn!(code = e.code(), error = %e, project_directory, "Build did not run");
                failure_report(&e)
            }
        }
    }
}

/// Map a runner error onto its failure category
pub fn failure_report(err: &RunnerError) -> BuildReport {
    match err {
        RunnerError::DirectoryNotFound { .. } => BuildReport::aborted(
            FailureKind::DirectoryNotFound,
            "❌ Project directory not found",
            err.to_string(),
        ),
        RunnerError::NotADirectory { .. } => BuildReport::aborted(
            FailureKind::NotADirectory,
            "❌ Invalid project directory",
            err.to_string(),
        ),
        RunnerError::ToolNotFound { program } => BuildReport::aborted(
            FailureKind::ToolNotFound,
            "❌ QuickBuild tool not found",
            format!(
                "{} command not found. Ensure Azure QuickBuild tools are installed.",
                program
            ),
        ),
        RunnerError::InvalidTimeout | RunnerError::InvalidCommand { .. } => {
            invalid_request(&err.to_string())
        }
        RunnerError::Spawn { .. } | RunnerError::Io(_) => BuildReport::aborted(
            FailureKind::Unexpected,
            format!("❌ Unexpected error: {}", err),
            format!("Unexpected error: {}", err),
        ),
    }
}

fn invalid_request(message: &str) -> BuildReport {
    BuildReport::aborted(
        FailureKind::InvalidRequest,
        format!("❌ Invalid request: {}", message),
        message,
    )
}
