//! Build log sinks
//!
//! The tool hands every finished report to a [`ReportSink`]. Sinks observe
//! only; they cannot change what the caller receives.

use crate::diagnostics::{BuildReport, FailureKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// One build, as recorded by a sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildLogEntry {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub project_directory: String,
    pub command: String,
    pub duration_ms: u64,
    pub success: bool,
    pub error_count: usize,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_kind: Option<FailureKind>,
}

impl BuildLogEntry {
    pub fn new(
        run_id: Uuid,
        started_at: DateTime<Utc>,
        project_directory: impl Into<String>,
        command: impl Into<String>,
        elapsed: Duration,
        report: &BuildReport,
    ) -> Self {
        Self {
            run_id,
            started_at,
            project_directory: project_directory.into(),
            command: command.into(),
            duration_ms: elapsed.as_millis() as u64,
            success: report.success,
            error_count: report.error_count(),
            status: report.status.clone(),
            failure_kind: report.failure_kind,
        }
    }
}

/// Receives a record of every build
#[cfg_attr(test, mockall::automock)]
pub trait ReportSink: Send + Sync {
    fn record(&self, entry: &BuildLogEntry);
}

/// Discards everything. Used when logging is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl ReportSink for NoopSink {
    fn record(&self, _entry: &BuildLogEntry) {}
}

/// Emits each build as a structured `tracing` event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn record(&self, entry: &BuildLogEntry) {
        tracing::info!(
            run_id = %entry.run_id,
            started_at = %entry.started_at.to_rfc3339(),
            project_directory = %entry.project_directory,
            command = %entry.command,
            duration_ms = entry.duration_ms,
            success = entry.success,
            error_count = entry.error_count,
            failure_kind = ?entry.failure_kind,
            "{}",
            entry.status
        );
    }
}

/// Sink selected by the logging toggle
pub fn sink_for(enable_logging: bool) -> Arc<dyn ReportSink> {
    if enable_logging {
        Arc::new(TracingSink)
    } else {
        Arc::new(NoopSink)
    }
}
