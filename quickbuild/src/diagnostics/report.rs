//! Build Report — Structured output of a single QuickBuild invocation
//!
//! The report is the only artifact handed back to callers. It is fully
//! determined by the execution result (or by the launch failure that
//! prevented one).

use serde::{Deserialize, Serialize};

/// Status line for a clean build.
pub const STATUS_SUCCESS: &str = "✅ Build completed successfully - No errors found";

/// Machine-readable failure category accompanying the status text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The project directory does not exist
    DirectoryNotFound,
    /// The project path exists but is not a directory
    NotADirectory,
    /// The build executable could not be found
    ToolNotFound,
    /// The build exceeded its wall-clock limit and was killed
    TimedOut,
    /// The build ran and reported (or implied) errors
    BuildFailed,
    /// The request itself was unusable (blank directory, zero timeout)
    InvalidRequest,
    /// Any other fault while launching or reading the build
    Unexpected,
}

impl FailureKind {
    /// Launch failures happen before any build output exists.
    pub fn is_launch_failure(&self) -> bool {
        matches!(
            self,
            Self::DirectoryNotFound | Self::NotADirectory | Self::ToolNotFound
        )
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DirectoryNotFound => write!(f, "directory_not_found"),
            Self::NotADirectory => write!(f, "not_a_directory"),
            Self::ToolNotFound => write!(f, "tool_not_found"),
            Self::TimedOut => write!(f, "timed_out"),
            Self::BuildFailed => write!(f, "build_failed"),
            Self::InvalidRequest => write!(f, "invalid_request"),
            Self::Unexpected => write!(f, "unexpected"),
        }
    }
}

/// A single compiler error decomposed into location and message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Source file, when the diagnostic names one
    pub file: Option<String>,
    /// 1-based line number, when the diagnostic carries one
    pub line: Option<u32>,
    /// Diagnostic text (never empty)
    pub message: String,
}

impl ErrorRecord {
    /// Error with no file context, used for synthetic records.
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            file: None,
            line: None,
            message: message.into(),
        }
    }

    /// Error located in a file at a given line
    pub fn located(file: impl Into<String>, line: Option<u32>, message: impl Into<String>) -> Self {
        Self {
            file: Some(file.into()),
            line,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => write!(f, "{}:{}: {}", file, line, self.message),
            (Some(file), None) => write!(f, "{}: {}", file, self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}

/// Outcome of one build, as returned to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    /// True only for a zero exit status with no extracted errors
    pub success: bool,
    /// Errors in order of first appearance in the output
    pub errors: Vec<ErrorRecord>,
    /// Verbatim combined build output (partial output after a timeout)
    pub raw_output: String,
    /// Short human-readable summary
    pub status: String,
    /// Failure category; absent on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_kind: Option<FailureKind>,
}

impl BuildReport {
    /// A clean build.
    pub fn succeeded(raw_output: impl Into<String>) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            raw_output: raw_output.into(),
            status: STATUS_SUCCESS.to_string(),
            failure_kind: None,
        }
    }

    /// A build that ran and failed with the given errors.
    pub fn failed(errors: Vec<ErrorRecord>, raw_output: impl Into<String>) -> Self {
        Self {
            success: false,
            status: format!("❌ Build failed with {} error(s)", errors.len()),
            errors,
            raw_output: raw_output.into(),
            failure_kind: Some(FailureKind::BuildFailed),
        }
    }

    /// A build that was killed by the watchdog. Partial output is kept.
    pub fn timed_out(status: impl Into<String>, raw_output: impl Into<String>) -> Self {
        Self {
            success: false,
            errors: Vec::new(),
            raw_output: raw_output.into(),
            status: status.into(),
            failure_kind: Some(FailureKind::TimedOut),
        }
    }

    /// A run that never produced build output (bad directory, missing tool,
    /// unexpected fault). Carries one synthetic error with the detail.
    pub fn aborted(kind: FailureKind, status: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            errors: vec![ErrorRecord::message_only(message)],
            raw_output: String::new(),
            status: status.into(),
            failure_kind: Some(kind),
        }
    }

    /// Number of extracted errors
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Short multi-line summary for terminals and logs
    pub fn summary(&self) -> String {
        let mut out = self.status.clone();
        for error in &self.errors {
            out.push_str("\n  - ");
            out.push_str(&error.to_string());
        }
        out
    }
}
