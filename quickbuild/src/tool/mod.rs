//! Tool Module — The QuickBuild Tool Contract
//!
//! Wraps the runner and the classifier behind the `project_directory` /
//! `timeout_minutes` contract exposed over MCP and the CLI:
//! - Defaults and validates requests
//! - Maps launch failures to distinct statuses and failure kinds
//! - Reports each build to an optional [`ReportSink`]

pub mod config;
pub mod quickbuild;
pub mod sink;

pub use config::{QuickBuildConfig, DEFAULT_TIMEOUT_MINUTES, MAX_TIMEOUT_MINUTES};
pub use quickbuild::{failure_report, BuildRequest, BuildRunner, QuickBuildTool};
pub use sink::{sink_for, BuildLogEntry, NoopSink, ReportSink, TracingSink};
