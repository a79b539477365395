//! QuickBuild MCP Library
//!
//! This library provides:
//! - A bounded-lifetime process runner for external build commands
//! - A classifier turning MSBuild / C# compiler text into structured errors
//! - The `azure_net_quickbuild` tool contract shared by the MCP server and CLI
//!
//! # Usage
//!
//! ```bash
//! # Serve the tool over MCP (stdio)
//! quickbuild-mcp
//!
//! # Use a different build command and log every build
//! QUICKBUILD_COMMAND="dotnet build" quickbuild-mcp --enable-logging
//!
//! # One-shot build from a terminal
//! quickbuild-cli /src/MyService --timeout-minutes 5
//! ```

#![allow(clippy::uninlined_format_args)]

pub mod diagnostics;
pub mod runner;
pub mod tool;

// Re-export key diagnostics types
pub use diagnostics::{classify, classify_execution, BuildReport, ErrorRecord, FailureKind};

// Re-export key runner types
pub use runner::{CommandSpec, ExecutionResult, ProcessRunner, RunnerError, RunnerResult};

// Re-export key tool types
pub use tool::{
    BuildLogEntry, BuildRequest, BuildRunner, NoopSink, QuickBuildConfig, QuickBuildTool,
    ReportSink, TracingSink,
};
