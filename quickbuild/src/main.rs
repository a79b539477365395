//! MCP Server for Azure .NET QuickBuild
//!
//! Provides one tool:
//! - `azure_net_quickbuild`: runs `quickbuild -debug` in a project directory and
//!   returns structured compiler errors plus the raw build output
//!
//! # Usage
//!
//! ```bash
//! # Standard MCP mode (stdio)
//! quickbuild-mcp
//!
//! # Custom configuration
//! QUICKBUILD_DEFAULT_TIMEOUT_MINUTES=20 quickbuild-mcp --command "dotnet build" --enable-logging
//! ```

// Suppress false positive dead_code warnings from #[tool_router] macro and serde deserialization
#![allow(dead_code)]

use anyhow::Result;
use clap::Parser;
use quickbuild_mcp::{BuildRequest, CommandSpec, QuickBuildConfig, QuickBuildTool};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router, ServerHandler, ServiceExt,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::io::{stdin, stdout};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Build command run in the project directory (overrides QUICKBUILD_COMMAND)
    #[arg(long)]
    command: Option<String>,

    /// Timeout used when a request omits one (overrides QUICKBUILD_DEFAULT_TIMEOUT_MINUTES)
    #[arg(long)]
    default_timeout_minutes: Option<u64>,

    /// Upper bound for requested timeouts (overrides QUICKBUILD_MAX_TIMEOUT_MINUTES)
    #[arg(long)]
    max_timeout_minutes: Option<u64>,

    /// Log a structured record of every build to stderr
    #[arg(long, default_value_t = false)]
    enable_logging: bool,
}

impl Args {
    fn into_config(self) -> Result<QuickBuildConfig> {
        let mut config = QuickBuildConfig::from_env();
        if let Some(line) = self.command {
            config.command = CommandSpec::parse(&line)?;
        }
        if let Some(minutes) = self.default_timeout_minutes {
            config.default_timeout_minutes = minutes;
        }
        if let Some(minutes) = self.max_timeout_minutes {
            config.max_timeout_minutes = minutes;
        }
        config.enable_logging |= self.enable_logging;
        Ok(config)
    }
}

/// Request parameters for the QuickBuild tool
#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[schemars(crate = "rmcp::schemars")]
struct QuickBuildRequest {
    #[schemars(description = "The absolute path to the directory containing the .NET project")]
    project_directory: String,
    #[schemars(description = "Maximum time to wait for build completion in minutes (default: 10)")]
    timeout_minutes: Option<u64>,
}

impl From<QuickBuildRequest> for BuildRequest {
    fn from(req: QuickBuildRequest) -> Self {
        Self {
            project_directory: req.project_directory,
            timeout_minutes: req.timeout_minutes,
        }
    }
}

/// The MCP server handler
#[derive(Clone)]
struct QuickBuildServer {
    tool: Arc<QuickBuildTool>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl QuickBuildServer {
    fn new(tool: QuickBuildTool) -> Self {
        Self {
            tool: Arc::new(tool),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Runs Azure .NET QuickBuild in debug mode to test project compilation. Returns JSON with `success`, `errors` (file, line, message), `raw_output` (complete build output) and a human-readable `status`. Launch problems are reported with a `failure_kind` of directory_not_found, not_a_directory, tool_not_found or timed_out."
    )]
    async fn azure_net_quickbuild(
        &self,
        Parameters(req): Parameters<QuickBuildRequest>,
    ) -> Result<String, String> {
        let report = self.tool.execute(req.into()).await;
        serde_json::to_string_pretty(&report).map_err(|e| e.to_string())
    }
}

#[tool_handler]
impl ServerHandler for QuickBuildServer {
    fn get_info(&self) -> ServerInfo {
        let config = self.tool.config();
        let instructions = format!(
            "MCP server that compiles .NET projects with Azure QuickBuild.\n\
             - azure_net_quickbuild: runs `{}` in `project_directory` and parses compiler errors.\n\
             Builds are killed after `timeout_minutes` (default {}, max {}).\n\
             `success` is true only when the build exits cleanly with no errors; \
             read `errors` first and fall back to `raw_output` when it is empty.",
            config.command, config.default_timeout_minutes, config.max_timeout_minutes
        );

        ServerInfo {
            instructions: Some(instructions),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // stdout carries the MCP protocol; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quickbuild_mcp=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = args.into_config()?;
    tracing::info!(
        command = %config.command,
        default_timeout_minutes = config.default_timeout_minutes,
        max_timeout_minutes = config.max_timeout_minutes,
        enable_logging = config.enable_logging,
        "Starting QuickBuild MCP Server"
    );

    let server = QuickBuildServer::new(QuickBuildTool::new(config));

    let transport = (stdin(), stdout());
    let service = server.serve(transport).await?;

    service.waiting().await?;

    Ok(())
}
