//! One-shot QuickBuild runner
//!
//! Builds a single project, prints the report as JSON on stdout and exits
//! with 0 (clean build), 1 (build failed or timed out) or 2 (the build could
//! not be started).

use anyhow::Result;
use clap::Parser;
use quickbuild_mcp::{BuildReport, BuildRequest, CommandSpec, QuickBuildConfig, QuickBuildTool};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory containing the .NET project
    project_directory: String,

    /// Kill the build after this many minutes
    #[arg(long)]
    timeout_minutes: Option<u64>,

    /// Build command to run instead of QUICKBUILD_COMMAND / `quickbuild -debug`
    #[arg(long)]
    command: Option<String>,

    /// Print single-line JSON
    #[arg(long, default_value_t = false)]
    compact: bool,

    /// Log a structured record of the build to stderr
    #[arg(long, default_value_t = false)]
    enable_logging: bool,
}

fn exit_code_for(report: &BuildReport) -> u8 {
    match report.failure_kind {
        None => 0,
        Some(kind) if kind.is_launch_failure() => 2,
        Some(_) => 1,
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = QuickBuildConfig::from_env();
    if let Some(line) = &cli.command {
        config.command = CommandSpec::parse(line)?;
    }
    config.enable_logging |= cli.enable_logging;

    let request = BuildRequest {
        project_directory: cli.project_directory,
        timeout_minutes: cli.timeout_minutes,
    };
    let report = QuickBuildTool::new(config).execute(request).await;

    let json = if cli.compact {
        serde_json::to_string(&report)?
    } else {
        serde_json::to_string_pretty(&report)?
    };
    println!("{}", json);

    tracing::debug!("{}", report.summary());
    Ok(ExitCode::from(exit_code_for(&report)))
}
