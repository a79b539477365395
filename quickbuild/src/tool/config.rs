//! QuickBuild tool configuration
//!
//! Defaults match the stock `quickbuild -debug` workflow. Every field can be
//! overridden from the environment and then from command-line flags.

use crate::runner::CommandSpec;
use serde::{Deserialize, Serialize};

/// Default build limit when the caller does not pass `timeout_minutes`
pub const DEFAULT_TIMEOUT_MINUTES: u64 = 10;

/// Upper bound applied to caller-supplied limits
pub const MAX_TIMEOUT_MINUTES: u64 = 120;

/// Configuration for the QuickBuild tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickBuildConfig {
    /// Build command run inside the project directory
    pub command: CommandSpec,
    /// Limit used when a request omits `timeout_minutes`
    pub default_timeout_minutes: u64,
    /// Requests asking for more are clamped to this
    pub max_timeout_minutes: u64,
    /// Emit a structured log record for every build
    pub enable_logging: bool,
}

impl Default for QuickBuildConfig {
    fn default() -> Self {
        Self {
            command: CommandSpec::quickbuild_debug(),
            default_timeout_minutes: DEFAULT_TIMEOUT_MINUTES,
            max_timeout_minutes: MAX_TIMEOUT_MINUTES,
            enable_logging: false,
        }
    }
}

impl QuickBuildConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unparseable values keep the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(line) = lookup("QUICKBUILD_COMMAND") {
            match CommandSpec::parse(&line) {
                Ok(command) => config.command = command,
                Err(e) => tracing::warn!(error = %e, "Ignoring QUICKBUILD_COMMAND"),
            }
        }
        if let Some(minutes) = lookup("QUICKBUILD_DEFAULT_TIMEOUT_MINUTES") {
            if let Ok(n) = minutes.trim().parse() {
                config.default_timeout_minutes = n;
            }
        }
        if let Some(minutes) = lookup("QUICKBUILD_MAX_TIMEOUT_MINUTES") {
            if let Ok(n) = minutes.trim().parse() {
                config.max_timeout_minutes = n;
            }
        }
        if let Some(val) = lookup("QUICKBUILD_ENABLE_LOGGING") {
            config.enable_logging = val.to_lowercase() == "true" || val == "1";
        }

        config
    }

    /// Resolve the requested limit in minutes.
    ///
    /// Absent means the configured default; zero is rejected; anything above
    /// the maximum is clamped.
    pub fn resolve_timeout_minutes(&self, requested: Option<u64>) -> Result<u64, String> {
        match requested.unwrap_or(self.default_timeout_minutes) {
            0 => Err("timeout_minutes must be greater than zero".to_string()),
            minutes if minutes > self.max_timeout_minutes => {
                tracing::warn!(
                    requested = minutes,
                    max = self.max_timeout_minutes,
                    "Clamping build timeout"
                );
                Ok(self.max_timeout_minutes)
            }
            minutes => Ok(minutes),
        }
    }
}
