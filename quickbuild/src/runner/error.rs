//! Runner error types

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for runner operations
pub type RunnerResult<T> = Result<T, RunnerError>;

/// Errors that prevent a build from producing an [`super::ExecutionResult`]
#[derive(Error, Debug)]
pub enum RunnerError {
    /// Working directory does not exist
    #[error("Project directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    /// Working directory exists but is a file or something else
    #[error("Path is not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    /// Timeout must be strictly positive
    #[error("Timeout must be greater than zero")]
    InvalidTimeout,

    /// Command line could not be turned into an argument vector
    #[error("Invalid build command: {message}")]
    InvalidCommand { message: String },

    /// Build executable is not installed or not on PATH
    #[error("{program} command not found")]
    ToolNotFound { program: String },

    /// Executable exists but could not be started
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O failure while the build was running
    #[error("I/O error while running build: {0}")]
    Io(#[from] std::io::Error),
}

impl RunnerError {
    /// Launch errors are raised before any output is captured. Everything
    /// else is a runtime fault.
    pub fn is_launch_error(&self) -> bool {
        !matches!(self, Self::Io(_))
    }

    /// Machine-readable error code (e.g., "TOOL_NOT_FOUND")
    pub fn code(&self) -> &'static str {
        match self {
            Self::DirectoryNotFound { .. } => "DIRECTORY_NOT_FOUND",
            Self::NotADirectory { .. } => "NOT_A_DIRECTORY",
            Self::InvalidTimeout => "INVALID_TIMEOUT",
            Self::InvalidCommand { .. } => "INVALID_COMMAND",
            Self::ToolNotFound { .. } => "TOOL_NOT_FOUND",
            Self::Spawn { .. } => "SPAWN_FAILED",
            Self::Io(_) => "IO_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_error_classification() {
        assert!(RunnerError::DirectoryNotFound {
            path: PathBuf::from("/nope")
        }
        .is_launch_error());
        assert!(RunnerError::ToolNotFound {
            program: "quickbuild".into()
        }
        .is_launch_error());
        assert!(!RunnerError::Io(std::io::Error::other("pipe closed")).is_launch_error());
    }

    #[test]
    fn test_error_messages() {
        let err = RunnerError::NotADirectory {
            path: PathBuf::from("/tmp/file.txt"),
        };
        assert_eq!(err.to_string(), "Path is not a directory: /tmp/file.txt");
        assert_eq!(err.code(), "NOT_A_DIRECTORY");

        let err = RunnerError::ToolNotFound {
            program: "quickbuild".into(),
        };
        assert_eq!(err.to_string(), "quickbuild command not found");
    }
}
