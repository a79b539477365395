//! Runner Module — Build Process Execution
//!
//! Launches the external build command with `tokio::process::Command`,
//! streams its combined output, and enforces a hard wall-clock limit by
//! killing the process group when the watchdog fires.
//!
//! ```text
//! validate dir → spawn (own process group) → stdout/stderr reader tasks ─┐
//!                                                                         ├─► read loop ─► ExecutionResult
//!                                   watchdog (sleep → cancel token) ──────┘
//! ```

pub mod command;
pub mod error;
pub mod process;

pub use command::CommandSpec;
pub use error::{RunnerError, RunnerResult};
pub use process::{ExecutionResult, ProcessRunner};
