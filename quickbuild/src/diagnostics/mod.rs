//! Diagnostics Module — Compiler Output Classification
//!
//! Converts loosely structured MSBuild / C# compiler text into a normalized
//! error list and a success verdict. No model or network is involved; the
//! result depends only on the output text, exit status and timeout flag.
//!
//! # Precedence
//!
//! ```text
//! path(l,c): error CODE: msg → path(l): error CODE: msg → error CODE: msg → path: error: msg
//!                                       (nothing matched) → "Build FAILED" marker
//!                                       (still nothing, non-zero exit) → synthetic error
//! ```
//!
//! # Usage
//!
//! ```rust
//! use quickbuild_mcp::diagnostics::classify;
//!
//! let report = classify(
//!     "MyProject.cs(15): error CS0103: The name 'x' does not exist",
//!     Some(1),
//!     false,
//! );
//! assert!(!report.success);
//! assert_eq!(report.errors[0].line, Some(15));
//! ```

pub mod classifier;
pub mod patterns;
pub mod report;

pub use classifier::{classify, classify_execution, extract_errors, STATUS_TIMED_OUT};
pub use patterns::{DiagnosticRule, RULES};
pub use report::{BuildReport, ErrorRecord, FailureKind, STATUS_SUCCESS};
