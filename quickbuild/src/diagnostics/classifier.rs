//! Diagnostic classification
//!
//! Turns combined build output plus exit status into a [`BuildReport`].
//! Classification is a pure function of its inputs.

use crate::diagnostics::patterns::{match_line, match_terminal_marker};
use crate::diagnostics::report::{BuildReport, ErrorRecord};
use crate::runner::ExecutionResult;

/// Status used when the watchdog killed the build and no limit is known.
pub const STATUS_TIMED_OUT: &str = "❌ Build timed out";

/// Classify build output.
///
/// A timed-out run short-circuits: partial output is never parsed.
pub fn classify(output_text: &str, exit_code: Option<i32>, timed_out: bool) -> BuildReport {
    if timed_out {
        return BuildReport::timed_out(STATUS_TIMED_OUT, output_text);
    }

    let mut errors = extract_errors(output_text);

    if errors.is_empty() {
        if let Some(marker) = find_terminal_marker(output_text) {
            errors.push(marker);
        }
    }

    if errors.is_empty() && exit_code != Some(0) {
        tracing::debug!(
            ?exit_code,
            "Build reported failure but no diagnostic matched; emitting synthetic error"
        );
        errors.push(ErrorRecord::message_only(fallback_message(exit_code)));
    }

    if errors.is_empty() {
        BuildReport::succeeded(output_text)
    } else {
        BuildReport::failed(errors, output_text)
    }
}

/// Classify the result of a [`crate::runner::ProcessRunner`] run.
pub fn classify_execution(result: &ExecutionResult) -> BuildReport {
    classify(&result.output, result.exit_code, result.timed_out)
}

/// Structured errors (rules 1–4) in order of appearance.
pub fn extract_errors(output_text: &str) -> Vec<ErrorRecord> {
    output_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let (rule, record) = match_line(line)?;
            tracing::debug!(rule, line, "Matched diagnostic");
            Some(record)
        })
        .collect()
}

fn find_terminal_marker(output_text: &str) -> Option<ErrorRecord> {
    output_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .find_map(match_terminal_marker)
}

fn fallback_message(exit_code: Option<i32>) -> String {
    match exit_code {
        Some(code) => format!(
            "Build exited with code {} but reported no recognizable errors - check raw output for details",
            code
        ),
        None => "Build process was terminated before reporting an exit code - check raw output for details"
            .to_string(),
    }
}
