//! MSBuild / C# diagnostic line matchers
//!
//! Each matcher recognizes one structural convention and returns an
//! [`ErrorRecord`] for lines it accepts. [`RULES`] fixes the precedence: the
//! first matcher that accepts a line wins, so located forms are always tried
//! before looser ones.

use crate::diagnostics::report::ErrorRecord;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// `path(line,col): error CODE: message` (also the `(l,c,l,c)` span form).
/// The path may itself contain parentheses; the code may be absent.
static LOCATED_WITH_COLUMN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:\d+>)?(?P<file>.+?)\s*\((?P<line>\d+),\d+(?:,\d+,\d+)?\)\s*:\s*error(?:\s+[A-Za-z]+\d+)?\s*:\s*(?P<msg>.+)$",
    )
    .unwrap()
});

/// `path(line): error CODE: message`
static LOCATED_LINE_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:\d+>)?(?P<file>.+?)\s*\((?P<line>\d+)\)\s*:\s*error(?:\s+[A-Za-z]+\d+)?\s*:\s*(?P<msg>.+)$",
    )
    .unwrap()
});

/// `error CODE: message` anywhere on the line (`MSBUILD : error MSB1009: ...`)
static CODED_NO_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\berror\s+[A-Za-z]+\d+\s*:\s*(?P<msg>.+)$").unwrap()
});

/// `path: error: message`, tolerating a Windows drive letter in the path
static FILE_NO_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d+>)?(?P<file>(?:[A-Za-z]:[\\/])?[^:]+?)\s*:\s*error\s*:\s*(?P<msg>.+)$")
        .unwrap()
});

static BUILD_FAILED_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bbuild failed\b").unwrap());

static NODE_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+>").unwrap());

/// Trailing ` [C:\src\App\App.csproj]` that MSBuild appends to diagnostics
static PROJECT_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+\[[^\[\]]+\.[A-Za-z]*proj\]$").unwrap());

/// A line matcher. Receives a trimmed, non-empty line.
pub type Matcher = fn(&str) -> Option<ErrorRecord>;

/// One named entry in the precedence list
#[derive(Clone, Copy)]
pub struct DiagnosticRule {
    /// Short identifier, logged with every match
    pub name: &'static str,
    pub matcher: Matcher,
}

impl std::fmt::Debug for DiagnosticRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticRule")
            .field("name", &self.name)
            .finish()
    }
}

/// Structured diagnostic rules in precedence order.
pub const RULES: [DiagnosticRule; 4] = [
    DiagnosticRule {
        name: "located_with_column",
        matcher: match_located_with_column,
    },
    DiagnosticRule {
        name: "located_line_only",
        matcher: match_located_line_only,
    },
    DiagnosticRule {
        name: "coded_no_file",
        matcher: match_coded_no_file,
    },
    DiagnosticRule {
        name: "file_no_line",
        matcher: match_file_no_line,
    },
];

/// Apply [`RULES`] in order; the first match wins.
pub fn match_line(line: &str) -> Option<(&'static str, ErrorRecord)> {
    RULES
        .iter()
        .find_map(|rule| (rule.matcher)(line).map(|record| (rule.name, record)))
}

/// Rule 1: file, line and column. The column is dropped.
pub fn match_located_with_column(line: &str) -> Option<ErrorRecord> {
    located(&LOCATED_WITH_COLUMN, line)
}

/// Rule 2: file and line.
pub fn match_located_line_only(line: &str) -> Option<ErrorRecord> {
    located(&LOCATED_LINE_ONLY, line)
}

/// Rule 3: error code without file context.
pub fn match_coded_no_file(line: &str) -> Option<ErrorRecord> {
    let caps = CODED_NO_FILE.captures(line)?;
    Some(ErrorRecord::message_only(message(&caps)?))
}

/// Rule 4: file without a line number.
pub fn match_file_no_line(line: &str) -> Option<ErrorRecord> {
    let caps = FILE_NO_LINE.captures(line)?;
    let file = caps.name("file")?.as_str().trim();
    if file.is_empty() {
        return None;
    }
    Some(ErrorRecord::located(file, None, message(&caps)?))
}

/// Rule 5: the terminal "Build FAILED" marker, as a synthetic error whose
/// message is the marker line itself.
pub fn match_terminal_marker(line: &str) -> Option<ErrorRecord> {
    if !BUILD_FAILED_MARKER.is_match(line) {
        return None;
    }
    let text = NODE_PREFIX.replace(line, "");
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some(ErrorRecord::message_only(text))
}

fn located(pattern: &Regex, line: &str) -> Option<ErrorRecord> {
    let caps = pattern.captures(line)?;
    let file = caps.name("file")?.as_str().trim();
    if file.is_empty() {
        return None;
    }
    let line_no = caps
        .name("line")
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|n| *n > 0);
    Some(ErrorRecord::located(file, line_no, message(&caps)?))
}

fn message(caps: &Captures<'_>) -> Option<String> {
    let raw = caps.name("msg")?.as_str().trim();
    if raw.is_empty() {
        return None;
    }
    let stripped = PROJECT_SUFFIX.replace(raw, "");
    let text = stripped.trim();
    Some(if text.is_empty() { raw } else { text }.to_string())
}
