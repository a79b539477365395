//! Build command argument vectors
//!
//! Commands are always executed as a program plus arguments, never through a
//! shell. Configured command lines are split with POSIX quoting rules.

use crate::runner::error::{RunnerError, RunnerResult};
use serde::{Deserialize, Serialize};

/// Program and arguments for one build invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Executable name or path
    pub program: String,
    /// Arguments passed verbatim
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Split a command line such as `quickbuild -debug` into program and arguments.
    pub fn parse(line: &str) -> RunnerResult<Self> {
        let mut parts = shlex::split(line)
            .ok_or_else(|| RunnerError::InvalidCommand {
                message: format!("unbalanced quoting in '{}'", line),
            })?
            .into_iter();

        let program = parts.next().ok_or_else(|| RunnerError::InvalidCommand {
            message: "command is empty".to_string(),
        })?;

        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    /// The `quickbuild -debug` invocation used when nothing is configured
    pub fn quickbuild_debug() -> Self {
        Self::new("quickbuild").arg("-debug")
    }
}

impl Default for CommandSpec {
    fn default() -> Self {
        Self::quickbuild_debug()
    }
}

impl std::fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let words = std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str));
        match shlex::try_join(words) {
            Ok(joined) => write!(f, "{}", joined),
            Err(_) => write!(f, "{} {}", self.program, self.args.join(" ")),
        }
    }
}
