//! Process execution helpers.
//!
//! External commands are considered "world-touching" and must go through the HAL so we can
//! test workflows without spawning real processes.

use crate::HalResult;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

/// A single blocking invocation of an external tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Text written to the child's stdin before it is closed (answers interactive prompts).
    pub stdin: Option<String>,
    pub timeout: Duration,
}

impl CommandRequest {
    pub fn new<I, S>(program: &Path, args: I, timeout: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_path_buf(),
            args: args.into_iter().map(Into::into).collect(),
            stdin: None,
            timeout,
        }
    }

    pub fn with_stdin(mut self, input: &str) -> Self {
        self.stdin = Some(input.to_string());
        self
    }

    /// Short program name used in error messages (`fastboot`, not `/usr/bin/fastboot`).
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }

    /// Human-readable command line as stored in the audit log.
    pub fn display(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        if let Some(input) = &self.stdin {
            line.push_str(&format!(" <<< {:?}", input));
        }
        line
    }
}

/// Process execution trait (external command runner).
pub trait ProcessOps {
    /// Run the request to completion or until its timeout expires.
    ///
    /// A non-zero exit status is not an error here; callers inspect `Output::status`.
    fn run(&self, request: &CommandRequest) -> HalResult<Output>;
}

/// Executable discovery.
pub trait ToolLookupOps {
    fn find_program(&self, name: &str) -> Option<PathBuf>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_args_and_stdin() {
        let req = CommandRequest::new(
            Path::new("/usr/bin/fastboot"),
            ["flashing", "unlock"],
            Duration::from_secs(5),
        )
        .with_stdin("y\n");
        assert_eq!(
            req.display(),
            "/usr/bin/fastboot flashing unlock <<< \"y\\n\""
        );
        assert_eq!(req.program_name(), "fastboot");
    }

    #[test]
    fn display_without_stdin_is_plain_command_line() {
        let req = CommandRequest::new(Path::new("adb"), ["devices"], Duration::from_secs(1));
        assert_eq!(req.display(), "adb devices");
    }
}
