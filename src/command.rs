//! External command execution
//!
//! Actions that shell out (`zip`, `git`, the translations tool) go through
//! [`CommandRunner`] so tests can script outcomes and inspect invocations.

use std::io;
use std::path::Path;
use std::process::Command;

use tracing::debug;

/// Captured result of one command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Successful output with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Short description of a failure for error messages
    pub fn describe_failure(&self) -> String {
        let code = match self.code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        };
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            code
        } else {
            format!("{}: {}", code, stderr)
        }
    }
}

/// Runs a program to completion in a working directory.
pub trait CommandRunner: Send + Sync {
    /// Fails only when the program could not be started. A non-zero exit is
    /// reported through [`CommandOutput::code`].
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> io::Result<CommandOutput>;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> io::Result<CommandOutput> {
        debug!(program, ?args, cwd = %cwd.display(), "running command");
        let output = Command::new(program).args(args).current_dir(cwd).output()?;
        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_failure() {
        assert_eq!(CommandOutput::failed(1, "").describe_failure(), "exit code 1");
        assert_eq!(
            CommandOutput::failed(128, "fatal: not a git repository\n").describe_failure(),
            "exit code 128: fatal: not a git repository"
        );
        let killed = CommandOutput {
            code: None,
            ..CommandOutput::default()
        };
        assert_eq!(killed.describe_failure(), "terminated by signal");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_captures_output() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "x").unwrap();

        let output = SystemCommandRunner.run("ls", &[], dir.path()).unwrap();
        assert!(output.success());
        assert!(output.stdout.contains("marker.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_reports_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let output = SystemCommandRunner
            .run("sh", &["-c", "echo nope >&2; exit 3"], dir.path())
            .unwrap();
        assert_eq!(output.code, Some(3));
        assert_eq!(output.stderr.trim(), "nope");
    }

    #[test]
    fn test_system_runner_missing_program() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SystemCommandRunner
            .run("definitely-not-a-real-program-xyz", &[], dir.path())
            .is_err());
    }
}
