//! External command execution.
//!
//! Commands are spawned directly, without a shell, so paths and tokens are
//! passed as arguments and never re-parsed.

use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::error::{OnboardError, Result};

/// Result of executing a command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

/// Render a program and its arguments for messages.
pub fn display_command(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Execute `program` with `args` and capture its output.
///
/// Stdin is null. A program that cannot be spawned is
/// [`OnboardError::CommandFailed`] with no exit code. A non-zero exit is
/// reported in the result, not as an error.
pub fn execute(program: &str, args: &[&str], cwd: Option<&Path>) -> Result<CommandResult> {
    let start = Instant::now();
    let rendered = display_command(program, args);
    tracing::debug!("running: {}", rendered);

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(cwd) = cwd {
        cmd.current_dir(cwd);
    }

    let output = cmd.output().map_err(|e| {
        tracing::debug!("failed to spawn {}: {}", program, e);
        OnboardError::CommandFailed {
            command: rendered.clone(),
            code: None,
        }
    })?;

    let result = CommandResult {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        duration: start.elapsed(),
        success: output.status.success(),
    };

    tracing::debug!(
        "{} exited with {:?} after {:?}",
        rendered,
        result.exit_code,
        result.duration
    );
    Ok(result)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn execute_successful_command() {
        let result = execute("echo", &["hello"], None).unwrap();

        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert_eq!(result.stdout.trim(), "hello");
    }

    #[test]
    fn execute_failing_command() {
        let result = execute("sh", &["-c", "echo oops >&2; exit 3"], None).unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, Some(3));
        assert_eq!(result.stderr.trim(), "oops");
    }

    #[test]
    fn execute_with_cwd() {
        let temp = TempDir::new().unwrap();
        let result = execute("pwd", &[], Some(temp.path())).unwrap();

        let name = temp.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(result.stdout.contains(&name));
    }

    #[test]
    fn missing_program_is_command_failed() {
        let err = execute("vault-onboard-no-such-program", &[], None).unwrap_err();
        assert!(matches!(err, OnboardError::CommandFailed { code: None, .. }));
    }

    #[test]
    fn display_command_joins_args() {
        assert_eq!(
            display_command("docker", &["compose", "up", "-d"]),
            "docker compose up -d"
        );
    }
}
