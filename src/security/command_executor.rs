//! SafeCommandExecutor: allow-listed external command execution
//!
//! # Security Features
//!
//! - **Whitelist-based validation**: Only pre-approved programs can execute
//! - **Injection prevention**: Arguments are passed as a vector to
//!   `tokio::process::Command`, never interpolated into a shell string
//! - **Working directory validation**: Validates existence before execution
//!
//! # Example
//!
//! ```rust,no_run
//! use artifact_publisher::{SafeCommandExecutor, StdioPolicy};
//!
//! # async fn example() -> Result<(), artifact_publisher::CommandError> {
//! let executor = SafeCommandExecutor::new(std::env::current_dir().unwrap())?;
//! let output = executor
//!     .execute("git", &["rev-parse", "HEAD"], StdioPolicy::Capture)
//!     .await?;
//! println!("{}", output.stdout);
//! # Ok(())
//! # }
//! ```

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::process::Command;

/// Allowed programs.
///
/// The publish script runs through a shell interpreter, released versions are
/// queried with sfdx and tags are written with git.
const ALLOWED_COMMANDS: &[&str] = &["bash", "cmd.exe", "git", "sfdx"];

/// Errors that can occur during command execution
#[derive(Error, Debug)]
pub enum CommandError {
    /// Command is not in the allowed whitelist
    #[error("Command '{0}' is not in the allowed whitelist")]
    CommandNotAllowed(String),

    /// Working directory does not exist or is not accessible
    #[error("Working directory does not exist: {0}")]
    InvalidWorkingDirectory(PathBuf),

    /// Command could not be started (e.g., binary not found, permission denied)
    #[error("Command execution failed: {0}")]
    ExecutionFailed(String),
}

/// How the child's standard streams are wired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdioPolicy {
    /// Capture stdout and stderr
    Capture,
    /// Discard stdout, pass stderr through to the operator
    InheritStderr,
}

/// Output of a finished command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: ExitStatus,
    /// Empty unless stdout was captured
    pub stdout: String,
    /// Empty unless stderr was captured
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Best description of a failure: captured stderr, or the exit status
    pub fn failure_message(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            format!("command exited with {}", self.status)
        } else {
            stderr.to_string()
        }
    }
}

/// Safe command executor with security controls
#[derive(Debug, Clone)]
pub struct SafeCommandExecutor {
    /// Working directory where commands will be executed
    working_dir: PathBuf,
}

impl SafeCommandExecutor {
    /// Create a new SafeCommandExecutor with working directory validation.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::InvalidWorkingDirectory` if the directory does not exist.
    pub fn new<P: AsRef<Path>>(working_dir: P) -> Result<Self, CommandError> {
        let working_dir = working_dir.as_ref().to_path_buf();

        if !working_dir.is_dir() {
            return Err(CommandError::InvalidWorkingDirectory(working_dir));
        }

        Ok(Self { working_dir })
    }

    /// Execute a command and wait for it to finish.
    ///
    /// A nonzero exit status is not an error here; callers inspect
    /// `CommandOutput::status`.
    ///
    /// # Errors
    ///
    /// - `CommandError::CommandNotAllowed` - Command not in whitelist
    /// - `CommandError::ExecutionFailed` - Binary not found or execution error
    pub async fn execute<S: AsRef<OsStr>>(
        &self,
        command: &str,
        args: &[S],
        stdio: StdioPolicy,
    ) -> Result<CommandOutput, CommandError> {
        if !ALLOWED_COMMANDS.contains(&command) {
            return Err(CommandError::CommandNotAllowed(command.to_string()));
        }

        // sfdx ships as a .cmd shim on Windows
        #[cfg(target_os = "windows")]
        let command_name = if command == "sfdx" {
            format!("{}.cmd", command)
        } else {
            command.to_string()
        };

        #[cfg(not(target_os = "windows"))]
        let command_name = command.to_string();

        let mut cmd = Command::new(&command_name);
        cmd.args(args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null());

        match stdio {
            StdioPolicy::Capture => {
                cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
            }
            StdioPolicy::InheritStderr => {
                cmd.stdout(Stdio::null()).stderr(Stdio::inherit());
            }
        }

        tracing::debug!(command = %command_name, "executing command");

        // Command::output() pipes both streams regardless of the policy
        let child = cmd
            .spawn()
            .map_err(|e| CommandError::ExecutionFailed(format!("{}: {}", command_name, e)))?;
        let output = child
            .wait_with_output()
            .await
            .map_err(|e| CommandError::ExecutionFailed(format!("{}: {}", command_name, e)))?;

        Ok(CommandOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
