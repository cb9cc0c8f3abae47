//! Script Publisher - publishes artifacts through a user-supplied script
//!
//! The script is invoked once per artifact as
//! `<script> <package> <dash version> <archive path> <promoted only>`,
//! through `bash -e` on POSIX hosts and `cmd.exe /c` on Windows.

use crate::core::error::PublishError;
use crate::core::traits::{PublishRequest, Publisher};
use crate::security::command_executor::{SafeCommandExecutor, StdioPolicy};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::PathBuf;

/// Publisher backed by an external script
pub struct ScriptPublisher {
    script_path: PathBuf,
    executor: SafeCommandExecutor,
}

impl ScriptPublisher {
    pub fn new<P: Into<PathBuf>>(script_path: P, executor: SafeCommandExecutor) -> Self {
        Self {
            script_path: script_path.into(),
            executor,
        }
    }

    /// Interpreter and argv for one request
    fn command_line(&self, request: &PublishRequest) -> (&'static str, Vec<OsString>) {
        let (interpreter, flag) = if cfg!(windows) {
            ("cmd.exe", "/c")
        } else {
            ("bash", "-e")
        };

        let args = vec![
            OsString::from(flag),
            self.script_path.clone().into_os_string(),
            OsString::from(&request.package_name),
            OsString::from(&request.raw_version),
            request.archive_path.clone().into_os_string(),
            OsString::from(request.promoted_only.to_string()),
        ];

        (interpreter, args)
    }
}

#[async_trait]
impl Publisher for ScriptPublisher {
    fn name(&self) -> &str {
        "script"
    }

    async fn preflight(&self) -> Result<(), PublishError> {
        if tokio::fs::metadata(&self.script_path).await.is_err() {
            return Err(PublishError::ScriptNotFound {
                path: self.script_path.clone(),
            });
        }
        Ok(())
    }

    async fn publish(&self, request: &PublishRequest) -> Result<(), PublishError> {
        let (interpreter, args) = self.command_line(request);

        let output = self
            .executor
            .execute(interpreter, &args, StdioPolicy::InheritStderr)
            .await
            .map_err(|e| PublishError::ScriptFailed {
                package: request.package_name.clone(),
                version: request.raw_version.clone(),
                message: e.to_string(),
            })?;

        if !output.success() {
            return Err(PublishError::ScriptFailed {
                package: request.package_name.clone(),
                version: request.raw_version.clone(),
                message: output.failure_message(),
            });
        }

        Ok(())
    }
}
