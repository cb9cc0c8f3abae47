//! Git tag writer
//!
//! Creates annotated tags and pushes them with the git CLI. The tag author is
//! passed per invocation with `-c user.name=... -c user.email=...`, so the
//! repository and global git configuration are left untouched.

use crate::core::config::GitIdentity;
use crate::core::error::PublishError;
use crate::core::traits::{PackageTag, TagWriter};
use crate::security::command_executor::{SafeCommandExecutor, StdioPolicy};
use async_trait::async_trait;

pub struct GitTagWriter {
    executor: SafeCommandExecutor,
}

impl GitTagWriter {
    pub fn new(executor: SafeCommandExecutor) -> Self {
        Self { executor }
    }

    fn tag_args(tag: &PackageTag, identity: &GitIdentity) -> Vec<String> {
        vec![
            "-c".to_string(),
            format!("user.name={}", identity.name),
            "-c".to_string(),
            format!("user.email={}", identity.email),
            "tag".to_string(),
            "-a".to_string(),
            "-m".to_string(),
            tag.message.clone(),
            tag.name.clone(),
            tag.target.clone(),
        ]
    }

    async fn git(&self, args: &[String]) -> Result<(), PublishError> {
        let output = self
            .executor
            .execute("git", args, StdioPolicy::Capture)
            .await
            .map_err(|e| PublishError::Git {
                message: e.to_string(),
            })?;

        if !output.success() {
            return Err(PublishError::Git {
                message: output.failure_message(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl TagWriter for GitTagWriter {
    async fn create_annotated_tag(
        &self,
        tag: &PackageTag,
        identity: &GitIdentity,
    ) -> Result<(), PublishError> {
        self.git(&Self::tag_args(tag, identity)).await?;
        tracing::debug!(tag = %tag.name, target = %tag.target, "created annotated tag");
        Ok(())
    }

    async fn push_tags(&self) -> Result<(), PublishError> {
        self.git(&["push".to_string(), "--tags".to_string()]).await
    }
}
