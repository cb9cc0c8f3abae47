//! Released versions lookup through the sfdx CLI
//!
//! Runs `sfdx force:package:version:list --released -v <alias> --json` and
//! collects the subscriber package version ids from its `result` array.

use crate::core::error::PublishError;
use crate::core::traits::{ReleasedVersionSource, ReleasedVersions};
use crate::security::command_executor::{SafeCommandExecutor, StdioPolicy};
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct PackageVersionListResponse {
    #[serde(default)]
    result: Vec<PackageVersionEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PackageVersionEntry {
    subscriber_package_version_id: String,
}

/// Queries the devhub for promoted package versions
pub struct SfdxReleasedVersions {
    devhub_alias: String,
    executor: SafeCommandExecutor,
}

impl SfdxReleasedVersions {
    pub fn new(devhub_alias: impl Into<String>, executor: SafeCommandExecutor) -> Self {
        Self {
            devhub_alias: devhub_alias.into(),
            executor,
        }
    }

    fn parse_response(stdout: &str) -> Result<ReleasedVersions, PublishError> {
        let response: PackageVersionListResponse =
            serde_json::from_str(stdout).map_err(|e| PublishError::ReleasedVersionQuery {
                message: format!("unexpected sfdx output: {}", e),
            })?;

        Ok(ReleasedVersions::new(
            response
                .result
                .into_iter()
                .map(|entry| entry.subscriber_package_version_id),
        ))
    }
}

#[async_trait]
impl ReleasedVersionSource for SfdxReleasedVersions {
    async fn released_versions(&self) -> Result<ReleasedVersions, PublishError> {
        let args = [
            "force:package:version:list",
            "--released",
            "-v",
            self.devhub_alias.as_str(),
            "--json",
        ];

        let output = self
            .executor
            .execute("sfdx", &args, StdioPolicy::Capture)
            .await
            .map_err(|e| PublishError::ReleasedVersionQuery {
                message: e.to_string(),
            })?;

        if !output.success() {
            return Err(PublishError::ReleasedVersionQuery {
                message: output.failure_message(),
            });
        }

        let released = Self::parse_response(&output.stdout)?;
        tracing::debug!(
            devhub = %self.devhub_alias,
            count = released.len(),
            "fetched released package versions"
        );

        Ok(released)
    }
}
