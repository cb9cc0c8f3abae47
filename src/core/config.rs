//! Configuration structures and types for artifact-publisher
//!
//! `PublishConfig` is one configuration layer (defaults, project file,
//! environment, CLI); layers are merged by the config loader and resolved
//! into an immutable `RunConfig`.

use crate::core::error::PublishError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default artifact directory, relative to the working directory
pub const DEFAULT_ARTIFACT_DIR: &str = "artifacts";

/// Default statsd metric prefix
pub const DEFAULT_STATSD_PREFIX: &str = "sfpowerscripts";

/// Default statsd port
pub const DEFAULT_STATSD_PORT: u16 = 8125;

/// One configuration layer; every field is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PublishConfig {
    /// Directory holding the artifacts to publish
    #[serde(skip_serializing_if = "Option::is_none", rename = "artifactDir")]
    pub artifact_dir: Option<PathBuf>,

    /// Publish script invoked once per artifact
    #[serde(skip_serializing_if = "Option::is_none", rename = "scriptPath")]
    pub script_path: Option<PathBuf>,

    /// Only publish unlocked packages that have been promoted
    #[serde(skip_serializing_if = "Option::is_none", rename = "publishPromotedOnly")]
    pub publish_promoted_only: Option<bool>,

    /// Devhub alias used to query released package versions
    #[serde(skip_serializing_if = "Option::is_none", rename = "devhubAlias")]
    pub devhub_alias: Option<String>,

    /// Free-form tag attached to emitted metrics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    /// Create a git tag per published artifact
    #[serde(skip_serializing_if = "Option::is_none", rename = "gitTag")]
    pub git_tag: Option<bool>,

    /// Push created tags to the remote
    #[serde(skip_serializing_if = "Option::is_none", rename = "pushGitTag")]
    pub push_git_tag: Option<bool>,

    /// Identity used to author tags
    #[serde(skip_serializing_if = "Option::is_none", rename = "gitIdentity")]
    pub git_identity: Option<GitIdentity>,

    /// Metrics transport settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricsConfig>,
}

/// Author identity for created tags
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GitIdentity {
    pub name: String,
    pub email: String,
}

impl Default for GitIdentity {
    fn default() -> Self {
        Self {
            name: "sfpowerscripts".to_string(),
            email: "sfpowerscripts@dxscale".to_string(),
        }
    }
}

/// Metrics configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetricsConfig {
    /// StatsD transport (metrics are only logged when absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statsd: Option<StatsdConfig>,
}

/// StatsD endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatsdConfig {
    pub host: String,

    #[serde(default = "default_statsd_port")]
    pub port: u16,

    #[serde(default = "default_statsd_prefix")]
    pub prefix: String,
}

fn default_statsd_port() -> u16 {
    DEFAULT_STATSD_PORT
}

fn default_statsd_prefix() -> String {
    DEFAULT_STATSD_PREFIX.to_string()
}

/// Fully resolved settings for one publish run
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub artifact_dir: PathBuf,
    pub script_path: PathBuf,
    pub promoted_only: bool,
    pub devhub_alias: Option<String>,
    pub run_tag: Option<String>,
    pub git_tag: bool,
    pub push_git_tag: bool,
    pub git_identity: GitIdentity,
    pub statsd: Option<StatsdConfig>,
}

impl PublishConfig {
    /// Resolve a merged configuration into run settings
    ///
    /// # Errors
    ///
    /// Returns `PublishError::Config` when the script path is missing or
    /// promoted-only mode is requested without a devhub alias.
    pub fn resolve(self) -> Result<RunConfig, PublishError> {
        let script_path = self
            .script_path
            .ok_or_else(|| PublishError::Config("a publish script path is required".to_string()))?;

        let promoted_only = self.publish_promoted_only.unwrap_or(false);
        let devhub_alias = self.devhub_alias.filter(|alias| !alias.trim().is_empty());

        if promoted_only && devhub_alias.is_none() {
            return Err(PublishError::Config(
                "publishing promoted artifacts only requires a devhub alias".to_string(),
            ));
        }

        Ok(RunConfig {
            artifact_dir: self
                .artifact_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTIFACT_DIR)),
            script_path,
            promoted_only,
            devhub_alias,
            run_tag: self.tag,
            git_tag: self.git_tag.unwrap_or(false),
            push_git_tag: self.push_git_tag.unwrap_or(false),
            git_identity: self.git_identity.unwrap_or_default(),
            statsd: self.metrics.and_then(|m| m.statsd),
        })
    }
}
