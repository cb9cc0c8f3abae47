//! Configuration file loader for artifact-publisher
//!
//! This module provides configuration loading and merging across the
//! project file, environment variables and CLI arguments.

use super::config::*;
use crate::core::error::PublishError;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Configuration file name
pub const CONFIG_FILENAME: &str = ".publish-config.yaml";

lazy_static! {
    /// Environment variable reference (${VAR_NAME})
    static ref ENV_VAR_REGEX: Regex =
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("env var pattern is valid");
}

/// Configuration load options
#[derive(Debug, Clone, Default)]
pub struct ConfigLoadOptions {
    /// Directory searched for `.publish-config.yaml`
    pub project_path: PathBuf,

    /// Explicit config file; must exist when given
    pub config_file: Option<PathBuf>,

    /// CLI arguments (highest priority)
    pub cli_args: Option<PublishConfig>,

    /// Environment variables
    pub env: HashMap<String, String>,
}

/// Configuration file loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from multiple sources with priority
    ///
    /// Priority (high to low):
    /// 1. CLI arguments
    /// 2. Environment variables
    /// 3. Project config (./.publish-config.yaml or --config)
    /// 4. Default values
    pub async fn load(options: ConfigLoadOptions) -> Result<RunConfig, PublishError> {
        let mut configs: Vec<PublishConfig> = Vec::new();

        // 4. Default values (lowest priority)
        configs.push(PublishConfig::default());

        // 3. Project config
        let file_config = match &options.config_file {
            Some(path) => Some(Self::load_required_file(path).await?),
            None => Self::load_config_file(&options.project_path.join(CONFIG_FILENAME)).await?,
        };
        if let Some(file_config) = file_config {
            configs.push(file_config);
        }

        // 2. Environment variables
        if let Some(env_config) = Self::load_env_config(&options.env)? {
            configs.push(env_config);
        }

        // 1. CLI arguments (highest priority)
        if let Some(cli_config) = options.cli_args {
            configs.push(cli_config);
        }

        let merged = Self::merge_configs(configs);
        let expanded = Self::expand_env_vars(merged, &options.env);

        expanded.resolve()
    }

    async fn load_required_file(file_path: &Path) -> Result<PublishConfig, PublishError> {
        Self::load_config_file(file_path).await?.ok_or_else(|| {
            PublishError::Config(format!("config file {} not found", file_path.display()))
        })
    }

    /// Load configuration from a YAML file, `None` when it does not exist
    async fn load_config_file(file_path: &Path) -> Result<Option<PublishConfig>, PublishError> {
        if !fs::try_exists(file_path).await.unwrap_or(false) {
            return Ok(None);
        }

        let content = fs::read_to_string(file_path).await.map_err(|e| {
            PublishError::Config(format!("Failed to read config file: {}", e))
        })?;

        let config: PublishConfig = serde_yaml::from_str(&content).map_err(|e| {
            PublishError::Config(format!("Failed to parse YAML config: {}", e))
        })?;

        tracing::debug!(path = %file_path.display(), "loaded config file");
        Ok(Some(config))
    }

    /// Load configuration from environment variables
    fn load_env_config(env: &HashMap<String, String>) -> Result<Option<PublishConfig>, PublishError> {
        let mut config = PublishConfig::default();
        let mut has_changes = false;

        if let Some(dir) = env.get("PUBLISH_ARTIFACT_DIR") {
            config.artifact_dir = Some(PathBuf::from(dir));
            has_changes = true;
        }

        if let Some(script) = env.get("PUBLISH_SCRIPT_PATH") {
            config.script_path = Some(PathBuf::from(script));
            has_changes = true;
        }

        if let Some(value) = env.get("PUBLISH_PROMOTED_ONLY") {
            config.publish_promoted_only = Some(parse_bool("PUBLISH_PROMOTED_ONLY", value)?);
            has_changes = true;
        }

        if let Some(alias) = env.get("PUBLISH_DEVHUB_ALIAS") {
            config.devhub_alias = Some(alias.clone());
            has_changes = true;
        }

        if let Some(tag) = env.get("PUBLISH_RUN_TAG") {
            config.tag = Some(tag.clone());
            has_changes = true;
        }

        if let Some(value) = env.get("PUBLISH_GIT_TAG") {
            config.git_tag = Some(parse_bool("PUBLISH_GIT_TAG", value)?);
            has_changes = true;
        }

        if let Some(value) = env.get("PUBLISH_PUSH_GIT_TAG") {
            config.push_git_tag = Some(parse_bool("PUBLISH_PUSH_GIT_TAG", value)?);
            has_changes = true;
        }

        // SFPOWERSCRIPTS_STATSD=true enables the statsd sink
        if env.get("SFPOWERSCRIPTS_STATSD").map(|s| s.as_str()) == Some("true") {
            let host = env
                .get("SFPOWERSCRIPTS_STATSD_HOST")
                .cloned()
                .unwrap_or_else(|| "localhost".to_string());
            let port = match env.get("SFPOWERSCRIPTS_STATSD_PORT") {
                Some(port) => port.parse().map_err(|_| {
                    PublishError::Config(format!("SFPOWERSCRIPTS_STATSD_PORT is not a port: {}", port))
                })?,
                None => DEFAULT_STATSD_PORT,
            };

            config.metrics = Some(MetricsConfig {
                statsd: Some(StatsdConfig {
                    host,
                    port,
                    prefix: DEFAULT_STATSD_PREFIX.to_string(),
                }),
            });
            has_changes = true;
        }

        Ok(if has_changes { Some(config) } else { None })
    }

    /// Merge multiple configurations with priority
    fn merge_configs(configs: Vec<PublishConfig>) -> PublishConfig {
        let mut result = PublishConfig::default();

        for config in configs {
            Self::merge_into(&mut result, config);
        }

        result
    }

    /// Merge source config into target
    fn merge_into(target: &mut PublishConfig, source: PublishConfig) {
        if source.artifact_dir.is_some() {
            target.artifact_dir = source.artifact_dir;
        }
        if source.script_path.is_some() {
            target.script_path = source.script_path;
        }
        if source.publish_promoted_only.is_some() {
            target.publish_promoted_only = source.publish_promoted_only;
        }
        if source.devhub_alias.is_some() {
            target.devhub_alias = source.devhub_alias;
        }
        if source.tag.is_some() {
            target.tag = source.tag;
        }
        if source.git_tag.is_some() {
            target.git_tag = source.git_tag;
        }
        if source.push_git_tag.is_some() {
            target.push_git_tag = source.push_git_tag;
        }
        if source.git_identity.is_some() {
            target.git_identity = source.git_identity;
        }
        if source.metrics.is_some() {
            target.metrics = source.metrics;
        }
    }

    /// Expand ${VAR} references in path and string settings
    fn expand_env_vars(mut config: PublishConfig, env: &HashMap<String, String>) -> PublishConfig {
        let expand_path =
            |path: PathBuf| PathBuf::from(Self::expand_string(&path.to_string_lossy(), env));

        config.artifact_dir = config.artifact_dir.map(&expand_path);
        config.script_path = config.script_path.map(&expand_path);
        config.devhub_alias = config.devhub_alias.map(|s| Self::expand_string(&s, env));
        config.tag = config.tag.map(|s| Self::expand_string(&s, env));

        config
    }

    /// Expand environment variables in a single string
    ///
    /// Unknown variables are left in place.
    fn expand_string(input: &str, env: &HashMap<String, String>) -> String {
        ENV_VAR_REGEX
            .replace_all(input, |caps: &regex::Captures| match env.get(&caps[1]) {
                Some(value) => value.clone(),
                None => {
                    tracing::warn!(variable = &caps[1], "environment variable not found");
                    caps[0].to_string()
                }
            })
            .into_owned()
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, PublishError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(PublishError::Config(format!("{} is not a boolean: {}", name, other))),
    }
}
