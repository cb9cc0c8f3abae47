//! Core traits and types for artifact publishing
//!
//! This module defines the capability interfaces the orchestrator drives
//! (publishing, released-version lookup, tagging, metrics) and the value
//! types passed across them.

use crate::core::config::GitIdentity;
use crate::core::error::PublishError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::PathBuf;

// ============================================================================
// Package types
// ============================================================================

/// Distribution model of a package, as recorded in its sidecar metadata
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PackageType {
    Unlocked,
    Managed,
    Source,
    Data,
    Other(String),
}

impl PackageType {
    /// Only unlocked packages need to be promoted before they may be published
    /// in promoted-only mode.
    pub fn requires_promotion(&self) -> bool {
        matches!(self, Self::Unlocked)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Unlocked => "unlocked",
            Self::Managed => "managed",
            Self::Source => "source",
            Self::Data => "data",
            Self::Other(other) => other,
        }
    }
}

impl From<String> for PackageType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "unlocked" => Self::Unlocked,
            "managed" => Self::Managed,
            "source" => Self::Source,
            "data" => Self::Data,
            _ => Self::Other(value),
        }
    }
}

impl From<PackageType> for String {
    fn from(value: PackageType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Publishing
// ============================================================================

/// Arguments handed to the publisher for one artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    pub package_name: String,
    /// Version exactly as embedded in the filename (dash form)
    pub raw_version: String,
    pub archive_path: PathBuf,
    pub promoted_only: bool,
}

/// Publishes a single artifact to the registry
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publisher name used in logs
    fn name(&self) -> &str;

    /// Check run-level preconditions before any artifact is processed
    ///
    /// Default implementation has no preconditions.
    async fn preflight(&self) -> Result<(), PublishError> {
        Ok(())
    }

    /// Publish one artifact. An error fails this artifact only.
    async fn publish(&self, request: &PublishRequest) -> Result<(), PublishError>;
}

// ============================================================================
// Released versions
// ============================================================================

/// Set of subscriber package version ids that have been promoted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleasedVersions {
    ids: HashSet<String>,
}

impl ReleasedVersions {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, version_id: &str) -> bool {
        self.ids.contains(version_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Source of released package versions, queried once per promoted-only run
#[async_trait]
pub trait ReleasedVersionSource: Send + Sync {
    async fn released_versions(&self) -> Result<ReleasedVersions, PublishError>;
}

// ============================================================================
// Tagging
// ============================================================================

/// Annotated tag to create for a published package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageTag {
    pub name: String,
    pub message: String,
    /// Revision the tag points at
    pub target: String,
}

/// Creates and pushes version-control tags
#[async_trait]
pub trait TagWriter: Send + Sync {
    /// Create one annotated tag, authored by `identity`
    async fn create_annotated_tag(
        &self,
        tag: &PackageTag,
        identity: &GitIdentity,
    ) -> Result<(), PublishError>;

    /// Push every local tag to the remote in one operation
    async fn push_tags(&self) -> Result<(), PublishError>;
}

// ============================================================================
// Metrics
// ============================================================================

/// Dimensions attached to every gauge of a run
pub type MetricDimensions = BTreeMap<String, String>;

/// Receives gauges emitted by the run reporter
///
/// Sinks must not fail the run; transport problems are theirs to log.
pub trait MetricsSink: Send + Sync {
    fn gauge(&self, name: &str, value: f64, dimensions: &MetricDimensions);
}
