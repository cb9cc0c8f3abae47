//! Error handling for artifact publishing
//!
//! This module provides the error types raised while resolving and publishing
//! artifacts, with recovery guidance using the thiserror crate.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for artifact publishing operations
#[derive(Error, Debug)]
pub enum PublishError {
    // Run-level preconditions
    #[error("Script path {} does not exist", path.display())]
    ScriptNotFound { path: PathBuf },

    #[error("Artifact directory {} does not exist", path.display())]
    ArtifactDirectoryNotFound { path: PathBuf },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Unable to fetch released package versions: {message}")]
    ReleasedVersionQuery { message: String },

    // Metadata resolution
    #[error("Unable to find artifact metadata for {package} Version {version}")]
    MetadataNotFound { package: String, version: String },

    #[error("Invalid artifact metadata in {}: {message}", path.display())]
    InvalidMetadata { path: PathBuf, message: String },

    #[error("Found {} metadata files for {package} Version {version}", paths.len())]
    DuplicateMetadata {
        package: String,
        version: String,
        paths: Vec<PathBuf>,
    },

    // Publishing
    #[error("Publish script failed for {package} Version {version}: {message}")]
    ScriptFailed {
        package: String,
        version: String,
        message: String,
    },

    // Version control
    #[error("Git command failed: {message}")]
    Git { message: String },

    // Filesystem
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PublishError {
    /// Get suggested actions for this error
    pub fn suggested_actions(&self) -> Vec<&'static str> {
        match self {
            Self::ScriptNotFound { .. } => vec![
                "Check the --scriptpath value",
                "Paths are resolved relative to the current directory",
            ],
            Self::ArtifactDirectoryNotFound { .. } => vec![
                "Check the --artifactdir value",
                "Make sure the build stage produced artifacts",
            ],
            Self::Config(_) => vec!["Check .publish-config.yaml and the PUBLISH_* variables"],
            Self::ReleasedVersionQuery { .. } => vec![
                "Check that sfdx is installed and on PATH",
                "Check that the devhub alias is authenticated",
            ],
            Self::MetadataNotFound { .. } => vec![
                "Check that every artifact has an artifact_metadata.json sidecar",
                "The filename version must match package_version_number",
            ],
            Self::InvalidMetadata { .. } => {
                vec!["Check that the sidecar file is a JSON object with package_name and package_version_number"]
            }
            Self::DuplicateMetadata { .. } => {
                vec!["Remove stale artifacts so each package version appears once"]
            }
            Self::ScriptFailed { .. } => vec![
                "Review the script output above",
                "Run the script manually with the same arguments",
            ],
            Self::Git { .. } => vec![
                "Check that the working directory is a git repository",
                "Check remote permissions when pushing tags",
            ],
            Self::Io { .. } => vec!["Check file permissions"],
        }
    }

    /// Get error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::ScriptNotFound { .. } => "SCRIPT_NOT_FOUND",
            Self::ArtifactDirectoryNotFound { .. } => "ARTIFACT_DIRECTORY_NOT_FOUND",
            Self::Config(_) => "CONFIG_ERROR",
            Self::ReleasedVersionQuery { .. } => "RELEASED_VERSION_QUERY_FAILED",
            Self::MetadataNotFound { .. } => "METADATA_NOT_FOUND",
            Self::InvalidMetadata { .. } => "INVALID_METADATA",
            Self::DuplicateMetadata { .. } => "DUPLICATE_METADATA",
            Self::ScriptFailed { .. } => "SCRIPT_FAILED",
            Self::Git { .. } => "GIT_ERROR",
            Self::Io { .. } => "IO_ERROR",
        }
    }
}
