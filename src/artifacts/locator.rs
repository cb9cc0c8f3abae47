//! Artifact locator for discovering archives and their sidecar metadata
//!
//! Walks the artifact directory once and returns every artifact archive
//! together with every sidecar metadata file found alongside them.

use crate::core::error::PublishError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Marker every artifact archive name carries
pub const ARTIFACT_MARKER: &str = "sfpowerscripts_artifact";

/// Name of the metadata file an artifact unit carries
pub const METADATA_FILENAME: &str = "artifact_metadata.json";

/// One discovered artifact archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactReference {
    pub archive_path: PathBuf,
    /// Sidecar next to the archive, if any. Identity is resolved by content,
    /// so this may describe a different artifact.
    pub metadata_path: Option<PathBuf>,
}

/// Everything the locator found in one directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactInventory {
    pub artifacts: Vec<ArtifactReference>,
    pub metadata_paths: Vec<PathBuf>,
}

/// Scans an artifact directory
pub struct ArtifactLocator {
    artifact_dir: PathBuf,
}

impl ArtifactLocator {
    pub fn new<P: Into<PathBuf>>(artifact_dir: P) -> Self {
        Self {
            artifact_dir: artifact_dir.into(),
        }
    }

    /// Locate artifact archives and sidecar metadata files
    ///
    /// Entries are returned in traversal order.
    ///
    /// # Errors
    ///
    /// Returns `PublishError::ArtifactDirectoryNotFound` if the directory does
    /// not exist or is not a directory.
    pub fn locate(&self) -> Result<ArtifactInventory, PublishError> {
        if !self.artifact_dir.is_dir() {
            return Err(PublishError::ArtifactDirectoryNotFound {
                path: self.artifact_dir.clone(),
            });
        }

        let mut archives = Vec::new();
        let mut metadata_paths = Vec::new();
        let mut seen_metadata = HashSet::new();

        // Symlinks are not followed, so an aliased directory is scanned once
        for entry in WalkDir::new(&self.artifact_dir)
            .into_iter()
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable entry");
                    None
                }
            })
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let Some(file_name) = entry.file_name().to_str() else {
                continue;
            };

            if is_artifact_archive(file_name) {
                archives.push(entry.path().to_path_buf());
            } else if is_metadata_file(file_name)
                && seen_metadata.insert(entry.path().to_path_buf())
            {
                metadata_paths.push(entry.path().to_path_buf());
            }
        }

        let artifacts = archives
            .into_iter()
            .map(|archive_path| ArtifactReference {
                metadata_path: sidecar_for(&archive_path),
                archive_path,
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            dir = %self.artifact_dir.display(),
            artifacts = artifacts.len(),
            metadata_files = metadata_paths.len(),
            "located artifacts"
        );

        Ok(ArtifactInventory {
            artifacts,
            metadata_paths,
        })
    }
}

fn is_artifact_archive(file_name: &str) -> bool {
    file_name.contains(ARTIFACT_MARKER) && file_name.ends_with(".zip")
}

fn is_metadata_file(file_name: &str) -> bool {
    file_name == METADATA_FILENAME
        || file_name.ends_with(&format!("_{}", METADATA_FILENAME))
        || (file_name.contains(ARTIFACT_MARKER) && file_name.ends_with("_metadata.json"))
}

/// Positional guess at the sidecar belonging to an archive
fn sidecar_for(archive_path: &Path) -> Option<PathBuf> {
    let parent = archive_path.parent()?;
    let stem = archive_path.file_stem()?.to_str()?;

    [
        parent.join(format!("{}_metadata.json", stem)),
        parent.join(stem).join(METADATA_FILENAME),
        parent.join(METADATA_FILENAME),
    ]
    .into_iter()
    .find(|candidate| candidate.is_file())
}
