//! Sidecar metadata records and the resolver that matches them to artifacts

use crate::artifacts::identity::CandidateIdentity;
use crate::core::error::PublishError;
use crate::core::traits::PackageType;
use crate::core::version::normalize_version;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Authoritative package identity loaded from a sidecar file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadataRecord {
    pub package_name: String,
    /// Dot-separated version
    pub package_version_number: String,
    pub package_type: PackageType,
    /// Subscriber package version id; absent for source and data packages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_version_id: Option<String>,
}

impl PackageMetadataRecord {
    pub fn load(path: &Path) -> Result<Self, PublishError> {
        let content = fs::read_to_string(path).map_err(|source| PublishError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|e| PublishError::InvalidMetadata {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn matches(&self, package_name: &str, version: &str) -> bool {
        self.package_name == package_name && self.package_version_number == version
    }
}

/// A metadata record together with the file it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMetadata {
    pub record: PackageMetadataRecord,
    pub path: PathBuf,
}

/// Matches candidate identities against every known sidecar file
pub struct MetadataResolver {
    metadata_paths: Vec<PathBuf>,
}

impl MetadataResolver {
    pub fn new(metadata_paths: Vec<PathBuf>) -> Self {
        Self { metadata_paths }
    }

    /// Find the sidecar record for `candidate`
    ///
    /// A record matches when its name equals the candidate's name and its
    /// version equals the candidate's normalized version. Unreadable sidecars
    /// are logged and skipped.
    ///
    /// # Errors
    ///
    /// - `PublishError::MetadataNotFound` - no sidecar matches
    /// - `PublishError::DuplicateMetadata` - more than one sidecar matches
    pub fn resolve(&self, candidate: &CandidateIdentity) -> Result<ResolvedMetadata, PublishError> {
        let version = normalize_version(&candidate.raw_version);
        let mut matches = Vec::new();

        for path in &self.metadata_paths {
            let record = match PackageMetadataRecord::load(path) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable metadata");
                    continue;
                }
            };

            if record.matches(&candidate.package_name, &version) {
                matches.push(ResolvedMetadata {
                    record,
                    path: path.clone(),
                });
            }
        }

        if matches.len() > 1 {
            return Err(PublishError::DuplicateMetadata {
                package: candidate.package_name.clone(),
                version,
                paths: matches.into_iter().map(|m| m.path).collect(),
            });
        }

        matches.pop().ok_or(PublishError::MetadataNotFound {
            package: candidate.package_name.clone(),
            version,
        })
    }
}
