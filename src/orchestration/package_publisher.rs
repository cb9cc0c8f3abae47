//! Package Publisher - processes a single artifact
//!
//! Each artifact goes through the same steps:
//! - Filename identity parsing (non-conforming names are skipped)
//! - Metadata resolution against every known sidecar
//! - Promotion check in promoted-only runs
//! - Publishing through the injected `Publisher`
//!
//! Every failure is converted into a `PublishOutcome`; nothing here aborts
//! the batch.

use crate::artifacts::identity::CandidateIdentity;
use crate::artifacts::locator::ArtifactReference;
use crate::artifacts::metadata::MetadataResolver;
use crate::core::traits::{PackageTag, PackageType, PublishRequest, Publisher};
use crate::core::version::normalize_version;
use crate::orchestration::promotion::{Eligibility, PromotionFilter};

/// Revision every package tag points at
pub const TAG_TARGET: &str = "HEAD";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Published,
    SkippedNotPromoted,
    Failed,
}

/// Result of processing one artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    pub package_name: String,
    /// Version as embedded in the filename
    pub raw_version: String,
    /// Dot-separated version
    pub version: String,
    /// Unknown when metadata could not be resolved
    pub package_type: Option<PackageType>,
    pub tag_name: String,
    pub status: OutcomeStatus,
    pub error: Option<String>,
}

impl PublishOutcome {
    fn new(candidate: &CandidateIdentity, status: OutcomeStatus) -> Self {
        let version = normalize_version(&candidate.raw_version);
        Self {
            tag_name: format!("{}_v{}", candidate.package_name, version),
            package_name: candidate.package_name.clone(),
            raw_version: candidate.raw_version.clone(),
            version,
            package_type: None,
            status,
            error: None,
        }
    }

    /// Label used in the failure list: `<name> v<raw version>`
    pub fn label(&self) -> String {
        format!("{} v{}", self.package_name, self.raw_version)
    }

    pub fn is_failure(&self) -> bool {
        self.status != OutcomeStatus::Published
    }

    /// Annotated tag recording this outcome; only published artifacts get one
    pub fn tag(&self) -> Option<PackageTag> {
        if self.status != OutcomeStatus::Published {
            return None;
        }
        let package_type = self.package_type.as_ref()?;

        Some(PackageTag {
            name: self.tag_name.clone(),
            message: format!(
                "{} {} Package {}",
                self.package_name, package_type, self.version
            ),
            target: TAG_TARGET.to_string(),
        })
    }
}

/// Runs the per-artifact steps against shared run resources
pub struct PackagePublisher<'a> {
    resolver: &'a MetadataResolver,
    filter: &'a PromotionFilter,
    publisher: &'a dyn Publisher,
}

impl<'a> PackagePublisher<'a> {
    pub fn new(
        resolver: &'a MetadataResolver,
        filter: &'a PromotionFilter,
        publisher: &'a dyn Publisher,
    ) -> Self {
        Self {
            resolver,
            filter,
            publisher,
        }
    }

    /// Process one artifact
    ///
    /// Returns `None` when the archive name does not follow the artifact
    /// naming convention; such artifacts are not counted anywhere.
    pub async fn process(&self, artifact: &ArtifactReference) -> Option<PublishOutcome> {
        let candidate = CandidateIdentity::from_archive_path(&artifact.archive_path)?;

        let resolved = match self.resolver.resolve(&candidate) {
            Ok(resolved) => resolved,
            Err(e) => {
                println!("{}", e);
                let mut outcome = PublishOutcome::new(&candidate, OutcomeStatus::Failed);
                outcome.error = Some(e.to_string());
                return Some(outcome);
            }
        };

        let mut outcome = PublishOutcome::new(&candidate, OutcomeStatus::Published);
        outcome.package_type = Some(resolved.record.package_type.clone());

        if let Eligibility::NotPromoted { package_version_id } =
            self.filter.evaluate(&resolved.record)
        {
            println!(
                "Skipping {} Version {}. Package Version Id {} has not been promoted.",
                candidate.package_name,
                candidate.raw_version,
                package_version_id.as_deref().unwrap_or("<none>")
            );
            outcome.status = OutcomeStatus::SkippedNotPromoted;
            return Some(outcome);
        }

        println!(
            "Publishing {} Version {}...",
            candidate.package_name, candidate.raw_version
        );

        let request = PublishRequest {
            package_name: candidate.package_name.clone(),
            raw_version: candidate.raw_version.clone(),
            archive_path: artifact.archive_path.clone(),
            promoted_only: self.filter.is_active(),
        };

        if let Err(e) = self.publisher.publish(&request).await {
            println!("{}", e);
            tracing::debug!(
                publisher = self.publisher.name(),
                package = %candidate.package_name,
                error = %e,
                "publish failed"
            );
            outcome.status = OutcomeStatus::Failed;
            outcome.error = Some(e.to_string());
        }

        Some(outcome)
    }
}
