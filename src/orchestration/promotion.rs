//! Promotion filter for promoted-only runs

use crate::artifacts::metadata::PackageMetadataRecord;
use crate::core::traits::ReleasedVersions;

/// Whether an artifact may be published
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    /// Unlocked package whose version id is not in the released list
    NotPromoted { package_version_id: Option<String> },
}

/// Gates unlocked packages on the released version list
#[derive(Debug, Clone, Default)]
pub struct PromotionFilter {
    /// `None` when the run is not restricted to promoted versions
    released: Option<ReleasedVersions>,
}

impl PromotionFilter {
    /// Filter that lets every artifact through
    pub fn disabled() -> Self {
        Self { released: None }
    }

    pub fn promoted_only(released: ReleasedVersions) -> Self {
        Self {
            released: Some(released),
        }
    }

    pub fn is_active(&self) -> bool {
        self.released.is_some()
    }

    pub fn evaluate(&self, record: &PackageMetadataRecord) -> Eligibility {
        let Some(released) = &self.released else {
            return Eligibility::Eligible;
        };

        if !record.package_type.requires_promotion() {
            return Eligibility::Eligible;
        }

        match &record.package_version_id {
            Some(id) if released.contains(id) => Eligibility::Eligible,
            other => Eligibility::NotPromoted {
                package_version_id: other.clone(),
            },
        }
    }
}
