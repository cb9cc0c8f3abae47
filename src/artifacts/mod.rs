//! Artifact discovery and identity resolution
//!
//! Locates artifact archives on disk, recovers a candidate identity from each
//! archive name and matches it against sidecar metadata.

pub mod identity;
pub mod locator;
pub mod metadata;

pub use identity::CandidateIdentity;
pub use locator::{ArtifactInventory, ArtifactLocator, ArtifactReference};
pub use metadata::{MetadataResolver, PackageMetadataRecord, ResolvedMetadata};
