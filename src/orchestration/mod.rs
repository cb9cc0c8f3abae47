//! Orchestration layer for artifact publishing
//!
//! This module drives a publish run: per-artifact processing, the promotion
//! gate, tagging and the end-of-run report.

pub mod batch_publisher;
pub mod package_publisher;
pub mod promotion;
pub mod reporter;

#[cfg(test)]
pub(crate) mod fakes;

// Re-export main types for convenience
pub use batch_publisher::{BatchPublisher, RunReport};
pub use package_publisher::{OutcomeStatus, PackagePublisher, PublishOutcome};
pub use promotion::{Eligibility, PromotionFilter};
pub use reporter::{format_elapsed, render_summary, RunReporter, RunSummary};
