//! Batch Publisher - publishes every artifact in a directory
//!
//! Run flow:
//! - Publisher preflight (the publish script must exist)
//! - Released-version query in promoted-only runs
//! - Artifact discovery
//! - Sequential per-artifact processing with isolated failures
//! - Tag creation, only when no artifact failed
//! - Summary and gauges, always

use crate::artifacts::locator::ArtifactLocator;
use crate::artifacts::metadata::MetadataResolver;
use crate::core::config::RunConfig;
use crate::core::error::PublishError;
use crate::core::traits::{MetricsSink, Publisher, ReleasedVersionSource, TagWriter};
use crate::orchestration::package_publisher::{OutcomeStatus, PackagePublisher, PublishOutcome};
use crate::orchestration::promotion::PromotionFilter;
use crate::orchestration::reporter::{RunReporter, RunSummary};
use chrono::Utc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// Accumulators owned by a single run
#[derive(Debug, Default)]
struct RunState {
    outcomes: Vec<PublishOutcome>,
    published_count: usize,
    failed_labels: Vec<String>,
    tags_created: Vec<String>,
    tags_pushed: bool,
}

impl RunState {
    fn record(&mut self, outcome: PublishOutcome) {
        match outcome.status {
            OutcomeStatus::Published => self.published_count += 1,
            OutcomeStatus::SkippedNotPromoted | OutcomeStatus::Failed => {
                self.failed_labels.push(outcome.label())
            }
        }
        self.outcomes.push(outcome);
    }
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub summary: RunSummary,
    /// Outcomes in processing order; skipped filenames are absent
    pub outcomes: Vec<PublishOutcome>,
    pub tags_created: Vec<String>,
    pub tags_pushed: bool,
}

impl RunReport {
    pub fn exit_code(&self) -> i32 {
        self.summary.exit_code()
    }
}

/// BatchPublisher - drives one publish run over injected capabilities
pub struct BatchPublisher {
    config: RunConfig,
    publisher: Box<dyn Publisher>,
    released_versions: Option<Box<dyn ReleasedVersionSource>>,
    tag_writer: Box<dyn TagWriter>,
    metrics: Box<dyn MetricsSink>,
}

impl BatchPublisher {
    /// Create a new BatchPublisher
    ///
    /// `released_versions` is only consulted in promoted-only runs.
    pub fn new(
        config: RunConfig,
        publisher: Box<dyn Publisher>,
        released_versions: Option<Box<dyn ReleasedVersionSource>>,
        tag_writer: Box<dyn TagWriter>,
        metrics: Box<dyn MetricsSink>,
    ) -> Self {
        Self {
            config,
            publisher,
            released_versions,
            tag_writer,
            metrics,
        }
    }

    /// Run the batch and report on it
    ///
    /// Never fails: run-level errors are printed, folded into the summary
    /// and reflected in the exit code.
    pub async fn run(&self) -> RunReport {
        let started = Instant::now();
        let started_at = Utc::now();
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("publish", %run_id);

        let mut state = RunState::default();
        let fatal_error = match self.execute(&mut state).instrument(span).await {
            Ok(()) => None,
            Err(e) => {
                Self::print_fatal(&e);
                Some(e.to_string())
            }
        };

        let summary = RunSummary {
            published_count: state.published_count,
            failed_artifact_labels: state.failed_labels,
            elapsed: started.elapsed(),
            started_at,
            fatal_error,
        };

        self.reporter().report(&summary);

        RunReport {
            run_id,
            summary,
            outcomes: state.outcomes,
            tags_created: state.tags_created,
            tags_pushed: state.tags_pushed,
        }
    }

    /// Reporter configured for this run's dimensions
    pub fn reporter(&self) -> RunReporter<'_> {
        RunReporter::new(
            self.metrics.as_ref(),
            self.config.promoted_only,
            self.config.run_tag.clone(),
        )
    }

    async fn execute(&self, state: &mut RunState) -> Result<(), PublishError> {
        self.publisher.preflight().await?;

        let filter = self.promotion_filter().await?;

        let inventory = ArtifactLocator::new(&self.config.artifact_dir).locate()?;
        tracing::info!(
            artifacts = inventory.artifacts.len(),
            metadata_files = inventory.metadata_paths.len(),
            "located artifacts"
        );

        let resolver = MetadataResolver::new(inventory.metadata_paths);
        let step = PackagePublisher::new(&resolver, &filter, self.publisher.as_ref());

        for artifact in &inventory.artifacts {
            match step.process(artifact).await {
                Some(outcome) => state.record(outcome),
                None => tracing::debug!(
                    path = %artifact.archive_path.display(),
                    "skipping artifact with non-conforming name"
                ),
            }
        }

        if self.config.git_tag && state.failed_labels.is_empty() {
            self.record_tags(state).await?;
        }

        Ok(())
    }

    async fn promotion_filter(&self) -> Result<PromotionFilter, PublishError> {
        if !self.config.promoted_only {
            return Ok(PromotionFilter::disabled());
        }

        let source = self.released_versions.as_ref().ok_or_else(|| {
            PublishError::Config("promoted-only run without a released version source".to_string())
        })?;

        let released = source.released_versions().await?;
        tracing::info!(released = released.len(), "fetched released versions");
        Ok(PromotionFilter::promoted_only(released))
    }

    async fn record_tags(&self, state: &mut RunState) -> Result<(), PublishError> {
        println!("Creating Git Tags in Repo");

        for tag in state.outcomes.iter().filter_map(PublishOutcome::tag) {
            self.tag_writer
                .create_annotated_tag(&tag, &self.config.git_identity)
                .await?;
            state.tags_created.push(tag.name);
        }

        if self.config.push_git_tag {
            println!("Pushing Git Tags to Repo");
            self.tag_writer.push_tags().await?;
            state.tags_pushed = true;
        }

        Ok(())
    }

    fn print_fatal(error: &PublishError) {
        println!("{}", error);
        for action in error.suggested_actions() {
            println!("  → {}", action);
        }
        tracing::debug!(code = error.code(), "run aborted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GitIdentity;
    use crate::orchestration::fakes::{
        write_artifact, FakePublisher, FakeReleasedVersions, FakeTagWriter, RecordingMetricsSink,
    };
    use crate::orchestration::reporter::{METRIC_DURATION, METRIC_FAILED, METRIC_SUCCEEDED};
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn run_config(artifact_dir: &Path) -> RunConfig {
        RunConfig {
            artifact_dir: artifact_dir.to_path_buf(),
            script_path: PathBuf::from("publish.sh"),
            promoted_only: false,
            devhub_alias: None,
            run_tag: None,
            git_tag: false,
            push_git_tag: false,
            git_identity: GitIdentity::default(),
            statsd: None,
        }
    }

    struct Harness {
        publisher: FakePublisher,
        released: FakeReleasedVersions,
        tags: FakeTagWriter,
        metrics: RecordingMetricsSink,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                publisher: FakePublisher::default(),
                released: FakeReleasedVersions::new(&[]),
                tags: FakeTagWriter::default(),
                metrics: RecordingMetricsSink::default(),
            }
        }

        async fn run(&self, config: RunConfig) -> RunReport {
            BatchPublisher::new(
                config,
                Box::new(self.publisher.clone()),
                Some(Box::new(self.released.clone())),
                Box::new(self.tags.clone()),
                Box::new(self.metrics.clone()),
            )
            .run()
            .await
        }
    }

    #[tokio::test]
    async fn test_single_artifact_published_and_tagged() {
        let temp_dir = TempDir::new().unwrap();
        write_artifact(temp_dir.path(), "foo", "1-0-0", "unlocked", Some("X1"));

        let harness = Harness::new();
        let mut config = run_config(temp_dir.path());
        config.git_tag = true;

        let report = harness.run(config).await;

        assert_eq!(report.summary.published_count, 1);
        assert!(report.summary.failed_artifact_labels.is_empty());
        assert_eq!(report.exit_code(), 0);
        assert_eq!(report.tags_created, vec!["foo_v1.0.0"]);
        assert_eq!(harness.tags.tag_names(), vec!["foo_v1.0.0"]);
        assert!(!report.tags_pushed);
        assert_eq!(harness.tags.push_count(), 0);
    }

    #[tokio::test]
    async fn test_unpromoted_artifact_fails_run_without_tags() {
        let temp_dir = TempDir::new().unwrap();
        write_artifact(temp_dir.path(), "foo", "1-0-0", "unlocked", Some("X1"));

        let mut harness = Harness::new();
        harness.released = FakeReleasedVersions::new(&["X2"]);
        let mut config = run_config(temp_dir.path());
        config.promoted_only = true;
        config.devhub_alias = Some("HubOrg".to_string());
        config.git_tag = true;

        let report = harness.run(config).await;

        assert_eq!(report.summary.published_count, 0);
        assert_eq!(report.summary.failed_artifact_labels, vec!["foo v1-0-0"]);
        assert_ne!(report.exit_code(), 0);
        assert!(report.tags_created.is_empty());
        assert!(harness.publisher.requests.lock().unwrap().is_empty());
        assert!(harness.tags.tag_names().is_empty());
    }

    #[tokio::test]
    async fn test_managed_published_regardless_of_released_list() {
        let temp_dir = TempDir::new().unwrap();
        write_artifact(temp_dir.path(), "core", "2-1-0", "managed", Some("M1"));

        let harness = Harness::new();
        let mut config = run_config(temp_dir.path());
        config.promoted_only = true;
        config.devhub_alias = Some("HubOrg".to_string());

        let report = harness.run(config).await;

        assert_eq!(report.summary.published_count, 1);
        assert_eq!(report.exit_code(), 0);
        assert_eq!(*harness.released.calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_released_versions_not_queried_when_not_promoted_only() {
        let temp_dir = TempDir::new().unwrap();
        write_artifact(temp_dir.path(), "foo", "1-0-0", "unlocked", Some("X1"));

        let harness = Harness::new();
        harness.run(run_config(temp_dir.path())).await;

        assert_eq!(*harness.released.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_non_conforming_names_are_not_counted() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("foo-1.0.0.zip"), b"").unwrap();
        std::fs::write(temp_dir.path().join("readme.txt"), b"").unwrap();

        let harness = Harness::new();
        let mut config = run_config(temp_dir.path());
        config.git_tag = true;

        let report = harness.run(config).await;

        assert_eq!(report.summary.published_count, 0);
        assert!(report.summary.failed_artifact_labels.is_empty());
        assert!(report.outcomes.is_empty());
        assert!(report.tags_created.is_empty());
        assert_eq!(report.exit_code(), 0);
    }

    #[tokio::test]
    async fn test_missing_metadata_does_not_stop_batch() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("orphan_sfpowerscripts_artifact_1-0-0.zip"),
            b"",
        )
        .unwrap();
        write_artifact(temp_dir.path(), "foo", "1-0-0", "unlocked", Some("X1"));
        write_artifact(temp_dir.path(), "bar", "3-0-0", "source", None);

        let harness = Harness::new();
        let mut config = run_config(temp_dir.path());
        config.git_tag = true;

        let report = harness.run(config).await;

        assert_eq!(report.summary.published_count, 2);
        assert_eq!(report.summary.failed_artifact_labels, vec!["orphan v1-0-0"]);
        assert_ne!(report.exit_code(), 0);
        assert_eq!(harness.publisher.published_names(), vec!["bar", "foo"]);
        assert!(report.tags_created.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_metadata_fails_only_that_artifact() {
        let temp_dir = TempDir::new().unwrap();
        write_artifact(temp_dir.path(), "foo", "1-0-0", "unlocked", Some("X1"));
        write_artifact(temp_dir.path(), "bar", "2-0-0", "managed", Some("M1"));
        std::fs::write(
            temp_dir.path().join("stale_artifact_metadata.json"),
            r#"{"package_name":"foo","package_version_number":"1.0.0","package_type":"unlocked","package_version_id":"X0"}"#,
        )
        .unwrap();

        let harness = Harness::new();
        let mut config = run_config(temp_dir.path());
        config.git_tag = true;

        let report = harness.run(config).await;

        assert_eq!(report.summary.published_count, 1);
        assert_eq!(report.summary.failed_artifact_labels, vec!["foo v1-0-0"]);
        assert_ne!(report.exit_code(), 0);
        assert_eq!(harness.publisher.published_names(), vec!["bar"]);

        let foo = report
            .outcomes
            .iter()
            .find(|o| o.package_name == "foo")
            .unwrap();
        assert_eq!(foo.status, OutcomeStatus::Failed);
        assert!(foo.error.as_ref().unwrap().contains("Found 2 metadata files"));
        assert!(report.tags_created.is_empty());
    }

    #[tokio::test]
    async fn test_script_failure_is_isolated() {
        let temp_dir = TempDir::new().unwrap();
        write_artifact(temp_dir.path(), "foo", "1-0-0", "unlocked", Some("X1"));
        write_artifact(temp_dir.path(), "bar", "2-0-0", "unlocked", Some("X2"));
        write_artifact(temp_dir.path(), "baz", "3-0-0", "data", None);

        let mut harness = Harness::new();
        harness.publisher = FakePublisher::failing(&["bar"]);
        let mut config = run_config(temp_dir.path());
        config.git_tag = true;
        config.push_git_tag = true;

        let report = harness.run(config).await;

        assert_eq!(report.summary.published_count, 2);
        assert_eq!(report.summary.failed_artifact_labels, vec!["bar v2-0-0"]);
        assert_eq!(harness.publisher.published_names(), vec!["bar", "baz", "foo"]);
        assert!(harness.tags.tag_names().is_empty());
        assert_eq!(harness.tags.push_count(), 0);
    }

    #[tokio::test]
    async fn test_tags_every_published_artifact_then_pushes_once() {
        let temp_dir = TempDir::new().unwrap();
        write_artifact(temp_dir.path(), "foo", "1-0-0", "unlocked", Some("X1"));
        write_artifact(temp_dir.path(), "bar", "2-0-0-4", "managed", Some("M1"));

        let harness = Harness::new();
        let mut config = run_config(temp_dir.path());
        config.git_tag = true;
        config.push_git_tag = true;
        config.git_identity = GitIdentity {
            name: "release-bot".to_string(),
            email: "release-bot@example.com".to_string(),
        };

        let report = harness.run(config).await;

        assert_eq!(harness.tags.tag_names(), vec!["bar_v2.0.0.4", "foo_v1.0.0"]);
        assert_eq!(harness.tags.push_count(), 1);
        assert!(report.tags_pushed);

        let tags = harness.tags.tags.lock().unwrap();
        assert!(tags.iter().all(|(_, identity)| identity.name == "release-bot"));
        assert!(tags
            .iter()
            .any(|(tag, _)| tag.message == "bar managed Package 2.0.0.4"));
    }

    #[tokio::test]
    async fn test_push_requires_tag_creation() {
        let temp_dir = TempDir::new().unwrap();
        write_artifact(temp_dir.path(), "foo", "1-0-0", "unlocked", Some("X1"));

        let harness = Harness::new();
        let mut config = run_config(temp_dir.path());
        config.push_git_tag = true;

        let report = harness.run(config).await;

        assert!(harness.tags.tag_names().is_empty());
        assert_eq!(harness.tags.push_count(), 0);
        assert!(!report.tags_pushed);
    }

    #[tokio::test]
    async fn test_missing_script_aborts_but_still_reports() {
        let temp_dir = TempDir::new().unwrap();
        write_artifact(temp_dir.path(), "foo", "1-0-0", "unlocked", Some("X1"));

        let mut harness = Harness::new();
        harness.publisher.missing_script = true;

        let report = harness.run(run_config(temp_dir.path())).await;

        assert_eq!(report.summary.published_count, 0);
        assert!(report.summary.fatal_error.is_some());
        assert_ne!(report.exit_code(), 0);
        assert!(harness.publisher.requests.lock().unwrap().is_empty());
        assert_eq!(
            harness.metrics.gauge_names(),
            vec![METRIC_DURATION, METRIC_SUCCEEDED]
        );
    }

    #[tokio::test]
    async fn test_missing_artifact_directory_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let harness = Harness::new();

        let report = harness
            .run(run_config(&temp_dir.path().join("does-not-exist")))
            .await;

        assert_ne!(report.exit_code(), 0);
        assert!(report
            .summary
            .fatal_error
            .unwrap()
            .contains("does not exist"));
        assert_eq!(harness.metrics.gauge_names().len(), 2);
    }

    #[tokio::test]
    async fn test_released_query_failure_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        write_artifact(temp_dir.path(), "foo", "1-0-0", "managed", Some("M1"));

        let mut harness = Harness::new();
        harness.released = FakeReleasedVersions::unavailable();
        let mut config = run_config(temp_dir.path());
        config.promoted_only = true;
        config.devhub_alias = Some("HubOrg".to_string());

        let report = harness.run(config).await;

        assert_ne!(report.exit_code(), 0);
        assert!(harness.publisher.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tagging_failure_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        write_artifact(temp_dir.path(), "foo", "1-0-0", "unlocked", Some("X1"));

        let mut harness = Harness::new();
        harness.tags.fail_tagging = true;
        let mut config = run_config(temp_dir.path());
        config.git_tag = true;

        let report = harness.run(config).await;

        assert_eq!(report.summary.published_count, 1);
        assert!(report.summary.failed_artifact_labels.is_empty());
        assert_ne!(report.exit_code(), 0);
    }

    #[tokio::test]
    async fn test_gauges_carry_failures_and_dimensions() {
        let temp_dir = TempDir::new().unwrap();
        write_artifact(temp_dir.path(), "foo", "1-0-0", "unlocked", Some("X1"));
        write_artifact(temp_dir.path(), "bar", "1-0-0", "unlocked", Some("X2"));

        let mut harness = Harness::new();
        harness.released = FakeReleasedVersions::new(&["X1"]);
        let mut config = run_config(temp_dir.path());
        config.promoted_only = true;
        config.devhub_alias = Some("HubOrg".to_string());
        config.run_tag = Some("release-42".to_string());

        harness.run(config).await;

        assert_eq!(harness.metrics.value_of(METRIC_SUCCEEDED), Some(1.0));
        assert_eq!(harness.metrics.value_of(METRIC_FAILED), Some(1.0));
        for (_, _, dimensions) in harness.metrics.gauges.lock().unwrap().iter() {
            assert_eq!(dimensions.get("publish_promoted_only").map(String::as_str), Some("true"));
            assert_eq!(dimensions.get("tag").map(String::as_str), Some("release-42"));
        }
    }
}
