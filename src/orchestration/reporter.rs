//! Run reporter
//!
//! Prints the end-of-run summary and emits the run gauges. The reporter is
//! invoked exactly once per run, including runs aborted by a fatal error.

use crate::core::traits::{MetricDimensions, MetricsSink};
use chrono::{DateTime, Utc};
use std::time::Duration;

pub const METRIC_DURATION: &str = "publish.duration";
pub const METRIC_SUCCEEDED: &str = "publish.succeeded";
pub const METRIC_FAILED: &str = "publish.failed";

const SEPARATOR_WIDTH: usize = 100;

/// Aggregate of one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub published_count: usize,
    /// `<name> v<raw version>` labels, in processing order
    pub failed_artifact_labels: Vec<String>,
    pub elapsed: Duration,
    pub started_at: DateTime<Utc>,
    /// Run-level error that aborted the remaining work
    pub fatal_error: Option<String>,
}

impl RunSummary {
    /// Summary of a run that never reached artifact processing
    pub fn aborted(started_at: DateTime<Utc>, elapsed: Duration, error: impl ToString) -> Self {
        Self {
            published_count: 0,
            failed_artifact_labels: Vec::new(),
            elapsed,
            started_at,
            fatal_error: Some(error.to_string()),
        }
    }

    pub fn failure_count(&self) -> usize {
        self.failed_artifact_labels.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed_artifact_labels.is_empty() && self.fatal_error.is_none()
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }
}

/// Format a duration as `HH:MM:SS`; hours do not wrap
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Render the printed summary block
pub fn render_summary(summary: &RunSummary) -> String {
    let separator = "-".repeat(SEPARATOR_WIDTH);
    let mut lines = vec![
        separator.clone(),
        format!(
            "{} artifacts published in {} with {{{}}} errors",
            summary.published_count,
            format_elapsed(summary.elapsed),
            summary.failure_count()
        ),
    ];

    if !summary.failed_artifact_labels.is_empty() {
        lines.push(format!(
            "Packages Failed to Publish {:?}",
            summary.failed_artifact_labels
        ));
    }

    lines.push(separator);
    lines.join("\n")
}

/// Prints summaries and emits gauges for one run configuration
pub struct RunReporter<'a> {
    sink: &'a dyn MetricsSink,
    promoted_only: bool,
    run_tag: Option<String>,
}

impl<'a> RunReporter<'a> {
    pub fn new(sink: &'a dyn MetricsSink, promoted_only: bool, run_tag: Option<String>) -> Self {
        Self {
            sink,
            promoted_only,
            run_tag,
        }
    }

    /// Dimensions attached to every gauge
    pub fn dimensions(&self) -> MetricDimensions {
        let mut dimensions = MetricDimensions::new();
        dimensions.insert(
            "publish_promoted_only".to_string(),
            self.promoted_only.to_string(),
        );
        if let Some(tag) = &self.run_tag {
            dimensions.insert("tag".to_string(), tag.clone());
        }
        dimensions
    }

    pub fn report(&self, summary: &RunSummary) {
        println!("{}", render_summary(summary));

        tracing::debug!(
            started_at = %summary.started_at.to_rfc3339(),
            published = summary.published_count,
            failed = summary.failure_count(),
            "run finished"
        );

        let dimensions = self.dimensions();
        self.sink.gauge(
            METRIC_DURATION,
            summary.elapsed.as_millis() as f64,
            &dimensions,
        );
        self.sink.gauge(
            METRIC_SUCCEEDED,
            summary.published_count as f64,
            &dimensions,
        );
        if summary.failure_count() > 0 {
            self.sink.gauge(
                METRIC_FAILED,
                summary.failure_count() as f64,
                &dimensions,
            );
        }
    }
}
