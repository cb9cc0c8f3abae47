//! Adapters implementing the core capability traits with external tools

pub mod git_tagger;
pub mod metrics;
pub mod released_versions;
pub mod script_publisher;

pub use git_tagger::GitTagWriter;
pub use metrics::{format_statsd_line, LogMetricsSink, StatsdMetricsSink};
pub use released_versions::SfdxReleasedVersions;
pub use script_publisher::ScriptPublisher;
