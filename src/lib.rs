pub mod artifacts;
pub mod core;
pub mod orchestration;
pub mod plugins;
pub mod security;

pub use artifacts::{ArtifactLocator, CandidateIdentity, MetadataResolver};
pub use crate::core::*;
pub use orchestration::{BatchPublisher, RunReport, RunSummary};
pub use plugins::{
    GitTagWriter, LogMetricsSink, ScriptPublisher, SfdxReleasedVersions, StatsdMetricsSink,
};
pub use security::{CommandError, CommandOutput, SafeCommandExecutor, StdioPolicy};
