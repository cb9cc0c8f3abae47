//! In-memory capability fakes shared by the orchestration tests

use crate::core::config::GitIdentity;
use crate::core::error::PublishError;
use crate::core::traits::{
    MetricDimensions, MetricsSink, PackageTag, PublishRequest, Publisher, ReleasedVersionSource,
    ReleasedVersions, TagWriter,
};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Records every request; fails packages listed in `failing`
#[derive(Clone, Default)]
pub struct FakePublisher {
    pub requests: Arc<Mutex<Vec<PublishRequest>>>,
    pub failing: HashSet<String>,
    pub missing_script: bool,
}

impl FakePublisher {
    pub fn failing(packages: &[&str]) -> Self {
        Self {
            failing: packages.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn published_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.package_name.clone())
            .collect();
        names.sort();
        names
    }
}

#[async_trait]
impl Publisher for FakePublisher {
    fn name(&self) -> &str {
        "fake"
    }

    async fn preflight(&self) -> Result<(), PublishError> {
        if self.missing_script {
            return Err(PublishError::ScriptNotFound {
                path: PathBuf::from("missing.sh"),
            });
        }
        Ok(())
    }

    async fn publish(&self, request: &PublishRequest) -> Result<(), PublishError> {
        self.requests.lock().unwrap().push(request.clone());

        if self.failing.contains(&request.package_name) {
            return Err(PublishError::ScriptFailed {
                package: request.package_name.clone(),
                version: request.raw_version.clone(),
                message: "exit status: 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Fixed released list, or a query failure when `None`
#[derive(Clone)]
pub struct FakeReleasedVersions {
    pub released: Option<Vec<String>>,
    pub calls: Arc<Mutex<usize>>,
}

impl FakeReleasedVersions {
    pub fn new(ids: &[&str]) -> Self {
        Self {
            released: Some(ids.iter().map(|id| id.to_string()).collect()),
            calls: Arc::default(),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            released: None,
            calls: Arc::default(),
        }
    }
}

#[async_trait]
impl ReleasedVersionSource for FakeReleasedVersions {
    async fn released_versions(&self) -> Result<ReleasedVersions, PublishError> {
        *self.calls.lock().unwrap() += 1;
        match &self.released {
            Some(ids) => Ok(ReleasedVersions::new(ids.clone())),
            None => Err(PublishError::ReleasedVersionQuery {
                message: "devhub not authenticated".to_string(),
            }),
        }
    }
}

#[derive(Clone, Default)]
pub struct FakeTagWriter {
    pub tags: Arc<Mutex<Vec<(PackageTag, GitIdentity)>>>,
    pub pushes: Arc<Mutex<usize>>,
    pub fail_tagging: bool,
}

impl FakeTagWriter {
    pub fn tag_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tags
            .lock()
            .unwrap()
            .iter()
            .map(|(tag, _)| tag.name.clone())
            .collect();
        names.sort();
        names
    }

    pub fn push_count(&self) -> usize {
        *self.pushes.lock().unwrap()
    }
}

#[async_trait]
impl TagWriter for FakeTagWriter {
    async fn create_annotated_tag(
        &self,
        tag: &PackageTag,
        identity: &GitIdentity,
    ) -> Result<(), PublishError> {
        if self.fail_tagging {
            return Err(PublishError::Git {
                message: "not a git repository".to_string(),
            });
        }
        self.tags
            .lock()
            .unwrap()
            .push((tag.clone(), identity.clone()));
        Ok(())
    }

    async fn push_tags(&self) -> Result<(), PublishError> {
        *self.pushes.lock().unwrap() += 1;
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct RecordingMetricsSink {
    pub gauges: Arc<Mutex<Vec<(String, f64, MetricDimensions)>>>,
}

impl RecordingMetricsSink {
    pub fn gauge_names(&self) -> Vec<String> {
        self.gauges
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _, _)| name.clone())
            .collect()
    }

    pub fn value_of(&self, name: &str) -> Option<f64> {
        self.gauges
            .lock()
            .unwrap()
            .iter()
            .find(|(n, _, _)| n == name)
            .map(|(_, value, _)| *value)
    }
}

impl MetricsSink for RecordingMetricsSink {
    fn gauge(&self, name: &str, value: f64, dimensions: &MetricDimensions) {
        self.gauges
            .lock()
            .unwrap()
            .push((name.to_string(), value, dimensions.clone()));
    }
}

/// Write an empty archive and a sidecar describing it
pub fn write_artifact(
    dir: &Path,
    name: &str,
    raw_version: &str,
    package_type: &str,
    version_id: Option<&str>,
) -> PathBuf {
    let stem = format!("{}_sfpowerscripts_artifact_{}", name, raw_version);
    let archive = dir.join(format!("{}.zip", stem));
    std::fs::write(&archive, b"").unwrap();

    let mut sidecar = serde_json::json!({
        "package_name": name,
        "package_version_number": raw_version.replace('-', "."),
        "package_type": package_type,
    });
    if let Some(id) = version_id {
        sidecar["package_version_id"] = serde_json::Value::String(id.to_string());
    }
    std::fs::write(
        dir.join(format!("{}_metadata.json", stem)),
        sidecar.to_string(),
    )
    .unwrap();

    archive
}
