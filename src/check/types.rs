//! Common types for the checking pipeline

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::check::error::RuntimeError;

/// Label used before a version could be determined
pub const UNKNOWN_VERSION: &str = "unknown";

/// Snapshot of a running container taken at listing time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerRef {
    /// Container id assigned by the runtime
    pub id: String,
    /// Display name without the leading `/`
    pub name: String,
    /// Image reference the container was started from (`repo[:tag]` or `repo@digest`)
    pub image: String,
    /// Local image id (content digest)
    pub image_id: String,
    /// Runtime status string (e.g., "Up 3 hours")
    pub status: String,
}

/// Metadata of a locally stored image
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocalImage {
    /// Image id (content digest, e.g., "sha256:...")
    pub id: String,
    /// Tags pointing at this image (e.g., "nginx:1.25")
    pub repo_tags: Vec<String>,
    /// Registry digests this image was pulled by (e.g., "nginx@sha256:...")
    pub repo_digests: Vec<String>,
}

impl LocalImage {
    /// Returns true if the image id or any repo digest equals `digest`
    ///
    /// The image id is the config digest, which never equals a registry manifest
    /// digest, so comparing the id alone would report every pulled image as outdated.
    pub fn matches_digest(&self, digest: &str) -> bool {
        self.id == digest
            || self
                .repo_digests
                .iter()
                .any(|d| d.rsplit_once('@').is_some_and(|(_, d)| d == digest))
    }
}

/// Distribution descriptor returned by the remote registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteDescriptor {
    pub digest: String,
}

/// Per-container outcome of a check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateVerdict {
    pub container: ContainerRef,
    /// Version label the container currently runs
    pub current_version: String,
    /// Newest version label found when an update exists
    pub latest_version: String,
    pub is_up_to_date: bool,
    /// Reason the check could not complete
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<RuntimeError>,
}

impl UpdateVerdict {
    /// Creates an optimistic verdict: unknown versions, up to date, no error
    pub fn new(container: ContainerRef) -> Self {
        Self {
            container,
            current_version: UNKNOWN_VERSION.to_string(),
            latest_version: UNKNOWN_VERSION.to_string(),
            is_up_to_date: true,
            error: None,
        }
    }

    /// Attaches a check failure without touching `is_up_to_date`
    pub fn with_error(mut self, error: RuntimeError) -> Self {
        self.error = Some(error);
        self
    }

    /// Bucket this verdict belongs to: error first, then staleness
    pub fn classify(&self) -> VerdictKind {
        if self.error.is_some() {
            VerdictKind::Failed
        } else if !self.is_up_to_date {
            VerdictKind::UpdateAvailable
        } else {
            VerdictKind::UpToDate
        }
    }
}

fn serialize_error<S: Serializer>(
    error: &Option<RuntimeError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

/// Report bucket of a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictKind {
    UpdateAvailable,
    Failed,
    UpToDate,
}

/// Metadata attached to a report by the caller after a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunMetadata {
    pub hostname: String,
    pub timestamp: DateTime<Utc>,
}

impl RunMetadata {
    pub fn now(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Classified result of one check run
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CheckReport {
    pub total: usize,
    pub available: Vec<UpdateVerdict>,
    pub failed: Vec<UpdateVerdict>,
    pub up_to_date: Vec<UpdateVerdict>,
    pub metadata: Option<RunMetadata>,
}

impl CheckReport {
    /// Builds a report placing every verdict in exactly one bucket, keeping input order
    pub fn from_verdicts(verdicts: Vec<UpdateVerdict>) -> Self {
        let mut report = Self {
            total: verdicts.len(),
            ..Default::default()
        };

        for verdict in verdicts {
            match verdict.classify() {
                VerdictKind::Failed => report.failed.push(verdict),
                VerdictKind::UpdateAvailable => report.available.push(verdict),
                VerdictKind::UpToDate => report.up_to_date.push(verdict),
            }
        }

        report
    }

    pub fn with_metadata(mut self, metadata: RunMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn hostname(&self) -> Option<&str> {
        self.metadata.as_ref().map(|m| m.hostname.as_str())
    }

    /// Reports with updates or failures are worth notifying about
    pub fn needs_notification(&self) -> bool {
        !self.available.is_empty() || !self.failed.is_empty()
    }
}
