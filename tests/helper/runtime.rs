//! Container runtime and tag source test utilities

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use image_update_checker::check::dispatcher::create_default_dispatcher;
use image_update_checker::check::engine::Checker;
use image_update_checker::check::error::{RuntimeError, TagLookupError};
use image_update_checker::check::runtime::ContainerRuntime;
use image_update_checker::check::tag::ImageTag;
use image_update_checker::check::tag_source::TagSource;
use image_update_checker::check::types::{ContainerRef, LocalImage, RemoteDescriptor};
use image_update_checker::config::CheckerConfig;

/// In-memory container runtime
#[derive(Default)]
pub struct FakeRuntime {
    containers: Vec<ContainerRef>,
    local: HashMap<String, Result<LocalImage, RuntimeError>>,
    remote: HashMap<String, Result<RemoteDescriptor, RuntimeError>>,
    list_error: Option<RuntimeError>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a running container whose image id is `sha256:<name>`
    pub fn with_container(mut self, name: &str, image: &str) -> Self {
        self.containers.push(ContainerRef {
            id: format!("{name}-id"),
            name: name.to_string(),
            image: image.to_string(),
            image_id: format!("sha256:{name}"),
            status: "Up 2 hours".to_string(),
        });
        self
    }

    pub fn with_local_image(mut self, container: &str, repo_tag: &str, digest: &str) -> Self {
        self.local.insert(
            format!("sha256:{container}"),
            Ok(LocalImage {
                id: format!("sha256:{container}"),
                repo_tags: vec![repo_tag.to_string()],
                repo_digests: vec![format!("{}@{}", repo_tag, digest)],
            }),
        );
        self
    }

    pub fn with_local_error(mut self, container: &str, error: RuntimeError) -> Self {
        self.local.insert(format!("sha256:{container}"), Err(error));
        self
    }

    pub fn with_remote_digest(mut self, image: &str, digest: &str) -> Self {
        self.remote.insert(
            image.to_string(),
            Ok(RemoteDescriptor {
                digest: digest.to_string(),
            }),
        );
        self
    }

    pub fn with_remote_error(mut self, image: &str, error: RuntimeError) -> Self {
        self.remote.insert(image.to_string(), Err(error));
        self
    }

    pub fn with_list_error(mut self, error: RuntimeError) -> Self {
        self.list_error = Some(error);
        self
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn list_running_containers(&self) -> Result<Vec<ContainerRef>, RuntimeError> {
        match &self.list_error {
            Some(e) => Err(e.clone()),
            None => Ok(self.containers.clone()),
        }
    }

    async fn inspect_local_image(&self, image_id: &str) -> Result<LocalImage, RuntimeError> {
        self.local
            .get(image_id)
            .cloned()
            .unwrap_or_else(|| Err(RuntimeError::ImageNotFound(image_id.to_string())))
    }

    async fn inspect_remote_digest(&self, image: &str) -> Result<RemoteDescriptor, RuntimeError> {
        self.remote
            .get(image)
            .cloned()
            .unwrap_or_else(|| Err(RuntimeError::ImageNotFound(image.to_string())))
    }
}

/// In-memory tag listing that records requested repositories
#[derive(Default)]
pub struct FakeTagSource {
    tags: HashMap<String, Vec<ImageTag>>,
    requested: Mutex<Vec<String>>,
}

impl FakeTagSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds tags; the n-th tag (1-based) was updated on 2024-01-n
    pub fn with_tags(mut self, repository: &str, tags: Vec<(&str, u32)>) -> Self {
        self.tags.insert(
            repository.to_string(),
            tags.into_iter()
                .map(|(name, day)| {
                    ImageTag::new(name, Some(Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()))
                })
                .collect(),
        );
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl TagSource for FakeTagSource {
    async fn fetch_recent_tags(&self, repository: &str) -> Result<Vec<ImageTag>, TagLookupError> {
        self.requested.lock().unwrap().push(repository.to_string());
        self.tags
            .get(repository)
            .cloned()
            .ok_or_else(|| TagLookupError::NotFound(repository.to_string()))
    }
}

/// Create a checker with the default dispatcher over the given fakes
pub fn create_test_checker(
    runtime: FakeRuntime,
    tags: Arc<FakeTagSource>,
    config: &CheckerConfig,
) -> Checker {
    let runtime: Arc<dyn ContainerRuntime> = Arc::new(runtime);
    let dispatcher = create_default_dispatcher(runtime.clone(), tags, config);
    Checker::new(runtime, dispatcher).with_concurrency(config.concurrency)
}
