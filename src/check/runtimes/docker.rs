//! Docker Engine API runtime implementation

use std::future::Future;
use std::time::Duration;

use bollard::Docker;
use bollard::container::ListContainersOptions;
use bollard::errors::Error as BollardError;
use bollard::models::ContainerSummary;
use tracing::{debug, info};

use crate::check::error::RuntimeError;
use crate::check::runtime::ContainerRuntime;
use crate::check::types::{ContainerRef, LocalImage, RemoteDescriptor};

/// Runtime implementation talking to the Docker daemon
pub struct DockerRuntime {
    docker: Docker,
    timeout: Duration,
}

impl DockerRuntime {
    /// Connects to the daemon at `host` (`unix://...`, `tcp://...` or `http://...`)
    pub fn connect(host: &str, timeout: Duration) -> Result<Self, RuntimeError> {
        let secs = timeout.as_secs().max(1);
        let docker = if host.starts_with("tcp://") || host.starts_with("http://") {
            Docker::connect_with_http(host, secs, bollard::API_DEFAULT_VERSION)
        } else {
            Docker::connect_with_unix(host, secs, bollard::API_DEFAULT_VERSION)
        }
        .map_err(RuntimeError::from)?;

        info!("Docker client configured for {}", host);

        Ok(Self { docker, timeout })
    }

    /// Runs a Docker API call, failing with `RuntimeError::Timeout` once the timeout elapses
    async fn with_timeout<T>(
        &self,
        call: impl Future<Output = Result<T, BollardError>>,
    ) -> Result<T, RuntimeError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(RuntimeError::from),
            Err(_) => Err(RuntimeError::Timeout(self.timeout.as_secs())),
        }
    }
}

impl From<BollardError> for RuntimeError {
    fn from(error: BollardError) -> Self {
        match error {
            BollardError::DockerResponseServerError {
                status_code: 404,
                message,
            } => RuntimeError::ImageNotFound(message),
            other => RuntimeError::Api(other.to_string()),
        }
    }
}

fn to_container_ref(summary: ContainerSummary) -> ContainerRef {
    let name = summary
        .names
        .as_ref()
        .and_then(|names| names.first())
        .map(|name| name.trim_start_matches('/').to_string())
        .unwrap_or_default();

    ContainerRef {
        id: summary.id.unwrap_or_default(),
        name,
        image: summary.image.unwrap_or_default(),
        image_id: summary.image_id.unwrap_or_default(),
        status: summary.status.unwrap_or_default(),
    }
}

#[async_trait::async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn list_running_containers(&self) -> Result<Vec<ContainerRef>, RuntimeError> {
        let options = ListContainersOptions::<String> {
            all: false,
            ..Default::default()
        };

        let summaries = self
            .with_timeout(self.docker.list_containers(Some(options)))
            .await?;

        debug!("Docker reported {} running containers", summaries.len());

        Ok(summaries.into_iter().map(to_container_ref).collect())
    }

    async fn inspect_local_image(&self, image_id: &str) -> Result<LocalImage, RuntimeError> {
        let inspect = self.with_timeout(self.docker.inspect_image(image_id)).await?;

        Ok(LocalImage {
            id: inspect.id.unwrap_or_else(|| image_id.to_string()),
            repo_tags: inspect.repo_tags.unwrap_or_default(),
            repo_digests: inspect.repo_digests.unwrap_or_default(),
        })
    }

    async fn inspect_remote_digest(&self, image: &str) -> Result<RemoteDescriptor, RuntimeError> {
        let inspect = self
            .with_timeout(self.docker.inspect_registry_image(image, None))
            .await?;

        let digest = inspect
            .descriptor
            .digest
            .filter(|d| !d.is_empty())
            .ok_or_else(|| RuntimeError::MissingDigest(image.to_string()))?;

        Ok(RemoteDescriptor { digest })
    }
}
