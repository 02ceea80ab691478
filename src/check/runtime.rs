//! Container runtime trait for listing containers and inspecting images

#[cfg(test)]
use mockall::automock;

use crate::check::error::RuntimeError;
use crate::check::types::{ContainerRef, LocalImage, RemoteDescriptor};

/// Capabilities the checking pipeline needs from a container runtime
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Lists the containers currently running on the host
    async fn list_running_containers(&self) -> Result<Vec<ContainerRef>, RuntimeError>;

    /// Inspects a locally stored image by id
    async fn inspect_local_image(&self, image_id: &str) -> Result<LocalImage, RuntimeError>;

    /// Asks the remote registry for the current descriptor of a reference
    ///
    /// Only the distribution descriptor is fetched; no image content is pulled.
    async fn inspect_remote_digest(&self, image: &str) -> Result<RemoteDescriptor, RuntimeError>;
}
