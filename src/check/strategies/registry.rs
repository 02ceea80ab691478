//! Registry strategy: compares the local image against the remote registry digest

use std::sync::Arc;

use tracing::{debug, warn};

use crate::check::reference::{
    extract_tag, is_dangling, is_local_registry, looks_locally_built, repository_path,
};
use crate::check::runtime::ContainerRuntime;
use crate::check::strategy::CheckStrategy;
use crate::check::tag::select_latest_tag;
use crate::check::tag_source::TagSource;
use crate::check::types::{ContainerRef, UpdateVerdict};

/// Checks images pulled from a remote registry
///
/// Images that look local (dangling, served by a local registry, or locally
/// built) are left to other strategies. This is a best-effort classification:
/// a local image that slips through fails its remote lookup and is reported
/// as failed, never as outdated.
pub struct RegistryStrategy {
    runtime: Arc<dyn ContainerRuntime>,
    tags: Arc<dyn TagSource>,
    include_build_images: bool,
}

impl RegistryStrategy {
    pub fn new(runtime: Arc<dyn ContainerRuntime>, tags: Arc<dyn TagSource>) -> Self {
        Self {
            runtime,
            tags,
            include_build_images: false,
        }
    }

    /// Also check images whose name contains "build"
    pub fn include_build_images(mut self, include: bool) -> Self {
        self.include_build_images = include;
        self
    }

    /// Resolves a human-readable label for the newer version
    ///
    /// Lookup failures fall back to the reference's own tag; the update itself
    /// is already established by the digest comparison.
    async fn resolve_latest_label(&self, image: &str) -> String {
        // extract_tag already yields "latest" for untagged references
        let fallback = || extract_tag(image);

        let Some(repository) = repository_path(image) else {
            debug!("Cannot derive repository from {}, using fallback label", image);
            return fallback();
        };

        match self.tags.fetch_recent_tags(&repository).await {
            Ok(tags) => select_latest_tag(tags).unwrap_or_else(|| {
                debug!("No release tag found for {}, using fallback label", repository);
                fallback()
            }),
            Err(e) => {
                debug!("Failed to fetch tags for {}: {}", repository, e);
                fallback()
            }
        }
    }
}

#[async_trait::async_trait]
impl CheckStrategy for RegistryStrategy {
    fn name(&self) -> &'static str {
        "registry"
    }

    fn can_handle(&self, container: &ContainerRef) -> bool {
        let image = container.image.as_str();

        if is_dangling(image) || is_local_registry(image) {
            return false;
        }

        self.include_build_images || !looks_locally_built(image)
    }

    async fn check(&self, container: &ContainerRef) -> UpdateVerdict {
        let mut verdict = UpdateVerdict::new(container.clone());

        let local = match self.runtime.inspect_local_image(&container.image_id).await {
            Ok(local) => local,
            Err(e) => {
                warn!(
                    "Failed to inspect local image of {} ({}): {}",
                    container.name, container.image_id, e
                );
                return verdict.with_error(e);
            }
        };

        if let Some(repo_tag) = local.repo_tags.first() {
            verdict.current_version = extract_tag(repo_tag);
        }

        let remote = match self.runtime.inspect_remote_digest(&container.image).await {
            Ok(remote) => remote,
            Err(e) => {
                warn!(
                    "Failed to inspect remote image {} for {}: {}",
                    container.image, container.name, e
                );
                return verdict.with_error(e);
            }
        };

        if local.matches_digest(&remote.digest) {
            debug!("{} ({}) is up to date", container.name, container.image);
            return verdict;
        }

        verdict.is_up_to_date = false;
        verdict.latest_version = self.resolve_latest_label(&container.image).await;

        debug!(
            "{} ({}) has an update: {} -> {}",
            container.name, container.image, verdict.current_version, verdict.latest_version
        );

        verdict
    }
}
