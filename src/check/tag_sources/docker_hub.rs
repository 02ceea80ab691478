//! Docker Hub tag-listing API implementation

use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::check::error::TagLookupError;
use crate::check::tag::ImageTag;
use crate::check::tag_source::TagSource;
use crate::config::{DEFAULT_DOCKER_HUB_URL, DEFAULT_REQUEST_TIMEOUT_SECS, TAG_PAGE_SIZE};

/// Response from the Docker Hub tags endpoint
#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    results: Vec<ImageTag>,
}

/// Tag source backed by the Docker Hub repositories API
pub struct DockerHubTags {
    client: reqwest::Client,
    base_url: String,
}

impl DockerHubTags {
    /// Creates a new DockerHubTags with a custom base URL and per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(concat!("image-update-checker/", env!("CARGO_PKG_VERSION")))
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for DockerHubTags {
    fn default() -> Self {
        Self::new(
            DEFAULT_DOCKER_HUB_URL,
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }
}

#[async_trait::async_trait]
impl TagSource for DockerHubTags {
    async fn fetch_recent_tags(&self, repository: &str) -> Result<Vec<ImageTag>, TagLookupError> {
        let url = format!(
            "{}/v2/repositories/{}/tags/?page_size={}",
            self.base_url, repository, TAG_PAGE_SIZE
        );

        let response = self.client.get(&url).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(TagLookupError::NotFound(repository.to_string()));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(TagLookupError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            warn!("Docker Hub returned status {}: {}", status, url);
            return Err(TagLookupError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let tags: TagsResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse Docker Hub tags response: {}", e);
            TagLookupError::InvalidResponse(e.to_string())
        })?;

        Ok(tags.results)
    }
}
