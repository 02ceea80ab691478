//! Tag source trait for looking up published image tags

#[cfg(test)]
use mockall::automock;

use crate::check::error::TagLookupError;
use crate::check::tag::ImageTag;

/// Trait for fetching the recently published tags of a repository
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait TagSource: Send + Sync {
    /// Fetches one page of tags for a repository
    ///
    /// # Arguments
    /// * `repository` - Namespaced repository path (e.g., "library/nginx")
    ///
    /// # Returns
    /// * `Ok(Vec<ImageTag>)` - Tags in the order the endpoint returned them
    /// * `Err(TagLookupError)` - If the fetch fails
    async fn fetch_recent_tags(&self, repository: &str) -> Result<Vec<ImageTag>, TagLookupError>;
}
