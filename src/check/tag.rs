//! Published tag selection

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::check::reference::LATEST_TAG;

/// Substrings that mark a tag as a pre-release
const PRERELEASE_MARKERS: &[&str] = &["rc", "beta", "alpha"];

/// A tag entry from the tag-listing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageTag {
    pub name: String,
    pub last_updated: Option<DateTime<Utc>>,
}

impl ImageTag {
    pub fn new(name: impl Into<String>, last_updated: Option<DateTime<Utc>>) -> Self {
        Self {
            name: name.into(),
            last_updated,
        }
    }

    /// Tag label without a `repository:` prefix
    fn label(&self) -> &str {
        self.name
            .rsplit_once(':')
            .map_or(self.name.as_str(), |(_, tag)| tag)
    }
}

/// Returns true for tags that name a pre-release build
pub fn is_prerelease(tag: &str) -> bool {
    let tag = tag.to_lowercase();
    PRERELEASE_MARKERS.iter().any(|marker| tag.contains(marker))
}

/// Picks the most recently updated tag that is neither "latest" nor a pre-release
///
/// Tags are ordered by `last_updated` descending with a stable sort, so equal
/// timestamps keep the endpoint's order. Tags without a timestamp sort last.
pub fn select_latest_tag(mut tags: Vec<ImageTag>) -> Option<String> {
    tags.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));

    tags.iter()
        .map(ImageTag::label)
        .find(|label| !label.is_empty() && *label != LATEST_TAG && !is_prerelease(label))
        .map(str::to_string)
}
