//! Check strategy trait
//!
//! A strategy encapsulates one way of deciding whether a container's image
//! has a newer version:
//! - Registry: compare local and remote digests, then resolve a tag label
//! - Excluded images: report configured images as up to date without checking

#[cfg(test)]
use mockall::automock;

use crate::check::types::{ContainerRef, UpdateVerdict};

/// Trait for a pluggable update check
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait CheckStrategy: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Returns true if this strategy can check the container
    ///
    /// Must be a pure predicate on the container snapshot.
    fn can_handle(&self, container: &ContainerRef) -> bool;

    /// Checks the container and returns its verdict
    ///
    /// Failures are recorded on the verdict instead of being returned.
    async fn check(&self, container: &ContainerRef) -> UpdateVerdict;
}
