//! Excluded images strategy

use tracing::debug;

use crate::check::reference::matches_pattern;
use crate::check::strategy::CheckStrategy;
use crate::check::types::{ContainerRef, UpdateVerdict};

/// Claims images matching a configured pattern and reports them as up to date
///
/// Registered ahead of the registry strategy so excluded images never reach
/// the runtime or the registry.
pub struct ExcludedImagesStrategy {
    patterns: Vec<String>,
}

impl ExcludedImagesStrategy {
    pub fn new(patterns: Vec<String>) -> Self {
        Self { patterns }
    }
}

#[async_trait::async_trait]
impl CheckStrategy for ExcludedImagesStrategy {
    fn name(&self) -> &'static str {
        "excluded"
    }

    fn can_handle(&self, container: &ContainerRef) -> bool {
        self.patterns
            .iter()
            .any(|pattern| matches_pattern(&container.image, pattern))
    }

    async fn check(&self, container: &ContainerRef) -> UpdateVerdict {
        debug!(
            "Skipping excluded image {} for {}",
            container.image, container.name
        );
        UpdateVerdict::new(container.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn container(image: &str) -> ContainerRef {
        ContainerRef {
            id: "c1".to_string(),
            name: "db".to_string(),
            image: image.to_string(),
            image_id: "sha256:aaa".to_string(),
            status: "Up 3 days".to_string(),
        }
    }

    #[rstest]
    #[case("postgres:16", true)]
    #[case("internal/api:1.2", true)]
    #[case("nginx:1.25", false)]
    fn can_handle_matches_configured_patterns(#[case] image: &str, #[case] expected: bool) {
        let strategy =
            ExcludedImagesStrategy::new(vec!["postgres".to_string(), "internal/*".to_string()]);

        assert_eq!(strategy.can_handle(&container(image)), expected);
    }

    #[tokio::test]
    async fn check_reports_up_to_date_without_error() {
        let strategy = ExcludedImagesStrategy::new(vec!["postgres".to_string()]);

        let verdict = strategy.check(&container("postgres:16")).await;

        assert!(verdict.is_up_to_date);
        assert!(verdict.error.is_none());
        assert_eq!(verdict.classify(), crate::check::types::VerdictKind::UpToDate);
    }
}
