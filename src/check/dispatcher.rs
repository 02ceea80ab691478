//! Ordered strategy dispatch

use std::sync::Arc;

use tracing::debug;

use crate::check::runtime::ContainerRuntime;
use crate::check::strategies::{ExcludedImagesStrategy, RegistryStrategy};
use crate::check::strategy::CheckStrategy;
use crate::check::tag_source::TagSource;
use crate::check::types::{ContainerRef, UpdateVerdict};
use crate::config::CheckerConfig;

/// Holds strategies in registration order; the first one that can handle a container wins
#[derive(Default, Clone)]
pub struct StrategyDispatcher {
    strategies: Vec<Arc<dyn CheckStrategy>>,
}

impl StrategyDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a strategy after the already registered ones
    pub fn register(&mut self, strategy: Arc<dyn CheckStrategy>) {
        self.strategies.push(strategy);
    }

    pub fn with_strategy(mut self, strategy: Arc<dyn CheckStrategy>) -> Self {
        self.register(strategy);
        self
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Checks a container with the first matching strategy
    ///
    /// Containers no strategy claims are assumed up to date, so unknown image
    /// shapes never produce an update notification.
    pub async fn dispatch(&self, container: &ContainerRef) -> UpdateVerdict {
        match self.strategies.iter().find(|s| s.can_handle(container)) {
            Some(strategy) => {
                debug!(
                    "Checking {} ({}) with {} strategy",
                    container.name,
                    container.image,
                    strategy.name()
                );
                strategy.check(container).await
            }
            None => {
                debug!(
                    "No strategy for {} ({}), assuming up to date",
                    container.name, container.image
                );
                UpdateVerdict::new(container.clone())
            }
        }
    }
}

/// Create the default dispatcher: configured exclusions first, then registry checks
pub fn create_default_dispatcher(
    runtime: Arc<dyn ContainerRuntime>,
    tags: Arc<dyn TagSource>,
    config: &CheckerConfig,
) -> StrategyDispatcher {
    let mut dispatcher = StrategyDispatcher::new();

    if !config.exclude_images.is_empty() {
        dispatcher.register(Arc::new(ExcludedImagesStrategy::new(
            config.exclude_images.clone(),
        )));
    }

    dispatcher.register(Arc::new(
        RegistryStrategy::new(runtime, tags).include_build_images(config.include_build_images),
    ));

    dispatcher
}
