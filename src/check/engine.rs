//! Checking engine: lists running containers and classifies their verdicts

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::info;

use crate::check::dispatcher::StrategyDispatcher;
use crate::check::error::RuntimeError;
use crate::check::runtime::ContainerRuntime;
use crate::check::types::CheckReport;

/// Runs one check over every running container
pub struct Checker {
    runtime: Arc<dyn ContainerRuntime>,
    dispatcher: StrategyDispatcher,
    concurrency: usize,
}

impl Checker {
    pub fn new(runtime: Arc<dyn ContainerRuntime>, dispatcher: StrategyDispatcher) -> Self {
        Self {
            runtime,
            dispatcher,
            concurrency: 1,
        }
    }

    /// Number of containers checked at once (at least one)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Checks all running containers
    ///
    /// Per-container failures end up in the report's failed bucket. Only a
    /// failure to list containers aborts the run, in which case no report is
    /// produced. Verdicts are collected in listing order before being
    /// classified, so bucket order does not depend on completion order.
    pub async fn check_all(&self) -> Result<CheckReport, RuntimeError> {
        let containers = self.runtime.list_running_containers().await?;
        info!("Checking {} running containers", containers.len());

        let dispatcher = &self.dispatcher;
        let verdicts = stream::iter(containers)
            .map(|container| async move { dispatcher.dispatch(&container).await })
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        let report = CheckReport::from_verdicts(verdicts);

        info!(
            "Check finished: {} total, {} updates available, {} failed, {} up to date",
            report.total,
            report.available.len(),
            report.failed.len(),
            report.up_to_date.len()
        );

        Ok(report)
    }
}
