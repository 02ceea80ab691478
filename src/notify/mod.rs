//! Notification fan-out for finished check reports
//!
//! - [`Notifier`]: a single subscriber (e.g., Telegram)
//! - [`NotificationManager`]: hands a report to every subscriber
//! - [`telegram`]: Telegram Bot API subscriber

pub mod telegram;

pub use telegram::TelegramNotifier;

use std::path::PathBuf;
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;
use thiserror::Error;
use tracing::{error, info};

use crate::check::types::CheckReport;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Failed to read template {path:?}: {source}")]
    TemplateFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Notification API returned status {0}")]
    UnexpectedStatus(u16),
}

/// A subscriber that receives every finished report
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Name used for logging and unsubscribing
    fn name(&self) -> &'static str;

    async fn notify(&self, report: &CheckReport) -> Result<(), NotifyError>;
}

/// Fans a report out to all subscribed notifiers
#[derive(Default)]
pub struct NotificationManager {
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl NotificationManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, notifier: Arc<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    /// Removes the first notifier with the given name; returns false if none matched
    pub fn unsubscribe(&mut self, name: &str) -> bool {
        match self.notifiers.iter().position(|n| n.name() == name) {
            Some(index) => {
                self.notifiers.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }

    /// Delivers the report to every notifier
    ///
    /// A failing notifier does not stop the others; the last failure is returned.
    pub async fn notify_all(&self, report: &CheckReport) -> Result<(), NotifyError> {
        let mut last_error = None;

        for notifier in &self.notifiers {
            match notifier.notify(report).await {
                Ok(()) => info!("Notification sent via {}", notifier.name()),
                Err(e) => {
                    error!("Failed to send notification via {}: {}", notifier.name(), e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifier(name: &'static str, status: Option<u16>) -> MockNotifier {
        let mut notifier = MockNotifier::new();
        notifier.expect_name().return_const(name);
        notifier
            .expect_notify()
            .times(1)
            .returning(move |_| match status {
                Some(code) => Err(NotifyError::UnexpectedStatus(code)),
                None => Ok(()),
            });
        notifier
    }

    #[tokio::test]
    async fn notify_all_calls_every_notifier() {
        let mut manager = NotificationManager::new();
        manager.subscribe(Arc::new(notifier("first", None)));
        manager.subscribe(Arc::new(notifier("second", None)));

        let result = manager.notify_all(&CheckReport::default()).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn notify_all_continues_after_failure_and_returns_last_error() {
        let mut manager = NotificationManager::new();
        manager.subscribe(Arc::new(notifier("first", Some(500))));
        manager.subscribe(Arc::new(notifier("second", Some(502))));
        manager.subscribe(Arc::new(notifier("third", None)));

        let result = manager.notify_all(&CheckReport::default()).await;

        assert!(matches!(result, Err(NotifyError::UnexpectedStatus(502))));
    }

    #[tokio::test]
    async fn notify_all_without_notifiers_succeeds() {
        let manager = NotificationManager::new();

        assert!(manager.notify_all(&CheckReport::default()).await.is_ok());
    }

    #[test]
    fn unsubscribe_removes_notifier_by_name() {
        let mut manager = NotificationManager::new();
        let mut telegram = MockNotifier::new();
        telegram.expect_name().return_const("telegram");
        manager.subscribe(Arc::new(telegram));

        assert!(!manager.unsubscribe("email"));
        assert!(manager.unsubscribe("telegram"));
        assert!(manager.is_empty());
    }
}
