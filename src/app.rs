//! Application runner: wires the checker and notifiers, runs once or on a schedule

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::check::dispatcher::create_default_dispatcher;
use crate::check::engine::Checker;
use crate::check::runtime::ContainerRuntime;
use crate::check::runtimes::DockerRuntime;
use crate::check::tag_source::TagSource;
use crate::check::tag_sources::DockerHubTags;
use crate::check::types::{CheckReport, RunMetadata};
use crate::config::{AppConfig, CheckerConfig, ConfigError, parse_schedule};
use crate::notify::{NotificationManager, TelegramNotifier};
use crate::report::render_report;

/// When the daemon runs again after a finished check
#[derive(Debug, Clone)]
pub enum RunSchedule {
    Every(Duration),
    Cron(cron::Schedule),
}

impl RunSchedule {
    /// Uses `checker.schedule` when set, otherwise `checker.interval_secs`
    pub fn from_config(config: &CheckerConfig) -> Result<Self, ConfigError> {
        match &config.schedule {
            Some(expression) => Ok(Self::Cron(parse_schedule(expression)?)),
            None => Ok(Self::Every(Duration::from_secs(config.interval_secs))),
        }
    }

    /// Time to wait after `now` before the next run
    ///
    /// Returns `None` when a cron schedule has no upcoming fire time.
    pub fn next_delay(&self, now: DateTime<Utc>) -> Option<Duration> {
        match self {
            Self::Every(interval) => Some(*interval),
            Self::Cron(schedule) => schedule
                .after(&now)
                .next()
                .map(|at| (at - now).to_std().unwrap_or(Duration::ZERO)),
        }
    }
}

impl fmt::Display for RunSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Every(interval) => write!(f, "every {}s", interval.as_secs()),
            Self::Cron(schedule) => write!(f, "cron {}", schedule),
        }
    }
}

pub struct App {
    checker: Checker,
    notifier: NotificationManager,
    hostname: String,
    schedule: RunSchedule,
}

impl App {
    pub fn new(checker: Checker, notifier: NotificationManager, schedule: RunSchedule) -> Self {
        Self {
            checker,
            notifier,
            hostname: hostname(),
            schedule,
        }
    }

    /// Builds the Docker-backed application described by the configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.checker.timeout_secs);

        let runtime: Arc<dyn ContainerRuntime> = Arc::new(
            DockerRuntime::connect(&config.env.docker_host, timeout)
                .context("Failed to create Docker client")?,
        );
        let tags: Arc<dyn TagSource> = Arc::new(DockerHubTags::new(
            &config.registries.docker_hub_url,
            timeout,
        ));

        let dispatcher = create_default_dispatcher(runtime.clone(), tags, &config.checker);
        let checker = Checker::new(runtime, dispatcher).with_concurrency(config.checker.concurrency);

        let mut notifier = NotificationManager::new();
        let telegram = &config.notifications.telegram;
        if telegram.enabled {
            // Presence is checked by AppConfig::validate
            let token = config.env.telegram_bot_token.clone().unwrap_or_default();
            let chat_id = config.env.telegram_chat_id.clone().unwrap_or_default();
            let telegram = TelegramNotifier::from_config(telegram, token, chat_id, timeout)
                .context("Failed to create Telegram notifier")?;
            notifier.subscribe(Arc::new(telegram));
        }

        Ok(Self::new(
            checker,
            notifier,
            RunSchedule::from_config(&config.checker)?,
        ))
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    /// Runs a single check, prints the report, and notifies when there is something to report
    pub async fn run_once(&self) -> Result<CheckReport> {
        info!("Starting image update check");

        let report = self
            .checker
            .check_all()
            .await
            .context("Failed to check containers")?
            .with_metadata(RunMetadata::now(self.hostname.clone()));

        println!("{}", render_report(&report));

        if report.needs_notification() {
            info!(
                "Sending notifications ({} updates, {} failures)",
                report.available.len(),
                report.failed.len()
            );
            if let Err(e) = self.notifier.notify_all(&report).await {
                warn!("Failed to send notifications: {}", e);
            }
        } else {
            info!("No updates or failures, skipping notifications");
        }

        info!("Image update check finished");
        Ok(report)
    }

    /// Runs a check immediately and then on the schedule until a shutdown signal
    ///
    /// The next run is scheduled only after the current one completes, so runs
    /// never overlap.
    pub async fn run_daemon(&self) -> Result<()> {
        info!("Starting daemon mode (schedule: {})", self.schedule);

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            if let Err(e) = self.run_once().await {
                error!("Check run failed: {:#}", e);
            }

            let Some(delay) = self.schedule.next_delay(Utc::now()) else {
                warn!("Schedule has no upcoming run, stopping daemon");
                return Ok(());
            };
            debug!("Next check in {}s", delay.as_secs());

            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown signal received, stopping daemon");
                    return Ok(());
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

/// Returns the host name from the kernel, then `$HOSTNAME`, then "unknown"
pub fn hostname() -> String {
    hostname_from(
        std::fs::read_to_string("/proc/sys/kernel/hostname").ok(),
        std::env::var("HOSTNAME").ok(),
    )
}

fn hostname_from(kernel: Option<String>, env: Option<String>) -> String {
    kernel
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .or_else(|| env.filter(|h| !h.is_empty()))
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::dispatcher::StrategyDispatcher;
    use crate::check::error::RuntimeError;
    use crate::check::runtime::MockContainerRuntime;
    use crate::check::strategy::MockCheckStrategy;
    use crate::check::types::{ContainerRef, UpdateVerdict};
    use crate::notify::{MockNotifier, NotifyError};
    use chrono::TimeZone;
    use rstest::rstest;

    fn container(name: &str, image: &str) -> ContainerRef {
        ContainerRef {
            id: format!("{name}-id"),
            name: name.to_string(),
            image: image.to_string(),
            image_id: "sha256:aaa".to_string(),
            status: "Up 1 hour".to_string(),
        }
    }

    fn app(containers: Vec<ContainerRef>, notifier: MockNotifier) -> App {
        let mut runtime = MockContainerRuntime::new();
        runtime
            .expect_list_running_containers()
            .returning(move || Ok(containers.clone()));

        let mut strategy = MockCheckStrategy::new();
        strategy.expect_name().return_const("stale");
        strategy.expect_can_handle().return_const(true);
        strategy.expect_check().returning(|c| UpdateVerdict {
            is_up_to_date: !c.image.ends_with(":old"),
            ..UpdateVerdict::new(c.clone())
        });

        let checker = Checker::new(
            Arc::new(runtime),
            StrategyDispatcher::new().with_strategy(Arc::new(strategy)),
        );
        let mut manager = NotificationManager::new();
        manager.subscribe(Arc::new(notifier));

        App::new(checker, manager, RunSchedule::Every(Duration::from_secs(60)))
            .with_hostname("test-host")
    }

    #[tokio::test]
    async fn run_once_attaches_metadata_and_notifies_about_updates() {
        let mut notifier = MockNotifier::new();
        notifier.expect_name().return_const("mock");
        notifier
            .expect_notify()
            .withf(|report| report.available.len() == 1 && report.hostname() == Some("test-host"))
            .times(1)
            .returning(|_| Ok(()));

        let report = app(vec![container("web", "nginx:old")], notifier)
            .run_once()
            .await
            .unwrap();

        assert_eq!(report.hostname(), Some("test-host"));
        assert_eq!(report.available.len(), 1);
    }

    #[tokio::test]
    async fn run_once_skips_notification_when_everything_is_up_to_date() {
        let mut notifier = MockNotifier::new();
        notifier.expect_name().return_const("mock");
        notifier.expect_notify().times(0);

        let report = app(vec![container("web", "nginx:1.27")], notifier)
            .run_once()
            .await
            .unwrap();

        assert_eq!(report.up_to_date.len(), 1);
    }

    #[tokio::test]
    async fn run_once_succeeds_when_notification_fails() {
        let mut notifier = MockNotifier::new();
        notifier.expect_name().return_const("mock");
        notifier
            .expect_notify()
            .times(1)
            .returning(|_| Err(NotifyError::UnexpectedStatus(500)));

        let result = app(vec![container("web", "nginx:old")], notifier)
            .run_once()
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn run_once_fails_when_listing_fails() {
        let mut runtime = MockContainerRuntime::new();
        runtime
            .expect_list_running_containers()
            .returning(|| Err(RuntimeError::Api("daemon unreachable".to_string())));
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(0);
        let mut manager = NotificationManager::new();
        manager.subscribe(Arc::new(notifier));
        let app = App::new(
            Checker::new(Arc::new(runtime), StrategyDispatcher::new()),
            manager,
            RunSchedule::Every(Duration::from_secs(60)),
        );

        let err = app.run_once().await.unwrap_err();

        assert!(format!("{:#}", err).contains("daemon unreachable"));
    }

    fn at(hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, minute, second).unwrap()
    }

    #[rstest]
    #[case(at(2, 30, 0), Duration::from_secs(30 * 60))]
    #[case(at(2, 59, 30), Duration::from_secs(30))]
    #[case(at(3, 0, 0), Duration::from_secs(24 * 60 * 60))]
    #[case(at(4, 0, 0), Duration::from_secs(23 * 60 * 60))]
    fn next_delay_waits_until_next_cron_fire_time(
        #[case] now: DateTime<Utc>,
        #[case] expected: Duration,
    ) {
        let schedule = RunSchedule::Cron(parse_schedule("0 3 * * *").unwrap());

        assert_eq!(schedule.next_delay(now), Some(expected));
    }

    #[test]
    fn next_delay_returns_fixed_interval() {
        let schedule = RunSchedule::Every(Duration::from_secs(600));

        assert_eq!(schedule.next_delay(at(12, 0, 0)), Some(Duration::from_secs(600)));
    }

    #[rstest]
    #[case(Some("*/10 * * * *"), "cron 0 */10 * * * *")]
    #[case(None, "every 3600s")]
    fn run_schedule_from_config_prefers_cron_expression(
        #[case] schedule: Option<&str>,
        #[case] expected: &str,
    ) {
        let config = CheckerConfig {
            schedule: schedule.map(String::from),
            interval_secs: 3600,
            ..CheckerConfig::default()
        };

        let schedule = RunSchedule::from_config(&config).unwrap();

        assert_eq!(schedule.to_string(), expected);
    }

    #[test]
    fn run_schedule_from_config_rejects_invalid_expression() {
        let config = CheckerConfig {
            schedule: Some("whenever".to_string()),
            ..CheckerConfig::default()
        };

        assert!(matches!(
            RunSchedule::from_config(&config),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[rstest]
    #[case(Some("node-1\n"), None, "node-1")]
    #[case(Some("  "), Some("from-env"), "from-env")]
    #[case(None, Some("from-env"), "from-env")]
    #[case(None, Some(""), "unknown")]
    #[case(None, None, "unknown")]
    fn hostname_from_prefers_kernel_then_env(
        #[case] kernel: Option<&str>,
        #[case] env: Option<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(
            hostname_from(kernel.map(String::from), env.map(String::from)),
            expected
        );
    }
}
