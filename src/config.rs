use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// Time-related constants
// =============================================================================

/// Default interval between daemon runs in seconds (6 hours)
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 6 * 60 * 60;

/// Timeout for a single Docker API or registry HTTP call in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// Endpoint constants
// =============================================================================

/// Maximum number of tags requested from the tag-listing endpoint (single page)
pub const TAG_PAGE_SIZE: usize = 100;

pub const DEFAULT_DOCKER_HOST: &str = "unix:///var/run/docker.sock";
pub const DEFAULT_DOCKER_HUB_URL: &str = "https://registry.hub.docker.com";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_CONFIG_PATH: &str = "configs/config.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    #[error("Failed to load .env file: {0}")]
    DotEnv(#[from] dotenvy::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Application configuration: YAML file sections plus environment values
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub checker: CheckerConfig,
    pub registries: RegistriesConfig,
    pub notifications: NotificationsConfig,
    pub logging: LoggingConfig,
    #[serde(skip)]
    pub env: EnvConfig,
}

/// Checking engine configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CheckerConfig {
    /// Five-field cron expression (`0 3 * * *`); takes precedence over `interval_secs`
    pub schedule: Option<String>,
    /// Daemon interval in seconds when no schedule is set
    pub interval_secs: u64,
    /// Per-call timeout for Docker API and tag-listing requests
    pub timeout_secs: u64,
    /// Number of containers checked at once
    pub concurrency: usize,
    /// Image patterns that are never checked (`nginx`, `nginx:1.25`, `myorg/*`)
    pub exclude_images: Vec<String>,
    /// Check images whose name contains "build" instead of skipping them
    pub include_build_images: bool,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            schedule: None,
            interval_secs: DEFAULT_CHECK_INTERVAL_SECS,
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            concurrency: 1,
            exclude_images: Vec::new(),
            include_build_images: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RegistriesConfig {
    pub docker_hub_url: String,
}

impl Default for RegistriesConfig {
    fn default() -> Self {
        Self {
            docker_hub_url: DEFAULT_DOCKER_HUB_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct NotificationsConfig {
    pub telegram: TelegramConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TelegramConfig {
    pub enabled: bool,
    /// Tera template for the message body; the embedded template is used when unset
    pub template_file: Option<PathBuf>,
    pub api_url: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            template_file: None,
            api_url: DEFAULT_TELEGRAM_API_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file path; logs go to stderr when unset
    pub file: Option<PathBuf>,
    /// Number of rotated daily log files to keep (0 keeps all)
    pub max_backups: usize,
    pub json: bool,
}

/// Values read from the process environment
#[derive(Debug, Clone, PartialEq)]
pub struct EnvConfig {
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub docker_host: String,
    pub log_level: String,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            telegram_bot_token: None,
            telegram_chat_id: None,
            docker_host: DEFAULT_DOCKER_HOST.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl EnvConfig {
    /// Reads the environment of the current process
    pub fn from_process_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Self {
            telegram_bot_token: non_empty("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: non_empty("TELEGRAM_CHAT_ID"),
            docker_host: non_empty("DOCKER_HOST").unwrap_or(defaults.docker_host),
            log_level: non_empty("LOG_LEVEL").unwrap_or(defaults.log_level),
        }
    }
}

impl AppConfig {
    /// Loads `.env` (if present), the YAML file and the environment, then validates
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        check_dotenv(dotenvy::dotenv())?;

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_yaml(&content)?;
        config.env = EnvConfig::from_process_env();
        config.validate()?;

        Ok(config)
    }

    /// Parses the YAML sections only; environment values keep their defaults
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml_ng::from_str(content)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.notifications.telegram.enabled {
            if self.env.telegram_bot_token.is_none() {
                return Err(ConfigError::Invalid(
                    "TELEGRAM_BOT_TOKEN is required when telegram notifications are enabled"
                        .to_string(),
                ));
            }
            if self.env.telegram_chat_id.is_none() {
                return Err(ConfigError::Invalid(
                    "TELEGRAM_CHAT_ID is required when telegram notifications are enabled"
                        .to_string(),
                ));
            }
        }

        if let Some(expression) = &self.checker.schedule {
            parse_schedule(expression)?;
        }

        if self.checker.interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "checker.interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.checker.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "checker.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.checker.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "checker.concurrency must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// A missing .env file is normal outside development; anything else is an error
fn check_dotenv<T>(result: Result<T, dotenvy::Error>) -> Result<(), ConfigError> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(ConfigError::DotEnv(e)),
    }
}

/// Parses a standard five-field cron expression (minute, hour, day of month, month, day of week)
///
/// Fire times are computed in UTC.
pub fn parse_schedule(expression: &str) -> Result<cron::Schedule, ConfigError> {
    let fields = expression.split_whitespace().collect::<Vec<_>>();
    if fields.len() != 5 {
        return Err(ConfigError::Invalid(format!(
            "checker.schedule {:?} must have 5 fields, found {}",
            expression,
            fields.len()
        )));
    }

    // The cron crate expects a leading seconds field
    cron::Schedule::from_str(&format!("0 {}", fields.join(" "))).map_err(|e| {
        ConfigError::Invalid(format!(
            "checker.schedule {:?} is not a valid cron expression: {}",
            expression, e
        ))
    })
}
