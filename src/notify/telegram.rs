//! Telegram Bot API notifier

use std::path::Path;
use std::time::Duration;

use serde_json::json;
use tera::{Context, Tera};
use tracing::{debug, warn};

use crate::check::types::CheckReport;
use crate::config::TelegramConfig;
use crate::notify::{Notifier, NotifyError};

/// Template used when no template file is configured
pub const DEFAULT_TEMPLATE: &str = include_str!("../../templates/telegram.html.tera");

/// Name of the registered template; the `.html` suffix enables HTML escaping
const TEMPLATE_NAME: &str = "telegram.html";

/// Sends rendered reports to a Telegram chat
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_url: String,
    bot_token: String,
    chat_id: String,
    tera: Tera,
}

impl TelegramNotifier {
    /// Creates a notifier from a template source
    pub fn new(
        api_url: &str,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
        template: &str,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, template)?;

        Ok(Self {
            client: reqwest::Client::builder()
                .user_agent(concat!("image-update-checker/", env!("CARGO_PKG_VERSION")))
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
            api_url: api_url.trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            tera,
        })
    }

    /// Creates a notifier from configuration, loading the template file if one is set
    pub fn from_config(
        config: &TelegramConfig,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let template = match &config.template_file {
            Some(path) => load_template(path)?,
            None => DEFAULT_TEMPLATE.to_string(),
        };

        Self::new(&config.api_url, bot_token, chat_id, &template, timeout)
    }

    /// Renders the message body for a report
    pub fn render(&self, report: &CheckReport) -> Result<String, NotifyError> {
        let mut context = Context::from_serialize(report)?;
        context.insert("hostname", report.hostname().unwrap_or("unknown"));

        Ok(self.tera.render(TEMPLATE_NAME, &context)?)
    }

    async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        let url = format!("{}/bot{}/sendMessage", self.api_url, self.bot_token);

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "chat_id": self.chat_id,
                "text": text,
                "parse_mode": "HTML",
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Telegram API returned status {}", status);
            return Err(NotifyError::UnexpectedStatus(status.as_u16()));
        }

        Ok(())
    }
}

fn load_template(path: &Path) -> Result<String, NotifyError> {
    std::fs::read_to_string(path).map_err(|source| NotifyError::TemplateFile {
        path: path.to_path_buf(),
        source,
    })
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn notify(&self, report: &CheckReport) -> Result<(), NotifyError> {
        let message = self.render(report)?;
        debug!("Rendered Telegram message ({} chars)", message.chars().count());

        self.send_message(&message).await
    }
}
