use async_trait::async_trait;
use tracing::{debug, error};

use crate::config::MailerConfig;

const UNISENDER_URL: &str = "https://api.unisender.com/ru/api/sendEmail";
const FORMAT: &str = "json";
const LIST_ID: &str = "1";

/// Outbound notification capability. The auth handlers only know this
/// interface; the wire implementation lives behind it.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

/// Unisender HTTP client. Credentials and sender identity come from config.
pub struct Unisender {
    http: reqwest::Client,
    config: MailerConfig,
}

impl Unisender {
    pub fn new(config: MailerConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl NotificationSender for Unisender {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        let email_to = format!("User <{}>", recipient);
        let response = self
            .http
            .post(UNISENDER_URL)
            .query(&[
                ("api_key", self.config.api_key.as_str()),
                ("sender_name", self.config.sender_name.as_str()),
                ("sender_email", self.config.sender_email.as_str()),
                ("email", email_to.as_str()),
                ("subject", subject),
                ("body", body),
                ("format", FORMAT),
                ("list_id", LIST_ID),
            ])
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "unisender request failed");
                anyhow::anyhow!(e)
            })?;

        if !response.status().is_success() {
            error!(status = %response.status(), "unisender rejected send");
            anyhow::bail!("unisender responded with {}", response.status());
        }

        debug!(recipient = %recipient, "notification sent");
        Ok(())
    }
}

/// Mailer that drops everything. Used by `AppState::fake()` in tests.
pub struct NoopMailer;

#[async_trait]
impl NotificationSender for NoopMailer {
    async fn send(&self, _recipient: &str, _subject: &str, _body: &str) -> anyhow::Result<()> {
        Ok(())
    }
}
