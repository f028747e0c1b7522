//! Telegram notification delivery.
//!
//! [`TelegramNotifier`] sends Markdown-formatted messages to a chat via
//! the Bot API. Delivery is best-effort: the executor logs failures and
//! keeps going, so a broken bot token never blocks an evaluation.

use std::time::Duration;

use async_trait::async_trait;

/// Telegram Bot API base URL.
const API_BASE: &str = "https://api.telegram.org";

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Error type for notification delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Telegram returned a non-2xx status code.
    #[error("Telegram returned HTTP {0}")]
    HttpStatus(u16),

    /// No bot token / chat id were configured for this run.
    #[error("Telegram credentials are not configured")]
    NotConfigured,
}

/// Delivery seam for outgoing notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

/// Sends messages to a Telegram chat via the Bot API.
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: String, chat_id: String) -> Self {
        Self::with_api_base(API_BASE.to_string(), bot_token, chat_id)
    }

    /// Create a notifier against an alternate API base URL (tests,
    /// self-hosted Bot API servers).
    pub fn with_api_base(api_base: String, bot_token: String, chat_id: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            api_base,
            bot_token,
            chat_id,
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_token);
        let payload = serde_json::json!({
            "chat_id": self.chat_id,
            "text": text,
            "parse_mode": "Markdown",
        });

        let response = self.client.post(url).json(&payload).send().await?;
        if !response.status().is_success() {
            return Err(NotifyError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

/// Stands in when Telegram credentials are absent; every send fails with
/// [`NotifyError::NotConfigured`] and is logged by the executor.
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn send(&self, _text: &str) -> Result<(), NotifyError> {
        Err(NotifyError::NotConfigured)
    }
}
