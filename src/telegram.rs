//! Telegram notification channel.

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::TelegramConfig;
use crate::error::{Error, SinkError};
use crate::secret::Secret;
use crate::sink::Notifier;

const SERVICE: &str = "telegram";

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends reports to a Telegram chat through the Bot API.
///
/// Delivery is synchronous and bounded by the configured timeout. Errors are
/// returned to the caller, which records them; nothing is retried.
pub struct TelegramNotifier {
    client: reqwest::blocking::Client,
    api_base: String,
    token: Secret<String>,
    chat_id: String,
}

impl TelegramNotifier {
    /// Default Bot API endpoint.
    pub const DEFAULT_API_BASE: &'static str = "https://api.telegram.org";

    /// Creates a notifier for `chat_id` using the default endpoint and a
    /// ten second timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the token or chat id is empty.
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Result<Self, Error> {
        Self::with_endpoint(token, chat_id, Self::DEFAULT_API_BASE, Duration::from_secs(10))
    }

    /// Creates a notifier against a custom Bot API endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the token or chat id is empty or the HTTP
    /// client cannot be built.
    pub fn with_endpoint(
        token: impl Into<String>,
        chat_id: impl Into<String>,
        api_base: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let token = token.into();
        let chat_id = chat_id.into();

        if token.trim().is_empty() {
            return Err(Error::config("telegram bot token is empty"));
        }
        if chat_id.trim().is_empty() {
            return Err(Error::config("telegram chat id is empty"));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: Secret::new(token),
            chat_id,
        })
    }

    /// Builds a notifier from configuration.
    ///
    /// Returns `Ok(None)` when notifications are not configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured values are unusable.
    pub fn from_config(config: &TelegramConfig) -> Result<Option<Self>, Error> {
        match (&config.bot_token, &config.chat_id) {
            (Some(token), Some(chat_id)) if config.is_enabled() => Self::with_endpoint(
                token.as_str(),
                chat_id.as_str(),
                config.api_base.as_str(),
                Duration::from_secs(config.timeout_secs),
            )
            .map(Some),
            _ => Ok(None),
        }
    }

    /// Returns the destination chat id.
    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base,
            self.token.expose_secret()
        )
    }
}

impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("api_base", &self.api_base)
            .field("token", &self.token)
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl Notifier for TelegramNotifier {
    fn send(&self, message: &str) -> Result<(), SinkError> {
        let body = SendMessage {
            chat_id: &self.chat_id,
            text: message,
        };

        // Request errors carry the URL, which contains the token.
        let response = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .map_err(|e| SinkError::transport(e.without_url()))?;

        let status = response.status();
        let body: Option<ApiResponse> = response.json().ok();

        check_response(status, body)?;
        tracing::debug!(chat_id = %self.chat_id, len = message.len(), "telegram notification sent");
        Ok(())
    }
}

/// Decides whether the Bot API accepted a message.
///
/// Both a success status and `ok: true` are required. The reason of a
/// rejection comes from the API's `description` or the status line, never
/// from the request URL.
fn check_response(status: StatusCode, body: Option<ApiResponse>) -> Result<(), SinkError> {
    match body {
        Some(api) if status.is_success() && api.ok => Ok(()),
        Some(api) => Err(SinkError::Rejected {
            service: SERVICE,
            reason: api
                .description
                .unwrap_or_else(|| format!("HTTP {}", status)),
        }),
        None => Err(SinkError::Rejected {
            service: SERVICE,
            reason: format!("HTTP {} with unreadable body", status),
        }),
    }
}
