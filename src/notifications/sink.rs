//! Outbound message delivery.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::error::EngineError;

/// Fire-and-forget message delivery to one recipient.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, recipient: &str, text: &str) -> Result<(), EngineError>;
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram Bot API `sendMessage` sink; recipients are chat ids.
pub struct TelegramSink {
    base_url: String,
    bot_token: String,
    client: reqwest::Client,
}

impl TelegramSink {
    pub fn new(
        base_url: impl Into<String>,
        bot_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::Delivery {
                recipient: "*".to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self::with_client(base_url, bot_token, client))
    }

    pub fn with_client(
        base_url: impl Into<String>,
        bot_token: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            bot_token: bot_token.into(),
            client,
        }
    }
}

#[async_trait]
impl NotificationSink for TelegramSink {
    async fn send(&self, recipient: &str, text: &str) -> Result<(), EngineError> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.base_url.trim_end_matches('/'),
            self.bot_token
        );
        let failed = |reason: String| EngineError::Delivery {
            recipient: recipient.to_string(),
            reason,
        };

        let response = self
            .client
            .post(url)
            .json(&json!({ "chat_id": recipient, "text": text }))
            .send()
            .await
            // the URL path holds the bot token
            .map_err(|e| failed(e.without_url().to_string()))?;

        let status = response.status();
        let body: TelegramResponse = response
            .json()
            .await
            .map_err(|e| failed(format!("status {}: {}", status, e.without_url())))?;

        if !status.is_success() || !body.ok {
            return Err(failed(
                body.description
                    .unwrap_or_else(|| format!("status {}", status)),
            ));
        }

        debug!(recipient = %recipient, "TelegramSink: delivered message to {}", recipient);
        Ok(())
    }
}
