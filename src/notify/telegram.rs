//! Telegram Bot API notifier

use super::{OrderNotifier, format_order_message};
use crate::config::TelegramConfig;
use crate::services::Order;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("telegram transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("telegram api rejected message: {0}")]
    Api(String),
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'static str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends the order summary to each allowed chat
pub struct TelegramNotifier {
    client: reqwest::Client,
    endpoint: String,
    chat_ids: Vec<i64>,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Result<Self, TelegramError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/bot{}/sendMessage",
                config.api_base.trim_end_matches('/'),
                config.token
            ),
            chat_ids: config.allowed_chat_ids.clone(),
        })
    }

    async fn send(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        let response: ApiResponse = self
            .client
            .post(&self.endpoint)
            .json(&SendMessage {
                chat_id,
                text,
                parse_mode: "HTML",
            })
            .send()
            .await?
            .json()
            .await?;

        if response.ok {
            Ok(())
        } else {
            Err(TelegramError::Api(
                response.description.unwrap_or_else(|| "no description".to_string()),
            ))
        }
    }
}

#[async_trait]
impl OrderNotifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn notify_new_order(&self, order: &Order) {
        let text = format_order_message(order);
        for &chat_id in &self.chat_ids {
            if let Err(err) = self.send(chat_id, &text).await {
                tracing::error!(
                    error = %err,
                    chat_id,
                    order_id = order.id,
                    "send new order to telegram"
                );
            }
        }
    }
}
