//! Chat-webhook notification transport (Telegram bot API shape).
//!
//! Delivery retries a configured number of times with a fixed backoff via
//! the shared retry utility, then gives up. The API base is configurable
//! so deployments can point at a proxy or a test double.

use reqwest::Client;
use serde_json::json;

use super::render_message;
use crate::config::WebhookConfig;
use crate::core::models::ModelSetDiff;
use crate::core::retry::{WEBHOOK_BACKOFF, retry_with_backoff};
use crate::error::{ChanwatchError, Result};

/// Deliver a diff to the configured webhook.
///
/// # Errors
///
/// Returns an error once all attempts are exhausted.
pub async fn send(client: &Client, config: &WebhookConfig, diff: &ModelSetDiff) -> Result<()> {
    let url = format!(
        "{}/bot{}/sendMessage",
        config.api_base.trim_end_matches('/'),
        config.secret
    );
    let body = json!({
        "chat_id": config.chat_id,
        "text": render_message(diff),
    });

    retry_with_backoff(config.retry, WEBHOOK_BACKOFF, || {
        post_once(client, &url, &body)
    })
    .await
    .map_err(|e| ChanwatchError::Notification {
        transport: "webhook".to_string(),
        message: e.to_string(),
    })
}

async fn post_once(client: &Client, url: &str, body: &serde_json::Value) -> Result<()> {
    let response = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|e| ChanwatchError::Network(e.to_string()))?;

    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(ChanwatchError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}
