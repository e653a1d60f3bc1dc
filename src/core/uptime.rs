//! Uptime-Kuma style push collaborator.
//!
//! After a successful probe the checker fires a GET against the configured
//! push URL for that model and for its channel. Failures are logged and
//! counted only; they never affect the probe result.

use std::sync::Arc;

use reqwest::Client;

use crate::config::UptimeConfig;
use crate::error::{ChanwatchError, Result};
use crate::metrics::Metrics;

/// Push-URL dispatcher. Disabled configs turn every call into a no-op.
pub struct UptimePusher {
    config: UptimeConfig,
    client: Client,
    metrics: Arc<Metrics>,
}

impl UptimePusher {
    #[must_use]
    pub fn new(config: UptimeConfig, client: Client, metrics: Arc<Metrics>) -> Self {
        Self {
            config,
            client,
            metrics,
        }
    }

    /// Push for a successful model probe. Logs on failure, never errors out.
    pub async fn push_model(&self, model: &str) {
        if !self.config.enabled {
            return;
        }
        let Some(url) = self.config.model_urls.get(model) else {
            return;
        };
        match self.push(url).await {
            Ok(()) => self.metrics.record_uptime_push("model", true),
            Err(e) => {
                tracing::warn!(model, error = %e, "uptime push failed");
                self.metrics.record_uptime_push("model", false);
            }
        }
    }

    /// Push for a channel with at least one successful probe.
    pub async fn push_channel(&self, channel_id: i64) {
        if !self.config.enabled {
            return;
        }
        let Some(url) = self.config.channel_urls.get(&channel_id.to_string()) else {
            return;
        };
        match self.push(url).await {
            Ok(()) => self.metrics.record_uptime_push("channel", true),
            Err(e) => {
                tracing::warn!(channel_id, error = %e, "uptime push failed");
                self.metrics.record_uptime_push("channel", false);
            }
        }
    }

    async fn push(&self, url: &str) -> Result<()> {
        let response = self
            .client
            .get(url)
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
}
