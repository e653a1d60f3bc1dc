//! Notification collaborator for model-set changes.
//!
//! The dispatcher fans a [`ModelSetDiff`] out to whichever transports are
//! enabled. Delivery is at-least-once with bounded retries inside the
//! webhook transport; the reconciler never retries a dispatch and a failed
//! dispatch never affects the already-committed store write.

pub mod email;
pub mod webhook;

use std::sync::Arc;

use reqwest::Client;

use crate::config::NotificationConfig;
use crate::core::models::ModelSetDiff;
use crate::error::Result;
use crate::metrics::Metrics;

/// Render the human-readable notification body shared by all transports.
#[must_use]
pub fn render_message(diff: &ModelSetDiff) -> String {
    format!(
        "Channel ID: {}\nChannel name: {}\nAdded models: {:?}\nRemoved models: {:?}\nCurrent models: {:?}\n",
        diff.channel_id, diff.channel_name, diff.added, diff.removed, diff.new_models
    )
}

/// Dispatches diffs to the enabled transports.
pub struct Notifier {
    config: NotificationConfig,
    client: Client,
    metrics: Arc<Metrics>,
}

impl Notifier {
    #[must_use]
    pub fn new(config: NotificationConfig, client: Client, metrics: Arc<Metrics>) -> Self {
        Self {
            config,
            client,
            metrics,
        }
    }

    /// Whether any transport is enabled.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.config.smtp.enabled || self.config.webhook.enabled
    }

    /// Deliver a diff to every enabled transport.
    ///
    /// # Errors
    ///
    /// Returns the first transport error; remaining transports are still
    /// attempted before returning.
    pub async fn send(&self, diff: &ModelSetDiff) -> Result<()> {
        let mut first_err = None;

        if self.config.smtp.enabled {
            match email::send(&self.config.smtp, diff).await {
                Ok(()) => self.metrics.record_notification("email", true),
                Err(e) => {
                    tracing::error!(channel_id = diff.channel_id, error = %e, "email notification failed");
                    self.metrics.record_notification("email", false);
                    first_err.get_or_insert(e);
                }
            }
        }

        if self.config.webhook.enabled {
            match webhook::send(&self.client, &self.config.webhook, diff).await {
                Ok(()) => self.metrics.record_notification("webhook", true),
                Err(e) => {
                    tracing::error!(channel_id = diff.channel_id, error = %e, "webhook notification failed");
                    self.metrics.record_notification("webhook", false);
                    first_err.get_or_insert(e);
                }
            }
        }

        match first_err {
            None => Ok(()),
            Some(e) => Err(e),
        }
    }
}
