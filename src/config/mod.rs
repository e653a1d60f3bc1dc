//! Configuration file loading and validation.
//!
//! Configuration is a single TOML file, by default `chanwatch.toml` in the
//! working directory. The path can be overridden with `--config` or the
//! `CHANWATCH_CONFIG` environment variable.
//!
//! Defaults mirror a small self-hosted gateway: 5 concurrent probes, 5
//! requests per second, 10 second probe timeout.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ChanwatchError, Result};
use crate::util::time::parse_duration;

/// Environment variable overriding the config file path.
pub const ENV_CONFIG: &str = "CHANWATCH_CONFIG";

/// Default probe concurrency cap shared across a cycle.
pub const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Default outbound probe requests per second.
pub const DEFAULT_RPS: u32 = 5;

/// Default per-probe timeout.
pub const DEFAULT_TIMEOUT: &str = "10s";

/// Default cycle interval.
pub const DEFAULT_INTERVAL: &str = "5m";

/// Default metrics listen address (scrape-only exposition).
pub const DEFAULT_METRICS_LISTEN: &str = "0.0.0.0:2112";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Path to the gateway SQLite database.
    pub database: String,

    /// Cycle interval, e.g. `"5m"` or `"90s"`.
    #[serde(default = "default_interval")]
    pub interval: String,

    /// Per-probe timeout, e.g. `"10s"`.
    #[serde(default = "default_timeout")]
    pub timeout: String,

    /// Probe concurrency cap, shared across all channels in a cycle.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Outbound probe requests per second, shared across the cycle.
    #[serde(default = "default_rps")]
    pub rps: u32,

    /// Compute and report diffs but never write to the store.
    #[serde(default)]
    pub dry_run: bool,

    /// Always probe the static `models` list instead of discovering.
    #[serde(default)]
    pub force_models: bool,

    /// Probe each channel's persisted model list instead of its catalog.
    #[serde(default)]
    pub force_inside_models: bool,

    /// Static model list: the forced list when `force_models` is set, and the
    /// fallback when a channel's catalog endpoint fails.
    #[serde(default)]
    pub models: Vec<String>,

    /// Channel ids excluded from testing entirely.
    #[serde(default)]
    pub exclude_channels: Vec<i64>,

    /// Model names dropped from catalog responses.
    #[serde(default)]
    pub exclude_models: Vec<String>,

    /// Listen address for the `/metrics` and `/health` endpoints.
    #[serde(default = "default_metrics_listen")]
    pub metrics_listen: String,

    #[serde(default)]
    pub notification: NotificationConfig,

    #[serde(default)]
    pub uptime: UptimeConfig,
}

/// Notification transports for model-set changes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotificationConfig {
    #[serde(default)]
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
}

/// SMTP email transport settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SmtpConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
}

/// Chat-webhook transport settings (Telegram bot API shape).
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WebhookConfig {
    #[serde(default)]
    pub enabled: bool,
    /// API base the bot path is appended to.
    #[serde(default = "default_webhook_api_base")]
    pub api_base: String,
    /// Bot token or shared secret used to build the webhook URL.
    #[serde(default)]
    pub secret: String,
    #[serde(default)]
    pub chat_id: String,
    /// Delivery attempts before giving up.
    #[serde(default = "default_webhook_retry")]
    pub retry: u32,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_base: default_webhook_api_base(),
            secret: String::new(),
            chat_id: String::new(),
            retry: default_webhook_retry(),
        }
    }
}

/// Uptime-Kuma style push settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UptimeConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Push URL per model name.
    #[serde(default)]
    pub model_urls: HashMap<String, String>,
    /// Push URL per channel id (stringified).
    #[serde(default)]
    pub channel_urls: HashMap<String, String>,
}

fn default_interval() -> String {
    DEFAULT_INTERVAL.to_string()
}

fn default_timeout() -> String {
    DEFAULT_TIMEOUT.to_string()
}

const fn default_max_concurrent() -> usize {
    DEFAULT_MAX_CONCURRENT
}

const fn default_rps() -> u32 {
    DEFAULT_RPS
}

fn default_metrics_listen() -> String {
    DEFAULT_METRICS_LISTEN.to_string()
}

const fn default_smtp_port() -> u16 {
    587
}

const fn default_webhook_retry() -> u32 {
    3
}

fn default_webhook_api_base() -> String {
    "https://api.telegram.org".to_string()
}

impl Config {
    /// Load and validate a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, fails to parse, or fails
    /// validation. These are fatal at startup.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|_| {
            ChanwatchError::ConfigNotFound {
                path: path.display().to_string(),
            }
        })?;
        let config: Self =
            toml::from_str(&raw).map_err(|e| ChanwatchError::ConfigParse {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate field values. Called by [`Config::load`].
    ///
    /// # Errors
    ///
    /// Returns an error for malformed durations, a zero concurrency cap or
    /// rate ceiling, or an unparseable metrics listen address.
    pub fn validate(&self) -> Result<()> {
        parse_duration(&self.interval).map_err(|e| ChanwatchError::ConfigInvalid {
            key: "interval".to_string(),
            message: e.to_string(),
        })?;
        parse_duration(&self.timeout).map_err(|e| ChanwatchError::ConfigInvalid {
            key: "timeout".to_string(),
            message: e.to_string(),
        })?;
        if self.max_concurrent == 0 {
            return Err(ChanwatchError::ConfigInvalid {
                key: "max_concurrent".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if self.rps == 0 {
            return Err(ChanwatchError::ConfigInvalid {
                key: "rps".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if self.notification.webhook.enabled && self.notification.webhook.retry == 0 {
            return Err(ChanwatchError::ConfigInvalid {
                key: "notification.webhook.retry".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        self.metrics_addr()?;
        Ok(())
    }

    /// The cycle interval as a [`Duration`].
    ///
    /// # Panics
    ///
    /// Never panics after a successful [`Config::validate`].
    #[must_use]
    pub fn interval(&self) -> Duration {
        parse_duration(&self.interval).unwrap_or(Duration::from_secs(300))
    }

    /// The per-probe timeout as a [`Duration`].
    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        parse_duration(&self.timeout).unwrap_or(Duration::from_secs(10))
    }

    /// Parsed metrics listen address.
    ///
    /// # Errors
    ///
    /// Returns a config error if the address does not parse.
    pub fn metrics_addr(&self) -> Result<SocketAddr> {
        self.metrics_listen
            .parse()
            .map_err(|_| ChanwatchError::ConfigInvalid {
                key: "metrics_listen".to_string(),
                message: format!("invalid listen address '{}'", self.metrics_listen),
            })
    }
}
