//! Application context: explicit dependency injection for the checker.
//!
//! Built once at startup and passed into the scheduler, testers, and
//! reconciler. Holds the loaded config, the store handle, the shared HTTP
//! client, the cycle-wide concurrency cap and rate limiter, and the
//! collaborators (metrics, notifier, uptime pusher).

use std::sync::Arc;

use reqwest::Client;
use tokio::sync::Semaphore;

use super::http::{DEFAULT_TIMEOUT, build_client};
use super::limiter::RateLimiter;
use super::uptime::UptimePusher;
use crate::config::Config;
use crate::error::Result;
use crate::metrics::Metrics;
use crate::notify::Notifier;
use crate::storage::ChannelStore;

/// Shared state for one checker process.
pub struct AppContext {
    pub config: Config,
    pub store: Arc<dyn ChannelStore>,
    pub client: Client,
    /// Token-bucket ceiling shared by every probe in a cycle.
    pub limiter: RateLimiter,
    /// Concurrency cap shared by every probe in a cycle.
    pub slots: Arc<Semaphore>,
    pub metrics: Arc<Metrics>,
    pub notifier: Notifier,
    pub uptime: UptimePusher,
}

impl AppContext {
    /// Wire up the context from a validated config and an opened store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: Config, store: Arc<dyn ChannelStore>) -> Result<Arc<Self>> {
        let client = build_client(DEFAULT_TIMEOUT)?;
        let metrics = Arc::new(Metrics::new());
        let notifier = Notifier::new(
            config.notification.clone(),
            client.clone(),
            Arc::clone(&metrics),
        );
        let uptime = UptimePusher::new(
            config.uptime.clone(),
            client.clone(),
            Arc::clone(&metrics),
        );
        let limiter = RateLimiter::new(config.rps);
        let slots = Arc::new(Semaphore::new(config.max_concurrent));

        Ok(Arc::new(Self {
            config,
            store,
            client,
            limiter,
            slots,
            metrics,
            notifier,
            uptime,
        }))
    }
}
