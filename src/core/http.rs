//! HTTP client utilities.
//!
//! Provides the shared HTTP client used by probes, catalog fetches,
//! notifications, and uptime pushes.

use std::time::Duration;

use reqwest::{Client, ClientBuilder};

use crate::error::{ChanwatchError, Result};

/// Default timeout for non-probe HTTP requests (catalog fetches, webhooks,
/// uptime pushes). Probe requests carry their own configured timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Build a configured HTTP client.
///
/// # Errors
///
/// Returns error if client construction fails.
pub fn build_client(timeout: Duration) -> Result<Client> {
    ClientBuilder::new()
        .timeout(timeout)
        .user_agent(format!("chanwatch/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ChanwatchError::Network(e.to_string()))
}

/// Fetch JSON from a URL with a bearer credential.
///
/// # Errors
///
/// Returns error on transport failure, non-success status, or JSON parse
/// failure.
pub async fn fetch_json_authorized<T: serde::de::DeserializeOwned>(
    client: &Client,
    url: &str,
    bearer: &str,
) -> Result<T> {
    let response = client
        .get(url)
        .bearer_auth(bearer)
        .send()
        .await
        .map_err(|e| ChanwatchError::from_reqwest(&e, DEFAULT_TIMEOUT.as_secs()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ChanwatchError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    response
        .json()
        .await
        .map_err(|e| ChanwatchError::ParseResponse(e.to_string()))
}
