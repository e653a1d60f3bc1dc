//! Single-model availability probe.
//!
//! A probe is one minimal chat-completion request. It never retries: the
//! measured latency must reflect a single attempt.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde_json::json;

use super::models::{Channel, ProbeOutcome};

/// Text sent as the probe prompt.
pub const PROBE_PROMPT: &str = "Hi";

/// Build the completion URL from a channel's normalized base URL.
///
/// If the base does not already end in the full completions path, `/v1` is
/// appended unless already present, then `/chat` unless already present,
/// then `/completions`.
#[must_use]
pub fn completion_url(base: &str) -> String {
    if base.contains("/v1/chat/completions") {
        return base.to_string();
    }
    let mut url = base.to_string();
    if !url.ends_with("/chat") {
        if !url.ends_with("/v1") {
            url.push_str("/v1");
        }
        url.push_str("/chat");
    }
    url.push_str("/completions");
    url
}

/// Probe one model on one channel. Success is exactly HTTP 200; any other
/// status or transport error is a failure. Single attempt, bounded by
/// `timeout`.
pub async fn probe_model(
    client: &Client,
    channel: &Channel,
    model: &str,
    timeout: Duration,
) -> ProbeOutcome {
    let url = completion_url(&channel.base_url);
    let body = json!({
        "model": model,
        "messages": [{"role": "user", "content": PROBE_PROMPT}],
        "max_tokens": 1,
    });

    tracing::debug!(
        channel = %channel.name,
        channel_id = channel.id,
        model,
        url = %url,
        "probing model"
    );

    let started = Instant::now();
    let response = client
        .post(&url)
        .bearer_auth(&channel.key)
        .json(&body)
        .timeout(timeout)
        .send()
        .await;
    let latency = started.elapsed();

    match response {
        Ok(resp) => {
            let status = resp.status().as_u16();
            if status == 200 {
                ProbeOutcome::success(model.to_string(), latency)
            } else {
                ProbeOutcome::http_failure(model.to_string(), latency, status)
            }
        }
        Err(e) => ProbeOutcome::transport_failure(model.to_string(), latency, e.to_string()),
    }
}
