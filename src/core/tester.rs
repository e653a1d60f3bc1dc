//! Per-channel model testing: candidate discovery and bounded fan-out.

use serde::Deserialize;

use super::context::AppContext;
use super::models::{Channel, ProbeOutcome};
use super::probe::probe_model;
use crate::core::http::fetch_json_authorized;

/// Response shape of the provider catalog endpoint (`GET {base}/v1/models`).
#[derive(Debug, Deserialize)]
struct CatalogResponse {
    data: Vec<CatalogModel>,
}

#[derive(Debug, Deserialize)]
struct CatalogModel {
    id: String,
}

/// Resolve the candidate model list for a channel.
///
/// Exactly one source is used, by precedence: the globally forced static
/// list, the channel's persisted list (force-inside mode), or the channel's
/// live catalog filtered by the global model exclusion set. A catalog
/// failure falls back to the static list; a persisted-list fetch failure
/// yields an empty candidate set.
pub async fn resolve_candidates(ctx: &AppContext, channel: &Channel) -> Vec<String> {
    if ctx.config.force_models {
        tracing::debug!(channel = %channel.name, "using forced static model list");
        return ctx.config.models.clone();
    }

    if ctx.config.force_inside_models {
        let started = std::time::Instant::now();
        match ctx.store.get_models(channel.id) {
            Ok(models) => {
                ctx.metrics.record_db_operation("get_models", true);
                ctx.metrics
                    .observe_db_operation("get_models", started.elapsed().as_secs_f64());
                return models;
            }
            Err(e) => {
                ctx.metrics.record_db_operation("get_models", false);
                tracing::error!(
                    channel = %channel.name,
                    channel_id = channel.id,
                    error = %e,
                    "failed to read persisted model list"
                );
                return Vec::new();
            }
        }
    }

    let url = format!("{}/v1/models", channel.base_url);
    match fetch_json_authorized::<CatalogResponse>(&ctx.client, &url, &channel.key).await {
        Ok(catalog) => catalog
            .data
            .into_iter()
            .map(|m| m.id)
            .filter(|id| {
                let excluded = ctx.config.exclude_models.contains(id);
                if excluded {
                    tracing::debug!(model = %id, "model excluded from catalog");
                }
                !excluded
            })
            .collect(),
        Err(e) => {
            tracing::warn!(
                channel = %channel.name,
                channel_id = channel.id,
                error = %e,
                "catalog fetch failed, falling back to static model list"
            );
            ctx.config.models.clone()
        }
    }
}

/// Test every candidate model on a channel and return the available set.
///
/// Each probe acquires a cycle-wide concurrency slot and a rate-limiter
/// token before its HTTP call. A probe failure never aborts its siblings;
/// every candidate is always attempted.
pub async fn test_channel(ctx: &AppContext, channel: &Channel) -> Vec<String> {
    ctx.metrics
        .record_channel_test(channel.id, &channel.name, "started");

    let candidates = resolve_candidates(ctx, channel).await;
    tracing::info!(
        channel = %channel.name,
        channel_id = channel.id,
        candidates = candidates.len(),
        "testing channel"
    );

    let timeout = ctx.config.probe_timeout();
    let probes = candidates.iter().map(|model| async {
        let _permit = match ctx.slots.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                // Only reachable if the semaphore is closed, which nothing does.
                return ProbeOutcome::transport_failure(
                    model.clone(),
                    std::time::Duration::ZERO,
                    "probe slot pool closed".to_string(),
                );
            }
        };
        ctx.limiter.acquire().await;
        probe_model(&ctx.client, channel, model, timeout).await
    });
    let outcomes = futures::future::join_all(probes).await;

    let mut available = Vec::new();
    for outcome in outcomes {
        record_outcome(ctx, channel, &outcome).await;
        if outcome.ok {
            available.push(outcome.model);
        }
    }

    ctx.metrics
        .set_available_models(channel.id, &channel.name, available.len());
    ctx.metrics.record_channel_test(
        channel.id,
        &channel.name,
        if available.is_empty() { "failed" } else { "success" },
    );

    available
}

async fn record_outcome(ctx: &AppContext, channel: &Channel, outcome: &ProbeOutcome) {
    if outcome.ok {
        let latency_ms = u64::try_from(outcome.latency.as_millis()).unwrap_or(u64::MAX);
        tracing::info!(
            channel = %channel.name,
            channel_id = channel.id,
            model = %outcome.model,
            latency_ms,
            "model available"
        );
        ctx.metrics
            .record_model_test(channel.id, &channel.name, &outcome.model, "success");
        ctx.metrics
            .model_availability(channel.id, &channel.name, &outcome.model, true);
        ctx.metrics.observe_response_time(
            channel.id,
            &channel.name,
            &outcome.model,
            outcome.latency.as_secs_f64(),
        );
        ctx.uptime.push_model(&outcome.model).await;
        ctx.uptime.push_channel(channel.id).await;
    } else {
        let status = if outcome.status.is_some() { "failed" } else { "error" };
        tracing::warn!(
            channel = %channel.name,
            channel_id = channel.id,
            model = %outcome.model,
            http_status = outcome.status,
            error = outcome.error.as_deref().unwrap_or_default(),
            "model unavailable"
        );
        ctx.metrics
            .record_model_test(channel.id, &channel.name, &outcome.model, status);
        ctx.metrics
            .model_availability(channel.id, &channel.name, &outcome.model, false);
    }
}
