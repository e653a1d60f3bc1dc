//! Cycle scheduler: the outer loop of the checker.
//!
//! Alternates between Idle (sleeping out the configured interval) and
//! Running (one full pass over the channel fleet). Cycles never overlap;
//! the next interval starts only after every channel task has drained.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinSet;

use super::context::AppContext;
use super::models::{Channel, RESERVED_CHANNEL_NAME};
use super::reconcile::reconcile;
use super::tester::test_channel;
use crate::error::Result;

/// Outcome of one full cycle.
#[derive(Debug, Clone)]
pub struct CycleSummary {
    /// Channels actually tested (after exclusions).
    pub channels: usize,
    pub duration: Duration,
}

/// List the channels eligible for this cycle: exclusion-set ids and
/// reserved refresh artifacts are dropped, everything else is reported to
/// the metrics collaborator and returned.
///
/// # Errors
///
/// Returns an error if the store listing fails; the caller logs it and the
/// cycle contributes nothing.
pub fn eligible_channels(ctx: &AppContext) -> Result<Vec<Channel>> {
    let started = Instant::now();
    let all = match ctx.store.list_channels() {
        Ok(channels) => {
            ctx.metrics.record_db_operation("fetch_channels", true);
            ctx.metrics
                .observe_db_operation("fetch_channels", started.elapsed().as_secs_f64());
            channels
        }
        Err(e) => {
            ctx.metrics.record_db_operation("fetch_channels", false);
            return Err(e);
        }
    };

    let mut eligible = Vec::new();
    for channel in all {
        if ctx.config.exclude_channels.contains(&channel.id) {
            tracing::info!(
                channel = %channel.name,
                channel_id = channel.id,
                "channel in exclusion list, skipping"
            );
            continue;
        }
        if channel.name == RESERVED_CHANNEL_NAME {
            tracing::debug!(channel_id = channel.id, "skipping refresh artifact channel");
            continue;
        }
        ctx.metrics.channel_status(
            channel.id,
            &channel.name,
            channel.kind.code(),
            channel.status,
        );
        eligible.push(channel);
    }

    ctx.metrics.set_active_channels(eligible.len());
    tracing::info!(channels = eligible.len(), "channels eligible for testing");
    Ok(eligible)
}

/// Run one cycle: test every eligible channel concurrently, reconcile each
/// result, and wait for all of them. Failures never cross a channel
/// boundary.
pub async fn run_cycle(ctx: &Arc<AppContext>) -> Result<CycleSummary> {
    let started = Instant::now();
    let channels = eligible_channels(ctx)?;
    let count = channels.len();

    let mut tasks = JoinSet::new();
    for channel in channels {
        let ctx = Arc::clone(ctx);
        tasks.spawn(async move {
            let available = test_channel(&ctx, &channel).await;
            if let Err(e) = reconcile(&ctx, &channel, available).await {
                tracing::error!(
                    channel = %channel.name,
                    channel_id = channel.id,
                    error = %e,
                    "reconcile failed"
                );
            }
        });
    }
    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            tracing::error!(error = %e, "channel task panicked");
        }
    }

    let duration = started.elapsed();
    ctx.metrics.record_cycle(duration.as_secs_f64());
    let duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
    tracing::info!(channels = count, duration_ms, "cycle complete");

    Ok(CycleSummary {
        channels: count,
        duration,
    })
}

/// Run cycles forever, sleeping the configured interval between them.
pub async fn run(ctx: Arc<AppContext>) {
    let interval = ctx.config.interval();
    loop {
        if let Err(e) = run_cycle(&ctx).await {
            tracing::error!(error = %e, "cycle failed");
        }
        tokio::time::sleep(interval).await;
    }
}
