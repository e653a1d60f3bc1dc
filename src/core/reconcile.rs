//! Transactional reconciliation of probe results against persisted state.

use std::collections::HashMap;
use std::time::Instant;

use super::context::AppContext;
use super::models::{Channel, ModelSetDiff};
use crate::error::Result;

/// Substitute each probed (external-facing) model name with its internal
/// storage name before writing back. The mapping stores external -> upstream
/// pairs; reconciliation applies it in reverse.
#[must_use]
pub fn apply_mapping(models: Vec<String>, mapping: &HashMap<String, String>) -> Vec<String> {
    if mapping.is_empty() {
        return models;
    }
    let inverted: HashMap<&str, &str> = mapping
        .iter()
        .map(|(k, v)| (v.as_str(), k.as_str()))
        .collect();
    models
        .into_iter()
        .map(|m| {
            inverted
                .get(m.as_str())
                .map_or(m, |internal| (*internal).to_string())
        })
        .collect()
}

/// Reconcile a channel's freshly probed available set with the store.
///
/// Reads the persisted list, applies the name remap, and when the set
/// changed commits the new list plus capability updates as one transaction.
/// Notification is dispatched after a successful commit; its failure is
/// logged, never retried here, and never rolls back the write. In dry-run
/// mode the diff is computed and reported but nothing is written and no
/// notification fires.
///
/// # Errors
///
/// Returns an error if the persisted list cannot be read or the transaction
/// fails; prior state is left intact in either case.
pub async fn reconcile(
    ctx: &AppContext,
    channel: &Channel,
    available: Vec<String>,
) -> Result<ModelSetDiff> {
    let old_models = ctx.store.get_models(channel.id).inspect_err(|_| {
        ctx.metrics.record_db_operation("get_models", false);
    })?;
    ctx.metrics.record_db_operation("get_models", true);

    let new_models = apply_mapping(available, &channel.model_mapping);
    let diff = ModelSetDiff::compute(
        channel.id,
        channel.name.clone(),
        old_models,
        new_models,
    );

    if ctx.config.dry_run {
        tracing::info!(
            channel = %channel.name,
            channel_id = channel.id,
            added = ?diff.added,
            removed = ?diff.removed,
            "dry run: skipping store update"
        );
        return Ok(diff);
    }

    if diff.is_empty() {
        tracing::debug!(
            channel = %channel.name,
            channel_id = channel.id,
            "model set unchanged, nothing to write"
        );
        return Ok(diff);
    }

    let started = Instant::now();
    match ctx.store.update_models(channel.id, &diff.new_models) {
        Ok(()) => {
            ctx.metrics.record_db_operation("update_models", true);
            ctx.metrics
                .observe_db_operation("update_models", started.elapsed().as_secs_f64());
        }
        Err(e) => {
            ctx.metrics.record_db_operation("update_models", false);
            return Err(e);
        }
    }

    tracing::info!(
        channel = %channel.name,
        channel_id = channel.id,
        added = ?diff.added,
        removed = ?diff.removed,
        models = ?diff.new_models,
        "model list updated"
    );

    if ctx.notifier.enabled() {
        // Committed already; a failed dispatch is logged by the notifier.
        let _ = ctx.notifier.send(&diff).await;
    }

    Ok(diff)
}
