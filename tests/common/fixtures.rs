//! Builders for configs, stores, and channels used across integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use chanwatch::config::Config;
use chanwatch::core::models::{Channel, ProviderKind};
use chanwatch::core::AppContext;
use chanwatch::storage::{ChannelStore, SqliteStore};

/// Minimal valid config; tests mutate the public fields they care about.
#[must_use]
pub fn base_config() -> Config {
    toml::from_str(r#"database = ":memory:""#).expect("minimal config parses")
}

/// Empty in-memory store.
#[must_use]
pub fn empty_store() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::open_in_memory().expect("in-memory store"))
}

/// Insert a channel row with the given persisted model list.
pub fn seed_channel(store: &SqliteStore, id: i64, name: &str, base_url: &str, models: &[&str]) {
    seed_channel_full(store, id, name, base_url, models, "");
}

/// Insert a channel row with a model mapping JSON blob.
pub fn seed_channel_full(
    store: &SqliteStore,
    id: i64,
    name: &str,
    base_url: &str,
    models: &[&str],
    model_mapping: &str,
) {
    let sql = format!(
        "INSERT INTO channels (id, type, name, base_url, \"key\", status, models, model_mapping)\
         VALUES ({id}, 14, '{name}', '{base_url}', 'sk-test', 1, '{}', '{model_mapping}')",
        models.join(",")
    );
    store.execute_batch(&sql).expect("seed channel");
    for model in models {
        store
            .execute_batch(&format!(
                "INSERT INTO abilities (channel_id, model, enabled) VALUES ({id}, '{model}', 1)"
            ))
            .expect("seed ability");
    }
}

/// In-memory Channel value matching [`seed_channel`]'s defaults.
#[must_use]
pub fn channel(id: i64, name: &str, base_url: &str) -> Channel {
    Channel {
        id,
        kind: ProviderKind::Other(14),
        name: name.to_string(),
        base_url: base_url.trim_end_matches('/').to_string(),
        key: "sk-test".to_string(),
        status: 1,
        model_mapping: std::collections::HashMap::new(),
    }
}

/// Context over an explicit config and store.
#[must_use]
pub fn context(config: Config, store: Arc<dyn ChannelStore>) -> Arc<AppContext> {
    AppContext::new(config, store).expect("context builds")
}
