//! SQLite implementation of the gateway store.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, params};

use super::ChannelStore;
use super::schema::run_migrations;
use crate::core::models::{Channel, ProviderKind};
use crate::error::{ChanwatchError, Result};

/// Gateway store backed by a SQLite database.
///
/// Each channel's row is only ever written by that channel's own reconcile
/// step, so a single connection behind a mutex is enough; writes are short
/// transactions.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and run migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated. This
    /// is fatal at startup.
    pub fn open(path: &Path) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        run_migrations(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store, used by tests and dry runs against no real gateway.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        run_migrations(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run raw SQL against the underlying connection. Test setup helper.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        let conn = self.lock();
        conn.execute_batch(sql)?;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        // A poisoned lock means another thread panicked mid-statement;
        // the connection itself is still usable.
        self.conn.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

fn parse_model_mapping(raw: &str) -> HashMap<String, String> {
    if raw.trim().is_empty() {
        return HashMap::new();
    }
    serde_json::from_str(raw).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "malformed model_mapping, ignoring");
        HashMap::new()
    })
}

fn split_models(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl ChannelStore for SqliteStore {
    fn list_channels(&self) -> Result<Vec<Channel>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, type, name, base_url, \"key\", status, model_mapping FROM channels",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, i64>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;

        let mut channels = Vec::new();
        for row in rows {
            let (id, type_code, name, base_url, key, status, mapping) = row?;
            let kind = ProviderKind::from_code(type_code);
            channels.push(Channel {
                id,
                kind,
                name,
                base_url: kind.normalize_base_url(&base_url),
                key,
                status,
                model_mapping: parse_model_mapping(&mapping),
            });
        }
        Ok(channels)
    }

    fn get_models(&self, channel_id: i64) -> Result<Vec<String>> {
        let conn = self.lock();
        let raw: String = conn
            .query_row(
                "SELECT models FROM channels WHERE id = ?1",
                params![channel_id],
                |row| row.get(0),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    ChanwatchError::ChannelNotFound(channel_id)
                }
                other => other.into(),
            })?;
        Ok(split_models(&raw))
    }

    fn update_models(&self, channel_id: i64, models: &[String]) -> Result<()> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        let joined = models.join(",");
        let updated = tx.execute(
            "UPDATE channels SET models = ?1 WHERE id = ?2",
            params![joined, channel_id],
        )?;
        if updated == 0 {
            return Err(ChanwatchError::ChannelNotFound(channel_id));
        }

        if models.is_empty() {
            tx.execute(
                "DELETE FROM abilities WHERE channel_id = ?1",
                params![channel_id],
            )?;
        } else {
            let placeholders = (2..=models.len() + 1)
                .map(|i| format!("?{i}"))
                .collect::<Vec<_>>()
                .join(", ");

            let mut prune_params: Vec<&dyn rusqlite::ToSql> = vec![&channel_id];
            for model in models {
                prune_params.push(model);
            }

            tx.execute(
                &format!(
                    "DELETE FROM abilities WHERE channel_id = ?1 AND model NOT IN ({placeholders})"
                ),
                prune_params.as_slice(),
            )?;
            tx.execute(
                &format!(
                    "UPDATE abilities SET enabled = 1 WHERE channel_id = ?1 AND model IN ({placeholders})"
                ),
                prune_params.as_slice(),
            )?;
        }

        tx.commit()?;
        Ok(())
    }
}
