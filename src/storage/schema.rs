//! Gateway schema migrations.
//!
//! The checker shares the gateway's `channels` and `abilities` tables. When
//! pointed at an existing gateway database the migrations are no-ops beyond
//! recording versions; a fresh database (tests, local runs) gets a minimal
//! compatible schema.

use rusqlite::Connection;

use crate::error::{ChanwatchError, Result};

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: "CREATE TABLE IF NOT EXISTS channels (\
            id INTEGER PRIMARY KEY,\
            type INTEGER NOT NULL DEFAULT 0,\
            name TEXT NOT NULL DEFAULT '',\
            base_url TEXT NOT NULL DEFAULT '',\
            \"key\" TEXT NOT NULL DEFAULT '',\
            status INTEGER NOT NULL DEFAULT 1,\
            models TEXT NOT NULL DEFAULT '',\
            model_mapping TEXT NOT NULL DEFAULT ''\
        );\
        CREATE TABLE IF NOT EXISTS abilities (\
            channel_id INTEGER NOT NULL,\
            model TEXT NOT NULL,\
            enabled INTEGER NOT NULL DEFAULT 1,\
            PRIMARY KEY (channel_id, model)\
        );",
}];

/// Run schema migrations. Returns the latest schema version applied.
///
/// # Errors
///
/// Returns an error if creating the migrations table, reading the schema
/// version, or applying any migration fails.
pub fn run_migrations(conn: &mut Connection) -> Result<i32> {
    ensure_schema_migrations_table(conn)?;

    let mut current_version = get_schema_version(conn)?;

    for migration in MIGRATIONS {
        if migration.version > current_version {
            apply_migration(conn, migration)?;
            current_version = migration.version;
        }
    }

    Ok(current_version)
}

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: i32,
    sql: &'static str,
}

fn ensure_schema_migrations_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS chanwatch_migrations (\
            version INTEGER PRIMARY KEY,\
            applied_at TEXT DEFAULT (datetime('now'))\
        );",
    )
    .map_err(|e| ChanwatchError::Database(format!("create chanwatch_migrations: {e}")))?;

    Ok(())
}

fn get_schema_version(conn: &Connection) -> Result<i32> {
    let version: Option<i32> = conn
        .query_row("SELECT MAX(version) FROM chanwatch_migrations", [], |row| {
            row.get(0)
        })
        .map_err(|e| ChanwatchError::Database(format!("read schema version: {e}")))?;

    Ok(version.unwrap_or(0))
}

fn apply_migration(conn: &mut Connection, migration: &Migration) -> Result<()> {
    let tx = conn
        .transaction()
        .map_err(|e| ChanwatchError::Database(format!("begin migration: {e}")))?;

    tx.execute_batch(migration.sql).map_err(|e| {
        ChanwatchError::Database(format!("apply migration {}: {e}", migration.version))
    })?;

    tx.execute(
        "INSERT INTO chanwatch_migrations (version) VALUES (?1)",
        [migration.version],
    )
    .map_err(|e| {
        ChanwatchError::Database(format!("record migration {}: {e}", migration.version))
    })?;

    tx.commit()
        .map_err(|e| ChanwatchError::Database(format!("commit migration: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_apply_once() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert_eq!(run_migrations(&mut conn).unwrap(), 1);
        // Re-running is a no-op at the same version.
        assert_eq!(run_migrations(&mut conn).unwrap(), 1);

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM chanwatch_migrations", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn schema_has_expected_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();
        conn.execute(
            "INSERT INTO channels (id, type, name, models) VALUES (1, 1, 'main', 'a,b')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO abilities (channel_id, model, enabled) VALUES (1, 'a', 1)",
            [],
        )
        .unwrap();
    }
}
