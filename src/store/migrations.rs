//! Schema versions for the libSQL key-value store.
//!
//! Applied versions are recorded in `_migrations`; each pending step runs in
//! its own transaction together with its bookkeeping row.

use libsql::{Connection, params};
use tracing::{debug, info};

use crate::error::StoreError;

/// `(version, name, sql)`, in ascending version order.
const SCHEMA: &[(i64, &str, &str)] = &[(
    1,
    "key_value_store",
    "CREATE TABLE IF NOT EXISTS kv_entries (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );",
)];

/// Latest schema version this build knows about.
pub fn latest_version() -> i64 {
    SCHEMA.last().map_or(0, |(version, _, _)| *version)
}

/// Bring the schema up to [`latest_version`].
pub async fn run_migrations(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .await
    .map_err(|e| StoreError::Migration(format!("bookkeeping table: {e}")))?;

    let applied = applied_version(conn).await?;
    let pending = SCHEMA.iter().filter(|(version, _, _)| *version > applied);

    for &(version, name, sql) in pending {
        info!(version, name, "Upgrading store schema");
        apply(conn, version, name, sql)
            .await
            .map_err(|e| StoreError::Migration(format!("V{version} {name}: {e}")))?;
    }

    debug!(version = latest_version(), "Store schema up to date");
    Ok(())
}

async fn apply(conn: &Connection, version: i64, name: &str, sql: &str) -> Result<(), libsql::Error> {
    let tx = conn.transaction().await?;
    tx.execute_batch(sql).await?;
    tx.execute(
        "INSERT INTO _migrations (version, name) VALUES (?1, ?2)",
        params![version, name],
    )
    .await?;
    tx.commit().await
}

/// Highest recorded version; 0 on a fresh database.
pub async fn applied_version(conn: &Connection) -> Result<i64, StoreError> {
    max_version(conn)
        .await
        .map_err(|e| StoreError::Migration(format!("reading schema version: {e}")))
}

async fn max_version(conn: &Connection) -> Result<i64, libsql::Error> {
    let mut rows = conn
        .query("SELECT COALESCE(MAX(version), 0) FROM _migrations", ())
        .await?;
    match rows.next().await? {
        Some(row) => row.get::<i64>(0),
        None => Ok(0),
    }
}
