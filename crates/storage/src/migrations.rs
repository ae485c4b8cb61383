// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schema creation and evolution (§4.C).
//!
//! Every migration is additive (`CREATE TABLE IF NOT EXISTS`, `ALTER TABLE
//! ... ADD COLUMN` guarded by a column-existence check) so re-running it
//! against an already-current database is a no-op. Column migrations run
//! before index creation in every version bump — reversing that order once
//! caused an index to be built against a table that didn't have the
//! column yet.

use rusqlite::Connection;

use crate::error::{StorageError, StorageResult};

/// Table names this crate ever introspects by name. Any function that
/// accepts a table name as an argument (e.g. for `PRAGMA table_info`)
/// MUST validate against this list before interpolating it into SQL —
/// string-interpolating an unchecked name into a pragma query is exactly
/// the SQL-injection-shaped mistake §4.C forbids.
pub const KNOWN_TABLES: &[&str] =
    &["tasks", "lists", "bindings", "operations", "conflicts", "reminders", "schema_meta"];

pub fn validate_table_name(name: &str) -> StorageResult<()> {
    if KNOWN_TABLES.contains(&name) {
        Ok(())
    } else {
        Err(StorageError::DisallowedTable(name.to_string()))
    }
}

/// Returns the columns SQLite currently has for `table`, using
/// `PRAGMA table_info`. `table` must pass [`validate_table_name`] first;
/// this function re-validates rather than trusting the caller.
pub fn table_columns(conn: &Connection, table: &str) -> StorageResult<Vec<String>> {
    validate_table_name(table)?;
    let sql = format!("PRAGMA table_info({table})");
    let mut stmt = conn.prepare(&sql).map_err(StorageError::sqlite("preparing table_info"))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .map_err(StorageError::sqlite("querying table_info"))?;
    let mut cols = Vec::new();
    for row in rows {
        cols.push(row.map_err(StorageError::sqlite("reading table_info row"))?);
    }
    Ok(cols)
}

fn add_column_if_missing(
    conn: &Connection,
    table: &str,
    column: &str,
    ddl: &str,
) -> StorageResult<()> {
    let existing = table_columns(conn, table)?;
    if existing.iter().any(|c| c == column) {
        return Ok(());
    }
    let sql = format!("ALTER TABLE {table} ADD COLUMN {ddl}");
    conn.execute(&sql, []).map_err(StorageError::sqlite("adding column"))?;
    Ok(())
}

pub fn run(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS lists (
            uid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            color TEXT,
            modified_at TEXT NOT NULL,
            deleted_at TEXT
        );

        CREATE TABLE IF NOT EXISTS tasks (
            uid TEXT PRIMARY KEY,
            list_id TEXT NOT NULL REFERENCES lists(uid),
            summary TEXT NOT NULL,
            description TEXT,
            status TEXT NOT NULL,
            priority INTEGER NOT NULL DEFAULT 0,
            due_at TEXT,
            start_at TEXT,
            created_at TEXT NOT NULL,
            modified_at TEXT NOT NULL,
            completed_at TEXT,
            categories TEXT NOT NULL DEFAULT '[]',
            parent_uid TEXT,
            deleted_at TEXT,
            sync_origin INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS bindings (
            local_uid TEXT NOT NULL,
            backend_id TEXT NOT NULL,
            remote_id TEXT NOT NULL,
            etag TEXT,
            remote_modified_at TEXT,
            last_synced_at TEXT NOT NULL,
            PRIMARY KEY (local_uid, backend_id)
        );

        CREATE TABLE IF NOT EXISTS operations (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            backend_id TEXT NOT NULL,
            kind TEXT NOT NULL,
            target_uid TEXT NOT NULL,
            payload TEXT NOT NULL,
            status TEXT NOT NULL,
            worker_id TEXT,
            claimed_at TEXT,
            attempts INTEGER NOT NULL DEFAULT 0,
            last_error TEXT,
            enqueued_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS conflicts (
            id TEXT PRIMARY KEY,
            task_uid TEXT NOT NULL,
            backend_id TEXT NOT NULL,
            local_version TEXT NOT NULL,
            remote_version TEXT NOT NULL,
            strategy_applied TEXT NOT NULL,
            field_diffs TEXT NOT NULL DEFAULT '[]',
            detected_at TEXT NOT NULL,
            resolved_at TEXT
        );

        CREATE TABLE IF NOT EXISTS reminders (
            task_uid TEXT NOT NULL,
            interval_spec TEXT NOT NULL,
            fired_at TEXT NOT NULL,
            PRIMARY KEY (task_uid, interval_spec)
        );
        ",
    )
    .map_err(StorageError::sqlite("creating base schema"))?;

    // Column migrations (additive, idempotent) run before any index DDL.
    add_column_if_missing(conn, "tasks", "sync_origin", "sync_origin INTEGER NOT NULL DEFAULT 0")?;
    add_column_if_missing(
        conn,
        "tasks",
        "field_modified_at",
        "field_modified_at TEXT NOT NULL DEFAULT '{}'",
    )?;

    conn.execute_batch(
        "
        CREATE INDEX IF NOT EXISTS idx_bindings_backend_remote ON bindings(backend_id, remote_id);
        CREATE INDEX IF NOT EXISTS idx_operations_status ON operations(status);
        CREATE INDEX IF NOT EXISTS idx_operations_backend_target ON operations(backend_id, target_uid, seq);
        CREATE INDEX IF NOT EXISTS idx_tasks_active ON tasks(list_id) WHERE deleted_at IS NULL;
        CREATE INDEX IF NOT EXISTS idx_lists_active ON lists(name) WHERE deleted_at IS NULL;
        ",
    )
    .map_err(StorageError::sqlite("creating indexes"))?;

    conn.execute(
        "INSERT INTO schema_meta(key, value) VALUES ('version', ?1)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        [CURRENT_SCHEMA_VERSION.to_string()],
    )
    .map_err(StorageError::sqlite("stamping schema version"))?;

    Ok(())
}

pub const CURRENT_SCHEMA_VERSION: i64 = 2;

#[cfg(test)]
#[path = "migrations_tests.rs"]
mod tests;
