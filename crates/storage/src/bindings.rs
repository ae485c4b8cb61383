// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CRUD for the `bindings` table: the `(local_uid, backend_id)` identity
//! map the sync engine consults before deciding whether a task is known to
//! a given remote (§3, §4.E).

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tsk_core::{BackendBinding, TaskUid};

use crate::error::{StorageError, StorageResult};

pub fn upsert(conn: &Connection, binding: &BackendBinding) -> StorageResult<()> {
    conn.execute(
        "INSERT INTO bindings (local_uid, backend_id, remote_id, etag, remote_modified_at, last_synced_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(local_uid, backend_id) DO UPDATE SET
            remote_id = excluded.remote_id,
            etag = excluded.etag,
            remote_modified_at = excluded.remote_modified_at,
            last_synced_at = excluded.last_synced_at",
        params![
            binding.local_uid.as_str(),
            binding.backend_id,
            binding.remote_id,
            binding.etag,
            binding.remote_modified_at.map(|t| t.to_rfc3339()),
            binding.last_synced_at.to_rfc3339(),
        ],
    )
    .map_err(StorageError::sqlite("upserting binding"))?;
    Ok(())
}

pub fn get(conn: &Connection, local_uid: &TaskUid, backend_id: &str) -> StorageResult<Option<BackendBinding>> {
    conn.query_row(
        "SELECT * FROM bindings WHERE local_uid = ?1 AND backend_id = ?2",
        params![local_uid.as_str(), backend_id],
        row_to_binding,
    )
    .optional()
    .map_err(StorageError::sqlite("fetching binding"))?
    .transpose()
}

pub fn list_for_task(conn: &Connection, local_uid: &TaskUid) -> StorageResult<Vec<BackendBinding>> {
    let mut stmt = conn
        .prepare("SELECT * FROM bindings WHERE local_uid = ?1")
        .map_err(StorageError::sqlite("preparing binding listing"))?;
    let rows = stmt
        .query_map(params![local_uid.as_str()], row_to_binding)
        .map_err(StorageError::sqlite("listing bindings"))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.map_err(StorageError::sqlite("reading binding row"))??);
    }
    Ok(out)
}

/// Looks up the local task already bound to a given remote item, if any.
/// The sync engine's pull loop starts from a `RemoteTask` it just fetched
/// and has to ask "do we already know this one?" before it can decide
/// between importing a new local task and updating an existing one.
pub fn find_by_remote(
    conn: &Connection,
    backend_id: &str,
    remote_id: &str,
) -> StorageResult<Option<BackendBinding>> {
    conn.query_row(
        "SELECT * FROM bindings WHERE backend_id = ?1 AND remote_id = ?2",
        params![backend_id, remote_id],
        row_to_binding,
    )
    .optional()
    .map_err(StorageError::sqlite("fetching binding by remote id"))?
    .transpose()
}

pub fn remove(conn: &Connection, local_uid: &TaskUid, backend_id: &str) -> StorageResult<()> {
    conn.execute(
        "DELETE FROM bindings WHERE local_uid = ?1 AND backend_id = ?2",
        params![local_uid.as_str(), backend_id],
    )
    .map_err(StorageError::sqlite("removing binding"))?;
    Ok(())
}

fn row_to_binding(row: &Row<'_>) -> rusqlite::Result<StorageResult<BackendBinding>> {
    Ok(try_row_to_binding(row))
}

fn try_row_to_binding(row: &Row<'_>) -> StorageResult<BackendBinding> {
    let local_uid: String = row.get("local_uid").map_err(StorageError::sqlite("reading local_uid"))?;
    let backend_id: String = row.get("backend_id").map_err(StorageError::sqlite("reading backend_id"))?;
    let remote_id: String = row.get("remote_id").map_err(StorageError::sqlite("reading remote_id"))?;
    let last_synced_at: String =
        row.get("last_synced_at").map_err(StorageError::sqlite("reading last_synced_at"))?;

    let mut binding = BackendBinding::new(
        TaskUid::from_string(local_uid),
        backend_id,
        remote_id,
        parse_rfc3339(&last_synced_at)?,
    );
    binding.etag = row.get("etag").map_err(StorageError::sqlite("reading etag"))?;
    let remote_modified_at: Option<String> =
        row.get("remote_modified_at").map_err(StorageError::sqlite("reading remote_modified_at"))?;
    binding.remote_modified_at = remote_modified_at.map(|t| parse_rfc3339(&t)).transpose()?;
    Ok(binding)
}

fn parse_rfc3339(text: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text).map(|dt| dt.with_timezone(&Utc)).map_err(|_| StorageError::Sqlite {
        context: "parsing timestamp",
        source: rusqlite::Error::InvalidColumnType(0, "timestamp".into(), rusqlite::types::Type::Text),
    })
}

#[cfg(test)]
#[path = "bindings_tests.rs"]
mod tests;
