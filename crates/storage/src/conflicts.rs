// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CRUD for the `conflicts` table (§4.E): one row per detected local/remote
//! divergence, kept for `status --conflicts` reporting even after the sync
//! engine auto-resolves it.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tsk_core::{ConflictId, ConflictRecord, ConflictStrategy, FieldDiff, TaskSnapshot, TaskUid};

use crate::error::{StorageError, StorageResult};

pub fn insert(conn: &Connection, conflict: &ConflictRecord) -> StorageResult<()> {
    conn.execute(
        "INSERT INTO conflicts (
            id, task_uid, backend_id, local_version, remote_version,
            strategy_applied, field_diffs, detected_at, resolved_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            conflict.id.as_str(),
            conflict.task_uid.as_str(),
            conflict.backend_id,
            to_json(&conflict.local_version, "conflict", conflict.id.as_str(), "local_version")?,
            to_json(&conflict.remote_version, "conflict", conflict.id.as_str(), "remote_version")?,
            conflict.strategy_applied.to_string(),
            to_json(&conflict.field_diffs, "conflict", conflict.id.as_str(), "field_diffs")?,
            conflict.detected_at.to_rfc3339(),
            conflict.resolved_at.map(|t| t.to_rfc3339()),
        ],
    )
    .map_err(StorageError::sqlite("inserting conflict"))?;
    Ok(())
}

pub fn mark_resolved(conn: &Connection, id: &ConflictId, now: DateTime<Utc>) -> StorageResult<()> {
    let changed = conn
        .execute(
            "UPDATE conflicts SET resolved_at = ?2 WHERE id = ?1",
            params![id.as_str(), now.to_rfc3339()],
        )
        .map_err(StorageError::sqlite("resolving conflict"))?;
    if changed == 0 {
        return Err(StorageError::NotFound { entity: "conflict", uid: id.to_string() });
    }
    Ok(())
}

pub fn unresolved(conn: &Connection) -> StorageResult<Vec<ConflictRecord>> {
    let mut stmt = conn
        .prepare("SELECT * FROM conflicts WHERE resolved_at IS NULL ORDER BY detected_at")
        .map_err(StorageError::sqlite("preparing conflict listing"))?;
    let rows = stmt.query_map([], row_to_conflict).map_err(StorageError::sqlite("listing conflicts"))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.map_err(StorageError::sqlite("reading conflict row"))??);
    }
    Ok(out)
}

pub fn for_task(conn: &Connection, task_uid: &TaskUid) -> StorageResult<Vec<ConflictRecord>> {
    let mut stmt = conn
        .prepare("SELECT * FROM conflicts WHERE task_uid = ?1 ORDER BY detected_at")
        .map_err(StorageError::sqlite("preparing conflict listing"))?;
    let rows = stmt
        .query_map(params![task_uid.as_str()], row_to_conflict)
        .map_err(StorageError::sqlite("listing conflicts for task"))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.map_err(StorageError::sqlite("reading conflict row"))??);
    }
    Ok(out)
}

fn to_json<T: serde::Serialize>(value: &T, entity: &'static str, uid: &str, field: &'static str) -> StorageResult<String> {
    serde_json::to_string(value).map_err(|source| StorageError::Decode { entity, uid: uid.to_string(), field, source })
}

fn row_to_conflict(row: &Row<'_>) -> rusqlite::Result<StorageResult<ConflictRecord>> {
    Ok(try_row_to_conflict(row))
}

fn try_row_to_conflict(row: &Row<'_>) -> StorageResult<ConflictRecord> {
    let id: String = row.get("id").map_err(StorageError::sqlite("reading id"))?;
    let strategy_text: String =
        row.get("strategy_applied").map_err(StorageError::sqlite("reading strategy_applied"))?;

    let local_json: String = row.get("local_version").map_err(StorageError::sqlite("reading local_version"))?;
    let remote_json: String = row.get("remote_version").map_err(StorageError::sqlite("reading remote_version"))?;
    let diffs_json: String = row.get("field_diffs").map_err(StorageError::sqlite("reading field_diffs"))?;

    let local_version: TaskSnapshot = from_json(&local_json, "local_version", &id)?;
    let remote_version: TaskSnapshot = from_json(&remote_json, "remote_version", &id)?;
    let field_diffs: Vec<FieldDiff> = from_json(&diffs_json, "field_diffs", &id)?;

    let detected_at: String = row.get("detected_at").map_err(StorageError::sqlite("reading detected_at"))?;
    let resolved_at: Option<String> =
        row.get("resolved_at").map_err(StorageError::sqlite("reading resolved_at"))?;

    Ok(ConflictRecord {
        id: ConflictId::from_string(id.clone()),
        task_uid: TaskUid::from_string(row.get::<_, String>("task_uid").map_err(StorageError::sqlite("reading task_uid"))?),
        backend_id: row.get("backend_id").map_err(StorageError::sqlite("reading backend_id"))?,
        local_version,
        remote_version,
        strategy_applied: parse_strategy(&strategy_text, &id)?,
        field_diffs,
        detected_at: parse_rfc3339(&detected_at)?,
        resolved_at: resolved_at.map(|t| parse_rfc3339(&t)).transpose()?,
    })
}

fn from_json<T: serde::de::DeserializeOwned>(raw: &str, field: &'static str, uid: &str) -> StorageResult<T> {
    serde_json::from_str(raw).map_err(|source| StorageError::Decode {
        entity: "conflict",
        uid: uid.to_string(),
        field,
        source,
    })
}

fn parse_strategy(text: &str, uid: &str) -> StorageResult<ConflictStrategy> {
    match text {
        "server_wins" => Ok(ConflictStrategy::ServerWins),
        "local_wins" => Ok(ConflictStrategy::LocalWins),
        "merge" => Ok(ConflictStrategy::Merge),
        "keep_both" => Ok(ConflictStrategy::KeepBoth),
        _ => Err(StorageError::InvalidEnumValue {
            entity: "conflict",
            uid: uid.to_string(),
            field: "strategy_applied",
            value: text.to_string(),
        }),
    }
}

fn parse_rfc3339(text: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text).map(|dt| dt.with_timezone(&Utc)).map_err(|_| StorageError::Sqlite {
        context: "parsing timestamp",
        source: rusqlite::Error::InvalidColumnType(0, "timestamp".into(), rusqlite::types::Type::Text),
    })
}

#[cfg(test)]
#[path = "conflicts_tests.rs"]
mod tests;
