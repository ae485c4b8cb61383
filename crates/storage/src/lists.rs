// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CRUD for the `lists` table (§4.C).

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tsk_core::{List, ListUid};

use crate::error::{StorageError, StorageResult};

pub fn insert(conn: &Connection, list: &List) -> StorageResult<()> {
    conn.execute(
        "INSERT INTO lists (uid, name, color, modified_at, deleted_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            list.uid.as_str(),
            list.name,
            list.color,
            list.modified_at.to_rfc3339(),
            list.deleted_at.map(|t| t.to_rfc3339()),
        ],
    )
    .map_err(StorageError::sqlite("inserting list"))?;
    Ok(())
}

pub fn update(conn: &Connection, list: &List) -> StorageResult<()> {
    let changed = conn
        .execute(
            "UPDATE lists SET name = ?2, color = ?3, modified_at = ?4, deleted_at = ?5 WHERE uid = ?1",
            params![
                list.uid.as_str(),
                list.name,
                list.color,
                list.modified_at.to_rfc3339(),
                list.deleted_at.map(|t| t.to_rfc3339()),
            ],
        )
        .map_err(StorageError::sqlite("updating list"))?;
    if changed == 0 {
        return Err(StorageError::NotFound { entity: "list", uid: list.uid.to_string() });
    }
    Ok(())
}

pub fn get(conn: &Connection, uid: &ListUid) -> StorageResult<Option<List>> {
    conn.query_row("SELECT * FROM lists WHERE uid = ?1", params![uid.as_str()], row_to_list)
        .optional()
        .map_err(StorageError::sqlite("fetching list"))?
        .transpose()
}

pub fn require(conn: &Connection, uid: &ListUid) -> StorageResult<List> {
    get(conn, uid)?.ok_or_else(|| StorageError::NotFound { entity: "list", uid: uid.to_string() })
}

pub fn list_all(conn: &Connection, include_deleted: bool) -> StorageResult<Vec<List>> {
    let sql = if include_deleted {
        "SELECT * FROM lists ORDER BY name"
    } else {
        "SELECT * FROM lists WHERE deleted_at IS NULL ORDER BY name"
    };
    let mut stmt = conn.prepare(sql).map_err(StorageError::sqlite("preparing list listing"))?;
    let rows = stmt.query_map([], row_to_list).map_err(StorageError::sqlite("listing lists"))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.map_err(StorageError::sqlite("reading list row"))??);
    }
    Ok(out)
}

/// True if `name` is already used by an active (non-deleted) list —
/// list names must be unique among the active set (§3).
pub fn name_in_use(conn: &Connection, name: &str, excluding: Option<&ListUid>) -> StorageResult<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT count(*) FROM lists WHERE name = ?1 AND deleted_at IS NULL AND uid != ?2",
            params![name, excluding.map(ListUid::as_str).unwrap_or("")],
            |row| row.get(0),
        )
        .map_err(StorageError::sqlite("checking list name uniqueness"))?;
    Ok(count > 0)
}

pub fn soft_delete(conn: &Connection, uid: &ListUid, now: DateTime<Utc>) -> StorageResult<()> {
    let changed = conn
        .execute(
            "UPDATE lists SET deleted_at = ?2, modified_at = ?2 WHERE uid = ?1 AND deleted_at IS NULL",
            params![uid.as_str(), now.to_rfc3339()],
        )
        .map_err(StorageError::sqlite("soft-deleting list"))?;
    if changed == 0 {
        return Err(StorageError::NotFound { entity: "list", uid: uid.to_string() });
    }
    Ok(())
}

fn row_to_list(row: &Row<'_>) -> rusqlite::Result<StorageResult<List>> {
    Ok(try_row_to_list(row))
}

fn try_row_to_list(row: &Row<'_>) -> StorageResult<List> {
    let uid: String = row.get("uid").map_err(StorageError::sqlite("reading uid"))?;
    let name: String = row.get("name").map_err(StorageError::sqlite("reading name"))?;
    let modified_at: String = row.get("modified_at").map_err(StorageError::sqlite("reading modified_at"))?;
    let modified_at = parse_rfc3339(&modified_at)?;

    let mut list = List::new(ListUid::from_string(uid), name, modified_at);
    list.color = row.get("color").map_err(StorageError::sqlite("reading color"))?;
    let deleted_at: Option<String> = row.get("deleted_at").map_err(StorageError::sqlite("reading deleted_at"))?;
    list.deleted_at = deleted_at.map(|t| parse_rfc3339(&t)).transpose()?;
    Ok(list)
}

fn parse_rfc3339(text: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text).map(|dt| dt.with_timezone(&Utc)).map_err(|_| StorageError::Sqlite {
        context: "parsing timestamp",
        source: rusqlite::Error::InvalidColumnType(0, "timestamp".into(), rusqlite::types::Type::Text),
    })
}

#[cfg(test)]
#[path = "lists_tests.rs"]
mod tests;
