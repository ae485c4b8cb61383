// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CRUD for the `tasks` table (§4.C).

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tsk_core::{ListUid, Task, TaskStatus, TaskUid};

use crate::error::{StorageError, StorageResult};

/// Walks `parent_uid` ancestry for `task`, rejecting a write before it
/// reaches the database if the parent is missing, lives in a different
/// list, or the chain closes a cycle back to `task` itself (§3, §9).
fn validate_parent(conn: &Connection, task: &Task) -> StorageResult<()> {
    let Some(parent_uid) = task.parent_uid.clone() else {
        return Ok(());
    };
    if parent_uid == task.uid {
        return Err(StorageError::InvalidParent {
            uid: task.uid.to_string(),
            reason: "a task cannot be its own parent",
        });
    }

    let mut current = get(conn, &parent_uid)?.ok_or_else(|| StorageError::InvalidParent {
        uid: task.uid.to_string(),
        reason: "parent_uid does not name an existing task",
    })?;
    if current.list_id != task.list_id {
        return Err(StorageError::InvalidParent {
            uid: task.uid.to_string(),
            reason: "parent must belong to the same list",
        });
    }

    // Bounds the walk against a pre-existing cycle in corrupted data;
    // a well-formed chain is at most as long as the table has rows.
    const MAX_ANCESTRY_DEPTH: usize = 10_000;
    for _ in 0..MAX_ANCESTRY_DEPTH {
        let Some(next) = current.parent_uid.clone() else {
            return Ok(());
        };
        if next == task.uid {
            return Err(StorageError::InvalidParent {
                uid: task.uid.to_string(),
                reason: "parent_uid would close a cycle",
            });
        }
        current = require(conn, &next)?;
    }
    Err(StorageError::InvalidParent {
        uid: task.uid.to_string(),
        reason: "parent chain exceeds the maximum ancestry depth",
    })
}

pub fn insert(conn: &Connection, task: &Task) -> StorageResult<()> {
    validate_parent(conn, task)?;
    conn.execute(
        "INSERT INTO tasks (
            uid, list_id, summary, description, status, priority, due_at, start_at,
            created_at, modified_at, completed_at, categories, parent_uid, deleted_at, sync_origin,
            field_modified_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            task.uid.as_str(),
            task.list_id.as_str(),
            task.summary,
            task.description,
            task.status.to_string(),
            task.priority(),
            task.due_at.map(|t| t.to_rfc3339()),
            task.start_at.map(|t| t.to_rfc3339()),
            task.created_at.to_rfc3339(),
            task.modified_at.to_rfc3339(),
            task.completed_at.map(|t| t.to_rfc3339()),
            categories_to_json(task)?,
            task.parent_uid.as_ref().map(TaskUid::as_str),
            task.deleted_at.map(|t| t.to_rfc3339()),
            task.sync_origin,
            field_modified_at_to_json(task)?,
        ],
    )
    .map_err(StorageError::sqlite("inserting task"))?;
    Ok(())
}

pub fn update(conn: &Connection, task: &Task) -> StorageResult<()> {
    validate_parent(conn, task)?;
    let changed = conn
        .execute(
            "UPDATE tasks SET
                list_id = ?2, summary = ?3, description = ?4, status = ?5, priority = ?6,
                due_at = ?7, start_at = ?8, modified_at = ?9, completed_at = ?10,
                categories = ?11, parent_uid = ?12, deleted_at = ?13, sync_origin = ?14,
                field_modified_at = ?15
             WHERE uid = ?1",
            params![
                task.uid.as_str(),
                task.list_id.as_str(),
                task.summary,
                task.description,
                task.status.to_string(),
                task.priority(),
                task.due_at.map(|t| t.to_rfc3339()),
                task.start_at.map(|t| t.to_rfc3339()),
                task.modified_at.to_rfc3339(),
                task.completed_at.map(|t| t.to_rfc3339()),
                categories_to_json(task)?,
                task.parent_uid.as_ref().map(TaskUid::as_str),
                task.deleted_at.map(|t| t.to_rfc3339()),
                task.sync_origin,
                field_modified_at_to_json(task)?,
            ],
        )
        .map_err(StorageError::sqlite("updating task"))?;
    if changed == 0 {
        return Err(StorageError::NotFound { entity: "task", uid: task.uid.to_string() });
    }
    Ok(())
}

pub fn get(conn: &Connection, uid: &TaskUid) -> StorageResult<Option<Task>> {
    conn.query_row("SELECT * FROM tasks WHERE uid = ?1", params![uid.as_str()], row_to_task)
        .optional()
        .map_err(StorageError::sqlite("fetching task"))?
        .transpose()
}

pub fn require(conn: &Connection, uid: &TaskUid) -> StorageResult<Task> {
    get(conn, uid)?.ok_or_else(|| StorageError::NotFound { entity: "task", uid: uid.to_string() })
}

pub fn list_for_list(conn: &Connection, list_id: &ListUid, include_deleted: bool) -> StorageResult<Vec<Task>> {
    let sql = if include_deleted {
        "SELECT * FROM tasks WHERE list_id = ?1 ORDER BY created_at"
    } else {
        "SELECT * FROM tasks WHERE list_id = ?1 AND deleted_at IS NULL ORDER BY created_at"
    };
    let mut stmt = conn.prepare(sql).map_err(StorageError::sqlite("preparing task listing"))?;
    let rows = stmt
        .query_map(params![list_id.as_str()], row_to_task)
        .map_err(StorageError::sqlite("listing tasks"))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.map_err(StorageError::sqlite("reading task row"))??);
    }
    Ok(out)
}

/// Lists every task across every list, for commands that resolve a task by
/// ID prefix without knowing its list ahead of time.
pub fn list_all(conn: &Connection, include_deleted: bool) -> StorageResult<Vec<Task>> {
    let sql = if include_deleted {
        "SELECT * FROM tasks ORDER BY created_at"
    } else {
        "SELECT * FROM tasks WHERE deleted_at IS NULL ORDER BY created_at"
    };
    let mut stmt = conn.prepare(sql).map_err(StorageError::sqlite("preparing task listing"))?;
    let rows = stmt.query_map([], row_to_task).map_err(StorageError::sqlite("listing tasks"))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.map_err(StorageError::sqlite("reading task row"))??);
    }
    Ok(out)
}

pub fn soft_delete(conn: &Connection, uid: &TaskUid, now: DateTime<Utc>) -> StorageResult<()> {
    let changed = conn
        .execute(
            "UPDATE tasks SET deleted_at = ?2, modified_at = ?2 WHERE uid = ?1 AND deleted_at IS NULL",
            params![uid.as_str(), now.to_rfc3339()],
        )
        .map_err(StorageError::sqlite("soft-deleting task"))?;
    if changed == 0 {
        return Err(StorageError::NotFound { entity: "task", uid: uid.to_string() });
    }
    Ok(())
}

fn categories_to_json(task: &Task) -> StorageResult<String> {
    serde_json::to_string(&task.categories).map_err(|source| StorageError::Decode {
        entity: "task",
        uid: task.uid.to_string(),
        field: "categories",
        source,
    })
}

fn field_modified_at_to_json(task: &Task) -> StorageResult<String> {
    serde_json::to_string(&task.field_modified_at).map_err(|source| StorageError::Decode {
        entity: "task",
        uid: task.uid.to_string(),
        field: "field_modified_at",
        source,
    })
}

fn row_to_task(row: &Row<'_>) -> rusqlite::Result<StorageResult<Task>> {
    Ok(try_row_to_task(row))
}

fn try_row_to_task(row: &Row<'_>) -> StorageResult<Task> {
    let uid: String = row.get("uid").map_err(StorageError::sqlite("reading uid"))?;
    let status_text: String = row.get("status").map_err(StorageError::sqlite("reading status"))?;
    let categories_json: String = row.get("categories").map_err(StorageError::sqlite("reading categories"))?;
    let categories = serde_json::from_str(&categories_json).map_err(|source| StorageError::Decode {
        entity: "task",
        uid: uid.clone(),
        field: "categories",
        source,
    })?;
    let created_at = get_datetime(row, "created_at")?.unwrap_or_else(Utc::now);

    // Task's constructor/builder don't expose every field (`priority` is
    // private, read through `priority()`/`set_priority`); build a minimal
    // task then overwrite the public fields with what the row holds.
    let mut task = Task::new(
        TaskUid::from_string(uid.clone()),
        ListUid::from_string(get_string(row, "list_id")?),
        get_string(row, "summary")?,
        created_at,
    );
    task.description = row.get("description").map_err(StorageError::sqlite("reading description"))?;
    task.status = parse_status(&status_text, &uid)?;
    task.set_priority(row.get("priority").map_err(StorageError::sqlite("reading priority"))?);
    task.due_at = get_datetime(row, "due_at")?;
    task.start_at = get_datetime(row, "start_at")?;
    task.modified_at = get_datetime(row, "modified_at")?.unwrap_or(created_at);
    task.completed_at = get_datetime(row, "completed_at")?;
    task.categories = categories;
    task.parent_uid = row
        .get::<_, Option<String>>("parent_uid")
        .map_err(StorageError::sqlite("reading parent_uid"))?
        .map(TaskUid::from_string);
    task.deleted_at = get_datetime(row, "deleted_at")?;
    task.sync_origin = row.get("sync_origin").map_err(StorageError::sqlite("reading sync_origin"))?;
    let field_modified_at_json: String =
        row.get("field_modified_at").map_err(StorageError::sqlite("reading field_modified_at"))?;
    task.field_modified_at = serde_json::from_str(&field_modified_at_json).map_err(|source| StorageError::Decode {
        entity: "task",
        uid: uid.clone(),
        field: "field_modified_at",
        source,
    })?;
    Ok(task)
}

fn get_string(row: &Row<'_>, col: &'static str) -> StorageResult<String> {
    row.get(col).map_err(StorageError::sqlite(col))
}

fn get_datetime(row: &Row<'_>, col: &'static str) -> StorageResult<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(col).map_err(StorageError::sqlite(col))?;
    raw.map(|text| {
        DateTime::parse_from_rfc3339(&text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| StorageError::Sqlite {
                context: "parsing timestamp",
                source: rusqlite::Error::InvalidColumnType(
                    0,
                    col.to_string(),
                    rusqlite::types::Type::Text,
                ),
            })
    })
    .transpose()
}

fn parse_status(text: &str, uid: &str) -> StorageResult<TaskStatus> {
    match text {
        "needs-action" => Ok(TaskStatus::NeedsAction),
        "in-progress" => Ok(TaskStatus::InProgress),
        "completed" => Ok(TaskStatus::Completed),
        "cancelled" => Ok(TaskStatus::Cancelled),
        _ => Err(StorageError::InvalidEnumValue {
            entity: "task",
            uid: uid.to_string(),
            field: "status",
            value: text.to_string(),
        }),
    }
}

#[cfg(test)]
#[path = "tasks_tests.rs"]
mod tests;
