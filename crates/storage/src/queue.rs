// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The operation queue (§4.D): one row per backend per enqueued mutation,
//! claimed by worker id under an exclusive transaction so two sync workers
//! can never both claim the same operation, finalized done/failed with a
//! retry cap, and recovered from a crash mid-claim via heartbeat liveness.

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use tsk_core::{Operation, OperationKind, OperationPayload, OperationStatus};

use crate::error::{StorageError, StorageResult};

/// Enqueues `payload` for `backend_id` inside the caller's transaction, so
/// the write that produced the mutation and the operation that will push
/// it commit atomically (§4.D: "enqueue happens in the same local
/// transaction as the mutation it represents").
pub fn enqueue(
    tx: &Transaction<'_>,
    backend_id: &str,
    kind: OperationKind,
    payload: &OperationPayload,
    now: DateTime<Utc>,
) -> StorageResult<Operation> {
    let payload_json = serde_json::to_string(payload).map_err(|source| StorageError::Decode {
        entity: "operation",
        uid: backend_id.to_string(),
        field: "payload",
        source,
    })?;

    tx.execute(
        "INSERT INTO operations (backend_id, kind, target_uid, payload, status, attempts, enqueued_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
        params![
            backend_id,
            kind.to_string(),
            target_uid(payload),
            payload_json,
            OperationStatus::Pending.to_string(),
            now.to_rfc3339(),
        ],
    )
    .map_err(StorageError::sqlite("enqueuing operation"))?;

    let seq = tx.last_insert_rowid() as u64;
    Ok(Operation {
        seq,
        backend_id: backend_id.to_string(),
        kind,
        payload: payload.clone(),
        status: OperationStatus::Pending,
        worker_id: None,
        claimed_at: None,
        attempts: 0,
        last_error: None,
        enqueued_at: now,
    })
}

/// Claims the oldest pending operation for `backend_id`, if any, marking it
/// `processing` under `worker_id`. Runs inside its own immediate
/// transaction so the read-then-update is atomic across concurrent
/// callers.
pub fn claim_next(
    conn: &mut Connection,
    backend_id: &str,
    worker_id: &str,
    now: DateTime<Utc>,
) -> StorageResult<Option<Operation>> {
    let tx = conn
        .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)
        .map_err(StorageError::sqlite("starting claim transaction"))?;

    let candidate = tx
        .query_row(
            "SELECT * FROM operations WHERE backend_id = ?1 AND status = ?2 ORDER BY seq LIMIT 1",
            params![backend_id, OperationStatus::Pending.to_string()],
            row_to_operation,
        )
        .optional()
        .map_err(StorageError::sqlite("selecting next operation"))?
        .transpose()?;

    let Some(mut op) = candidate else {
        return Ok(None);
    };

    tx.execute(
        "UPDATE operations SET status = ?2, worker_id = ?3, claimed_at = ?4 WHERE seq = ?1",
        params![op.seq, OperationStatus::Processing.to_string(), worker_id, now.to_rfc3339()],
    )
    .map_err(StorageError::sqlite("claiming operation"))?;
    tx.commit().map_err(StorageError::sqlite("committing claim"))?;

    op.status = OperationStatus::Processing;
    op.worker_id = Some(worker_id.to_string());
    op.claimed_at = Some(now);
    Ok(Some(op))
}

pub fn finalize_done(conn: &Connection, seq: u64) -> StorageResult<()> {
    conn.execute(
        "UPDATE operations SET status = ?2, last_error = NULL WHERE seq = ?1",
        params![seq, OperationStatus::Done.to_string()],
    )
    .map_err(StorageError::sqlite("finalizing operation as done"))?;
    Ok(())
}

/// Records a failed attempt. Below `max_attempts` the operation goes back
/// to `pending` for a retry; at or past the cap it's parked `failed` for
/// `status` to surface instead of retrying forever.
pub fn finalize_failed(
    conn: &Connection,
    seq: u64,
    error: &str,
    max_attempts: u32,
) -> StorageResult<OperationStatus> {
    let attempts: u32 = conn
        .query_row("SELECT attempts FROM operations WHERE seq = ?1", params![seq], |row| row.get(0))
        .map_err(StorageError::sqlite("reading operation attempts"))?;
    let attempts = attempts + 1;
    let status = if attempts >= max_attempts { OperationStatus::Failed } else { OperationStatus::Pending };

    conn.execute(
        "UPDATE operations SET status = ?2, attempts = ?3, last_error = ?4, worker_id = NULL, claimed_at = NULL
         WHERE seq = ?1",
        params![seq, status.to_string(), attempts, error],
    )
    .map_err(StorageError::sqlite("finalizing operation as failed"))?;
    Ok(status)
}

/// Resets operations stuck `processing` past `stuck_after` back to
/// `pending`, as if they'd never been claimed — for a worker that claimed
/// an operation and then crashed or lost its heartbeat before finalizing.
///
/// `stuck_after` only narrows the candidates worth checking; the actual
/// revert decision is `is_worker_alive(worker_id)`, so a `processing`
/// row whose worker still has a fresh heartbeat is left alone even once
/// it's older than `stuck_after` (§4.D: recovery is heartbeat-validated,
/// not a bare claim-age timeout).
pub fn recover_stuck(
    conn: &Connection,
    stuck_after: Duration,
    now: DateTime<Utc>,
    is_worker_alive: impl Fn(&str) -> bool,
) -> StorageResult<u64> {
    let cutoff = (now - stuck_after).to_rfc3339();
    let candidates: Vec<(i64, Option<String>)> = {
        let mut stmt = conn
            .prepare("SELECT seq, worker_id FROM operations WHERE status = ?1 AND claimed_at < ?2")
            .map_err(StorageError::sqlite("selecting stuck candidates"))?;
        let rows = stmt
            .query_map(params![OperationStatus::Processing.to_string(), cutoff], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, Option<String>>(1)?))
            })
            .map_err(StorageError::sqlite("selecting stuck candidates"))?
            .collect::<rusqlite::Result<_>>()
            .map_err(StorageError::sqlite("reading stuck candidates"))?;
        rows
    };

    let mut recovered = 0u64;
    for (seq, worker_id) in candidates {
        // A declared worker_id with a stale (or absent) heartbeat is
        // reverted; so is a row somehow claimed with no worker_id at all.
        let alive = worker_id.as_deref().is_some_and(&is_worker_alive);
        if alive {
            continue;
        }
        conn.execute(
            "UPDATE operations SET status = ?1, worker_id = NULL, claimed_at = NULL WHERE seq = ?2",
            params![OperationStatus::Pending.to_string(), seq],
        )
        .map_err(StorageError::sqlite("recovering stuck operation"))?;
        recovered += 1;
    }
    Ok(recovered)
}

pub fn pending_count(conn: &Connection, backend_id: &str) -> StorageResult<u64> {
    let count: i64 = conn
        .query_row(
            "SELECT count(*) FROM operations WHERE backend_id = ?1 AND status IN (?2, ?3)",
            params![backend_id, OperationStatus::Pending.to_string(), OperationStatus::Processing.to_string()],
            |row| row.get(0),
        )
        .map_err(StorageError::sqlite("counting pending operations"))?;
    Ok(count as u64)
}

fn target_uid(payload: &OperationPayload) -> &str {
    match payload {
        OperationPayload::CreateTask { uid, .. }
        | OperationPayload::UpdateTask { uid, .. }
        | OperationPayload::DeleteTask { uid } => uid.as_str(),
        OperationPayload::CreateList { uid, .. }
        | OperationPayload::UpdateList { uid, .. }
        | OperationPayload::DeleteList { uid } => uid.as_str(),
    }
}

fn row_to_operation(row: &Row<'_>) -> rusqlite::Result<StorageResult<Operation>> {
    Ok(try_row_to_operation(row))
}

fn try_row_to_operation(row: &Row<'_>) -> StorageResult<Operation> {
    let seq: i64 = row.get("seq").map_err(StorageError::sqlite("reading seq"))?;
    let backend_id: String = row.get("backend_id").map_err(StorageError::sqlite("reading backend_id"))?;
    let kind_text: String = row.get("kind").map_err(StorageError::sqlite("reading kind"))?;
    let status_text: String = row.get("status").map_err(StorageError::sqlite("reading status"))?;
    let payload_json: String = row.get("payload").map_err(StorageError::sqlite("reading payload"))?;
    let enqueued_at: String = row.get("enqueued_at").map_err(StorageError::sqlite("reading enqueued_at"))?;
    let claimed_at: Option<String> = row.get("claimed_at").map_err(StorageError::sqlite("reading claimed_at"))?;

    let payload: OperationPayload = serde_json::from_str(&payload_json).map_err(|source| StorageError::Decode {
        entity: "operation",
        uid: seq.to_string(),
        field: "payload",
        source,
    })?;

    Ok(Operation {
        seq: seq as u64,
        backend_id,
        kind: parse_kind(&kind_text, seq)?,
        payload,
        status: parse_status(&status_text, seq)?,
        worker_id: row.get("worker_id").map_err(StorageError::sqlite("reading worker_id"))?,
        claimed_at: claimed_at.map(|t| parse_rfc3339(&t)).transpose()?,
        attempts: row.get("attempts").map_err(StorageError::sqlite("reading attempts"))?,
        last_error: row.get("last_error").map_err(StorageError::sqlite("reading last_error"))?,
        enqueued_at: parse_rfc3339(&enqueued_at)?,
    })
}

fn parse_kind(text: &str, seq: i64) -> StorageResult<OperationKind> {
    match text {
        "create_task" => Ok(OperationKind::CreateTask),
        "update_task" => Ok(OperationKind::UpdateTask),
        "delete_task" => Ok(OperationKind::DeleteTask),
        "create_list" => Ok(OperationKind::CreateList),
        "update_list" => Ok(OperationKind::UpdateList),
        "delete_list" => Ok(OperationKind::DeleteList),
        _ => Err(StorageError::InvalidEnumValue {
            entity: "operation",
            uid: seq.to_string(),
            field: "kind",
            value: text.to_string(),
        }),
    }
}

fn parse_status(text: &str, seq: i64) -> StorageResult<OperationStatus> {
    match text {
        "pending" => Ok(OperationStatus::Pending),
        "processing" => Ok(OperationStatus::Processing),
        "done" => Ok(OperationStatus::Done),
        "failed" => Ok(OperationStatus::Failed),
        _ => Err(StorageError::InvalidEnumValue {
            entity: "operation",
            uid: seq.to_string(),
            field: "status",
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
#[path = "queue_tests.rs"]
mod tests;
