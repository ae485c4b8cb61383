// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conflict detection and resolution (§4.E).
//!
//! Detection compares the last-known binding snapshot against both sides'
//! current state — never the current local value against the current
//! remote value directly, since two sides can independently converge on
//! the same value without either having "won" anything.

use chrono::{DateTime, Utc};
use tsk_core::{
    BackendBinding, ConflictId, ConflictRecord, ConflictStrategy, FieldDiff, ResolutionSide, Task,
    TaskSnapshot, TaskUid, MUTABLE_TASK_FIELDS,
};

use tsk_adapters::RemoteTask;

/// Whether the remote side has moved since the binding's last snapshot.
/// Prefers the etag (cheap, exact); falls back to `modified_at` when the
/// backend doesn't surface one.
pub fn remote_changed(binding: &BackendBinding, remote: &RemoteTask) -> bool {
    if let Some(known) = &binding.etag {
        return known != &remote.etag;
    }
    match (binding.remote_modified_at, remote.modified_at) {
        (Some(known), Some(current)) => known != current,
        _ => true,
    }
}

/// Whether the local side has moved since the binding's last sync.
pub fn local_changed(binding: &BackendBinding, task: &Task) -> bool {
    task.modified_at > binding.last_synced_at
}

/// True when both sides changed since the last binding snapshot — the
/// only condition under which a conflict is recorded (§4.E).
pub fn is_conflict(binding: &BackendBinding, task: &Task, remote: &RemoteTask) -> bool {
    remote_changed(binding, remote) && local_changed(binding, task)
}

/// The outcome of resolving one conflicting task.
pub struct Resolution {
    /// The snapshot the local store should end up holding.
    pub local: TaskSnapshot,
    /// `Some` when the remote needs a push to match `local` (i.e. local's
    /// value didn't already win outright); `None` when the remote value is
    /// authoritative and nothing further needs pushing.
    pub push: Option<TaskSnapshot>,
    /// Present only for `keep_both`: the remote version, to be materialized
    /// as a separate local task.
    pub keep_both_extra: Option<TaskSnapshot>,
    pub field_diffs: Vec<FieldDiff>,
}

fn field_value(snapshot: &TaskSnapshot, field: &str) -> String {
    match field {
        "summary" => snapshot.summary.clone(),
        "description" => snapshot.description.clone().unwrap_or_default(),
        "status" => snapshot.status.to_string(),
        "priority" => snapshot.priority.to_string(),
        "due_at" => snapshot.due_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
        "start_at" => snapshot.start_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
        "categories" => snapshot.categories.join(","),
        "parent_uid" => snapshot.parent_uid.as_ref().map(TaskUid::as_str).unwrap_or_default().to_string(),
        _ => String::new(),
    }
}

fn apply_field(snapshot: &mut TaskSnapshot, field: &str, from: &TaskSnapshot) {
    match field {
        "summary" => snapshot.summary = from.summary.clone(),
        "description" => snapshot.description = from.description.clone(),
        "status" => snapshot.status = from.status,
        "priority" => snapshot.priority = from.priority,
        "due_at" => snapshot.due_at = from.due_at,
        "start_at" => snapshot.start_at = from.start_at,
        "categories" => snapshot.categories = from.categories.clone(),
        "parent_uid" => snapshot.parent_uid = from.parent_uid.clone(),
        _ => {}
    }
}

/// Field-level last-modified-wins (§4.E `merge`): each mutable field is
/// tagged with its own modification time on each side; the newer wins per
/// field; a field tracked on only one side is won by that side, since the
/// other side's backend never recorded having changed it at all.
fn merge_fields(local: &TaskSnapshot, remote: &TaskSnapshot) -> (TaskSnapshot, Vec<FieldDiff>) {
    let mut merged = local.clone();
    let mut diffs = Vec::new();

    for field in MUTABLE_TASK_FIELDS {
        let local_value = field_value(local, field);
        let remote_value = field_value(remote, field);
        if local_value == remote_value {
            continue;
        }

        let local_ts = local.field_modified_at.get(*field);
        let remote_ts = remote.field_modified_at.get(*field);
        let winner = match (local_ts, remote_ts) {
            (Some(l), Some(r)) if r > l => ResolutionSide::Remote,
            (Some(_), Some(_)) => ResolutionSide::Local,
            (None, Some(_)) => ResolutionSide::Remote,
            (Some(_), None) => ResolutionSide::Local,
            (None, None) => ResolutionSide::Local,
        };

        if winner == ResolutionSide::Remote {
            apply_field(&mut merged, field, remote);
        }
        diffs.push(FieldDiff { field: field.to_string(), local_value, remote_value, winner });
    }

    (merged, diffs)
}

/// Resolves one conflicting task per `strategy`, producing the snapshot the
/// local store should hold, the snapshot (if any) that must be pushed back
/// to the remote, and the field-level diff trail recorded on the
/// [`ConflictRecord`].
pub fn resolve(strategy: ConflictStrategy, local: &TaskSnapshot, remote: &TaskSnapshot) -> Resolution {
    match strategy {
        ConflictStrategy::ServerWins => {
            Resolution { local: remote.clone(), push: None, keep_both_extra: None, field_diffs: Vec::new() }
        }
        ConflictStrategy::LocalWins => {
            Resolution { local: local.clone(), push: Some(local.clone()), keep_both_extra: None, field_diffs: Vec::new() }
        }
        ConflictStrategy::Merge => {
            let (merged, diffs) = merge_fields(local, remote);
            let needs_push = diffs.iter().any(|d| d.winner == ResolutionSide::Local);
            Resolution {
                push: if needs_push { Some(merged.clone()) } else { None },
                local: merged,
                keep_both_extra: None,
                field_diffs: diffs,
            }
        }
        ConflictStrategy::KeepBoth => Resolution {
            local: local.clone(),
            push: Some(local.clone()),
            keep_both_extra: Some(remote.clone()),
            field_diffs: Vec::new(),
        },
    }
}

/// Builds the [`ConflictRecord`] to persist alongside a resolution, kept for
/// reporting even though the engine already auto-resolved it.
pub fn record(
    task_uid: TaskUid,
    backend_id: impl Into<String>,
    local: TaskSnapshot,
    remote: TaskSnapshot,
    strategy: ConflictStrategy,
    field_diffs: Vec<FieldDiff>,
    now: DateTime<Utc>,
) -> ConflictRecord {
    ConflictRecord {
        id: ConflictId::new(),
        task_uid,
        backend_id: backend_id.into(),
        local_version: local,
        remote_version: remote,
        strategy_applied: strategy,
        field_diffs,
        detected_at: now,
        resolved_at: Some(now),
    }
}

/// Convenience wrapper used by [`crate::reconcile`] to resolve and record a
/// conflict in one call.
pub fn resolve_conflict(
    task_uid: TaskUid,
    backend_id: impl Into<String>,
    strategy: ConflictStrategy,
    local: &TaskSnapshot,
    remote: &TaskSnapshot,
    now: DateTime<Utc>,
) -> (Resolution, ConflictRecord) {
    let backend_id = backend_id.into();
    let resolution = resolve(strategy, local, remote);
    let conflict = record(
        task_uid,
        backend_id,
        local.clone(),
        remote.clone(),
        strategy,
        resolution.field_diffs.clone(),
        now,
    );
    (resolution, conflict)
}

#[cfg(test)]
#[path = "conflict_tests.rs"]
mod tests;
