// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The operation queue record (§3, §4.D).
//!
//! Per §9's design note on heterogeneous records: the payload is a tagged
//! enum, not a dynamically-typed blob, so decoding from storage is total —
//! there is no "unknown operation kind" runtime state to handle beyond a
//! normal serde error at load time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::list::ListUid;
use crate::task::{Task, TaskUid};

/// Fields a mutation can change, shared by the sync engine's conflict
/// diffing and snapshot construction (§4.E).
pub const MUTABLE_TASK_FIELDS: &[&str] =
    &["summary", "description", "status", "priority", "due_at", "start_at", "categories", "parent_uid"];

/// A tagged mutation, one entry per backend per enqueue. `seq` is assigned
/// by the local store at enqueue time and is the ordering key the sync
/// engine must preserve per `(backend_id, target_uid)` (§4.D Ordering,
/// testable property 2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    pub seq: u64,
    pub backend_id: String,
    pub kind: OperationKind,
    pub payload: OperationPayload,
    pub status: OperationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_at: Option<DateTime<Utc>>,
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub enqueued_at: DateTime<Utc>,
}

impl Operation {
    /// The local UID this operation mutates, regardless of payload kind.
    pub fn target_uid(&self) -> &str {
        match &self.payload {
            OperationPayload::CreateTask { uid, .. }
            | OperationPayload::UpdateTask { uid, .. }
            | OperationPayload::DeleteTask { uid } => uid.as_str(),
            OperationPayload::CreateList { uid, .. }
            | OperationPayload::UpdateList { uid, .. }
            | OperationPayload::DeleteList { uid } => uid.as_str(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    CreateTask,
    UpdateTask,
    DeleteTask,
    CreateList,
    UpdateList,
    DeleteList,
}

crate::simple_display! {
    OperationKind {
        CreateTask => "create_task",
        UpdateTask => "update_task",
        DeleteTask => "delete_task",
        CreateList => "create_list",
        UpdateList => "update_list",
        DeleteList => "delete_list",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    Pending,
    Processing,
    Done,
    Failed,
}

crate::simple_display! {
    OperationStatus {
        Pending => "pending",
        Processing => "processing",
        Done => "done",
        Failed => "failed",
    }
}

/// A full-snapshot payload, tagged with `kind` for total decoding. Diffs
/// are not modeled at this layer: pushing always ships the current field
/// values, and `update_task`'s `changed_fields` tells the backend adapter
/// which ones to actually send (some REST APIs reject unchanged fields in
/// a PATCH, others don't care — the adapter decides).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum OperationPayload {
    CreateTask { uid: TaskUid, snapshot: TaskSnapshot },
    UpdateTask { uid: TaskUid, snapshot: TaskSnapshot, changed_fields: Vec<String> },
    DeleteTask { uid: TaskUid },
    CreateList { uid: ListUid, name: String },
    UpdateList { uid: ListUid, name: String },
    DeleteList { uid: ListUid },
}

/// A flattened, backend-agnostic view of a task at enqueue time, cheap to
/// serialize and stable even if [`crate::Task`] grows fields later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub list_id: ListUid,
    pub summary: String,
    pub description: Option<String>,
    pub status: crate::task::TaskStatus,
    pub priority: u8,
    pub due_at: Option<DateTime<Utc>>,
    pub start_at: Option<DateTime<Utc>>,
    pub categories: Vec<String>,
    pub parent_uid: Option<TaskUid>,
    /// Per-field modification timestamps, used by the `merge` conflict
    /// strategy (§4.E). Absent fields are treated as "this side is newer"
    /// per the spec's tie-break rule.
    pub field_modified_at: BTreeMap<String, DateTime<Utc>>,
}

impl TaskSnapshot {
    /// Builds a snapshot from `task`, carrying forward its real per-field
    /// modification timestamps. A field missing from `task.field_modified_at`
    /// (a task built before this tracking existed, or one that was never
    /// edited past creation) falls back to `task.modified_at` — the same
    /// "untracked side reads as newer" rule the `merge` conflict strategy
    /// already applies to a remote side with no per-field signal at all.
    pub fn from_task(task: &Task) -> Self {
        let mut field_modified_at = BTreeMap::new();
        for field in MUTABLE_TASK_FIELDS {
            let at = task.field_modified_at.get(*field).copied().unwrap_or(task.modified_at);
            field_modified_at.insert(field.to_string(), at);
        }
        Self {
            list_id: task.list_id,
            summary: task.summary.clone(),
            description: task.description.clone(),
            status: task.status,
            priority: task.priority(),
            due_at: task.due_at,
            start_at: task.start_at,
            categories: task.categories.iter().cloned().collect(),
            parent_uid: task.parent_uid,
            field_modified_at,
        }
    }
}

#[cfg(test)]
#[path = "operation_tests.rs"]
mod tests;
