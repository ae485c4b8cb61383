// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The task entity (§3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::list::ListUid;

crate::define_id! {
    /// Stable, caller-generated, globally unique identifier for a [`Task`].
    ///
    /// The UID is the join key the sync engine uses to find a task's
    /// [`crate::BackendBinding`] on each remote — it never changes across
    /// pushes or pulls.
    pub struct TaskUid("tsk-");
}

/// Lifecycle status of a task, mirroring the iCalendar `VTODO` status set
/// that CalDAV backends speak natively; other backends map onto it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum TaskStatus {
    NeedsAction,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Cancelled)
    }
}

crate::simple_display! {
    TaskStatus {
        NeedsAction => "needs-action",
        InProgress => "in-progress",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

/// A single task.
///
/// Invariants are enforced by constructors/mutators in this module, never
/// by callers poking fields directly from other crates:
///
/// - `completed_at` is `Some` iff `status == Completed`.
/// - `priority` is clamped to `0..=9` (0 = undefined, 1 = highest).
/// - `modified_at` only moves forward; see [`Task::touch`].
/// - `parent_uid`, if set, must name a task in the same list and must
///   never close a cycle — enforced by the local store at write time
///   (this type alone cannot see the rest of the list to check that).
/// - every key in `field_modified_at` names one of [`MUTABLE_TASK_FIELDS`];
///   setters keep it current so the `merge` conflict strategy can compare
///   true per-field timestamps instead of falling back to `modified_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub uid: TaskUid,
    pub list_id: ListUid,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    /// 0 = undefined, 1 = highest, 9 = lowest.
    priority: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub categories: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_uid: Option<TaskUid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    /// Set by the sync engine on pull so the apply path never re-enqueues
    /// a local mutation that only reflects a remote write (§4.E: "Pull ...
    /// any local mutations it performs are NOT re-queued").
    #[serde(default)]
    pub sync_origin: bool,
    /// Per-field local modification timestamps, keyed by [`MUTABLE_TASK_FIELDS`]
    /// entries. See [`TaskSnapshot::from_task`][crate::operation::TaskSnapshot::from_task].
    #[serde(default)]
    pub field_modified_at: BTreeMap<String, DateTime<Utc>>,
}

impl Task {
    pub fn new(uid: TaskUid, list_id: ListUid, summary: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            uid,
            list_id,
            summary: summary.into(),
            description: None,
            status: TaskStatus::NeedsAction,
            priority: 0,
            due_at: None,
            start_at: None,
            created_at: now,
            modified_at: now,
            completed_at: None,
            categories: BTreeSet::new(),
            parent_uid: None,
            deleted_at: None,
            sync_origin: false,
            field_modified_at: BTreeMap::new(),
        }
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    /// Sets priority without touching `field_modified_at` — used to
    /// hydrate a task from storage or a remote snapshot, where the
    /// timestamp is tracked separately rather than implied by "now".
    pub fn set_priority(&mut self, priority: u8) {
        self.priority = priority.min(9);
    }

    /// Sets priority as a local edit made `now`, clamping to `0..=9` and
    /// recording the per-field modification time the `merge` conflict
    /// strategy compares.
    pub fn set_priority_now(&mut self, priority: u8, now: DateTime<Utc>) {
        self.set_priority(priority);
        self.mark_modified("priority", now);
    }

    pub fn set_summary(&mut self, summary: impl Into<String>, now: DateTime<Utc>) {
        self.summary = summary.into();
        self.mark_modified("summary", now);
    }

    pub fn set_description(&mut self, description: Option<String>, now: DateTime<Utc>) {
        self.description = description;
        self.mark_modified("description", now);
    }

    pub fn set_due_at(&mut self, due_at: Option<DateTime<Utc>>, now: DateTime<Utc>) {
        self.due_at = due_at;
        self.mark_modified("due_at", now);
    }

    pub fn set_start_at(&mut self, start_at: Option<DateTime<Utc>>, now: DateTime<Utc>) {
        self.start_at = start_at;
        self.mark_modified("start_at", now);
    }

    pub fn set_categories(&mut self, categories: BTreeSet<String>, now: DateTime<Utc>) {
        self.categories = categories;
        self.mark_modified("categories", now);
    }

    pub fn set_parent_uid(&mut self, parent_uid: Option<TaskUid>, now: DateTime<Utc>) {
        self.parent_uid = parent_uid;
        self.mark_modified("parent_uid", now);
    }

    /// Moves this task to `status`, maintaining the `completed_at` invariant
    /// and advancing `modified_at`.
    pub fn set_status(&mut self, status: TaskStatus, now: DateTime<Utc>) {
        self.status = status;
        self.completed_at = if status == TaskStatus::Completed { Some(now) } else { None };
        self.mark_modified("status", now);
    }

    /// Records that `field` was changed `now`: advances its entry in
    /// `field_modified_at` and `modified_at` together.
    fn mark_modified(&mut self, field: &'static str, now: DateTime<Utc>) {
        self.field_modified_at.insert(field.to_string(), now);
        self.touch(now);
    }

    /// Advances `modified_at`, never moving it backwards (monotonic per UID,
    /// §3 invariant). Both local mutation and pull import call this.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.modified_at {
            self.modified_at = now;
        }
    }

    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    pub fn soft_delete(&mut self, now: DateTime<Utc>) {
        self.deleted_at = Some(now);
        self.touch(now);
    }

    pub fn restore(&mut self, now: DateTime<Utc>) {
        self.deleted_at = None;
        self.touch(now);
    }

    /// True if this status invariant holds; used by storage-layer
    /// assertions and property tests rather than at every mutation site.
    pub fn completed_at_invariant_holds(&self) -> bool {
        (self.status == TaskStatus::Completed) == self.completed_at.is_some()
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct TaskBuilder => Task {
        computed { uid: TaskUid = TaskUid::new() }
        set { list_id: ListUid = ListUid::new() }
        into { summary: String = "Untitled task" }
        option { description: String = None }
        set { status: TaskStatus = TaskStatus::NeedsAction }
        set { priority: u8 = 0 }
        option { due_at: DateTime<Utc> = None }
        option { start_at: DateTime<Utc> = None }
        set { created_at: DateTime<Utc> = Utc::now() }
        set { modified_at: DateTime<Utc> = Utc::now() }
        option { completed_at: DateTime<Utc> = None }
        computed { categories: BTreeSet<String> = BTreeSet::new() }
        option { parent_uid: TaskUid = None }
        option { deleted_at: DateTime<Utc> = None }
        set { sync_origin: bool = false }
        computed { field_modified_at: BTreeMap<String, DateTime<Utc>> = BTreeMap::new() }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
