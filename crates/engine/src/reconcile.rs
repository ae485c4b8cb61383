// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pull and push reconciliation (§4.E).
//!
//! Lists have no persisted binding table of their own — only tasks do
//! (`tsk_core::BackendBinding` is task-scoped). A local list and a remote
//! list are matched by name; a missing side is created. This keeps the
//! data model unchanged from what `tsk-core` already ships rather than
//! adding a second binding kind for a feature the spec never calls out
//! (see DESIGN.md).

use std::collections::BTreeMap;

use tracing::{debug, warn};

use tsk_adapters::{Backend, RemoteTask, TaskFields};
use tsk_core::{
    BackendBinding, Clock, ConflictStrategy, Error, ErrorKind, List, ListUid, Operation,
    OperationKind, OperationPayload, OperationStatus, Task, TaskSnapshot, TaskStatus, TaskUid,
    MUTABLE_TASK_FIELDS,
};
use tsk_storage::LocalStore;

use crate::conflict::{is_conflict, resolve_conflict};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PullSummary {
    pub lists_imported: u64,
    pub tasks_imported: u64,
    pub tasks_updated: u64,
    pub tasks_deleted: u64,
    pub conflicts: u64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PushSummary {
    pub pushed: u64,
    pub retried: u64,
    pub failed: u64,
    pub conflicts: u64,
}

/// Drives reconciliation for one backend at a time. Holds no backend or
/// connection state itself — both are passed in per call — so the same
/// engine instance serves every configured backend.
pub struct SyncEngine<C: Clock> {
    store: LocalStore,
    clock: C,
    conflict_strategy: ConflictStrategy,
}

impl<C: Clock> SyncEngine<C> {
    pub fn new(store: LocalStore, clock: C, conflict_strategy: ConflictStrategy) -> Self {
        Self { store, clock, conflict_strategy }
    }

    /// Pull (remote -> local), per backend (§4.E). Read-only to the remote;
    /// every local mutation performed here is stamped `sync_origin` so the
    /// write never gets re-queued as a push.
    pub async fn pull(&self, backend: &dyn Backend) -> Result<PullSummary, Error> {
        let backend_id = backend.id().to_string();
        let now = self.clock.now();
        let mut summary = PullSummary::default();

        for remote_list in backend.list_lists().await? {
            let local_list = self.find_or_import_list(&remote_list.name, now, &mut summary)?;
            let remote_tasks = backend.list_tasks(&remote_list.remote_id).await?;
            let remote_ids: std::collections::HashSet<&str> =
                remote_tasks.iter().map(|t| t.remote_id.as_str()).collect();

            for remote_task in &remote_tasks {
                self.reconcile_remote_task(&backend_id, local_list.uid, remote_task, now, &mut summary)?;
            }

            self.retire_missing_tasks(&backend_id, local_list.uid, &remote_ids, now, &mut summary)?;
        }

        Ok(summary)
    }

    fn find_or_import_list(
        &self,
        name: &str,
        now: chrono::DateTime<chrono::Utc>,
        summary: &mut PullSummary,
    ) -> Result<List, Error> {
        if let Some(existing) = self.store.list_all_lists(false)?.into_iter().find(|l| l.name == name) {
            return Ok(existing);
        }
        let list = List::new(ListUid::new(), name, now);
        self.store.create_list(&list)?;
        summary.lists_imported += 1;
        Ok(list)
    }

    fn reconcile_remote_task(
        &self,
        backend_id: &str,
        local_list_id: ListUid,
        remote: &RemoteTask,
        now: chrono::DateTime<chrono::Utc>,
        summary: &mut PullSummary,
    ) -> Result<(), Error> {
        let binding = self.store.find_binding_by_remote(backend_id, &remote.remote_id)?;

        let Some(binding) = binding else {
            let mut task = remote_task_to_local(remote, local_list_id, now);
            task.sync_origin = true;
            self.store.create_task(&task)?;
            let mut new_binding = BackendBinding::new(task.uid, backend_id, remote.remote_id.clone(), now);
            new_binding.etag = Some(remote.etag.clone());
            new_binding.remote_modified_at = remote.modified_at;
            self.store.upsert_binding(&new_binding)?;
            summary.tasks_imported += 1;
            return Ok(());
        };

        let task = self.store.require_task(&binding.local_uid)?;
        if !is_conflict(&binding, &task, remote) {
            if crate::conflict::remote_changed(&binding, remote) {
                let mut updated = apply_remote_fields(task, remote, now);
                updated.sync_origin = true;
                updated.touch(now);
                self.store.update_task(&updated)?;
                let mut updated_binding = binding;
                updated_binding.etag = Some(remote.etag.clone());
                updated_binding.remote_modified_at = remote.modified_at;
                updated_binding.last_synced_at = now;
                self.store.upsert_binding(&updated_binding)?;
                summary.tasks_updated += 1;
            }
            return Ok(());
        }

        let local_snapshot = TaskSnapshot::from_task(&task);
        let remote_snapshot = remote_task_to_snapshot(remote, local_list_id);
        let (resolution, conflict) = resolve_conflict(
            task.uid,
            backend_id,
            self.conflict_strategy,
            &local_snapshot,
            &remote_snapshot,
            now,
        );

        let mut updated = apply_snapshot(task, &resolution.local);
        updated.sync_origin = true;
        updated.touch(now);
        self.store.update_task(&updated)?;
        self.store.record_conflict(&conflict)?;

        let mut updated_binding = binding;
        updated_binding.etag = Some(remote.etag.clone());
        updated_binding.remote_modified_at = remote.modified_at;
        updated_binding.last_synced_at = now;

        if let Some(push_snapshot) = resolution.push {
            let changed_fields: Vec<String> = resolution
                .field_diffs
                .iter()
                .filter(|d| d.winner == tsk_core::ResolutionSide::Local)
                .map(|d| d.field.clone())
                .collect();
            self.store.write_and_enqueue(
                backend_id,
                OperationKind::UpdateTask,
                OperationPayload::UpdateTask { uid: updated.uid, snapshot: push_snapshot, changed_fields },
                |_tx| Ok(()),
                now,
            )?;
        }
        self.store.upsert_binding(&updated_binding)?;

        if let Some(extra) = resolution.keep_both_extra {
            let mut extra_task = snapshot_to_new_task(&extra, format!("{} (remote copy)", extra.summary), now);
            extra_task.sync_origin = true;
            self.store.create_task(&extra_task)?;
        }

        summary.conflicts += 1;
        Ok(())
    }

    fn retire_missing_tasks(
        &self,
        backend_id: &str,
        local_list_id: ListUid,
        remote_ids: &std::collections::HashSet<&str>,
        now: chrono::DateTime<chrono::Utc>,
        summary: &mut PullSummary,
    ) -> Result<(), Error> {
        for task in self.store.list_tasks(&local_list_id, false)? {
            let Some(binding) = self.store.get_binding(&task.uid, backend_id)? else {
                continue;
            };
            if remote_ids.contains(binding.remote_id.as_str()) {
                continue;
            }
            let mut deleted = task;
            deleted.sync_origin = true;
            deleted.soft_delete(now);
            self.store.update_task(&deleted)?;
            self.store.remove_binding(&deleted.uid, backend_id)?;
            summary.tasks_deleted += 1;
        }
        Ok(())
    }

    /// Push (local -> remote), per backend (§4.E). Drains the operation
    /// queue one claim at a time; `worker_id` identifies this drain loop in
    /// the `operations` table for stuck-recovery purposes (§4.D).
    pub async fn push(
        &self,
        backend: &dyn Backend,
        worker_id: &str,
        max_attempts: u32,
    ) -> Result<PushSummary, Error> {
        let backend_id = backend.id().to_string();
        let mut summary = PushSummary::default();

        loop {
            let now = self.clock.now();
            let Some(op) = self.store.claim_next_operation(&backend_id, worker_id, now)? else {
                break;
            };

            match self.apply_operation(backend, &op, now).await {
                Ok(()) => {
                    self.store.finalize_operation_done(op.seq)?;
                    summary.pushed += 1;
                }
                Err(err) if err.kind == ErrorKind::NotFound => {
                    debug!(backend = %backend_id, seq = op.seq, "remote target missing, treating push as already applied");
                    if let OperationPayload::UpdateTask { uid, .. } | OperationPayload::DeleteTask { uid } = &op.payload {
                        self.store.remove_binding(uid, &backend_id)?;
                    }
                    self.store.finalize_operation_done(op.seq)?;
                    summary.pushed += 1;
                }
                Err(err) if err.kind == ErrorKind::Validation => {
                    if self.try_resolve_push_conflict(backend, &op, now).await? {
                        summary.conflicts += 1;
                        self.store.finalize_operation_done(op.seq)?;
                    } else {
                        let status = self.store.finalize_operation_failed(op.seq, &err.message, max_attempts)?;
                        self.tally_failure(status, &mut summary);
                    }
                }
                Err(err) => {
                    let halts = err.kind.halts_backend();
                    let status = self.store.finalize_operation_failed(op.seq, &err.message, max_attempts)?;
                    self.tally_failure(status, &mut summary);
                    if halts {
                        warn!(backend = %backend_id, "halting push loop: {err}");
                        break;
                    }
                }
            }
        }

        Ok(summary)
    }

    fn tally_failure(&self, status: OperationStatus, summary: &mut PushSummary) {
        match status {
            OperationStatus::Failed => summary.failed += 1,
            _ => summary.retried += 1,
        }
    }

    /// Re-fetches the remote task a rejected push targeted, resolves the
    /// conflict the rejection implies, and applies the result locally.
    /// Returns `true` if a conflict was actually found and handled.
    async fn try_resolve_push_conflict(
        &self,
        backend: &dyn Backend,
        op: &Operation,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<bool, Error> {
        let OperationPayload::UpdateTask { uid, snapshot, .. } = &op.payload else {
            return Ok(false);
        };
        let Some(binding) = self.store.get_binding(uid, &op.backend_id)? else {
            return Ok(false);
        };
        let remote_list_id = self.resolve_remote_list_id(backend, snapshot.list_id).await?;
        let Some(remote) = backend.get_task(&remote_list_id, &binding.remote_id).await? else {
            return Ok(false);
        };

        let remote_snapshot = remote_task_to_snapshot(&remote, snapshot.list_id);
        let (resolution, conflict) =
            resolve_conflict(*uid, &op.backend_id, self.conflict_strategy, snapshot, &remote_snapshot, now);

        let task = self.store.require_task(uid)?;
        let mut updated = apply_snapshot(task, &resolution.local);
        updated.sync_origin = true;
        updated.touch(now);
        self.store.update_task(&updated)?;
        self.store.record_conflict(&conflict)?;

        let mut updated_binding = binding;
        updated_binding.etag = Some(remote.etag.clone());
        updated_binding.remote_modified_at = remote.modified_at;
        updated_binding.last_synced_at = now;
        self.store.upsert_binding(&updated_binding)?;

        if let Some(push_snapshot) = resolution.push {
            let changed_fields: Vec<String> = resolution
                .field_diffs
                .iter()
                .filter(|d| d.winner == tsk_core::ResolutionSide::Local)
                .map(|d| d.field.clone())
                .collect();
            self.store.write_and_enqueue(
                &op.backend_id,
                OperationKind::UpdateTask,
                OperationPayload::UpdateTask { uid: *uid, snapshot: push_snapshot, changed_fields },
                |_tx| Ok(()),
                now,
            )?;
        }
        Ok(true)
    }

    async fn apply_operation(&self, backend: &dyn Backend, op: &Operation, now: chrono::DateTime<chrono::Utc>) -> Result<(), Error> {
        match &op.payload {
            OperationPayload::CreateTask { uid, snapshot } => {
                let remote_list_id = self.resolve_remote_list_id(backend, snapshot.list_id).await?;
                let fields = snapshot_to_fields(snapshot);
                let created = backend.create_task(&remote_list_id, &fields).await?;
                let mut binding = BackendBinding::new(*uid, &op.backend_id, created.remote_id.clone(), now);
                binding.etag = Some(created.etag.clone());
                binding.remote_modified_at = created.modified_at;
                self.store.upsert_binding(&binding)?;
                Ok(())
            }
            OperationPayload::UpdateTask { uid, snapshot, .. } => {
                let remote_list_id = self.resolve_remote_list_id(backend, snapshot.list_id).await?;
                let binding = self
                    .store
                    .get_binding(uid, &op.backend_id)?
                    .ok_or_else(|| Error::internal("update pushed before task has a binding").with_backend(op.backend_id.clone()))?;
                let fields = snapshot_to_fields(snapshot);
                let updated = backend.update_task(&remote_list_id, &binding.remote_id, &fields).await?;
                let mut binding = binding;
                binding.etag = Some(updated.etag.clone());
                binding.remote_modified_at = updated.modified_at;
                binding.last_synced_at = now;
                self.store.upsert_binding(&binding)?;
                Ok(())
            }
            OperationPayload::DeleteTask { uid } => {
                let Some(binding) = self.store.get_binding(uid, &op.backend_id)? else {
                    return Ok(());
                };
                let task = self.store.get_task(uid)?;
                let Some(task) = task else {
                    self.store.remove_binding(uid, &op.backend_id)?;
                    return Ok(());
                };
                let remote_list_id = self.resolve_remote_list_id(backend, task.list_id).await?;
                backend.delete_task(&remote_list_id, &binding.remote_id).await?;
                self.store.remove_binding(uid, &op.backend_id)?;
                Ok(())
            }
            OperationPayload::CreateList { name, .. } => {
                backend.create_list(name).await?;
                Ok(())
            }
            OperationPayload::UpdateList { .. } => {
                warn!(backend = %op.backend_id, "list rename not propagated: no persisted list binding to retarget");
                Ok(())
            }
            OperationPayload::DeleteList { uid } => {
                let list = self.store.require_list(uid)?;
                if let Some(remote) = backend.list_lists().await?.into_iter().find(|l| l.name == list.name) {
                    backend.delete_list(&remote.remote_id).await?;
                }
                Ok(())
            }
        }
    }

    /// Resolves a local list to its remote counterpart by name, creating
    /// the remote list if the backend supports it and none exists yet.
    async fn resolve_remote_list_id(&self, backend: &dyn Backend, list_id: ListUid) -> Result<String, Error> {
        let list = self.store.require_list(&list_id)?;
        if let Some(found) = backend.list_lists().await?.into_iter().find(|l| l.name == list.name) {
            return Ok(found.remote_id);
        }
        let created = backend.create_list(&list.name).await?;
        Ok(created.remote_id)
    }
}

fn remote_task_to_local(remote: &RemoteTask, list_id: ListUid, now: chrono::DateTime<chrono::Utc>) -> Task {
    let task = Task::new(TaskUid::new(), list_id, remote.summary.clone(), now);
    apply_remote_fields(task, remote, now)
}

/// Overwrites `task`'s mutable fields wholesale with `remote`'s — the
/// non-conflict pull path, where the remote side simply wins. Every
/// field's `field_modified_at` entry is stamped `now`: the backend carries
/// no per-field timestamp of its own, so there is nothing truer to record.
fn apply_remote_fields(mut task: Task, remote: &RemoteTask, now: chrono::DateTime<chrono::Utc>) -> Task {
    task.summary = remote.summary.clone();
    task.description = remote.description.clone();
    task.status = remote.status;
    task.set_priority(remote.priority);
    task.due_at = remote.due_at;
    task.start_at = remote.start_at;
    task.categories = remote.categories.iter().cloned().collect();
    if remote.status == TaskStatus::Completed && task.completed_at.is_none() {
        task.completed_at = remote.modified_at;
    }
    for field in MUTABLE_TASK_FIELDS {
        task.field_modified_at.insert(field.to_string(), now);
    }
    task
}

/// Applies a resolved [`TaskSnapshot`] to `task`, carrying the snapshot's
/// own per-field timestamps forward so a later push or conflict comparison
/// still sees genuine per-field divergence rather than collapsing back to
/// one object-level time.
fn apply_snapshot(mut task: Task, snapshot: &TaskSnapshot) -> Task {
    task.summary = snapshot.summary.clone();
    task.description = snapshot.description.clone();
    task.status = snapshot.status;
    task.set_priority(snapshot.priority);
    task.due_at = snapshot.due_at;
    task.start_at = snapshot.start_at;
    task.categories = snapshot.categories.iter().cloned().collect();
    task.parent_uid = snapshot.parent_uid;
    for field in MUTABLE_TASK_FIELDS {
        if let Some(at) = snapshot.field_modified_at.get(*field) {
            task.field_modified_at.insert(field.to_string(), *at);
        }
    }
    task
}

fn snapshot_to_new_task(snapshot: &TaskSnapshot, summary: String, now: chrono::DateTime<chrono::Utc>) -> Task {
    let task = Task::new(TaskUid::new(), snapshot.list_id, summary, now);
    apply_snapshot(task, snapshot)
}

fn snapshot_to_fields(snapshot: &TaskSnapshot) -> TaskFields {
    TaskFields {
        summary: snapshot.summary.clone(),
        description: snapshot.description.clone(),
        status: snapshot.status,
        priority: snapshot.priority,
        due_at: snapshot.due_at,
        start_at: snapshot.start_at,
        categories: snapshot.categories.clone(),
    }
}

/// Builds a conflict-comparable snapshot from a remote task. Remote
/// backends never expose per-field modification times, so `field_modified_at`
/// is stamped uniformly from the remote's own `modified_at` when the
/// backend provides one; when it doesn't, the map stays empty and the
/// merge strategy's "only one side tracks a timestamp" rule lets the local
/// side win every differing field, which is the safer default absent any
/// remote timing signal at all.
fn remote_task_to_snapshot(remote: &RemoteTask, list_id: ListUid) -> TaskSnapshot {
    let mut field_modified_at = BTreeMap::new();
    if let Some(at) = remote.modified_at {
        for field in MUTABLE_TASK_FIELDS {
            field_modified_at.insert(field.to_string(), at);
        }
    }
    TaskSnapshot {
        list_id,
        summary: remote.summary.clone(),
        description: remote.description.clone(),
        status: remote.status,
        priority: remote.priority,
        due_at: remote.due_at,
        start_at: remote.start_at,
        categories: remote.categories.clone(),
        parent_uid: None,
        field_modified_at,
    }
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
