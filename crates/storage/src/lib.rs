// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! tsk-storage: the Local Store and Operation Queue (§4.C, §4.D).
//!
//! Everything here is SQLite through [`rusqlite`], reached through exactly
//! one shared connection per [`LocalStore`] — one writer at a time is what
//! SQLite gives you regardless, so a connection pool would just add
//! contention without adding concurrency. Every public function returns
//! [`tsk_core::Error`]; [`StorageError`] never crosses this crate's
//! boundary (§10.B).

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod bindings;
pub mod conflicts;
pub mod connection;
pub mod error;
pub mod lists;
pub mod migrations;
pub mod queue;
pub mod tasks;

pub use connection::LocalStore;
pub use error::{StorageError, StorageResult};

use chrono::{DateTime, Duration, Utc};
use tsk_core::{
    BackendBinding, ConflictId, ConflictRecord, List, ListUid, Operation, OperationKind,
    OperationPayload, OperationStatus, Task, TaskUid,
};

/// This crate's public-facing result alias — every method on [`LocalStore`]
/// returns [`tsk_core::Error`], never a raw [`StorageError`] (§10.B).
pub type Result<T> = std::result::Result<T, tsk_core::Error>;

/// Thin convenience layer over the per-entity modules, so callers in
/// `tsk-engine`/`tsk-cli`/`tsk-daemon` don't need to reach for
/// `store.with_conn(|conn| tasks::get(conn, uid))` at every call site.
/// The per-entity modules remain public for call sites that need a bare
/// connection (e.g. batched writes inside one transaction).
impl LocalStore {
    pub fn create_task(&self, task: &Task) -> Result<()> {
        Ok(self.with_conn(|conn| tasks::insert(conn, task))?)
    }

    pub fn update_task(&self, task: &Task) -> Result<()> {
        Ok(self.with_conn(|conn| tasks::update(conn, task))?)
    }

    pub fn get_task(&self, uid: &TaskUid) -> Result<Option<Task>> {
        Ok(self.with_conn(|conn| tasks::get(conn, uid))?)
    }

    pub fn require_task(&self, uid: &TaskUid) -> Result<Task> {
        Ok(self.with_conn(|conn| tasks::require(conn, uid))?)
    }

    pub fn list_tasks(&self, list_id: &ListUid, include_deleted: bool) -> Result<Vec<Task>> {
        Ok(self.with_conn(|conn| tasks::list_for_list(conn, list_id, include_deleted))?)
    }

    pub fn list_all_tasks(&self, include_deleted: bool) -> Result<Vec<Task>> {
        Ok(self.with_conn(|conn| tasks::list_all(conn, include_deleted))?)
    }

    pub fn soft_delete_task(&self, uid: &TaskUid, now: DateTime<Utc>) -> Result<()> {
        Ok(self.with_conn(|conn| tasks::soft_delete(conn, uid, now))?)
    }

    pub fn create_list(&self, list: &List) -> Result<()> {
        Ok(self.with_conn(|conn| lists::insert(conn, list))?)
    }

    pub fn update_list(&self, list: &List) -> Result<()> {
        Ok(self.with_conn(|conn| lists::update(conn, list))?)
    }

    pub fn get_list(&self, uid: &ListUid) -> Result<Option<List>> {
        Ok(self.with_conn(|conn| lists::get(conn, uid))?)
    }

    pub fn require_list(&self, uid: &ListUid) -> Result<List> {
        Ok(self.with_conn(|conn| lists::require(conn, uid))?)
    }

    pub fn list_all_lists(&self, include_deleted: bool) -> Result<Vec<List>> {
        Ok(self.with_conn(|conn| lists::list_all(conn, include_deleted))?)
    }

    pub fn list_name_in_use(&self, name: &str, excluding: Option<&ListUid>) -> Result<bool> {
        Ok(self.with_conn(|conn| lists::name_in_use(conn, name, excluding))?)
    }

    pub fn soft_delete_list(&self, uid: &ListUid, now: DateTime<Utc>) -> Result<()> {
        Ok(self.with_conn(|conn| lists::soft_delete(conn, uid, now))?)
    }

    pub fn upsert_binding(&self, binding: &BackendBinding) -> Result<()> {
        Ok(self.with_conn(|conn| bindings::upsert(conn, binding))?)
    }

    pub fn get_binding(&self, local_uid: &TaskUid, backend_id: &str) -> Result<Option<BackendBinding>> {
        Ok(self.with_conn(|conn| bindings::get(conn, local_uid, backend_id))?)
    }

    pub fn bindings_for_task(&self, local_uid: &TaskUid) -> Result<Vec<BackendBinding>> {
        Ok(self.with_conn(|conn| bindings::list_for_task(conn, local_uid))?)
    }

    pub fn find_binding_by_remote(&self, backend_id: &str, remote_id: &str) -> Result<Option<BackendBinding>> {
        Ok(self.with_conn(|conn| bindings::find_by_remote(conn, backend_id, remote_id))?)
    }

    pub fn remove_binding(&self, local_uid: &TaskUid, backend_id: &str) -> Result<()> {
        Ok(self.with_conn(|conn| bindings::remove(conn, local_uid, backend_id))?)
    }

    /// Enqueues an operation for `backend_id` in the same transaction as
    /// `write`, so the mutation and its queued push commit together or
    /// not at all (§4.D).
    pub fn write_and_enqueue(
        &self,
        backend_id: &str,
        kind: OperationKind,
        payload: OperationPayload,
        write: impl FnOnce(&rusqlite::Transaction<'_>) -> StorageResult<()>,
        now: DateTime<Utc>,
    ) -> Result<Operation> {
        Ok(self.with_transaction(|tx| {
            write(tx)?;
            queue::enqueue(tx, backend_id, kind, &payload, now)
        })?)
    }

    /// Like [`Self::write_and_enqueue`] but for callers (the CLI) that fan a
    /// single local write out to every currently enabled backend, rather
    /// than the one backend a sync-engine reconciliation round already
    /// knows it's talking to.
    pub fn write_and_enqueue_for_backends(
        &self,
        backend_ids: &[&str],
        kind: OperationKind,
        payload: OperationPayload,
        write: impl FnOnce(&rusqlite::Transaction<'_>) -> StorageResult<()>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Operation>> {
        Ok(self.with_transaction(|tx| {
            write(tx)?;
            backend_ids.iter().map(|backend_id| queue::enqueue(tx, backend_id, kind, &payload, now)).collect()
        })?)
    }

    pub fn claim_next_operation(
        &self,
        backend_id: &str,
        worker_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Operation>> {
        Ok(self.with_conn_mut(|conn| queue::claim_next(conn, backend_id, worker_id, now))?)
    }

    pub fn finalize_operation_done(&self, seq: u64) -> Result<()> {
        Ok(self.with_conn(|conn| queue::finalize_done(conn, seq))?)
    }

    pub fn finalize_operation_failed(&self, seq: u64, error: &str, max_attempts: u32) -> Result<OperationStatus> {
        Ok(self.with_conn(|conn| queue::finalize_failed(conn, seq, error, max_attempts))?)
    }

    pub fn recover_stuck_operations(
        &self,
        stuck_after: Duration,
        now: DateTime<Utc>,
        is_worker_alive: impl Fn(&str) -> bool,
    ) -> Result<u64> {
        Ok(self.with_conn(|conn| queue::recover_stuck(conn, stuck_after, now, is_worker_alive))?)
    }

    pub fn pending_operation_count(&self, backend_id: &str) -> Result<u64> {
        Ok(self.with_conn(|conn| queue::pending_count(conn, backend_id))?)
    }

    pub fn record_conflict(&self, conflict: &ConflictRecord) -> Result<()> {
        Ok(self.with_conn(|conn| conflicts::insert(conn, conflict))?)
    }

    pub fn mark_conflict_resolved(&self, id: &ConflictId, now: DateTime<Utc>) -> Result<()> {
        Ok(self.with_conn(|conn| conflicts::mark_resolved(conn, id, now))?)
    }

    pub fn unresolved_conflicts(&self) -> Result<Vec<ConflictRecord>> {
        Ok(self.with_conn(conflicts::unresolved)?)
    }

    pub fn conflicts_for_task(&self, task_uid: &TaskUid) -> Result<Vec<ConflictRecord>> {
        Ok(self.with_conn(|conn| conflicts::for_task(conn, task_uid))?)
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
