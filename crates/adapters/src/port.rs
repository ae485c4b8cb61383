// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Backend Port (§4.A): the one trait every remote integration
//! implements, so the sync engine never matches on a concrete backend
//! type. Errors are always [`tsk_core::Error`] — a backend that wants to
//! report "rate limited" or "not found" classifies it at the point the
//! underlying transport/parsing error is caught, never by letting a raw
//! `reqwest::Error` or `quick_xml::Error` escape this crate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tsk_core::{Capabilities, Error, TaskStatus};

/// A list as seen on one remote, before it has a local [`tsk_core::ListUid`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteList {
    pub remote_id: String,
    pub name: String,
}

/// A task as seen on one remote. Fields the backend's native format
/// doesn't support are `None`/default — the engine degrades per
/// [`RemoteTask::capabilities`], it never assumes every field is populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteTask {
    pub remote_id: String,
    pub remote_list_id: String,
    pub summary: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: u8,
    pub due_at: Option<DateTime<Utc>>,
    pub start_at: Option<DateTime<Utc>>,
    pub categories: Vec<String>,
    /// Cheap, exact change-detection token (ETag, revision id, content
    /// hash — whatever the backend natively offers). Required: every
    /// backend must produce *something* stable here, even a content hash,
    /// since conflict detection depends on it (§4.E).
    pub etag: String,
    pub modified_at: Option<DateTime<Utc>>,
}

/// Fields a backend accepts when creating or updating a task. A subset of
/// [`RemoteTask`] — no `remote_id`/`etag`, since those are assigned by the
/// backend on create and unaffected by the fields a push actually changes.
#[derive(Debug, Clone)]
pub struct TaskFields {
    pub summary: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: u8,
    pub due_at: Option<DateTime<Utc>>,
    pub start_at: Option<DateTime<Utc>>,
    pub categories: Vec<String>,
}

impl Default for TaskFields {
    fn default() -> Self {
        Self {
            summary: String::new(),
            description: None,
            status: TaskStatus::NeedsAction,
            priority: 0,
            due_at: None,
            start_at: None,
            categories: Vec::new(),
        }
    }
}

#[async_trait]
pub trait Backend: Send + Sync + std::fmt::Debug {
    /// Stable identifier used in configuration, binding rows, and error
    /// messages (e.g. `"home"`, `"work-caldav"`) — the config key, not the
    /// backend kind.
    fn id(&self) -> &str;

    fn capabilities(&self) -> Capabilities;

    async fn list_lists(&self) -> Result<Vec<RemoteList>, Error>;
    async fn get_list(&self, remote_id: &str) -> Result<Option<RemoteList>, Error>;
    async fn create_list(&self, name: &str) -> Result<RemoteList, Error>;
    async fn delete_list(&self, remote_id: &str) -> Result<(), Error>;

    async fn list_tasks(&self, remote_list_id: &str) -> Result<Vec<RemoteTask>, Error>;
    async fn get_task(&self, remote_list_id: &str, remote_id: &str) -> Result<Option<RemoteTask>, Error>;
    async fn create_task(&self, remote_list_id: &str, fields: &TaskFields) -> Result<RemoteTask, Error>;
    async fn update_task(&self, remote_list_id: &str, remote_id: &str, fields: &TaskFields) -> Result<RemoteTask, Error>;
    async fn delete_task(&self, remote_list_id: &str, remote_id: &str) -> Result<(), Error>;
}

#[cfg(test)]
#[path = "port_tests.rs"]
mod tests;
