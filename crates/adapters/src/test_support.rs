// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! An in-memory [`Backend`] double, available to every crate in the
//! workspace behind the `test-support` feature so reconciliation tests
//! don't each stand up a [`crate::backends::plain_markdown`] tempdir or a
//! `wiremock` server.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tsk_core::{Capabilities, Error};

use crate::port::{Backend, RemoteList, RemoteTask, TaskFields};

pub struct MockBackend {
    id: String,
    capabilities: Capabilities,
    lists: Mutex<Vec<RemoteList>>,
    tasks: Mutex<Vec<RemoteTask>>,
    next_id: AtomicU64,
}

impl MockBackend {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            capabilities: Capabilities::full(),
            lists: Mutex::new(Vec::new()),
            tasks: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Seeds a remote task directly, bypassing `create_task`, so tests can
    /// set up a pre-existing remote state to pull against.
    pub fn seed_task(&self, task: RemoteTask) {
        self.tasks.lock().push(task);
    }

    pub fn seed_list(&self, list: RemoteList) {
        self.lists.lock().push(list);
    }

    fn next_remote_id(&self) -> String {
        self.next_id.fetch_add(1, Ordering::SeqCst).to_string()
    }
}

fn to_remote_task(remote_id: String, remote_list_id: &str, fields: &TaskFields, etag: String) -> RemoteTask {
    RemoteTask {
        remote_id,
        remote_list_id: remote_list_id.to_string(),
        summary: fields.summary.clone(),
        description: fields.description.clone(),
        status: fields.status,
        priority: fields.priority,
        due_at: fields.due_at,
        start_at: fields.start_at,
        categories: fields.categories.clone(),
        etag,
        modified_at: None,
    }
}

#[async_trait]
impl Backend for MockBackend {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    async fn list_lists(&self) -> Result<Vec<RemoteList>, Error> {
        Ok(self.lists.lock().clone())
    }

    async fn get_list(&self, remote_id: &str) -> Result<Option<RemoteList>, Error> {
        Ok(self.lists.lock().iter().find(|l| l.remote_id == remote_id).cloned())
    }

    async fn create_list(&self, name: &str) -> Result<RemoteList, Error> {
        let list = RemoteList { remote_id: self.next_remote_id(), name: name.to_string() };
        self.lists.lock().push(list.clone());
        Ok(list)
    }

    async fn delete_list(&self, remote_id: &str) -> Result<(), Error> {
        self.lists.lock().retain(|l| l.remote_id != remote_id);
        Ok(())
    }

    async fn list_tasks(&self, remote_list_id: &str) -> Result<Vec<RemoteTask>, Error> {
        Ok(self.tasks.lock().iter().filter(|t| t.remote_list_id == remote_list_id).cloned().collect())
    }

    async fn get_task(&self, remote_list_id: &str, remote_id: &str) -> Result<Option<RemoteTask>, Error> {
        Ok(self.tasks.lock().iter().find(|t| t.remote_list_id == remote_list_id && t.remote_id == remote_id).cloned())
    }

    async fn create_task(&self, remote_list_id: &str, fields: &TaskFields) -> Result<RemoteTask, Error> {
        let task = to_remote_task(self.next_remote_id(), remote_list_id, fields, "v1".to_string());
        self.tasks.lock().push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, remote_list_id: &str, remote_id: &str, fields: &TaskFields) -> Result<RemoteTask, Error> {
        let mut tasks = self.tasks.lock();
        let existing = tasks
            .iter_mut()
            .find(|t| t.remote_list_id == remote_list_id && t.remote_id == remote_id)
            .ok_or_else(|| Error::not_found(format!("no remote task {remote_id}")).with_backend(self.id.clone()))?;
        let next_etag = format!("v{}", existing.etag.trim_start_matches('v').parse::<u64>().unwrap_or(1) + 1);
        *existing = to_remote_task(remote_id.to_string(), remote_list_id, fields, next_etag);
        Ok(existing.clone())
    }

    async fn delete_task(&self, remote_list_id: &str, remote_id: &str) -> Result<(), Error> {
        self.tasks.lock().retain(|t| !(t.remote_list_id == remote_list_id && t.remote_id == remote_id));
        Ok(())
    }
}
