// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Git-versioned markdown backend: same checklist-file format as
//! [`crate::backends::plain_markdown`], but every mutation is followed by
//! `git add` + `git commit` in the checklist's repository, giving each
//! sync a durable, inspectable history.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tsk_core::{Capabilities, Error};

use crate::backends::plain_markdown::PlainMarkdownBackend;
use crate::port::{Backend, RemoteList, RemoteTask, TaskFields};

pub struct GitMarkdownBackend {
    id: String,
    repo_root: PathBuf,
    inner: PlainMarkdownBackend,
}

impl GitMarkdownBackend {
    pub fn new(id: impl Into<String>, repo_root: impl Into<PathBuf>) -> Self {
        let id = id.into();
        let repo_root = repo_root.into();
        Self { id: id.clone(), inner: PlainMarkdownBackend::new(id, &repo_root), repo_root }
    }

    /// Stages and commits every change under the checklist directory.
    /// A git failure is logged but never fails the caller's mutation — the
    /// working tree write already succeeded, and history is a convenience,
    /// not the durability guarantee (that's the local store's job).
    async fn commit(&self, message: &str) {
        let add = run_git(&self.repo_root, &["add", "."]).await;
        if let Err(err) = add {
            tracing::warn!(backend = %self.id, %err, "git add failed");
            return;
        }
        if let Err(err) = run_git(&self.repo_root, &["commit", "-m", message]).await {
            tracing::warn!(backend = %self.id, %err, "git commit failed");
        }
    }
}

async fn run_git(repo_root: &Path, args: &[&str]) -> Result<(), String> {
    let output = tokio::process::Command::new("git")
        .arg("-C")
        .arg(repo_root)
        .args(args)
        .output()
        .await
        .map_err(|e| format!("failed to run git: {e}"))?;
    if !output.status.success() {
        return Err(String::from_utf8_lossy(&output.stderr).into_owned());
    }
    Ok(())
}

#[async_trait]
impl Backend for GitMarkdownBackend {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> Capabilities {
        self.inner.capabilities()
    }

    async fn list_lists(&self) -> Result<Vec<RemoteList>, Error> {
        self.inner.list_lists().await
    }

    async fn get_list(&self, remote_id: &str) -> Result<Option<RemoteList>, Error> {
        self.inner.get_list(remote_id).await
    }

    async fn create_list(&self, name: &str) -> Result<RemoteList, Error> {
        let list = self.inner.create_list(name).await?;
        self.commit(&format!("tsk: create list {name}")).await;
        Ok(list)
    }

    async fn delete_list(&self, remote_id: &str) -> Result<(), Error> {
        self.inner.delete_list(remote_id).await?;
        self.commit(&format!("tsk: delete list {remote_id}")).await;
        Ok(())
    }

    async fn list_tasks(&self, remote_list_id: &str) -> Result<Vec<RemoteTask>, Error> {
        self.inner.list_tasks(remote_list_id).await
    }

    async fn get_task(&self, remote_list_id: &str, remote_id: &str) -> Result<Option<RemoteTask>, Error> {
        self.inner.get_task(remote_list_id, remote_id).await
    }

    async fn create_task(&self, remote_list_id: &str, fields: &TaskFields) -> Result<RemoteTask, Error> {
        let task = self.inner.create_task(remote_list_id, fields).await?;
        self.commit(&format!("tsk: add {}", fields.summary)).await;
        Ok(task)
    }

    async fn update_task(&self, remote_list_id: &str, remote_id: &str, fields: &TaskFields) -> Result<RemoteTask, Error> {
        let task = self.inner.update_task(remote_list_id, remote_id, fields).await?;
        self.commit(&format!("tsk: update {}", fields.summary)).await;
        Ok(task)
    }

    async fn delete_task(&self, remote_list_id: &str, remote_id: &str) -> Result<(), Error> {
        self.inner.delete_task(remote_list_id, remote_id).await?;
        self.commit(&format!("tsk: delete task {remote_id}")).await;
        Ok(())
    }
}

#[cfg(test)]
#[path = "git_markdown_tests.rs"]
mod tests;
