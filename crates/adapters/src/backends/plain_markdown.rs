// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The plain markdown backend: a single checklist file per list, each task
//! a `- [ ]`/`- [x]` line. The minimal-capability remote — no priorities,
//! no start dates, no custom statuses — so round-trips through this
//! backend collapse everything the data model can't express in a
//! checklist line (§4.A degrade-gracefully contract).
//!
//! One file holds exactly one list; `remote_list_id` is the file's path.
//! `remote_id` for a task is its 1-based line number within the file,
//! stable across writes made by this backend (lines are rewritten
//! in-place, never reordered).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use tsk_core::{Capabilities, Error, TaskStatus};

use crate::port::{Backend, RemoteList, RemoteTask, TaskFields};

/// One markdown checklist line: `- [ ] Buy milk` or `- [x] Buy milk`.
fn format_line(summary: &str, done: bool) -> String {
    format!("- [{}] {}", if done { "x" } else { " " }, summary)
}

fn parse_line(line: &str) -> Option<(bool, &str)> {
    let rest = line.trim_start().strip_prefix("- [")?;
    let (marker, rest) = rest.split_once(']')?;
    let done = matches!(marker, "x" | "X");
    Some((done, rest.trim_start()))
}

fn etag_for(contents: &str) -> String {
    let digest = Sha256::digest(contents.as_bytes());
    format!("sha256:{digest:x}")
}

fn status_for(done: bool) -> TaskStatus {
    if done {
        TaskStatus::Completed
    } else {
        TaskStatus::NeedsAction
    }
}

pub struct PlainMarkdownBackend {
    id: String,
    root: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl PlainMarkdownBackend {
    pub fn new(id: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self { id: id.into(), root: root.into(), lock: Arc::new(Mutex::new(())) }
    }

    fn path_for(&self, remote_list_id: &str) -> PathBuf {
        self.root.join(remote_list_id)
    }

    fn read_lines(&self, remote_list_id: &str) -> Result<Vec<String>, Error> {
        let path = self.path_for(remote_list_id);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(contents.lines().map(str::to_owned).collect()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(io_error(&self.id, &path, err)),
        }
    }

    fn write_lines(&self, remote_list_id: &str, lines: &[String]) -> Result<(), Error> {
        let path = self.path_for(remote_list_id);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_error(&self.id, parent, e))?;
        }
        let mut contents = lines.join("\n");
        if !contents.is_empty() {
            contents.push('\n');
        }
        std::fs::write(&path, contents).map_err(|e| io_error(&self.id, &path, e))
    }

    fn task_at_line(&self, remote_list_id: &str, line_no: usize, line: &str) -> Result<RemoteTask, Error> {
        let (done, summary) = parse_line(line)
            .ok_or_else(|| Error::validation(format!("malformed checklist line {line_no}")))?;
        Ok(RemoteTask {
            remote_id: line_no.to_string(),
            remote_list_id: remote_list_id.to_string(),
            summary: summary.to_string(),
            description: None,
            status: status_for(done),
            priority: 0,
            due_at: None,
            start_at: None,
            categories: Vec::new(),
            etag: etag_for(line),
            modified_at: None,
        })
    }
}

fn io_error(backend_id: &str, path: &Path, source: std::io::Error) -> Error {
    Error::internal(format!("{}: {}", path.display(), source)).with_backend(backend_id.to_string())
}

#[async_trait]
impl Backend for PlainMarkdownBackend {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::minimal()
    }

    async fn list_lists(&self) -> Result<Vec<RemoteList>, Error> {
        let _guard = self.lock.lock();
        let mut lists = Vec::new();
        let entries = std::fs::read_dir(&self.root).map_err(|e| io_error(&self.id, &self.root, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| io_error(&self.id, &self.root, e))?;
            if entry.path().extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            lists.push(RemoteList { remote_id: name.clone(), name: name.trim_end_matches(".md").to_string() });
        }
        Ok(lists)
    }

    async fn get_list(&self, remote_id: &str) -> Result<Option<RemoteList>, Error> {
        let _guard = self.lock.lock();
        let path = self.path_for(remote_id);
        if path.exists() {
            Ok(Some(RemoteList { remote_id: remote_id.to_string(), name: remote_id.trim_end_matches(".md").to_string() }))
        } else {
            Ok(None)
        }
    }

    async fn create_list(&self, name: &str) -> Result<RemoteList, Error> {
        let _guard = self.lock.lock();
        let remote_id = format!("{name}.md");
        self.write_lines(&remote_id, &[])?;
        Ok(RemoteList { remote_id, name: name.to_string() })
    }

    async fn delete_list(&self, remote_id: &str) -> Result<(), Error> {
        let _guard = self.lock.lock();
        let path = self.path_for(remote_id);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(&self.id, &path, err)),
        }
    }

    async fn list_tasks(&self, remote_list_id: &str) -> Result<Vec<RemoteTask>, Error> {
        let _guard = self.lock.lock();
        let lines = self.read_lines(remote_list_id)?;
        lines
            .iter()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| self.task_at_line(remote_list_id, idx + 1, line))
            .collect()
    }

    async fn get_task(&self, remote_list_id: &str, remote_id: &str) -> Result<Option<RemoteTask>, Error> {
        let _guard = self.lock.lock();
        let line_no: usize = remote_id
            .parse()
            .map_err(|_| Error::validation(format!("invalid line number {remote_id}")))?;
        let lines = self.read_lines(remote_list_id)?;
        match lines.get(line_no.saturating_sub(1)) {
            Some(line) if !line.trim().is_empty() => Ok(Some(self.task_at_line(remote_list_id, line_no, line)?)),
            _ => Ok(None),
        }
    }

    async fn create_task(&self, remote_list_id: &str, fields: &TaskFields) -> Result<RemoteTask, Error> {
        let _guard = self.lock.lock();
        let mut lines = self.read_lines(remote_list_id)?;
        let line = format_line(&fields.summary, fields.status.is_terminal());
        lines.push(line.clone());
        let line_no = lines.len();
        self.write_lines(remote_list_id, &lines)?;
        self.task_at_line(remote_list_id, line_no, &line)
    }

    async fn update_task(&self, remote_list_id: &str, remote_id: &str, fields: &TaskFields) -> Result<RemoteTask, Error> {
        let _guard = self.lock.lock();
        let line_no: usize = remote_id
            .parse()
            .map_err(|_| Error::validation(format!("invalid line number {remote_id}")))?;
        let mut lines = self.read_lines(remote_list_id)?;
        let index = line_no
            .checked_sub(1)
            .filter(|i| *i < lines.len())
            .ok_or_else(|| Error::not_found(format!("no task at line {remote_id}")))?;
        let line = format_line(&fields.summary, fields.status.is_terminal());
        lines[index] = line.clone();
        self.write_lines(remote_list_id, &lines)?;
        self.task_at_line(remote_list_id, line_no, &line)
    }

    async fn delete_task(&self, remote_list_id: &str, remote_id: &str) -> Result<(), Error> {
        let _guard = self.lock.lock();
        let line_no: usize = remote_id
            .parse()
            .map_err(|_| Error::validation(format!("invalid line number {remote_id}")))?;
        let mut lines = self.read_lines(remote_list_id)?;
        if let Some(index) = line_no.checked_sub(1).filter(|i| *i < lines.len()) {
            lines[index] = String::new();
        }
        self.write_lines(remote_list_id, &lines)
    }
}

#[cfg(test)]
#[path = "plain_markdown_tests.rs"]
mod tests;
