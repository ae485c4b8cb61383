// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tsk task` — task CRUD against the local store, fanning writes out to
//! every enabled backend's operation queue (§4.C, §4.D).

use std::io::Write;

use chrono::Utc;
use clap::{Args, Subcommand};
use serde::Serialize;

use tsk_core::{Config, OperationKind, OperationPayload, ResultCode, Task, TaskSnapshot, TaskStatus, TaskUid};
use tsk_storage::LocalStore;

use crate::client::DaemonClient;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, handle_list, OutputFormat};
use crate::resolve::{resolve_list, resolve_task};

#[derive(Args)]
pub struct TaskArgs {
    #[command(subcommand)]
    pub command: TaskCommand,
}

#[derive(Subcommand)]
pub enum TaskCommand {
    /// Add a task to a list.
    Add {
        summary: String,
        /// List name or ID; defaults to "Inbox" if present.
        #[arg(short, long)]
        list: Option<String>,
        #[arg(long)]
        due: Option<chrono::DateTime<Utc>>,
        #[arg(long)]
        priority: Option<u8>,
    },
    /// List tasks, optionally scoped to one list.
    Ls {
        #[arg(short, long)]
        list: Option<String>,
        /// Include soft-deleted tasks.
        #[arg(long)]
        all: bool,
    },
    /// Show one task by ID or ID prefix.
    Show { id: String },
    /// Edit one or more fields of a task.
    Edit {
        id: String,
        #[arg(long)]
        summary: Option<String>,
        #[arg(long)]
        priority: Option<u8>,
        #[arg(long)]
        due: Option<chrono::DateTime<Utc>>,
    },
    /// Mark a task completed.
    Done { id: String },
    /// Soft-delete a task.
    Rm { id: String },
}

#[derive(Serialize)]
struct TaskView {
    id: String,
    list_id: String,
    summary: String,
    status: String,
    priority: u8,
    due_at: Option<chrono::DateTime<Utc>>,
}

impl From<&Task> for TaskView {
    fn from(task: &Task) -> Self {
        Self {
            id: task.uid.to_string(),
            list_id: task.list_id.to_string(),
            summary: task.summary.clone(),
            status: task.status.to_string(),
            priority: task.priority(),
            due_at: task.due_at,
        }
    }
}

pub async fn run(
    command: TaskCommand,
    store: &LocalStore,
    config: &Config,
    format: OutputFormat,
    no_prompt: bool,
) -> Result<(), ExitError> {
    let result_code = match command {
        TaskCommand::Add { summary, list, due, priority } => add(store, config, format, summary, list, due, priority).await?,
        TaskCommand::Ls { list, all } => {
            ls(store, format, list, all)?;
            ResultCode::InfoOnly
        }
        TaskCommand::Show { id } => {
            show(store, format, &id)?;
            ResultCode::InfoOnly
        }
        TaskCommand::Edit { id, summary, priority, due } => edit(store, config, format, &id, summary, priority, due).await?,
        TaskCommand::Done { id } => done(store, config, format, &id).await?,
        TaskCommand::Rm { id } => rm(store, config, format, &id).await?,
    };

    if no_prompt {
        println!("{result_code}");
    }
    Ok(())
}

async fn add(
    store: &LocalStore,
    config: &Config,
    format: OutputFormat,
    summary: String,
    list: Option<String>,
    due: Option<chrono::DateTime<Utc>>,
    priority: Option<u8>,
) -> Result<ResultCode, ExitError> {
    let list = resolve_or_default_list(store, list.as_deref())?;
    let now = Utc::now();

    let uid = TaskUid::new();
    let mut task = Task::new(uid.clone(), list.uid, summary, now);
    if let Some(due) = due {
        task.due_at = Some(due);
    }
    if let Some(priority) = priority {
        task.set_priority(priority);
    }

    enqueue_task_write(store, config, OperationKind::CreateTask, OperationPayload::CreateTask { uid, snapshot: TaskSnapshot::from_task(&task) }, {
        let task = task.clone();
        move |tx| tsk_storage::tasks::insert(tx, &task)
    })?;

    notify_daemon_if_configured(config).await;

    format_or_json(format, &TaskView::from(&task), || println!("added {} \"{}\"", task.uid, task.summary))?;
    Ok(ResultCode::ActionCompleted)
}

fn ls(store: &LocalStore, format: OutputFormat, list: Option<String>, all: bool) -> Result<(), ExitError> {
    let tasks = match list {
        Some(query) => {
            let list = resolve_list(store, &query)?;
            store.list_tasks(&list.uid, all)?
        }
        None => store.list_all_tasks(all)?,
    };
    let views: Vec<TaskView> = tasks.iter().map(TaskView::from).collect();

    handle_list(format, &views, "No tasks.", |items, out| {
        for item in items {
            let _ = writeln!(out, "{}  [{}] {}", crate::color::muted(&item.id), item.status, item.summary);
        }
    })?;
    Ok(())
}

fn show(store: &LocalStore, format: OutputFormat, id: &str) -> Result<(), ExitError> {
    let task = resolve_task(store, id)?;
    format_or_json(format, &TaskView::from(&task), || {
        println!("{}", crate::color::header(&task.uid.to_string()));
        println!("  summary:  {}", task.summary);
        println!("  status:   {}", task.status);
        println!("  priority: {}", task.priority());
        if let Some(due) = task.due_at {
            println!("  due:      {due}");
        }
    })?;
    Ok(())
}

/// Edits whichever fields the caller passed, each stamped with its own
/// modification time so a later `merge` conflict resolution can see which
/// field changed most recently rather than treating the whole task as one
/// unit (§4.E).
async fn edit(
    store: &LocalStore,
    config: &Config,
    format: OutputFormat,
    id: &str,
    summary: Option<String>,
    priority: Option<u8>,
    due: Option<chrono::DateTime<Utc>>,
) -> Result<ResultCode, ExitError> {
    if summary.is_none() && priority.is_none() && due.is_none() {
        return Err(ExitError::usage("edit requires at least one of --summary, --priority, --due"));
    }

    let mut task = resolve_task(store, id)?;
    let now = Utc::now();
    if let Some(summary) = summary {
        task.set_summary(summary, now);
    }
    if let Some(priority) = priority {
        task.set_priority_now(priority, now);
    }
    if let Some(due) = due {
        task.set_due_at(Some(due), now);
    }

    update_task_and_enqueue(store, config, &task)?;
    notify_daemon_if_configured(config).await;

    format_or_json(format, &TaskView::from(&task), || println!("edited {}", task.uid))?;
    Ok(ResultCode::ActionCompleted)
}

async fn done(store: &LocalStore, config: &Config, format: OutputFormat, id: &str) -> Result<ResultCode, ExitError> {
    let mut task = resolve_task(store, id)?;
    let now = Utc::now();
    task.set_status(TaskStatus::Completed, now);

    update_task_and_enqueue(store, config, &task)?;
    notify_daemon_if_configured(config).await;

    format_or_json(format, &TaskView::from(&task), || println!("completed {}", task.uid))?;
    Ok(ResultCode::ActionCompleted)
}

async fn rm(store: &LocalStore, config: &Config, format: OutputFormat, id: &str) -> Result<ResultCode, ExitError> {
    let task = resolve_task(store, id)?;
    let now = Utc::now();
    let uid = task.uid.clone();

    enqueue_task_write(store, config, OperationKind::DeleteTask, OperationPayload::DeleteTask { uid: uid.clone() }, {
        let uid = uid.clone();
        move |tx| tsk_storage::tasks::soft_delete(tx, &uid, now)
    })?;
    notify_daemon_if_configured(config).await;

    let obj = serde_json::json!({ "removed": uid.to_string() });
    format_or_json(format, &obj, || println!("removed {uid}"))?;
    Ok(ResultCode::ActionCompleted)
}

fn update_task_and_enqueue(store: &LocalStore, config: &Config, task: &Task) -> Result<(), ExitError> {
    let payload = OperationPayload::UpdateTask {
        uid: task.uid.clone(),
        snapshot: TaskSnapshot::from_task(task),
        changed_fields: tsk_core::MUTABLE_TASK_FIELDS.iter().map(|f| f.to_string()).collect(),
    };
    enqueue_task_write(store, config, OperationKind::UpdateTask, payload, {
        let task = task.clone();
        move |tx| tsk_storage::tasks::update(tx, &task)
    })
}

fn enqueue_task_write(
    store: &LocalStore,
    config: &Config,
    kind: OperationKind,
    payload: OperationPayload,
    write: impl FnOnce(&rusqlite::Transaction<'_>) -> tsk_storage::StorageResult<()>,
) -> Result<(), ExitError> {
    let backend_ids: Vec<&str> = config.enabled_backends().map(|(id, _)| id.as_str()).collect();
    if backend_ids.is_empty() {
        store.with_transaction(write).map_err(tsk_core::Error::from)?;
    } else {
        store.write_and_enqueue_for_backends(&backend_ids, kind, payload, write, Utc::now())?;
    }
    Ok(())
}

fn resolve_or_default_list(store: &LocalStore, query: Option<&str>) -> Result<tsk_core::List, ExitError> {
    match query {
        Some(query) => resolve_list(store, query),
        None => {
            let lists = store.list_all_lists(false)?;
            lists
                .into_iter()
                .find(|l| l.name == "Inbox")
                .ok_or_else(|| ExitError::usage("no list specified and no \"Inbox\" list exists"))
        }
    }
}

async fn notify_daemon_if_configured(config: &Config) {
    if config.sync.enabled && config.sync.auto_sync_after_operation {
        if let Ok(client) = DaemonClient::connect().await {
            let _ = client.notify(None).await;
        }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
