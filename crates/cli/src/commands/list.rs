// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tsk list` — list CRUD against the local store (§4.C, §4.D).

use chrono::Utc;
use clap::{Args, Subcommand};
use serde::Serialize;

use tsk_core::{Config, List, ListUid, OperationKind, OperationPayload, ResultCode};
use tsk_storage::LocalStore;

use crate::exit_error::ExitError;
use crate::output::{format_or_json, handle_list, OutputFormat};
use crate::resolve::resolve_list;

#[derive(Args)]
pub struct ListArgs {
    #[command(subcommand)]
    pub command: ListCommand,
}

#[derive(Subcommand)]
pub enum ListCommand {
    /// Create a new list.
    Add { name: String },
    /// List every list.
    Ls {
        /// Include soft-deleted lists.
        #[arg(long)]
        all: bool,
    },
    /// Soft-delete a list by ID or ID prefix.
    Rm { id: String },
}

#[derive(Serialize)]
struct ListView {
    id: String,
    name: String,
}

impl From<&List> for ListView {
    fn from(list: &List) -> Self {
        Self { id: list.uid.to_string(), name: list.name.clone() }
    }
}

pub fn run(command: ListCommand, store: &LocalStore, config: &Config, format: OutputFormat, no_prompt: bool) -> Result<(), ExitError> {
    let result_code = match command {
        ListCommand::Add { name } => add(store, config, format, name)?,
        ListCommand::Ls { all } => {
            ls(store, format, all)?;
            ResultCode::InfoOnly
        }
        ListCommand::Rm { id } => rm(store, config, format, &id)?,
    };

    if no_prompt {
        println!("{result_code}");
    }
    Ok(())
}

fn add(store: &LocalStore, config: &Config, format: OutputFormat, name: String) -> Result<ResultCode, ExitError> {
    if store.list_name_in_use(&name, None)? {
        return Err(ExitError::usage(format!("a list named \"{name}\" already exists")));
    }

    let now = Utc::now();
    let uid = ListUid::new();
    let list = List::new(uid.clone(), name, now);

    enqueue_list_write(store, config, OperationKind::CreateList, OperationPayload::CreateList { uid, name: list.name.clone() }, {
        let list = list.clone();
        move |tx| tsk_storage::lists::insert(tx, &list)
    })?;

    format_or_json(format, &ListView::from(&list), || println!("added {} \"{}\"", list.uid, list.name))?;
    Ok(ResultCode::ActionCompleted)
}

fn ls(store: &LocalStore, format: OutputFormat, all: bool) -> Result<(), ExitError> {
    let lists = store.list_all_lists(all)?;
    let views: Vec<ListView> = lists.iter().map(ListView::from).collect();

    handle_list(format, &views, "No lists.", |items, out| {
        use std::io::Write;
        for item in items {
            let _ = writeln!(out, "{}  {}", crate::color::muted(&item.id), item.name);
        }
    })?;
    Ok(())
}

fn rm(store: &LocalStore, config: &Config, format: OutputFormat, id: &str) -> Result<ResultCode, ExitError> {
    let list = resolve_list(store, id)?;
    let now = Utc::now();
    let uid = list.uid.clone();

    enqueue_list_write(store, config, OperationKind::DeleteList, OperationPayload::DeleteList { uid: uid.clone() }, {
        let uid = uid.clone();
        move |tx| tsk_storage::lists::soft_delete(tx, &uid, now)
    })?;

    let obj = serde_json::json!({ "removed": uid.to_string() });
    format_or_json(format, &obj, || println!("removed {uid}"))?;
    Ok(ResultCode::ActionCompleted)
}

fn enqueue_list_write(
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

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
