// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolves a user-typed ID or ID prefix against the local store, so
//! commands can accept `tsk-8f3a` instead of a full UID.

use tsk_core::prefix_matches;
use tsk_storage::LocalStore;

use crate::exit_error::ExitError;

/// Finds the single task whose UID exactly matches `query`, or whose UID
/// is prefixed by it. Exact matches win over prefix matches so a full UID
/// is never ambiguous even if it also happens to prefix another UID.
pub fn resolve_task(store: &LocalStore, query: &str) -> Result<tsk_core::Task, ExitError> {
    let tasks = store.list_all_tasks(false)?;
    let matched = resolve_one(tasks, query, |task| task.uid.as_str())?;
    Ok(matched)
}

pub fn resolve_list(store: &LocalStore, query: &str) -> Result<tsk_core::List, ExitError> {
    let lists = store.list_all_lists(false)?;
    let matched = resolve_one(lists, query, |list| list.uid.as_str())?;
    Ok(matched)
}

fn resolve_one<T>(candidates: Vec<T>, query: &str, id_of: impl Fn(&T) -> &str) -> Result<T, ExitError> {
    let mut matched: Vec<T> = candidates.into_iter().filter(|c| prefix_matches(id_of(c), query)).collect();

    if let Some(exact) = matched.iter().position(|c| id_of(c) == query) {
        return Ok(matched.remove(exact));
    }
    match matched.len() {
        0 => Err(ExitError::usage(format!("no match for \"{query}\""))),
        1 => Ok(matched.remove(0)),
        n => Err(ExitError::usage(format!("\"{query}\" is ambiguous, matches {n} entries"))),
    }
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;
