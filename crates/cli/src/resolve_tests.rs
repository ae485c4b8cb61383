// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::Utc;
use tsk_core::test_support::{sample_list, sample_task};

#[test]
fn resolve_task_finds_by_full_uid() {
    let store = LocalStore::open_in_memory().unwrap();
    let now = Utc::now();
    let list = sample_list(now);
    store.create_list(&list).unwrap();
    let task = sample_task(list.uid.clone(), now);
    store.create_task(&task).unwrap();

    let found = resolve_task(&store, task.uid.as_str()).unwrap();
    assert_eq!(found.uid, task.uid);
}

#[test]
fn resolve_task_finds_by_prefix() {
    let store = LocalStore::open_in_memory().unwrap();
    let now = Utc::now();
    let list = sample_list(now);
    store.create_list(&list).unwrap();
    let task = sample_task(list.uid.clone(), now);
    store.create_task(&task).unwrap();

    let prefix = &task.uid.as_str()[..8];
    let found = resolve_task(&store, prefix).unwrap();
    assert_eq!(found.uid, task.uid);
}

#[test]
fn resolve_task_errors_on_no_match() {
    let store = LocalStore::open_in_memory().unwrap();
    let err = resolve_task(&store, "tsk-doesnotexist").unwrap_err();
    assert_eq!(err.code, 1);
}

#[test]
fn resolve_list_finds_by_full_uid() {
    let store = LocalStore::open_in_memory().unwrap();
    let now = Utc::now();
    let list = sample_list(now);
    store.create_list(&list).unwrap();

    let found = resolve_list(&store, list.uid.as_str()).unwrap();
    assert_eq!(found.uid, list.uid);
}
