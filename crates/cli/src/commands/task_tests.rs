// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tsk_core::test_support::sample_list;

fn store_with_inbox() -> (LocalStore, tsk_core::List) {
    let store = LocalStore::open_in_memory().unwrap();
    let list = sample_list(Utc::now());
    store.create_list(&list).unwrap();
    (store, list)
}

#[tokio::test]
async fn add_creates_a_task_in_the_named_list() {
    let (store, list) = store_with_inbox();
    let config = Config::default();

    add(&store, &config, OutputFormat::Json, "write report".into(), Some(list.name.clone()), None, None).await.unwrap();

    let tasks = store.list_all_tasks(false).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].summary, "write report");
    assert_eq!(tasks[0].list_id, list.uid);
}

#[tokio::test]
async fn add_defaults_to_inbox_when_no_list_given() {
    let (store, _) = store_with_inbox();
    let config = Config::default();

    add(&store, &config, OutputFormat::Json, "anything".into(), None, None, None).await.unwrap();

    assert_eq!(store.list_all_tasks(false).unwrap().len(), 1);
}

#[tokio::test]
async fn edit_updates_only_the_fields_given_and_stamps_each_one() {
    let (store, list) = store_with_inbox();
    let config = Config::default();
    let now = Utc::now();
    let task = tsk_core::test_support::sample_task(list.uid, now);
    store.create_task(&task).unwrap();

    edit(&store, &config, OutputFormat::Json, task.uid.as_str(), Some("Renamed".into()), None, None).await.unwrap();

    let reloaded = store.require_task(&task.uid).unwrap();
    assert_eq!(reloaded.summary, "Renamed");
    assert_eq!(reloaded.priority(), task.priority());
    assert!(reloaded.field_modified_at["summary"] >= now);
    assert!(!reloaded.field_modified_at.contains_key("priority"), "priority was never touched by this edit");
}

#[tokio::test]
async fn edit_with_no_fields_is_a_usage_error() {
    let (store, list) = store_with_inbox();
    let config = Config::default();
    let task = tsk_core::test_support::sample_task(list.uid, Utc::now());
    store.create_task(&task).unwrap();

    let err = edit(&store, &config, OutputFormat::Json, task.uid.as_str(), None, None, None).await.unwrap_err();
    assert_eq!(err.code, 1);
}

#[tokio::test]
async fn done_marks_the_task_completed() {
    let (store, list) = store_with_inbox();
    let config = Config::default();
    let now = Utc::now();
    let task = tsk_core::test_support::sample_task(list.uid, now);
    store.create_task(&task).unwrap();

    done(&store, &config, OutputFormat::Json, task.uid.as_str()).await.unwrap();

    let reloaded = store.require_task(&task.uid).unwrap();
    assert_eq!(reloaded.status, TaskStatus::Completed);
}

#[tokio::test]
async fn rm_soft_deletes_the_task() {
    let (store, list) = store_with_inbox();
    let config = Config::default();
    let now = Utc::now();
    let task = tsk_core::test_support::sample_task(list.uid, now);
    store.create_task(&task).unwrap();

    rm(&store, &config, OutputFormat::Json, task.uid.as_str()).await.unwrap();

    let visible = store.list_all_tasks(false).unwrap();
    assert!(visible.is_empty());
    let all = store.list_all_tasks(true).unwrap();
    assert_eq!(all.len(), 1);
}

#[test]
fn show_errors_on_unknown_id() {
    let (store, _) = store_with_inbox();
    let err = show(&store, OutputFormat::Json, "tsk-nope").unwrap_err();
    assert_eq!(err.code, 1);
}
