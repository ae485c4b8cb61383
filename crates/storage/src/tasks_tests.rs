use chrono::Utc;
use rusqlite::Connection;
use tsk_core::test_support::{sample_list, sample_task};
use tsk_core::TaskStatus;

use super::*;
use crate::migrations;

fn open_with_list() -> (Connection, tsk_core::ListUid) {
    let conn = Connection::open_in_memory().unwrap();
    migrations::run(&conn).unwrap();
    let now = Utc::now();
    let list = sample_list(now);
    conn.execute(
        "INSERT INTO lists(uid, name, modified_at) VALUES (?1, ?2, ?3)",
        params![list.uid.as_str(), list.name, list.modified_at.to_rfc3339()],
    )
    .unwrap();
    (conn, list.uid)
}

#[test]
fn insert_then_get_round_trips() {
    let (conn, list_id) = open_with_list();
    let now = Utc::now();
    let mut task = sample_task(list_id.clone(), now);
    task.set_priority(3);
    task.categories.insert("work".to_string());

    insert(&conn, &task).unwrap();
    let fetched = get(&conn, &task.uid).unwrap().unwrap();

    assert_eq!(fetched.uid.as_str(), task.uid.as_str());
    assert_eq!(fetched.summary, task.summary);
    assert_eq!(fetched.priority(), 3);
    assert!(fetched.categories.contains("work"));
    assert_eq!(fetched.status, TaskStatus::NeedsAction);
}

#[test]
fn get_missing_task_returns_none() {
    let (conn, _list_id) = open_with_list();
    let missing = tsk_core::test_support::fixed_task_uid("doesnotexist0000000");
    assert!(get(&conn, &missing).unwrap().is_none());
}

#[test]
fn require_missing_task_is_an_error() {
    let (conn, _list_id) = open_with_list();
    let missing = tsk_core::test_support::fixed_task_uid("doesnotexist0000001");
    assert!(require(&conn, &missing).is_err());
}

#[test]
fn update_persists_changes() {
    let (conn, list_id) = open_with_list();
    let now = Utc::now();
    let mut task = sample_task(list_id, now);
    insert(&conn, &task).unwrap();

    task.set_status(TaskStatus::Completed, now);
    update(&conn, &task).unwrap();

    let fetched = get(&conn, &task.uid).unwrap().unwrap();
    assert_eq!(fetched.status, TaskStatus::Completed);
    assert!(fetched.completed_at.is_some());
}

#[test]
fn update_missing_task_is_an_error() {
    let (conn, list_id) = open_with_list();
    let task = sample_task(list_id, Utc::now());
    assert!(update(&conn, &task).is_err());
}

#[test]
fn soft_delete_excludes_from_active_listing() {
    let (conn, list_id) = open_with_list();
    let now = Utc::now();
    let task = sample_task(list_id.clone(), now);
    insert(&conn, &task).unwrap();

    soft_delete(&conn, &task.uid, now).unwrap();

    let active = list_for_list(&conn, &list_id, false).unwrap();
    assert!(active.is_empty());
    let all = list_for_list(&conn, &list_id, true).unwrap();
    assert_eq!(all.len(), 1);
}

#[test]
fn soft_delete_twice_is_an_error() {
    let (conn, list_id) = open_with_list();
    let now = Utc::now();
    let task = sample_task(list_id, now);
    insert(&conn, &task).unwrap();
    soft_delete(&conn, &task.uid, now).unwrap();
    assert!(soft_delete(&conn, &task.uid, now).is_err());
}

#[test]
fn insert_accepts_a_parent_in_the_same_list() {
    let (conn, list_id) = open_with_list();
    let now = Utc::now();
    let parent = sample_task(list_id.clone(), now);
    insert(&conn, &parent).unwrap();

    let mut child = sample_task(list_id, now);
    child.parent_uid = Some(parent.uid.clone());
    insert(&conn, &child).unwrap();

    assert_eq!(get(&conn, &child.uid).unwrap().unwrap().parent_uid, Some(parent.uid));
}

#[test]
fn insert_rejects_a_parent_in_a_different_list() {
    let (conn, list_id) = open_with_list();
    let now = Utc::now();
    let other_list = sample_list(now);
    conn.execute(
        "INSERT INTO lists(uid, name, modified_at) VALUES (?1, ?2, ?3)",
        params![other_list.uid.as_str(), other_list.name, other_list.modified_at.to_rfc3339()],
    )
    .unwrap();
    let parent = sample_task(other_list.uid, now);
    insert(&conn, &parent).unwrap();

    let mut child = sample_task(list_id, now);
    child.parent_uid = Some(parent.uid);
    assert!(insert(&conn, &child).is_err());
}

#[test]
fn insert_rejects_a_task_that_is_its_own_parent() {
    let (conn, list_id) = open_with_list();
    let now = Utc::now();
    let mut task = sample_task(list_id, now);
    task.parent_uid = Some(task.uid.clone());
    assert!(insert(&conn, &task).is_err());
}

#[test]
fn insert_rejects_a_parent_that_does_not_exist() {
    let (conn, list_id) = open_with_list();
    let now = Utc::now();
    let mut task = sample_task(list_id, now);
    task.parent_uid = Some(tsk_core::test_support::fixed_task_uid("doesnotexist0000002"));
    assert!(insert(&conn, &task).is_err());
}

#[test]
fn update_rejects_a_multi_hop_cycle() {
    let (conn, list_id) = open_with_list();
    let now = Utc::now();
    let a = sample_task(list_id.clone(), now);
    let mut b = sample_task(list_id.clone(), now);
    b.parent_uid = Some(a.uid.clone());
    let mut c = sample_task(list_id, now);
    c.parent_uid = Some(b.uid.clone());
    insert(&conn, &a).unwrap();
    insert(&conn, &b).unwrap();
    insert(&conn, &c).unwrap();

    let mut a = a;
    a.parent_uid = Some(c.uid);
    assert!(update(&conn, &a).is_err());
}

#[test]
fn list_for_list_orders_by_creation() {
    let (conn, list_id) = open_with_list();
    let t0 = Utc::now();
    let t1 = t0 + chrono::Duration::seconds(1);
    let first = sample_task(list_id.clone(), t0);
    let second = sample_task(list_id.clone(), t1);
    insert(&conn, &second).unwrap();
    insert(&conn, &first).unwrap();

    let tasks = list_for_list(&conn, &list_id, false).unwrap();
    assert_eq!(tasks[0].uid.as_str(), first.uid.as_str());
    assert_eq!(tasks[1].uid.as_str(), second.uid.as_str());
}
