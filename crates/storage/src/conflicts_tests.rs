use std::collections::BTreeMap;

use chrono::Utc;
use rusqlite::Connection;
use tsk_core::test_support::fixed_task_uid;
use tsk_core::{ConflictId, ConflictRecord, ConflictStrategy, FieldDiff, ResolutionSide, TaskSnapshot, TaskStatus};

use super::*;
use crate::migrations;

fn open() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    migrations::run(&conn).unwrap();
    conn
}

fn sample_snapshot() -> TaskSnapshot {
    TaskSnapshot {
        list_id: tsk_core::test_support::sample_list(Utc::now()).uid,
        summary: "Write the quarterly report".to_string(),
        description: None,
        status: TaskStatus::NeedsAction,
        priority: 0,
        due_at: None,
        start_at: None,
        categories: Vec::new(),
        parent_uid: None,
        field_modified_at: BTreeMap::new(),
    }
}

fn sample_conflict(task_uid: tsk_core::TaskUid, now: chrono::DateTime<Utc>) -> ConflictRecord {
    ConflictRecord {
        id: ConflictId::new(),
        task_uid,
        backend_id: "home".to_string(),
        local_version: sample_snapshot(),
        remote_version: sample_snapshot(),
        strategy_applied: ConflictStrategy::Merge,
        field_diffs: vec![FieldDiff {
            field: "summary".to_string(),
            local_value: "a".to_string(),
            remote_value: "b".to_string(),
            winner: ResolutionSide::Local,
        }],
        detected_at: now,
        resolved_at: None,
    }
}

#[test]
fn insert_then_list_unresolved() {
    let conn = open();
    let now = Utc::now();
    let uid = fixed_task_uid("aaaaaaaaaaaaaaaaaaa");
    let conflict = sample_conflict(uid, now);
    insert(&conn, &conflict).unwrap();

    let unresolved_list = unresolved(&conn).unwrap();
    assert_eq!(unresolved_list.len(), 1);
    assert_eq!(unresolved_list[0].field_diffs.len(), 1);
}

#[test]
fn mark_resolved_excludes_from_unresolved_listing() {
    let conn = open();
    let now = Utc::now();
    let uid = fixed_task_uid("bbbbbbbbbbbbbbbbbbb");
    let conflict = sample_conflict(uid, now);
    insert(&conn, &conflict).unwrap();

    mark_resolved(&conn, &conflict.id, now).unwrap();
    assert!(unresolved(&conn).unwrap().is_empty());
}

#[test]
fn for_task_filters_by_task_uid() {
    let conn = open();
    let now = Utc::now();
    let uid_a = fixed_task_uid("ccccccccccccccccccc");
    let uid_b = fixed_task_uid("ddddddddddddddddddd");
    insert(&conn, &sample_conflict(uid_a.clone(), now)).unwrap();
    insert(&conn, &sample_conflict(uid_b, now)).unwrap();

    let for_a = for_task(&conn, &uid_a).unwrap();
    assert_eq!(for_a.len(), 1);
}

#[test]
fn mark_resolved_unknown_id_is_an_error() {
    let conn = open();
    assert!(mark_resolved(&conn, &ConflictId::new(), Utc::now()).is_err());
}
