use chrono::Utc;
use rusqlite::Connection;
use tsk_core::test_support::fixed_task_uid;
use tsk_core::BackendBinding;

use super::*;
use crate::migrations;

fn open() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    migrations::run(&conn).unwrap();
    conn
}

#[test]
fn upsert_then_get_round_trips() {
    let conn = open();
    let now = Utc::now();
    let uid = fixed_task_uid("aaaaaaaaaaaaaaaaaaa");
    let binding = BackendBinding::new(uid.clone(), "home", "remote-1", now);
    upsert(&conn, &binding).unwrap();

    let fetched = get(&conn, &uid, "home").unwrap().unwrap();
    assert_eq!(fetched.remote_id, "remote-1");
}

#[test]
fn upsert_twice_updates_in_place() {
    let conn = open();
    let now = Utc::now();
    let uid = fixed_task_uid("bbbbbbbbbbbbbbbbbbb");
    let mut binding = BackendBinding::new(uid.clone(), "home", "remote-1", now);
    upsert(&conn, &binding).unwrap();

    binding.etag = Some("etag-2".to_string());
    upsert(&conn, &binding).unwrap();

    let fetched = get(&conn, &uid, "home").unwrap().unwrap();
    assert_eq!(fetched.etag.as_deref(), Some("etag-2"));
    assert_eq!(list_for_task(&conn, &uid).unwrap().len(), 1);
}

#[test]
fn remove_deletes_the_binding() {
    let conn = open();
    let now = Utc::now();
    let uid = fixed_task_uid("ccccccccccccccccccc");
    let binding = BackendBinding::new(uid.clone(), "home", "remote-1", now);
    upsert(&conn, &binding).unwrap();
    remove(&conn, &uid, "home").unwrap();
    assert!(get(&conn, &uid, "home").unwrap().is_none());
}

#[test]
fn find_by_remote_locates_the_bound_local_task() {
    let conn = open();
    let now = Utc::now();
    let uid = fixed_task_uid("eeeeeeeeeeeeeeeeeee");
    upsert(&conn, &BackendBinding::new(uid.clone(), "home", "remote-9", now)).unwrap();

    let found = find_by_remote(&conn, "home", "remote-9").unwrap().unwrap();
    assert_eq!(found.local_uid, uid);
    assert!(find_by_remote(&conn, "home", "remote-unknown").unwrap().is_none());
    assert!(find_by_remote(&conn, "work", "remote-9").unwrap().is_none());
}

#[test]
fn list_for_task_returns_one_entry_per_backend() {
    let conn = open();
    let now = Utc::now();
    let uid = fixed_task_uid("ddddddddddddddddddd");
    upsert(&conn, &BackendBinding::new(uid.clone(), "home", "remote-1", now)).unwrap();
    upsert(&conn, &BackendBinding::new(uid.clone(), "work", "remote-2", now)).unwrap();

    let bindings = list_for_task(&conn, &uid).unwrap();
    assert_eq!(bindings.len(), 2);
}
