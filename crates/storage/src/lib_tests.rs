use chrono::Utc;
use tsk_core::test_support::{sample_list, sample_task};
use tsk_core::OperationKind;

use super::*;

#[test]
fn create_and_get_task_round_trips_through_the_convenience_layer() {
    let store = LocalStore::open_in_memory().unwrap();
    let now = Utc::now();
    let list = sample_list(now);
    store.create_list(&list).unwrap();
    let task = sample_task(list.uid.clone(), now);
    store.create_task(&task).unwrap();

    let fetched = store.get_task(&task.uid).unwrap().unwrap();
    assert_eq!(fetched.summary, task.summary);
}

#[test]
fn write_and_enqueue_commits_atomically() {
    let store = LocalStore::open_in_memory().unwrap();
    let now = Utc::now();
    let list = sample_list(now);
    store.create_list(&list).unwrap();
    let task = sample_task(list.uid.clone(), now);

    let payload = tsk_core::OperationPayload::CreateTask {
        uid: task.uid.clone(),
        snapshot: tsk_core::TaskSnapshot {
            list_id: list.uid,
            summary: task.summary.clone(),
            description: None,
            status: task.status,
            priority: task.priority(),
            due_at: task.due_at,
            start_at: task.start_at,
            categories: Vec::new(),
            parent_uid: None,
            field_modified_at: Default::default(),
        },
    };

    let task_for_write = task.clone();
    let op = store
        .write_and_enqueue(
            "home",
            OperationKind::CreateTask,
            payload,
            move |tx| tasks::insert(tx, &task_for_write),
            now,
        )
        .unwrap();

    assert_eq!(op.seq, 1);
    assert!(store.get_task(&task.uid).unwrap().is_some());
    assert_eq!(store.pending_operation_count("home").unwrap(), 1);
}

#[test]
fn list_name_in_use_surfaces_through_the_convenience_layer() {
    let store = LocalStore::open_in_memory().unwrap();
    let list = sample_list(Utc::now());
    store.create_list(&list).unwrap();
    assert!(store.list_name_in_use(&list.name, None).unwrap());
}

#[test]
fn claim_and_finalize_round_trip() {
    let store = LocalStore::open_in_memory().unwrap();
    let now = Utc::now();
    let list = sample_list(now);
    store.create_list(&list).unwrap();
    let task = sample_task(list.uid.clone(), now);

    let payload = tsk_core::OperationPayload::DeleteTask { uid: task.uid.clone() };
    let task_for_write = task.clone();
    store
        .write_and_enqueue(
            "home",
            OperationKind::DeleteTask,
            payload,
            move |tx| tasks::insert(tx, &task_for_write),
            now,
        )
        .unwrap();

    let claimed = store.claim_next_operation("home", "worker-1", now).unwrap().unwrap();
    store.finalize_operation_done(claimed.seq).unwrap();
    assert_eq!(store.pending_operation_count("home").unwrap(), 0);
}

#[test]
fn list_all_tasks_finds_a_task_regardless_of_list() {
    let store = LocalStore::open_in_memory().unwrap();
    let now = Utc::now();
    let list = sample_list(now);
    store.create_list(&list).unwrap();
    let task = sample_task(list.uid.clone(), now);
    store.create_task(&task).unwrap();

    let all = store.list_all_tasks(false).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].uid, task.uid);
}

#[test]
fn write_and_enqueue_for_backends_enqueues_once_per_backend() {
    let store = LocalStore::open_in_memory().unwrap();
    let now = Utc::now();
    let list = sample_list(now);
    store.create_list(&list).unwrap();
    let task = sample_task(list.uid.clone(), now);

    let payload = tsk_core::OperationPayload::CreateTask {
        uid: task.uid.clone(),
        snapshot: tsk_core::TaskSnapshot::from_task(&task),
    };

    let task_for_write = task.clone();
    let ops = store
        .write_and_enqueue_for_backends(
            &["home", "work"],
            OperationKind::CreateTask,
            payload,
            move |tx| tasks::insert(tx, &task_for_write),
            now,
        )
        .unwrap();

    assert_eq!(ops.len(), 2);
    assert_eq!(store.pending_operation_count("home").unwrap(), 1);
    assert_eq!(store.pending_operation_count("work").unwrap(), 1);
}
