use std::collections::BTreeMap;

use async_trait::async_trait;
use tsk_adapters::test_support::MockBackend;
use tsk_adapters::{Backend, Capabilities, RemoteList, RemoteTask, TaskFields};
use tsk_core::test_support::{sample_list, sample_task};
use tsk_core::{Clock, ConflictStrategy, Error, FakeClock, OperationKind, OperationPayload, TaskSnapshot, TaskStatus};
use tsk_storage::LocalStore;

use super::*;

fn engine(store: LocalStore, clock: FakeClock) -> SyncEngine<FakeClock> {
    SyncEngine::new(store, clock, ConflictStrategy::default())
}

fn remote_task(remote_id: &str, summary: &str, etag: &str) -> RemoteTask {
    RemoteTask {
        remote_id: remote_id.to_string(),
        remote_list_id: "remote-inbox".to_string(),
        summary: summary.to_string(),
        description: None,
        status: TaskStatus::NeedsAction,
        priority: 0,
        due_at: None,
        start_at: None,
        categories: Vec::new(),
        etag: etag.to_string(),
        modified_at: None,
    }
}

#[tokio::test]
async fn pull_imports_a_new_remote_list_and_task() {
    let store = LocalStore::open_in_memory().unwrap();
    let clock = FakeClock::new();
    let backend = MockBackend::new("home");
    backend.seed_list(RemoteList { remote_id: "remote-inbox".to_string(), name: "Inbox".to_string() });
    backend.seed_task(remote_task("r1", "Buy milk", "v1"));

    let summary = engine(store.clone(), clock.clone()).pull(&backend).await.unwrap();
    assert_eq!(summary.lists_imported, 1);
    assert_eq!(summary.tasks_imported, 1);

    let list = store.list_all_lists(false).unwrap().into_iter().find(|l| l.name == "Inbox").unwrap();
    let tasks = store.list_tasks(&list.uid, false).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].summary, "Buy milk");
    assert!(tasks[0].sync_origin);
    assert!(store.find_binding_by_remote("home", "r1").unwrap().is_some());
}

#[tokio::test]
async fn pull_updates_local_task_when_only_remote_changed() {
    let store = LocalStore::open_in_memory().unwrap();
    let clock = FakeClock::new();
    let now = clock.now();

    let list = sample_list(now);
    store.create_list(&list).unwrap();
    let task = sample_task(list.uid, now);
    store.create_task(&task).unwrap();
    let binding = tsk_core::BackendBinding::new(task.uid, "home", "r1", now);
    store.upsert_binding(&binding).unwrap();

    clock.advance_ms(60_000);
    let backend = MockBackend::new("home");
    backend.seed_list(RemoteList { remote_id: "remote-inbox".to_string(), name: list.name.clone() });
    backend.seed_task(remote_task("r1", "Buy oat milk", "v2"));

    let summary = engine(store.clone(), clock.clone()).pull(&backend).await.unwrap();
    assert_eq!(summary.tasks_updated, 1);
    assert_eq!(summary.conflicts, 0);

    let reloaded = store.require_task(&task.uid).unwrap();
    assert_eq!(reloaded.summary, "Buy oat milk");
}

#[tokio::test]
async fn pull_soft_deletes_local_task_missing_from_remote() {
    let store = LocalStore::open_in_memory().unwrap();
    let clock = FakeClock::new();
    let now = clock.now();

    let list = sample_list(now);
    store.create_list(&list).unwrap();
    let task = sample_task(list.uid, now);
    store.create_task(&task).unwrap();
    store.upsert_binding(&tsk_core::BackendBinding::new(task.uid, "home", "r1", now)).unwrap();

    let backend = MockBackend::new("home");
    backend.seed_list(RemoteList { remote_id: "remote-inbox".to_string(), name: list.name.clone() });

    let summary = engine(store.clone(), clock.clone()).pull(&backend).await.unwrap();
    assert_eq!(summary.tasks_deleted, 1);
    let reloaded = store.require_task(&task.uid).unwrap();
    assert!(!reloaded.is_active());
    assert!(store.get_binding(&task.uid, "home").unwrap().is_none());
}

#[tokio::test]
async fn pull_resolves_conflict_with_server_wins_when_both_sides_changed() {
    let store = LocalStore::open_in_memory().unwrap();
    let clock = FakeClock::new();
    let now = clock.now();

    let list = sample_list(now);
    store.create_list(&list).unwrap();
    let mut task = sample_task(list.uid, now);
    store.create_task(&task).unwrap();
    store.upsert_binding(&tsk_core::BackendBinding::new(task.uid, "home", "r1", now)).unwrap();

    clock.advance_ms(60_000);
    let later = clock.now();
    task.summary = "Locally renamed".to_string();
    task.touch(later);
    store.update_task(&task).unwrap();

    let backend = MockBackend::new("home");
    backend.seed_list(RemoteList { remote_id: "remote-inbox".to_string(), name: list.name.clone() });
    backend.seed_task(remote_task("r1", "Remotely renamed", "v2"));

    let eng = SyncEngine::new(store.clone(), clock.clone(), ConflictStrategy::ServerWins);
    let summary = eng.pull(&backend).await.unwrap();
    assert_eq!(summary.conflicts, 1);

    let reloaded = store.require_task(&task.uid).unwrap();
    assert_eq!(reloaded.summary, "Remotely renamed");
    assert_eq!(store.conflicts_for_task(&task.uid).unwrap().len(), 1);
}

#[tokio::test]
async fn push_creates_remote_task_and_records_binding() {
    let store = LocalStore::open_in_memory().unwrap();
    let clock = FakeClock::new();
    let now = clock.now();

    let list = sample_list(now);
    store.create_list(&list).unwrap();
    let task = sample_task(list.uid, now);

    let snapshot = TaskSnapshot {
        list_id: list.uid,
        summary: task.summary.clone(),
        description: None,
        status: task.status,
        priority: task.priority(),
        due_at: task.due_at,
        start_at: task.start_at,
        categories: Vec::new(),
        parent_uid: None,
        field_modified_at: BTreeMap::new(),
    };
    store
        .write_and_enqueue(
            "home",
            OperationKind::CreateTask,
            OperationPayload::CreateTask { uid: task.uid, snapshot },
            |tx| tsk_storage::tasks::insert(tx, &task),
            now,
        )
        .unwrap();

    let backend = MockBackend::new("home");
    backend.seed_list(RemoteList { remote_id: "remote-inbox".to_string(), name: list.name.clone() });

    let summary = engine(store.clone(), clock.clone()).push(&backend, "worker-1", 3).await.unwrap();
    assert_eq!(summary.pushed, 1);
    assert!(store.get_binding(&task.uid, "home").unwrap().is_some());
    assert_eq!(store.pending_operation_count("home").unwrap(), 0);
}

struct AlwaysAuthFails;

#[async_trait]
impl Backend for AlwaysAuthFails {
    fn id(&self) -> &str {
        "broken"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::full()
    }

    async fn list_lists(&self) -> Result<Vec<RemoteList>, Error> {
        Ok(vec![RemoteList { remote_id: "remote-inbox".to_string(), name: "Inbox".to_string() }])
    }

    async fn get_list(&self, _remote_id: &str) -> Result<Option<RemoteList>, Error> {
        Ok(None)
    }

    async fn create_list(&self, _name: &str) -> Result<RemoteList, Error> {
        Err(Error::auth("token expired"))
    }

    async fn delete_list(&self, _remote_id: &str) -> Result<(), Error> {
        Ok(())
    }

    async fn list_tasks(&self, _remote_list_id: &str) -> Result<Vec<RemoteTask>, Error> {
        Ok(Vec::new())
    }

    async fn get_task(&self, _remote_list_id: &str, _remote_id: &str) -> Result<Option<RemoteTask>, Error> {
        Ok(None)
    }

    async fn create_task(&self, _remote_list_id: &str, _fields: &TaskFields) -> Result<RemoteTask, Error> {
        Err(Error::auth("token expired"))
    }

    async fn update_task(&self, _remote_list_id: &str, _remote_id: &str, _fields: &TaskFields) -> Result<RemoteTask, Error> {
        Err(Error::auth("token expired"))
    }

    async fn delete_task(&self, _remote_list_id: &str, _remote_id: &str) -> Result<(), Error> {
        Err(Error::auth("token expired"))
    }
}

#[tokio::test]
async fn push_halts_backend_on_auth_error() {
    let store = LocalStore::open_in_memory().unwrap();
    let clock = FakeClock::new();
    let now = clock.now();

    let list = sample_list(now);
    store.create_list(&list).unwrap();
    let task = sample_task(list.uid, now);
    let snapshot = TaskSnapshot {
        list_id: list.uid,
        summary: task.summary.clone(),
        description: None,
        status: task.status,
        priority: task.priority(),
        due_at: task.due_at,
        start_at: task.start_at,
        categories: Vec::new(),
        parent_uid: None,
        field_modified_at: BTreeMap::new(),
    };
    store
        .write_and_enqueue(
            "broken",
            OperationKind::CreateTask,
            OperationPayload::CreateTask { uid: task.uid, snapshot },
            |tx| tsk_storage::tasks::insert(tx, &task),
            now,
        )
        .unwrap();

    let backend = AlwaysAuthFails;
    let summary = engine(store.clone(), clock.clone()).push(&backend, "worker-1", 3).await.unwrap();
    assert_eq!(summary.pushed, 0);
    assert_eq!(summary.failed + summary.retried, 1);
    assert_eq!(store.pending_operation_count("broken").unwrap(), 1);
}
