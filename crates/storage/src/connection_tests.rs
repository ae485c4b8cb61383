use super::*;

#[test]
fn open_in_memory_runs_migrations() {
    let store = LocalStore::open_in_memory().unwrap();
    let version: i64 = store
        .with_conn(|conn| {
            conn.query_row("SELECT value FROM schema_meta WHERE key = 'version'", [], |row| {
                row.get::<_, String>(0)
            })
            .map_err(StorageError::sqlite("reading version"))
            .map(|v| v.parse().unwrap_or_default())
        })
        .unwrap();
    assert_eq!(version, migrations::CURRENT_SCHEMA_VERSION);
}

#[test]
fn open_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("tsk.db");
    let store = LocalStore::open(&path).unwrap();
    assert!(path.exists());
    drop(store);
}

#[test]
fn transaction_rolls_back_on_error() {
    let store = LocalStore::open_in_memory().unwrap();
    let result: StorageResult<()> = store.with_transaction(|tx| {
        tx.execute(
            "INSERT INTO lists(uid, name, modified_at) VALUES ('l1', 'Inbox', '2026-01-01T00:00:00Z')",
            [],
        )
        .map_err(StorageError::sqlite("inserting list"))?;
        Err(StorageError::DisallowedTable("force-rollback".into()))
    });
    assert!(result.is_err());

    let count: i64 = store
        .with_conn(|conn| {
            conn.query_row("SELECT count(*) FROM lists", [], |row| row.get(0))
                .map_err(StorageError::sqlite("counting lists"))
        })
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn transaction_commits_on_success() {
    let store = LocalStore::open_in_memory().unwrap();
    store
        .with_transaction(|tx| {
            tx.execute(
                "INSERT INTO lists(uid, name, modified_at) VALUES ('l1', 'Inbox', '2026-01-01T00:00:00Z')",
                [],
            )
            .map_err(StorageError::sqlite("inserting list"))
        })
        .unwrap();

    let count: i64 = store
        .with_conn(|conn| {
            conn.query_row("SELECT count(*) FROM lists", [], |row| row.get(0))
                .map_err(StorageError::sqlite("counting lists"))
        })
        .unwrap();
    assert_eq!(count, 1);
}
