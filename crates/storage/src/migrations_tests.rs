use rusqlite::Connection;

use super::*;

fn open() -> Connection {
    Connection::open_in_memory().expect("in-memory connection")
}

#[test]
fn running_migrations_twice_is_a_no_op() {
    let conn = open();
    run(&conn).unwrap();
    run(&conn).unwrap();

    let count: i64 = conn
        .query_row("SELECT count(*) FROM sqlite_master WHERE type = 'table'", [], |row| row.get(0))
        .unwrap();
    assert!(count >= KNOWN_TABLES.len() as i64);
}

#[test]
fn schema_version_is_stamped() {
    let conn = open();
    run(&conn).unwrap();
    let version: i64 = conn
        .query_row("SELECT value FROM schema_meta WHERE key = 'version'", [], |row| {
            row.get::<_, String>(0)?.parse().map_err(|_| rusqlite::Error::InvalidQuery)
        })
        .unwrap();
    assert_eq!(version, CURRENT_SCHEMA_VERSION);
}

#[test]
fn tasks_table_has_sync_origin_column_after_migration() {
    let conn = open();
    run(&conn).unwrap();
    let cols = table_columns(&conn, "tasks").unwrap();
    assert!(cols.iter().any(|c| c == "sync_origin"));
}

#[test]
fn validate_table_name_rejects_unknown_tables() {
    let err = validate_table_name("sqlite_master; DROP TABLE tasks").unwrap_err();
    assert!(matches!(err, StorageError::DisallowedTable(_)));
}

#[test]
fn validate_table_name_accepts_known_tables() {
    for table in KNOWN_TABLES {
        validate_table_name(table).unwrap();
    }
}
