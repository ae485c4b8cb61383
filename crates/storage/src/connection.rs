// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connection management. A [`LocalStore`] wraps one [`rusqlite::Connection`]
//! behind a [`parking_lot::Mutex`] — SQLite serializes writers regardless, so
//! a single shared connection avoids fighting it with a pool.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::Connection;

use crate::error::{StorageError, StorageResult};
use crate::migrations;

#[derive(Clone)]
pub struct LocalStore {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl LocalStore {
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .map_err(|source| StorageError::Io { context: "creating database directory", source })?;
        }
        let conn = Connection::open(path).map_err(StorageError::sqlite("opening database"))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory().map_err(StorageError::sqlite("opening in-memory database"))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> StorageResult<Self> {
        apply_pragmas(&conn)?;
        migrations::run(&conn)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    /// Runs `f` with exclusive access to the connection. SQLite only
    /// guarantees one writer at a time anyway; this makes that explicit at
    /// the Rust level instead of relying on `SQLITE_BUSY` retries.
    pub fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> StorageResult<T>) -> StorageResult<T> {
        let conn = self.conn.lock();
        f(&conn)
    }

    /// Like [`Self::with_conn`] but with exclusive access, for call sites
    /// (e.g. queue claiming) that need to open their own nested
    /// transaction rather than share the one `with_transaction` provides.
    pub fn with_conn_mut<T>(&self, f: impl FnOnce(&mut Connection) -> StorageResult<T>) -> StorageResult<T> {
        let mut conn = self.conn.lock();
        f(&mut conn)
    }

    /// Runs `f` inside an immediate (write-locking) transaction, committing
    /// on success and rolling back if `f` returns an error.
    pub fn with_transaction<T>(
        &self,
        f: impl FnOnce(&rusqlite::Transaction<'_>) -> StorageResult<T>,
    ) -> StorageResult<T> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)
            .map_err(StorageError::sqlite("starting transaction"))?;
        let result = f(&tx)?;
        tx.commit().map_err(StorageError::sqlite("committing transaction"))?;
        Ok(result)
    }
}

fn apply_pragmas(conn: &Connection) -> StorageResult<()> {
    conn.pragma_update(None, "foreign_keys", true)
        .map_err(StorageError::sqlite("enabling foreign_keys"))?;
    conn.pragma_update(None, "journal_mode", "WAL")
        .map_err(StorageError::sqlite("setting journal_mode"))?;
    conn.pragma_update(None, "synchronous", "NORMAL")
        .map_err(StorageError::sqlite("setting synchronous"))?;
    conn.pragma_update(None, "temp_store", "MEMORY")
        .map_err(StorageError::sqlite("setting temp_store"))?;
    conn.pragma_update(None, "busy_timeout", 5_000i64)
        .map_err(StorageError::sqlite("setting busy_timeout"))?;
    Ok(())
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
