// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle: paths, PID lock, startup, shutdown (§4.F).

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use fs2::FileExt;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::info;

use tsk_adapters::backends;
use tsk_adapters::Backend;
use tsk_core::{Config as TskConfig, SystemClock};
use tsk_storage::LocalStore;
use tsk_wire::BackendState;

/// Daemon runtime paths, all rooted under [`crate::env::state_dir`].
#[derive(Debug, Clone)]
pub struct Paths {
    pub state_dir: PathBuf,
    pub socket_path: PathBuf,
    pub lock_path: PathBuf,
    pub heartbeat_path: PathBuf,
    pub db_path: PathBuf,
}

impl Paths {
    pub fn load() -> Result<Self, LifecycleError> {
        let state_dir = crate::env::state_dir()?;
        Ok(Self {
            socket_path: state_dir.join("daemon.sock"),
            lock_path: state_dir.join("daemon.pid"),
            heartbeat_path: state_dir.join("daemon.heartbeat"),
            db_path: state_dir.join("tsk.db"),
            state_dir,
        })
    }
}

/// Running health counters for one backend, reported via `daemon status`
/// (§6 IPC schema).
#[derive(Debug, Clone, Default)]
pub struct BackendHealth {
    pub sync_count: u64,
    pub error_count: u32,
    pub last_sync: Option<chrono::DateTime<chrono::Utc>>,
    pub last_error: Option<String>,
    pub consecutive_errors: u32,
}

impl BackendHealth {
    pub fn to_wire(&self, max_consecutive_errors: u32) -> BackendState {
        BackendState {
            sync_count: self.sync_count,
            error_count: self.error_count,
            last_sync: self.last_sync,
            last_error: self.last_error.clone(),
            healthy: self.consecutive_errors < max_consecutive_errors,
        }
    }
}

/// Shared daemon state: the local store, the configured backends, and the
/// running health counters the IPC listener and tick scheduler both touch.
pub struct DaemonState {
    pub paths: Paths,
    pub config: TskConfig,
    pub store: LocalStore,
    pub backends: BTreeMap<String, Box<dyn Backend>>,
    pub health: Mutex<BTreeMap<String, BackendHealth>>,
    pub start_time: Instant,
    #[allow(dead_code)]
    lock_file: File,
}

impl DaemonState {
    /// Starts the daemon: acquires the exclusive PID lock, opens the local
    /// store, builds every enabled backend, and binds the IPC socket.
    /// Order matters — the lock is acquired before anything else so a
    /// second `tskd` invocation fails fast against an already-running one.
    pub fn startup(paths: Paths, config: TskConfig) -> Result<(Self, UnixListener), LifecycleError> {
        std::fs::create_dir_all(&paths.state_dir)?;

        let lock_file = std::fs::OpenOptions::new().write(true).create(true).truncate(false).open(&paths.lock_path)?;
        lock_file.try_lock_exclusive().map_err(LifecycleError::LockFailed)?;
        let mut lock_file = lock_file;
        lock_file.set_len(0)?;
        writeln!(lock_file, "{}", std::process::id())?;

        let store = LocalStore::open(&paths.db_path)?;

        let mut built_backends = BTreeMap::new();
        let mut health = BTreeMap::new();
        for (id, backend_config) in config.enabled_backends() {
            match backends::build(id, backend_config) {
                Ok(backend) => {
                    built_backends.insert(id.clone(), backend);
                    health.insert(id.clone(), BackendHealth::default());
                }
                Err(err) => {
                    tracing::warn!(backend = %id, "skipping backend with invalid config: {err}");
                }
            }
        }

        if paths.socket_path.exists() {
            std::fs::remove_file(&paths.socket_path)?;
        }
        let listener = UnixListener::bind(&paths.socket_path).map_err(|e| LifecycleError::BindFailed(paths.socket_path.clone(), e))?;

        info!(backends = built_backends.len(), "daemon started");

        Ok((
            Self {
                paths,
                config,
                store,
                backends: built_backends,
                health: Mutex::new(health),
                start_time: Instant::now(),
                lock_file,
            },
            listener,
        ))
    }

    pub fn clock(&self) -> SystemClock {
        SystemClock
    }

    pub fn shutdown(&self) {
        info!("daemon shutting down");
        if self.paths.socket_path.exists() {
            let _ = std::fs::remove_file(&self.paths.socket_path);
        }
        if self.paths.lock_path.exists() {
            let _ = std::fs::remove_file(&self.paths.lock_path);
        }
        // The PID lock itself is released when `lock_file` drops with `self`.
    }
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("could not determine a state directory for this user")]
    NoStateDir,
    #[error("failed to acquire the daemon lock: a daemon is probably already running")]
    LockFailed(#[source] std::io::Error),
    #[error("failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),
    #[error("storage error: {0}")]
    Storage(#[from] tsk_storage::StorageError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
