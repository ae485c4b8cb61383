// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `DaemonClient`: connects to `tskd` over its IPC socket and exchanges
//! [`tsk_wire::Request`]/[`tsk_wire::Response`] pairs (§6).

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tokio::io::BufReader;
use tokio::net::UnixStream;
use tokio::time::timeout;

use tsk_daemon::lifecycle::{LifecycleError, Paths};
use tsk_wire::{read_message, write_message, ProtocolError, Request, Response};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon is not running")]
    NotRunning,
    #[error("could not resolve daemon paths: {0}")]
    Paths(#[from] LifecycleError),
    #[error("timed out talking to the daemon")]
    Timeout,
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("failed to start the daemon: {0}")]
    SpawnFailed(std::io::Error),
}

impl ClientError {
    pub fn is_not_running(&self) -> bool {
        matches!(self, Self::NotRunning)
    }
}

/// One request/response round trip over a freshly-opened connection. Each
/// call opens and closes its own socket — `tskd` accepts a new connection
/// per IPC call, so there is no persistent session to hold open between
/// CLI invocations.
pub struct DaemonClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl DaemonClient {
    /// Connects to an already-running daemon. Does not spawn one.
    pub async fn connect() -> Result<Self, ClientError> {
        let paths = Paths::load()?;
        let ipc_timeout = tsk_daemon::env::ipc_timeout();
        match timeout(ipc_timeout, UnixStream::connect(&paths.socket_path)).await {
            Ok(Ok(_)) => Ok(Self { socket_path: paths.socket_path, timeout: ipc_timeout }),
            _ => Err(ClientError::NotRunning),
        }
    }

    /// Connects to a running daemon, or spawns `tskd` in the background and
    /// retries until it accepts connections.
    pub async fn connect_or_start() -> Result<Self, ClientError> {
        if let Ok(client) = Self::connect().await {
            return Ok(client);
        }

        let tskd_path = find_tskd_binary();
        std::process::Command::new(&tskd_path).spawn().map_err(ClientError::SpawnFailed)?;

        for _ in 0..20 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if let Ok(client) = Self::connect().await {
                return Ok(client);
            }
        }
        Err(ClientError::NotRunning)
    }

    async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let call = async {
            let stream = UnixStream::connect(&self.socket_path).await.map_err(|_| ClientError::NotRunning)?;
            let (read_half, mut write_half) = stream.into_split();
            write_message(&mut write_half, request).await?;
            let mut reader = BufReader::new(read_half);
            let response: Response = read_message(&mut reader).await?;
            Ok(response)
        };
        timeout(self.timeout, call).await.map_err(|_| ClientError::Timeout)?
    }

    /// Triggers a sync round for `backend_id`, or every enabled backend
    /// when `None`.
    pub async fn notify(&self, backend_id: Option<String>) -> Result<Response, ClientError> {
        self.send(&Request::Notify { data: backend_id }).await
    }

    pub async fn status(&self) -> Result<Response, ClientError> {
        self.send(&Request::Status).await
    }

    pub async fn stop(&self) -> Result<Response, ClientError> {
        self.send(&Request::Stop).await
    }
}

/// Finds the `tskd` binary alongside the running `tsk` executable, or
/// falls back to `PATH`.
pub(crate) fn find_tskd_binary() -> PathBuf {
    if let Some(dir) = std::env::current_exe().ok().as_deref().and_then(std::path::Path::parent) {
        let sibling = dir.join("tskd");
        if sibling.exists() {
            return sibling;
        }
    }
    PathBuf::from("tskd")
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
