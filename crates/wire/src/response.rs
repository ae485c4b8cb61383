// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-backend health reported in a `status` response (§6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendState {
    pub sync_count: u64,
    pub error_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub healthy: bool,
}

/// A response sent from the daemon to the CLI over the IPC socket (§6).
///
/// Matches the flat schema the spec fixes exactly, rather than the tagged
/// per-command enum a richer protocol would use: one shape serves `notify`,
/// `status`, and `stop` alike, with unused fields omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,
    pub running: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_states: Option<BTreeMap<String, BackendState>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Ok,
    Error,
}

impl Response {
    pub fn ok(running: bool) -> Self {
        Self {
            status: ResponseStatus::Ok,
            message: None,
            sync_count: None,
            last_sync: None,
            running,
            backend_states: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: Some(message.into()),
            sync_count: None,
            last_sync: None,
            running: true,
            backend_states: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ResponseStatus::Ok
    }
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
