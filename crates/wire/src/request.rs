// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};

/// A request sent from the CLI to the daemon over the IPC socket (§6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Trigger a sync round immediately. `data`, when present, names a
    /// single `backend_id` to sync; absent means all enabled backends.
    Notify {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<String>,
    },
    /// Return sync counts, last-sync time, and per-backend health.
    Status,
    /// Graceful shutdown after acknowledgement.
    Stop,
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
