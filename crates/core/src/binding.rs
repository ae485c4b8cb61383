// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backend bindings (§3) — the core's view of a local task/list's identity
//! on one specific remote. Absent means "unknown on this backend".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::TaskUid;

/// A persistent mapping `(local_uid, backend_id) -> (remote_id, etag, last_synced_at)`.
///
/// Populated the first time a task is pushed or pulled for `backend_id`;
/// updated on every successful sync round. The sync engine uses
/// `etag`/`remote_modified_at` — never wall-clock comparison of current
/// values — to decide whether a conflict exists (§4.E).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendBinding {
    pub local_uid: TaskUid,
    pub backend_id: String,
    pub remote_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_modified_at: Option<DateTime<Utc>>,
    pub last_synced_at: DateTime<Utc>,
}

impl BackendBinding {
    pub fn new(
        local_uid: TaskUid,
        backend_id: impl Into<String>,
        remote_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            local_uid,
            backend_id: backend_id.into(),
            remote_id: remote_id.into(),
            etag: None,
            remote_modified_at: None,
            last_synced_at: now,
        }
    }

    /// A version tag the engine can compare across sync rounds to decide
    /// whether the remote side changed since the last snapshot. Prefers
    /// the etag (cheap, exact) and falls back to `remote_modified_at`.
    pub fn version_tag(&self) -> Option<&str> {
        self.etag.as_deref()
    }
}

#[cfg(test)]
#[path = "binding_tests.rs"]
mod tests;
