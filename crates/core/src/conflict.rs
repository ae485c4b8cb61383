// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conflict records and resolution strategies (§3, §4.E).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::operation::TaskSnapshot;
use crate::task::TaskUid;

crate::define_id! {
    /// Identifier for a [`ConflictRecord`].
    pub struct ConflictId("cfl-");
}

/// The four resolution policies from §4.E. `merge` has no configurable
/// knobs in this version — §9's open question about per-field policy
/// overrides is intentionally left as a future hook, not implemented here
/// (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictStrategy {
    ServerWins,
    LocalWins,
    Merge,
    KeepBoth,
}

impl Default for ConflictStrategy {
    fn default() -> Self {
        ConflictStrategy::Merge
    }
}

crate::simple_display! {
    ConflictStrategy {
        ServerWins => "server_wins",
        LocalWins => "local_wins",
        Merge => "merge",
        KeepBoth => "keep_both",
    }
}

/// One field's divergence, tagged with which side's timestamp made it win
/// under the `merge` strategy — used to explain a resolution in `status`
/// output and in tests (E2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDiff {
    pub field: String,
    pub local_value: String,
    pub remote_value: String,
    pub winner: ResolutionSide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSide {
    Local,
    Remote,
}

/// A detected divergence between local and remote versions of one task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictRecord {
    pub id: ConflictId,
    pub task_uid: TaskUid,
    pub backend_id: String,
    pub local_version: TaskSnapshot,
    pub remote_version: TaskSnapshot,
    pub strategy_applied: ConflictStrategy,
    /// Empty for `server_wins`/`local_wins`/`keep_both`; one entry per
    /// mutable field for `merge`.
    pub field_diffs: Vec<FieldDiff>,
    pub detected_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl ConflictRecord {
    pub fn is_resolved(&self) -> bool {
        self.resolved_at.is_some()
    }
}
