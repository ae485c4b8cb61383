// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-backend sync round state machine (§4.E): `idle -> pulling ->
//! pushing -> settling -> idle`, with `error` reachable from any stage.
//! Each subphase commits to the local store atomically, so a failure
//! leaves the store in the state of the last completed subphase, never
//! partially applied.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStage {
    Idle,
    Pulling,
    Pushing,
    Settling,
    Error,
}

tsk_core::simple_display! {
    SyncStage {
        Idle => "idle",
        Pulling => "pulling",
        Pushing => "pushing",
        Settling => "settling",
        Error => "error",
    }
}

/// A sync round failure, tagged with the stage it failed in so the daemon
/// can report e.g. "backend home-caldav failed during push" rather than a
/// bare error (§4.F daemon `status`).
#[derive(Debug, Clone)]
pub struct SyncError {
    pub stage: SyncStage,
    pub backend_id: String,
    pub error: tsk_core::Error,
}

impl SyncError {
    pub fn new(stage: SyncStage, backend_id: impl Into<String>, error: tsk_core::Error) -> Self {
        Self { stage, backend_id: backend_id.into(), error }
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "backend {} failed during {}: {}", self.backend_id, self.stage, self.error)
    }
}

impl std::error::Error for SyncError {}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
