// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! tsk-engine: the sync engine (§4.E) — pull/push reconciliation, conflict
//! detection and resolution, the per-backend sync round state machine, and
//! the reminder scheduler (§4.H). This crate has no network or filesystem
//! I/O of its own; it drives [`tsk_adapters::Backend`] and
//! [`tsk_storage::LocalStore`], both passed in by the caller.

pub mod conflict;
pub mod reconcile;
pub mod reminder;
pub mod state;

pub use conflict::resolve_conflict;
pub use reconcile::{PullSummary, PushSummary, SyncEngine};
pub use reminder::{ReminderScheduler, parse_interval};
pub use state::{SyncError, SyncStage};
