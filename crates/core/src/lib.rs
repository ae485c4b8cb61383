// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! tsk-core: shared domain types for the Odd Tasks sync core.
//!
//! This crate defines the data model (`Task`, `List`, bindings, the
//! operation queue record, conflict records), the error taxonomy shared
//! across backends, and small infrastructure (clock abstraction, ID
//! generation, configuration types) used by every other crate in the
//! workspace. It has no I/O of its own.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod macros;

pub mod analytics;
pub mod binding;
pub mod capability;
pub mod clock;
pub mod config;
pub mod conflict;
pub mod error;
pub mod id;
pub mod list;
pub mod notifier;
pub mod operation;
pub mod result_code;
pub mod task;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use analytics::{AnalyticsRecorder, NoopAnalytics};
pub use binding::BackendBinding;
pub use capability::Capabilities;
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{BackendConfig, BackendKind, Config, DaemonConfig, SyncConfig};
pub use conflict::{ConflictId, ConflictRecord, ConflictStrategy, FieldDiff, ResolutionSide};
pub use error::{Error, ErrorKind};
pub use id::{prefix_matches, short};
pub use list::{List, ListUid};
pub use notifier::{NotificationKind, Notifier};
pub use operation::{
    Operation, OperationKind, OperationPayload, OperationStatus, TaskSnapshot, MUTABLE_TASK_FIELDS,
};
pub use result_code::ResultCode;
pub use task::{Task, TaskStatus, TaskUid};
