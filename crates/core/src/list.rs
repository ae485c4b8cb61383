// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The list entity (§3) — a named collection of tasks, mirroring a CalDAV
//! calendar, a Todoist project, or a single markdown file depending on
//! backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Stable, caller-generated identifier for a [`List`].
    pub struct ListUid("lst-");
}

/// Lifecycle mirrors [`crate::Task`]: soft-deleted into a trash, restored,
/// or purged after `trash_retention_days`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct List {
    pub uid: ListUid,
    /// Unique among non-deleted lists; enforced by the local store.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub modified_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl List {
    pub fn new(uid: ListUid, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self { uid, name: name.into(), color: None, modified_at: now, deleted_at: None }
    }

    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.modified_at {
            self.modified_at = now;
        }
    }

    pub fn soft_delete(&mut self, now: DateTime<Utc>) {
        self.deleted_at = Some(now);
        self.touch(now);
    }

    pub fn restore(&mut self, now: DateTime<Utc>) {
        self.deleted_at = None;
        self.touch(now);
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct ListBuilder => List {
        computed { uid: ListUid = ListUid::new() }
        into { name: String = "Inbox" }
        option { color: String = None }
        set { modified_at: DateTime<Utc> = Utc::now() }
        option { deleted_at: DateTime<Utc> = None }
    }
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
