// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test fixtures, available to every crate in the workspace behind
//! the `test-support` feature so integration tests don't each reinvent
//! sample data.

use chrono::{DateTime, Utc};

use crate::list::{List, ListUid};
use crate::task::{Task, TaskUid};

/// A list with a fixed UID, useful when tests need to assert on it.
pub fn sample_list(now: DateTime<Utc>) -> List {
    List::builder().name("Inbox").modified_at(now).build()
}

/// A task in `list_id`, summary `"Write the quarterly report"`, due now.
pub fn sample_task(list_id: ListUid, now: DateTime<Utc>) -> Task {
    Task::builder()
        .list_id(list_id)
        .summary("Write the quarterly report")
        .due_at(now)
        .created_at(now)
        .modified_at(now)
        .build()
}

/// A completed task, for conflict/reconciliation fixtures.
pub fn completed_task(list_id: ListUid, now: DateTime<Utc>) -> Task {
    let mut task = sample_task(list_id, now);
    task.set_status(crate::task::TaskStatus::Completed, now);
    task
}

/// Deterministic task UID for assertions that need to reference a fixed ID
/// rather than `TaskUid::new()`'s random suffix.
pub fn fixed_task_uid(suffix: &str) -> TaskUid {
    TaskUid::from_string(format!("{}{}", TaskUid::PREFIX, suffix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, FakeClock};

    #[test]
    fn sample_task_belongs_to_sample_list() {
        let clock = FakeClock::at_epoch_ms(0);
        let list = sample_list(clock.now());
        let task = sample_task(list.uid, clock.now());
        assert_eq!(task.list_id, list.uid);
        assert!(task.is_active());
    }

    #[test]
    fn fixed_task_uid_is_reproducible() {
        assert_eq!(fixed_task_uid("aaaaaaaaaaaaaaaaaaa"), fixed_task_uid("aaaaaaaaaaaaaaaaaaa"));
    }
}
