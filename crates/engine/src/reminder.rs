// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reminder scheduler (§4.H).
//!
//! Given a task's due date and a set of interval specifications, decides
//! whether a reminder should fire right now. Firing state lives entirely
//! in memory here; the daemon tick loop owns calling [`ReminderScheduler::evaluate`]
//! once per active task per tick and is responsible for actually sending
//! the notification through a [`tsk_core::notifier::Notifier`].

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Local, Utc};

use tsk_core::{Error, ErrorKind, Task, TaskUid};

/// A parsed reminder interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    /// Fires once, on the calendar day (local time) the task is due.
    AtDueTime,
    /// Fires when `due_at` is within `Duration` of now.
    Before(Duration),
}

impl Interval {
    fn dedup_key(&self, due_at: DateTime<Utc>) -> String {
        let date = due_at.with_timezone(&Local).date_naive();
        match self {
            Interval::AtDueTime => format!("at-due-time:{date}"),
            Interval::Before(window) => format!("before:{}:{date}", window.num_seconds()),
        }
    }
}

/// Parses both shorthand (`"1d"`, `"2h"`, `"15m"`, `"1w"`) and full-word
/// (`"1 day"`, `"2 hours"`, `"at due time"`) interval specifications.
pub fn parse_interval(spec: &str) -> Result<Interval, Error> {
    let trimmed = spec.trim();
    if trimmed.eq_ignore_ascii_case("at due time") {
        return Ok(Interval::AtDueTime);
    }

    let lower = trimmed.to_ascii_lowercase();
    let (digits, unit) = split_shorthand(&lower)
        .or_else(|| split_full_word(&lower))
        .ok_or_else(|| invalid(spec))?;

    let amount: i64 = digits.parse().map_err(|_| invalid(spec))?;
    let duration = match unit {
        "m" | "min" | "mins" | "minute" | "minutes" => Duration::minutes(amount),
        "h" | "hr" | "hrs" | "hour" | "hours" => Duration::hours(amount),
        "d" | "day" | "days" => Duration::days(amount),
        "w" | "week" | "weeks" => Duration::weeks(amount),
        _ => return Err(invalid(spec)),
    };
    Ok(Interval::Before(duration))
}

fn invalid(spec: &str) -> Error {
    Error::new(ErrorKind::Validation, format!("unrecognized reminder interval: {spec}"))
}

fn split_shorthand(s: &str) -> Option<(&str, &str)> {
    let last = s.chars().last()?;
    if !matches!(last, 'd' | 'h' | 'm' | 'w') {
        return None;
    }
    let idx = s.len() - last.len_utf8();
    let digits = &s[..idx];
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((digits, &s[idx..]))
}

fn split_full_word(s: &str) -> Option<(&str, &str)> {
    let mut parts = s.split_whitespace();
    let digits = parts.next()?;
    let unit = parts.next()?;
    if parts.next().is_some() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((digits, unit))
}

/// Tracks per-(task, interval, due-date) firing state and per-task disable
/// flags across ticks. Cheap to keep for the lifetime of the daemon process;
/// nothing here is persisted, so a daemon restart re-arms every reminder —
/// acceptable since re-arming can at most re-fire a reminder once, not
/// suppress a legitimate one.
pub struct ReminderScheduler {
    fired: Mutex<HashSet<(TaskUid, String)>>,
    disabled: Mutex<HashSet<TaskUid>>,
}

impl ReminderScheduler {
    pub fn new() -> Self {
        Self { fired: Mutex::new(HashSet::new()), disabled: Mutex::new(HashSet::new()) }
    }

    pub fn disable(&self, task_uid: TaskUid) {
        self.disabled.lock().unwrap_or_else(|e| e.into_inner()).insert(task_uid);
    }

    pub fn enable(&self, task_uid: &TaskUid) {
        self.disabled.lock().unwrap_or_else(|e| e.into_inner()).remove(task_uid);
    }

    pub fn is_disabled(&self, task_uid: &TaskUid) -> bool {
        self.disabled.lock().unwrap_or_else(|e| e.into_inner()).contains(task_uid)
    }

    /// Returns the intervals that should fire for `task` right now, marking
    /// each as fired so it isn't returned again for the same due date.
    pub fn evaluate(&self, task: &Task, intervals: &[Interval], now: DateTime<Utc>) -> Vec<Interval> {
        if task.status.is_terminal() || !task.is_active() || self.is_disabled(&task.uid) {
            return Vec::new();
        }
        let Some(due_at) = task.due_at else {
            return Vec::new();
        };

        let mut fired = self.fired.lock().unwrap_or_else(|e| e.into_inner());
        let mut due = Vec::new();
        for interval in intervals {
            if !should_fire(*interval, due_at, now) {
                continue;
            }
            let key = (task.uid, interval.dedup_key(due_at));
            if fired.contains(&key) {
                continue;
            }
            fired.insert(key);
            due.push(*interval);
        }
        due
    }
}

impl Default for ReminderScheduler {
    fn default() -> Self {
        Self::new()
    }
}

fn should_fire(interval: Interval, due_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    match interval {
        Interval::AtDueTime => due_at.with_timezone(&Local).date_naive() == now.with_timezone(&Local).date_naive(),
        Interval::Before(window) => {
            let remaining = due_at - now;
            remaining >= Duration::zero() && remaining <= window
        }
    }
}

#[cfg(test)]
#[path = "reminder_tests.rs"]
mod tests;
