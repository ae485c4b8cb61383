// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Heartbeat file: proof of daemon liveness for `daemon status` and
//! stuck-operation recovery (§4.F).

use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Utc};

/// A heartbeat is considered stale once this many missed intervals have
/// passed — three, so a single slow tick doesn't falsely read as dead.
const STALE_MULTIPLIER: u32 = 3;

/// Writes the current time to `path`, truncating any previous heartbeat.
pub fn beat(path: &Path) -> std::io::Result<()> {
    std::fs::write(path, Utc::now().to_rfc3339())
}

/// Reads the last heartbeat timestamp, if the file exists and parses.
pub fn read(path: &Path) -> Option<DateTime<Utc>> {
    let contents = std::fs::read_to_string(path).ok()?;
    DateTime::parse_from_rfc3339(contents.trim()).ok().map(|dt| dt.with_timezone(&Utc))
}

/// Whether a heartbeat last written at `last` is stale relative to `now`,
/// given the daemon's configured `heartbeat_interval`.
pub fn is_stale(last: DateTime<Utc>, now: DateTime<Utc>, heartbeat_interval: std::time::Duration) -> bool {
    let threshold = heartbeat_interval * STALE_MULTIPLIER;
    let age = now.signed_duration_since(last);
    age.to_std().map(|age| age >= threshold).unwrap_or(false)
}

/// Mtime-based staleness check, used when the heartbeat file's contents
/// can't be trusted (e.g. truncated mid-write) but its mtime still can.
pub fn mtime_is_stale(path: &Path, heartbeat_interval: std::time::Duration) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return true;
    };
    let Ok(modified) = metadata.modified() else {
        return true;
    };
    let threshold = heartbeat_interval * STALE_MULTIPLIER;
    SystemTime::now().duration_since(modified).map(|age| age >= threshold).unwrap_or(false)
}

/// Whether the heartbeat at `path` shows a live worker as of `now`: the
/// recorded timestamp if the file parses, the file's mtime otherwise. A
/// missing or unreadable file reads as dead, never alive.
pub fn is_alive(path: &Path, now: DateTime<Utc>, heartbeat_interval: std::time::Duration) -> bool {
    match read(path) {
        Some(last) => !is_stale(last, now, heartbeat_interval),
        None => !mtime_is_stale(path, heartbeat_interval),
    }
}

#[cfg(test)]
#[path = "heartbeat_tests.rs"]
mod tests;
