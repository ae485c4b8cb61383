// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File watcher with debounce + quiet-period smart timing (§4.G).
//!
//! [`SmartTimer`] is the pure decision logic, kept free of `notify` and
//! tokio so it can be driven by a fake clock in tests. [`FileWatcher`]
//! wraps it around a real `notify::RecommendedWatcher`.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::warn;

/// Debounces a burst of filesystem events into at most one fire, then
/// additionally waits for `quiet_period` of silence before actually
/// firing — so an active, ongoing edit doesn't get interrupted mid-save.
pub struct SmartTimer {
    debounce: Duration,
    quiet_period: Duration,
    burst_started_at: Option<Instant>,
    last_event_at: Option<Instant>,
}

impl SmartTimer {
    pub fn new(debounce: Duration, quiet_period: Duration) -> Self {
        Self { debounce, quiet_period, burst_started_at: None, last_event_at: None }
    }

    /// Records a filesystem event, arming (or extending) the pending fire.
    pub fn record_event(&mut self, now: Instant) {
        if self.burst_started_at.is_none() {
            self.burst_started_at = Some(now);
        }
        self.last_event_at = Some(now);
    }

    /// Returns whether the pending burst should fire now. Clears the
    /// pending state on fire so the next event starts a fresh burst.
    pub fn poll(&mut self, now: Instant) -> bool {
        let (Some(burst_started), Some(last)) = (self.burst_started_at, self.last_event_at) else {
            return false;
        };
        let past_debounce = now.duration_since(burst_started) >= self.debounce;
        let quiet = self.quiet_period.is_zero() || now.duration_since(last) >= self.quiet_period;
        if past_debounce && quiet {
            self.burst_started_at = None;
            self.last_event_at = None;
            true
        } else {
            false
        }
    }

    pub fn has_pending(&self) -> bool {
        self.last_event_at.is_some()
    }
}

fn is_relevant(event: &Event) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_))
}

/// One-shot file watcher over a fixed set of paths (§4.G): once `stop`
/// drops the underlying `notify::RecommendedWatcher`, it cannot be
/// restarted — callers construct a fresh [`FileWatcher`] instead.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Watches every path in `paths` that exists, skipping the rest
    /// without error, and forwards a signal on `tx` for every relevant
    /// event. Debounce/quiet-period decisions are the caller's job via
    /// [`SmartTimer`]; this only reports raw activity.
    pub fn watch(paths: &[PathBuf], tx: mpsc::UnboundedSender<()>) -> notify::Result<Self> {
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if is_relevant(&event) => {
                    let _ = tx.send(());
                }
                Ok(_) => {}
                Err(err) => warn!("file watcher error: {err}"),
            },
            notify::Config::default(),
        )?;

        for path in paths {
            if !path.exists() {
                continue;
            }
            watcher.watch(path.as_path(), RecursiveMode::Recursive)?;
        }

        Ok(Self { _watcher: watcher })
    }
}

pub fn existing_paths(paths: &[PathBuf]) -> impl Iterator<Item = &Path> {
    paths.iter().map(PathBuf::as_path).filter(|p| p.exists())
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
