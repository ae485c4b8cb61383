// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tick loop: drives pull/push reconciliation per backend on a timer, on
//! an explicit `notify` request, and recovers stuck operations (§4.D,
//! §4.F).

use std::sync::Arc;
use std::time::Instant as StdInstant;

use tokio::sync::{mpsc, Notify};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use tsk_core::SystemClock;
use tsk_engine::SyncEngine;

use crate::lifecycle::DaemonState;

const WORKER_ID: &str = "scheduler";

/// Runs the scheduler loop until `shutdown` fires. Also trips `shutdown`
/// itself once `idle_timeout` elapses with no sync activity.
pub async fn run(state: Arc<DaemonState>, mut sync_rx: mpsc::UnboundedReceiver<Option<String>>, shutdown: Arc<Notify>) {
    let daemon_config = state.config.sync.daemon.clone();
    let mut ticker = tokio::time::interval(daemon_config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut last_activity = StdInstant::now();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                last_activity = StdInstant::now();
                sync_all(&state).await;
            }
            target = sync_rx.recv() => {
                last_activity = StdInstant::now();
                match target {
                    Some(Some(backend_id)) => sync_one(&state, &backend_id).await,
                    Some(None) => sync_all(&state).await,
                    None => break,
                }
            }
            () = shutdown.notified() => break,
            () = idle_check(&daemon_config.idle_timeout, last_activity) => {
                info!("idle timeout reached, shutting down");
                shutdown.notify_waiters();
                break;
            }
        }
    }
}

/// Resolves after `idle_timeout` has elapsed since `last_activity`, or
/// never resolves when `idle_timeout` is zero (disabled, per §4.F).
async fn idle_check(idle_timeout: &std::time::Duration, last_activity: StdInstant) {
    if idle_timeout.is_zero() {
        std::future::pending::<()>().await;
        return;
    }
    let elapsed = last_activity.elapsed();
    let remaining = idle_timeout.saturating_sub(elapsed);
    tokio::time::sleep(remaining).await;
}

async fn sync_all(state: &Arc<DaemonState>) {
    recover_stuck(state, chrono::Utc::now());
    let backend_ids: Vec<String> = state.backends.keys().cloned().collect();
    for backend_id in backend_ids {
        sync_one(state, &backend_id).await;
    }
}

async fn sync_one(state: &Arc<DaemonState>, backend_id: &str) {
    let Some(backend) = state.backends.get(backend_id) else {
        warn!(backend = backend_id, "notify requested for an unconfigured backend");
        return;
    };

    if backend_is_halted(state, backend_id) {
        warn!(backend = backend_id, "skipping backend past its error threshold");
        return;
    }

    let engine = SyncEngine::new(state.store.clone(), SystemClock, state.config.sync.conflict_resolution);

    let pull_result = engine.pull(backend.as_ref()).await;
    let push_result = match &pull_result {
        Ok(_) => Some(engine.push(backend.as_ref(), WORKER_ID, 5).await),
        Err(_) => None,
    };

    record_outcome(state, backend_id, pull_result.is_ok() && push_result.as_ref().map(|r| r.is_ok()).unwrap_or(false), pull_err_message(&pull_result, &push_result));
}

fn pull_err_message(
    pull_result: &Result<tsk_engine::PullSummary, tsk_core::Error>,
    push_result: &Option<Result<tsk_engine::PushSummary, tsk_core::Error>>,
) -> Option<String> {
    if let Err(err) = pull_result {
        return Some(err.message.clone());
    }
    if let Some(Err(err)) = push_result {
        return Some(err.message.clone());
    }
    None
}

fn record_outcome(state: &Arc<DaemonState>, backend_id: &str, succeeded: bool, error: Option<String>) {
    let mut health = state.health.lock();
    let Some(entry) = health.get_mut(backend_id) else {
        return;
    };

    if succeeded {
        entry.sync_count += 1;
        entry.last_sync = Some(chrono::Utc::now());
        entry.consecutive_errors = 0;
    } else {
        entry.error_count += 1;
        entry.consecutive_errors += 1;
        entry.last_error = error;
    }
}

fn backend_is_halted(state: &Arc<DaemonState>, backend_id: &str) -> bool {
    let health = state.health.lock();
    let max = state.config.sync.daemon.max_consecutive_errors;
    health.get(backend_id).map(|h| h.consecutive_errors >= max).unwrap_or(false)
}

/// Candidates past `stuck_timeout` are only actually reverted if the
/// worker that claimed them looks dead. This daemon runs one worker
/// (`WORKER_ID`) per process, so every `processing` row belongs to this
/// daemon's own heartbeat file regardless of the declared `worker_id` —
/// a mismatched id (e.g. left over from a previous daemon instance) has
/// no heartbeat file of its own to consult and is treated as dead.
fn recover_stuck(state: &Arc<DaemonState>, now: chrono::DateTime<chrono::Utc>) {
    let stuck_after = state.config.sync.daemon.stuck_timeout;
    let heartbeat_interval = state.config.sync.daemon.heartbeat_interval;
    let heartbeat_path = state.paths.heartbeat_path.clone();

    let is_worker_alive = move |worker_id: &str| {
        worker_id == WORKER_ID && crate::heartbeat::is_alive(&heartbeat_path, now, heartbeat_interval)
    };

    let stuck_after = chrono::Duration::from_std(stuck_after).unwrap_or(chrono::Duration::MAX);
    match state.store.recover_stuck_operations(stuck_after, now, is_worker_alive) {
        Ok(0) => {}
        Ok(n) => warn!(count = n, "recovered stuck operations"),
        Err(err) => warn!("stuck operation recovery failed: {err}"),
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
