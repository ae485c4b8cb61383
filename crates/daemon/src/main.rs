// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tskd`: the sync daemon binary. Wires together the lifecycle, IPC
//! listener, tick scheduler, file watcher, and heartbeat started by
//! [`tsk_daemon::lifecycle::DaemonState::startup`].

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{mpsc, Notify};
use tracing::{error, info};

use tsk_core::Config;
use tsk_daemon::lifecycle::Paths;
use tsk_daemon::{heartbeat, listener, scheduler, watcher, DaemonState, ListenCtx};

fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("TSK_CONFIG") {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("tsk").join("config.toml"))
}

fn load_config() -> Config {
    match config_path().and_then(|path| std::fs::read_to_string(path).ok()) {
        Some(contents) => Config::from_toml_str(&contents).unwrap_or_else(|err| {
            error!("failed to parse config, using defaults: {err}");
            Config::default()
        }),
        None => Config::default(),
    }
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tsk_daemon=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let paths = match Paths::load() {
        Ok(paths) => paths,
        Err(err) => {
            error!("{err}");
            std::process::exit(1);
        }
    };

    let config = load_config();
    let watch_paths: Vec<PathBuf> = config
        .enabled_backends()
        .filter_map(|(_, backend)| backend.path.as_ref())
        .map(PathBuf::from)
        .collect();
    let watch_paths: Vec<PathBuf> = watcher::existing_paths(&watch_paths).map(PathBuf::from).collect();

    let (state, unix_listener) = match DaemonState::startup(paths, config) {
        Ok(pair) => pair,
        Err(err) => {
            error!("daemon failed to start: {err}");
            std::process::exit(1);
        }
    };
    let state = Arc::new(state);

    let (sync_tx, sync_rx) = mpsc::unbounded_channel();
    let shutdown = Arc::new(Notify::new());

    let ctx = Arc::new(ListenCtx { state: state.clone(), sync_tx: sync_tx.clone(), shutdown: shutdown.clone() });

    let listener_task = tokio::spawn(listener::run(ctx, unix_listener));
    let scheduler_task = tokio::spawn(scheduler::run(state.clone(), sync_rx, shutdown.clone()));
    let heartbeat_task = tokio::spawn(heartbeat_loop(state.clone(), shutdown.clone()));

    let file_watcher = if state.config.sync.daemon.file_watcher && !watch_paths.is_empty() {
        let (fs_tx, mut fs_rx) = mpsc::unbounded_channel();
        match watcher::FileWatcher::watch(&watch_paths, fs_tx) {
            Ok(fw) => {
                let sync_tx = sync_tx.clone();
                let daemon_config = state.config.sync.daemon.clone();
                tokio::spawn(async move {
                    let mut timer = watcher::SmartTimer::new(
                        std::time::Duration::from_millis(daemon_config.debounce_ms),
                        std::time::Duration::from_millis(daemon_config.quiet_period_ms),
                    );
                    let mut ticker = tokio::time::interval(std::time::Duration::from_millis(200));
                    loop {
                        tokio::select! {
                            Some(()) = fs_rx.recv() => timer.record_event(std::time::Instant::now()),
                            _ = ticker.tick() => {
                                if timer.poll(std::time::Instant::now()) {
                                    let _ = sync_tx.send(None);
                                }
                            }
                        }
                    }
                });
                Some(fw)
            }
            Err(err) => {
                error!("file watcher failed to start: {err}");
                None
            }
        }
    } else {
        None
    };

    info!("tskd ready");

    shutdown.notified().await;
    drop(file_watcher);

    listener_task.abort();
    scheduler_task.abort();
    heartbeat_task.abort();

    state.shutdown();
}

async fn heartbeat_loop(state: Arc<DaemonState>, shutdown: Arc<Notify>) {
    let interval = state.config.sync.daemon.heartbeat_interval;
    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(err) = heartbeat::beat(&state.paths.heartbeat_path) {
                    error!("failed to write heartbeat: {err}");
                }
            }
            () = shutdown.notified() => break,
        }
    }
}
