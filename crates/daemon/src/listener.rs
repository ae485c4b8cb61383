// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unix-socket IPC accept loop (§4.F.3, §6): speaks `tsk-wire`'s
//! newline-delimited JSON `Request`/`Response` pairs against the shared
//! [`DaemonState`](crate::lifecycle::DaemonState).

use std::sync::Arc;

use tokio::io::BufReader;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, Notify};
use tracing::{debug, warn};
use tsk_wire::{read_message, write_message, ProtocolError, Request, Response};

use crate::lifecycle::DaemonState;

/// Context shared across every accepted connection: the daemon's state,
/// a channel to ask the scheduler for an immediate sync round, and the
/// shutdown signal a `Stop` request trips.
pub struct ListenCtx {
    pub state: Arc<DaemonState>,
    pub sync_tx: mpsc::UnboundedSender<Option<String>>,
    pub shutdown: Arc<Notify>,
}

/// Accepts connections until `shutdown` fires, handling each on its own
/// task so a slow or stuck CLI client can't block others.
pub async fn run(ctx: Arc<ListenCtx>, listener: UnixListener) {
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, _addr)) => {
                        let ctx = ctx.clone();
                        tokio::spawn(async move {
                            if let Err(err) = handle_connection(&ctx, stream).await {
                                debug!("ipc connection ended: {err}");
                            }
                        });
                    }
                    Err(err) => warn!("ipc accept failed: {err}"),
                }
            }
            () = ctx.shutdown.notified() => break,
        }
    }
}

async fn handle_connection(ctx: &ListenCtx, stream: UnixStream) -> Result<(), ProtocolError> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    loop {
        let request: Request = match read_message(&mut reader).await {
            Ok(request) => request,
            Err(ProtocolError::Eof) => return Ok(()),
            Err(err) => return Err(err),
        };

        let response = handle_request(ctx, request.clone()).await;
        write_message(&mut write_half, &response).await?;

        if matches!(request, Request::Stop) {
            return Ok(());
        }
    }
}

async fn handle_request(ctx: &ListenCtx, request: Request) -> Response {
    match request {
        Request::Notify { data } => {
            let _ = ctx.sync_tx.send(data);
            Response::ok(true)
        }
        Request::Status => status_response(ctx).await,
        Request::Stop => {
            ctx.shutdown.notify_waiters();
            Response::ok(false)
        }
    }
}

async fn status_response(ctx: &ListenCtx) -> Response {
    let health = ctx.state.health.lock();
    let max_consecutive_errors = ctx.state.config.sync.daemon.max_consecutive_errors;

    let backend_states: std::collections::BTreeMap<_, _> =
        health.iter().map(|(id, h)| (id.clone(), h.to_wire(max_consecutive_errors))).collect();

    let sync_count = backend_states.values().map(|b| b.sync_count).sum();
    let last_sync = backend_states.values().filter_map(|b| b.last_sync).max();

    let mut response = Response::ok(true);
    response.sync_count = Some(sync_count);
    response.last_sync = last_sync;
    response.backend_states = Some(backend_states);
    response
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
