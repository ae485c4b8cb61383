// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tsk daemon` — start/stop/status/notify against `tskd` over its IPC
//! socket (§4.F, §6).

use clap::{Args, Subcommand};

use tsk_core::ResultCode;

use crate::client::DaemonClient;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct DaemonArgs {
    #[command(subcommand)]
    pub command: DaemonCommand,
}

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Start `tskd` if it is not already running.
    Start {
        /// Run in the foreground instead of detaching.
        #[arg(long)]
        foreground: bool,
    },
    /// Stop a running daemon.
    Stop,
    /// Print daemon uptime, sync counts, and per-backend health.
    Status,
    /// Trigger an immediate sync round for one backend, or all of them.
    Notify {
        /// Backend ID to sync; all enabled backends when omitted.
        backend: Option<String>,
    },
}

pub async fn run(command: DaemonCommand, format: OutputFormat, no_prompt: bool) -> Result<(), ExitError> {
    let result_code = match command {
        DaemonCommand::Start { foreground } => start(foreground).await?,
        DaemonCommand::Stop => stop(format).await?,
        DaemonCommand::Status => status(format).await?,
        DaemonCommand::Notify { backend } => notify(backend, format).await?,
    };

    if no_prompt {
        println!("{result_code}");
    }
    Ok(())
}

async fn start(foreground: bool) -> Result<ResultCode, ExitError> {
    if foreground {
        let tskd_path = crate::client::find_tskd_binary();
        let status = std::process::Command::new(&tskd_path).status().map_err(|err| ExitError::new(1, format!("failed to run tskd: {err}")))?;
        if !status.success() {
            return Err(ExitError::new(1, format!("tskd exited with {status}")));
        }
        return Ok(ResultCode::ActionCompleted);
    }

    if DaemonClient::connect().await.is_ok() {
        println!("daemon already running");
        return Ok(ResultCode::InfoOnly);
    }

    DaemonClient::connect_or_start().await?;
    println!("daemon started");
    Ok(ResultCode::ActionCompleted)
}

async fn stop(format: OutputFormat) -> Result<ResultCode, ExitError> {
    let client = match DaemonClient::connect().await {
        Ok(client) => client,
        Err(err) if err.is_not_running() => return print_not_running(format),
        Err(err) => return Err(err.into()),
    };
    client.stop().await?;
    let obj = serde_json::json!({ "stopped": true });
    format_or_json(format, &obj, || println!("daemon stopped"))?;
    Ok(ResultCode::ActionCompleted)
}

async fn status(format: OutputFormat) -> Result<ResultCode, ExitError> {
    let client = match DaemonClient::connect().await {
        Ok(client) => client,
        Err(err) if err.is_not_running() => return print_not_running(format),
        Err(err) => return Err(err.into()),
    };
    let response = client.status().await?;

    format_or_json(format, &response, || {
        println!("running: {}", response.running);
        if let Some(sync_count) = response.sync_count {
            println!("sync_count: {sync_count}");
        }
        if let Some(last_sync) = response.last_sync {
            println!("last_sync: {last_sync}");
        }
        if let Some(states) = &response.backend_states {
            for (backend_id, state) in states {
                println!("  {backend_id}: healthy={} sync_count={} errors={}", state.healthy, state.sync_count, state.error_count);
            }
        }
    })?;
    Ok(ResultCode::InfoOnly)
}

async fn notify(backend: Option<String>, format: OutputFormat) -> Result<ResultCode, ExitError> {
    let client = match DaemonClient::connect().await {
        Ok(client) => client,
        Err(err) if err.is_not_running() => return print_not_running(format),
        Err(err) => return Err(err.into()),
    };
    let response = client.notify(backend).await?;
    let obj = serde_json::json!({ "status": response.is_ok() });
    format_or_json(format, &obj, || println!("sync triggered"))?;
    Ok(ResultCode::ActionCompleted)
}

fn print_not_running(format: OutputFormat) -> Result<ResultCode, ExitError> {
    let obj = serde_json::json!({ "status": "not_running" });
    format_or_json(format, &obj, || println!("daemon not running"))?;
    Ok(ResultCode::InfoOnly)
}

#[cfg(test)]
#[path = "daemon_tests.rs"]
mod tests;
