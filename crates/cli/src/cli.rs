// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Top-level `clap` surface: global flags plus the `task`/`list`/`daemon`
//! subcommand groups (§6).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::{daemon::DaemonArgs, list::ListArgs, task::TaskArgs};
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "tsk", version, about = "Offline-first task manager with a sync core")]
pub struct Cli {
    /// Suppress interactive prompts; emit a trailing result-code line
    /// on the last line of stdout instead (§7).
    #[arg(long, global = true)]
    pub no_prompt: bool,

    /// Output format for commands that print data.
    #[arg(short = 'o', long, global = true, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Path to a config file, overriding `TSK_CONFIG` and the default
    /// config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Task CRUD.
    Task(TaskArgs),
    /// List CRUD.
    List(ListArgs),
    /// Daemon control: start, stop, status, notify.
    Daemon(DaemonArgs),
}
