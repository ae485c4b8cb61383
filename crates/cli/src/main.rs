// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tsk`: the CLI front-end for task/list CRUD and daemon control (§2).
//!
//! Mutations write to the local store and enqueue operations for every
//! enabled backend in one transaction (§4.C, §4.D); this binary never
//! talks to a backend or the sync engine directly, only to `tskd` over
//! its IPC socket for `daemon notify`/`status`/`stop` (§6).

mod cli;
mod client;
mod color;
mod commands;
mod config;
mod exit_error;
mod output;
mod resolve;

use clap::{CommandFactory, FromArgMatches};

use cli::{Cli, Commands};
use exit_error::ExitError;

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tsk_cli=info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let command = Cli::command().styles(color::styles());
    let matches = command.get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());
    let no_prompt = cli.no_prompt;

    if let Err(err) = run(cli).await {
        eprintln!("error: {err}");
        if no_prompt {
            println!("{}", err.result_code);
        }
        std::process::exit(err.code);
    }
}

async fn run(cli: Cli) -> Result<(), ExitError> {
    let config = config::load_config(cli.config.as_deref());
    let store = open_store(&config)?;

    match cli.command {
        Commands::Task(args) => commands::task::run(args.command, &store, &config, cli.output, cli.no_prompt).await,
        Commands::List(args) => commands::list::run(args.command, &store, &config, cli.output, cli.no_prompt),
        Commands::Daemon(args) => commands::daemon::run(args.command, cli.output, cli.no_prompt).await,
    }
}

fn open_store(_config: &tsk_core::Config) -> Result<tsk_storage::LocalStore, ExitError> {
    let paths = tsk_daemon::lifecycle::Paths::load().map_err(|err| ExitError::new(1, err.to_string()))?;
    tsk_storage::LocalStore::open(&paths.db_path).map_err(|err| ExitError::new(1, err.to_string()))
}
