// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A command error that carries both a process exit code and the
//! [`ResultCode`](tsk_core::ResultCode) printed in no-prompt mode (§7).
//!
//! Command handlers return `ExitError` instead of calling
//! `std::process::exit()` directly, so `main()` is the only place that
//! actually terminates the process.

use std::fmt;

use tsk_core::{Error, ErrorKind, ResultCode};

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
    pub result_code: ResultCode,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), result_code: ResultCode::Error }
    }

    /// A not-found/validation-style error that should exit `1` without
    /// reading as an unexpected crash.
    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(1, message)
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

impl From<Error> for ExitError {
    fn from(err: Error) -> Self {
        let code = if err.kind == ErrorKind::Cancelled { 130 } else { 1 };
        Self { code, message: format!("{}: {}", err.kind, err.message), result_code: ResultCode::from_error_kind(err.kind) }
    }
}

impl From<anyhow::Error> for ExitError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(1, err.to_string())
    }
}

impl From<crate::client::ClientError> for ExitError {
    fn from(err: crate::client::ClientError) -> Self {
        Self::new(1, err.to_string())
    }
}

#[cfg(test)]
#[path = "exit_error_tests.rs"]
mod tests;
