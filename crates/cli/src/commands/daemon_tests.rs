// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use tempfile::tempdir;

#[tokio::test]
#[serial]
async fn status_reports_not_running_when_no_daemon_is_listening() {
    let dir = tempdir().unwrap();
    std::env::set_var("TSK_STATE_DIR", dir.path());
    std::env::set_var("TSK_IPC_TIMEOUT_MS", "100");

    let result = status(OutputFormat::Json).await;
    assert!(result.is_ok());

    std::env::remove_var("TSK_STATE_DIR");
    std::env::remove_var("TSK_IPC_TIMEOUT_MS");
}

#[tokio::test]
#[serial]
async fn notify_reports_not_running_when_no_daemon_is_listening() {
    let dir = tempdir().unwrap();
    std::env::set_var("TSK_STATE_DIR", dir.path());
    std::env::set_var("TSK_IPC_TIMEOUT_MS", "100");

    let result = notify(None, OutputFormat::Json).await;
    assert!(result.is_ok());

    std::env::remove_var("TSK_STATE_DIR");
    std::env::remove_var("TSK_IPC_TIMEOUT_MS");
}
