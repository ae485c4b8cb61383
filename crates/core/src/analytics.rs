// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The analytics recorder port (§6). The SQL schema it might be backed by
//! is an explicit non-goal of this core; only the interface lives here.
//! Recording is asynchronous and failures never affect the caller.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

#[async_trait]
pub trait AnalyticsRecorder: Send + Sync {
    #[allow(clippy::too_many_arguments)]
    async fn track(
        &self,
        command: &str,
        subcommand: Option<&str>,
        backend: Option<&str>,
        success: bool,
        duration: Duration,
        error_class: Option<&str>,
        flags: &HashMap<String, String>,
    );
}

/// Discards every event. The default until a real recorder is configured.
pub struct NoopAnalytics;

#[async_trait]
impl AnalyticsRecorder for NoopAnalytics {
    async fn track(
        &self,
        _command: &str,
        _subcommand: Option<&str>,
        _backend: Option<&str>,
        _success: bool,
        _duration: Duration,
        _error_class: Option<&str>,
        _flags: &HashMap<String, String>,
    ) {
    }
}
