// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The notifier port (§6). Channel formatting is an explicit non-goal of
//! this core — this trait is the seam a notification crate plugs into.
//! Delivery is best-effort and must never block a sync round.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    SyncComplete,
    SyncError,
    Conflict,
    Reminder,
    Test,
}

crate::simple_display! {
    NotificationKind {
        SyncComplete => "sync_complete",
        SyncError => "sync_error",
        Conflict => "conflict",
        Reminder => "reminder",
        Test => "test",
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        kind: NotificationKind,
        title: &str,
        body: &str,
        metadata: &HashMap<String, Value>,
    );
}

/// Swallows every notification. Used when `sync.enabled` is on but no
/// desktop/channel notifier is wired up (e.g. headless daemon runs).
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send(
        &self,
        _kind: NotificationKind,
        _title: &str,
        _body: &str,
        _metadata: &HashMap<String, Value>,
    ) {
    }
}
