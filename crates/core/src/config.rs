// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration types (§6).
//!
//! Parsed from TOML on disk by the CLI/daemon entry points; this module
//! only defines the shape and defaults so every crate agrees on them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::conflict::ConflictStrategy;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sync: SyncConfig,
    /// Keyed by `backend_id`.
    pub backends: BTreeMap<String, BackendConfig>,
    #[serde(with = "humantime_secs", rename = "cache_ttl_secs")]
    pub cache_ttl: Duration,
    pub trash_retention_days: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sync: SyncConfig::default(),
            backends: BTreeMap::new(),
            cache_ttl: Duration::from_secs(300),
            trash_retention_days: 30,
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn enabled_backends(&self) -> impl Iterator<Item = (&String, &BackendConfig)> {
        self.backends.iter().filter(|(_, cfg)| cfg.enabled)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub enabled: bool,
    /// Default `true` when `sync.enabled` (§6) — constructed that way by
    /// [`SyncConfig::default`], not re-derived at read time, so a config
    /// that explicitly sets `enabled = false` after the fact does not
    /// silently flip this back on.
    pub auto_sync_after_operation: bool,
    pub conflict_resolution: ConflictStrategy,
    #[serde(with = "humantime_secs", rename = "background_pull_cooldown_secs")]
    pub background_pull_cooldown: Duration,
    pub daemon: DaemonConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_sync_after_operation: true,
            conflict_resolution: ConflictStrategy::default(),
            background_pull_cooldown: Duration::from_secs(5),
            daemon: DaemonConfig::default(),
        }
    }
}

impl SyncConfig {
    /// Clamps `background_pull_cooldown` up to the spec's 5s floor (§6).
    pub fn normalized(mut self) -> Self {
        if self.background_pull_cooldown < Duration::from_secs(5) {
            self.background_pull_cooldown = Duration::from_secs(5);
        }
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub enabled: bool,
    #[serde(with = "humantime_secs", rename = "interval_secs")]
    pub interval: Duration,
    #[serde(with = "humantime_secs", rename = "idle_timeout_secs")]
    pub idle_timeout: Duration,
    #[serde(with = "humantime_secs", rename = "heartbeat_interval_secs")]
    pub heartbeat_interval: Duration,
    #[serde(with = "humantime_secs", rename = "stuck_timeout_secs")]
    pub stuck_timeout: Duration,
    pub file_watcher: bool,
    pub smart_timing: bool,
    pub debounce_ms: u64,
    pub quiet_period_ms: u64,
    pub max_consecutive_errors: u32,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval: Duration::from_secs(300),
            idle_timeout: Duration::from_secs(0),
            heartbeat_interval: Duration::from_secs(30),
            stuck_timeout: Duration::from_secs(600),
            file_watcher: true,
            smart_timing: true,
            debounce_ms: 1_000,
            quiet_period_ms: 2_000,
            max_consecutive_errors: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub enabled: bool,
    pub kind: BackendKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(with = "humantime_secs", rename = "sync_interval_secs")]
    pub sync_interval: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            kind: BackendKind::PlainMarkdown,
            host: None,
            token: None,
            path: None,
            username: None,
            sync_interval: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Caldav,
    RestTodo,
    GoogleTasks,
    GitMarkdown,
    PlainMarkdown,
}

/// Serializes `Duration` as whole seconds so the TOML stays human-editable
/// (`interval_secs = 300`) rather than a nested struct.
mod humantime_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(d)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
