// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Config file resolution, mirroring `tskd`'s own `TSK_CONFIG` /
//! `dirs::config_dir()` fallback so both binaries read the same file
//! without either depending on the other's `main.rs`.

use std::path::{Path, PathBuf};

use tracing::warn;
use tsk_core::Config;

pub fn config_path(override_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = override_path {
        return Some(path.to_path_buf());
    }
    if let Ok(path) = std::env::var("TSK_CONFIG") {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("tsk").join("config.toml"))
}

pub fn load_config(override_path: Option<&Path>) -> Config {
    match config_path(override_path).and_then(|path| std::fs::read_to_string(path).ok()) {
        Some(contents) => Config::from_toml_str(&contents).unwrap_or_else(|err| {
            warn!("failed to parse config, using defaults: {err}");
            Config::default()
        }),
        None => Config::default(),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
