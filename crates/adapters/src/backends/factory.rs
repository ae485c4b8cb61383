// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builds a boxed [`crate::port::Backend`] from a `[backends.<id>]` config
//! table (§6), so the daemon and CLI don't each duplicate the
//! kind-to-constructor mapping.

use tsk_core::{BackendConfig, BackendKind, Error};

use crate::port::Backend;
use crate::transport::{Transport, TransportConfig};
use crate::backends::{caldav::CalDavBackend, git_markdown::GitMarkdownBackend, google_tasks::GoogleTasksBackend, plain_markdown::PlainMarkdownBackend, rest_todo::RestTodoBackend};

pub fn build(id: &str, config: &BackendConfig) -> Result<Box<dyn Backend>, Error> {
    match config.kind {
        BackendKind::Caldav => {
            let base_url = require(id, "host", config.host.as_deref())?;
            let username = require(id, "username", config.username.as_deref())?;
            let password = require(id, "token", config.token.as_deref())?;
            let transport = Transport::new(id, reqwest::Client::new(), TransportConfig::default());
            Ok(Box::new(CalDavBackend::new(id, base_url, username, password, transport)))
        }
        BackendKind::RestTodo => {
            let base_url = require(id, "host", config.host.as_deref())?;
            let token = require(id, "token", config.token.as_deref())?;
            let transport = Transport::new(id, reqwest::Client::new(), TransportConfig::default());
            Ok(Box::new(RestTodoBackend::new(id, base_url, token, transport)))
        }
        BackendKind::GoogleTasks => {
            let token = require(id, "token", config.token.as_deref())?;
            let transport = Transport::new(id, reqwest::Client::new(), TransportConfig::default());
            Ok(Box::new(GoogleTasksBackend::new(id, token, transport)))
        }
        BackendKind::GitMarkdown => {
            let path = require(id, "path", config.path.as_deref())?;
            Ok(Box::new(GitMarkdownBackend::new(id, path)))
        }
        BackendKind::PlainMarkdown => {
            let path = require(id, "path", config.path.as_deref())?;
            Ok(Box::new(PlainMarkdownBackend::new(id, path)))
        }
    }
}

fn require<'a>(backend_id: &str, field: &str, value: Option<&'a str>) -> Result<&'a str, Error> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::validation(format!("backend {backend_id} is missing required config field `{field}`")).with_backend(backend_id.to_string()))
}

#[cfg(test)]
#[path = "factory_tests.rs"]
mod tests;
