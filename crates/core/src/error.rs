// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The shared error taxonomy (§7).
//!
//! Backend adapters, the transport, the local store, and the sync engine
//! all produce errors through this one type so that the engine never has
//! to match on backend-specific error types to decide whether to retry.

use std::fmt;

/// Classification used by the sync engine and daemon to decide policy:
/// retry, surface-and-stop, treat-as-deletion, etc. See §7 of the design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Timeouts, connection resets. Retry with backoff; operation stays pending.
    TransientNetwork,
    /// 429 exhausted past `max_retries`. Operation marked failed-retryable.
    RateLimited,
    /// 401/403 or missing credential. Surfaced immediately, queue draining stops.
    Auth,
    /// 404 on a remote id the binding says should exist. Treated as remote deletion.
    NotFound,
    /// 4xx other than auth/not-found. Terminal failure, recorded on the operation.
    Validation,
    /// Local and remote both changed since the last binding snapshot.
    Conflict,
    /// Unexpected failure. Surfaced; increments `consecutive_errors`.
    Internal,
    /// Ambient cancellation observed. Propagated; never counted as an error.
    Cancelled,
}

impl ErrorKind {
    /// Whether an operation carrying this error kind should be retried by
    /// the queue (vs. marked terminal or surfaced for operator action).
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::TransientNetwork | ErrorKind::RateLimited)
    }

    /// Whether this error should stop further queue draining for the backend
    /// that produced it, rather than just failing the one operation.
    pub fn halts_backend(self) -> bool {
        matches!(self, ErrorKind::Auth)
    }
}

crate::simple_display! {
    ErrorKind {
        TransientNetwork => "transient_network",
        RateLimited => "rate_limited",
        Auth => "auth",
        NotFound => "not_found",
        Validation => "validation",
        Conflict => "conflict",
        Internal => "internal",
        Cancelled => "cancelled",
    }
}

/// A classified error with a human-readable sentence.
///
/// User-visible CLI errors print `message` and the `kind` name — never a
/// stack trace or raw SQL text (§7).
#[derive(Debug, Clone, thiserror::Error, serde::Serialize, serde::Deserialize)]
#[error("{kind}: {message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
    /// Name of the backend that produced this error, when applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl fmt::Display) -> Self {
        Self { kind, message: message.to_string(), backend: None }
    }

    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    pub fn transient_network(message: impl fmt::Display) -> Self {
        Self::new(ErrorKind::TransientNetwork, message)
    }

    pub fn rate_limited(message: impl fmt::Display) -> Self {
        Self::new(ErrorKind::RateLimited, message)
    }

    pub fn auth(message: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Auth, message)
    }

    pub fn not_found(message: impl fmt::Display) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn validation(message: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn conflict(message: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn internal(message: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled, "operation cancelled")
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
