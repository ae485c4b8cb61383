// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage-internal error type. Converted to [`tsk_core::Error`] at the
//! boundary every public function returns across (§10.B of SPEC_FULL.md) —
//! callers outside this crate never see a raw [`rusqlite::Error`].

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("sqlite error during {context}: {source}")]
    Sqlite {
        context: &'static str,
        #[source]
        source: rusqlite::Error,
    },
    #[error("table name {0:?} is not in the schema introspection allowlist")]
    DisallowedTable(String),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("row for {entity} {uid:?} not found")]
    NotFound { entity: &'static str, uid: String },
    #[error("decoding {field} on {entity} {uid:?}: {source}")]
    Decode {
        entity: &'static str,
        uid: String,
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{field} on {entity} {uid:?} has unrecognized value {value:?}")]
    InvalidEnumValue { entity: &'static str, uid: String, field: &'static str, value: String },
    #[error("task {uid:?} has an invalid parent_uid: {reason}")]
    InvalidParent { uid: String, reason: &'static str },
}

impl StorageError {
    pub fn sqlite(context: &'static str) -> impl FnOnce(rusqlite::Error) -> Self {
        move |source| StorageError::Sqlite { context, source }
    }
}

impl From<StorageError> for tsk_core::Error {
    fn from(err: StorageError) -> Self {
        match &err {
            StorageError::NotFound { .. } => tsk_core::Error::not_found(err.to_string()),
            StorageError::DisallowedTable(_) => tsk_core::Error::internal(err.to_string()),
            StorageError::Decode { .. } => tsk_core::Error::internal(err.to_string()),
            StorageError::InvalidEnumValue { .. } => tsk_core::Error::internal(err.to_string()),
            StorageError::InvalidParent { .. } => tsk_core::Error::validation(err.to_string()),
            StorageError::Io { .. } => tsk_core::Error::internal(err.to_string()),
            StorageError::Sqlite { source, .. } => match source {
                rusqlite::Error::SqliteFailure(e, _)
                    if e.code == rusqlite::ErrorCode::DatabaseBusy
                        || e.code == rusqlite::ErrorCode::DatabaseLocked =>
                {
                    tsk_core::Error::transient_network(err.to_string())
                }
                _ => tsk_core::Error::internal(err.to_string()),
            },
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
