// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Newline-delimited JSON framing (§4.F.3).

use serde::{de::DeserializeOwned, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("connection closed before a full message was read")]
    Eof,
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reads one newline-terminated JSON message from `reader`.
///
/// `reader` must be an `AsyncBufRead` positioned at the start of a message;
/// callers that read repeatedly from the same connection should keep the
/// same `BufReader` across calls rather than constructing a fresh one.
pub async fn read_message<T, R>(reader: &mut BufReader<R>) -> Result<T, ProtocolError>
where
    T: DeserializeOwned,
    R: tokio::io::AsyncRead + Unpin,
{
    let mut line = String::new();
    let n = reader.read_line(&mut line).await?;
    if n == 0 {
        return Err(ProtocolError::Eof);
    }
    Ok(serde_json::from_str(line.trim_end_matches('\n'))?)
}

/// Serializes `value` and writes it as one line, flushing immediately so a
/// request/response pair round-trips without buffering delay.
pub async fn write_message<T, W>(writer: &mut W, value: &T) -> Result<(), ProtocolError>
where
    T: Serialize,
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_string(value)?;
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
