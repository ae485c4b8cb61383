// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Trailing result codes for no-prompt CLI mode (§7).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultCode {
    ActionCompleted,
    InfoOnly,
    ActionIncomplete,
    Error,
}

crate::simple_display! {
    ResultCode {
        ActionCompleted => "ACTION_COMPLETED",
        InfoOnly => "INFO_ONLY",
        ActionIncomplete => "ACTION_INCOMPLETE",
        Error => "ERROR",
    }
}

impl ResultCode {
    pub fn from_error_kind(kind: crate::error::ErrorKind) -> Self {
        match kind {
            crate::error::ErrorKind::Cancelled => ResultCode::ActionIncomplete,
            _ => ResultCode::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn screaming_snake_case_round_trip() {
        assert_eq!(ResultCode::ActionCompleted.to_string(), "ACTION_COMPLETED");
    }

    #[test]
    fn cancellation_maps_to_incomplete_not_error() {
        assert_eq!(ResultCode::from_error_kind(ErrorKind::Cancelled), ResultCode::ActionIncomplete);
        assert_eq!(ResultCode::from_error_kind(ErrorKind::Internal), ResultCode::Error);
    }
}
