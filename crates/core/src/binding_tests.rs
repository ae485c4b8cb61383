// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::TaskUid;

#[test]
fn version_tag_prefers_etag() {
    let mut b = BackendBinding::new(TaskUid::new(), "caldav-home", "remote-1", Utc::now());
    assert_eq!(b.version_tag(), None);
    b.etag = Some("\"abc123\"".to_string());
    assert_eq!(b.version_tag(), Some("\"abc123\""));
}
