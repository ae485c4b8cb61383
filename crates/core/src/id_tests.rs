// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::{ListUid, TaskUid};

#[test]
fn id_buf_roundtrips_through_serde() {
    let buf = IdBuf::new("tsk-abc123");
    let json = serde_json::to_string(&buf).unwrap();
    let back: IdBuf = serde_json::from_str(&json).unwrap();
    assert_eq!(buf, back);
}

#[test]
fn id_buf_rejects_oversize_on_deserialize() {
    let too_long = "x".repeat(ID_MAX_LEN + 1);
    let json = format!("{:?}", too_long);
    let result: Result<IdBuf, _> = serde_json::from_str(&json);
    assert!(result.is_err());
}

#[test]
fn short_truncates_to_n_chars() {
    assert_eq!(short("hello world", 5), "hello");
    assert_eq!(short("hi", 5), "hi");
}

#[test]
fn task_uid_has_stable_prefix() {
    let id = TaskUid::new();
    assert!(id.as_str().starts_with("tsk-"));
    assert_eq!(id.as_str().len(), ID_MAX_LEN);
}

#[test]
fn task_uid_roundtrips_through_string() {
    let id = TaskUid::new();
    let s = id.to_string();
    let back = TaskUid::from_string(&s);
    assert_eq!(id, back);
}

#[test]
fn distinct_id_types_use_distinct_prefixes() {
    assert_ne!(TaskUid::PREFIX, ListUid::PREFIX);
}

#[test]
fn suffix_strips_prefix() {
    let id = TaskUid::new();
    assert!(!id.suffix().starts_with(TaskUid::PREFIX));
    assert_eq!(id.short(4).len(), 4);
}

#[test]
fn prefix_matches_accepts_exact_and_leading_substring() {
    let id = TaskUid::new();
    let full = id.to_string();
    assert!(prefix_matches(&full, &full));
    assert!(prefix_matches(&full, &full[..8]));
    assert!(!prefix_matches(&full, "zzz"));
    assert!(!prefix_matches(&full, ""));
}
