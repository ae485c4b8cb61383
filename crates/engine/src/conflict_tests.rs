use chrono::{Duration, Utc};
use std::collections::BTreeMap;
use tsk_core::test_support::{fixed_task_uid, sample_task};
use tsk_core::{ConflictStrategy, ListUid, ResolutionSide, TaskStatus};

use super::*;

fn snapshot(summary: &str, field_ts: &[(&str, DateTime<Utc>)]) -> TaskSnapshot {
    TaskSnapshot {
        list_id: ListUid::new(),
        summary: summary.to_string(),
        description: None,
        status: TaskStatus::NeedsAction,
        priority: 0,
        due_at: None,
        start_at: None,
        categories: Vec::new(),
        parent_uid: None,
        field_modified_at: field_ts.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
    }
}

#[test]
fn remote_changed_compares_etag_when_present() {
    let now = Utc::now();
    let mut binding = BackendBinding::new(fixed_task_uid("a"), "home", "r1", now);
    binding.etag = Some("v1".to_string());
    let remote = RemoteTask {
        remote_id: "r1".to_string(),
        remote_list_id: "l1".to_string(),
        summary: "x".to_string(),
        description: None,
        status: TaskStatus::NeedsAction,
        priority: 0,
        due_at: None,
        start_at: None,
        categories: Default::default(),
        etag: "v2".to_string(),
        modified_at: None,
    };
    assert!(remote_changed(&binding, &remote));
}

#[test]
fn local_changed_compares_against_last_synced_at() {
    let now = Utc::now();
    let list_id = ListUid::new();
    let binding = BackendBinding::new(fixed_task_uid("b"), "home", "r1", now);
    let mut task = sample_task(list_id, now);
    task.touch(now + Duration::seconds(1));
    assert!(local_changed(&binding, &task));
}

#[test]
fn server_wins_discards_local_changes() {
    let local = snapshot("local summary", &[]);
    let remote = snapshot("remote summary", &[]);
    let resolution = resolve(ConflictStrategy::ServerWins, &local, &remote);
    assert_eq!(resolution.local.summary, "remote summary");
    assert!(resolution.push.is_none());
}

#[test]
fn local_wins_pushes_local_value() {
    let local = snapshot("local summary", &[]);
    let remote = snapshot("remote summary", &[]);
    let resolution = resolve(ConflictStrategy::LocalWins, &local, &remote);
    assert_eq!(resolution.local.summary, "local summary");
    assert_eq!(resolution.push.unwrap().summary, "local summary");
}

#[test]
fn merge_picks_the_field_with_the_newer_timestamp() {
    let now = Utc::now();
    let local = snapshot("local summary", &[("summary", now)]);
    let remote = snapshot("remote summary", &[("summary", now + Duration::seconds(10))]);
    let resolution = resolve(ConflictStrategy::Merge, &local, &remote);
    assert_eq!(resolution.local.summary, "remote summary");
    assert_eq!(resolution.field_diffs.len(), 1);
    assert_eq!(resolution.field_diffs[0].winner, ResolutionSide::Remote);
}

#[test]
fn merge_prefers_the_side_that_tracked_a_timestamp() {
    let now = Utc::now();
    let local = snapshot("local summary", &[("summary", now)]);
    let remote = snapshot("remote summary", &[]);
    let resolution = resolve(ConflictStrategy::Merge, &local, &remote);
    assert_eq!(resolution.local.summary, "local summary");
    assert!(resolution.push.is_some());
}

#[test]
fn keep_both_materializes_the_remote_version_separately() {
    let local = snapshot("local summary", &[]);
    let remote = snapshot("remote summary", &[]);
    let resolution = resolve(ConflictStrategy::KeepBoth, &local, &remote);
    assert_eq!(resolution.local.summary, "local summary");
    assert_eq!(resolution.keep_both_extra.unwrap().summary, "remote summary");
}

#[test]
fn merge_resolves_a_task_edited_on_both_sides_field_by_field() {
    let t0 = Utc::now();
    let mut task = sample_task(ListUid::new(), t0);
    task.set_priority_now(3, t0 + Duration::seconds(5));
    task.set_summary("Draft", t0 + Duration::seconds(10));
    let local = TaskSnapshot::from_task(&task);

    let mut remote = snapshot("Draft v2", &[("summary", t0 + Duration::seconds(4))]);
    remote.priority = 1;
    remote.field_modified_at.insert("priority".to_string(), t0 + Duration::seconds(8));

    let resolution = resolve(ConflictStrategy::Merge, &local, &remote);
    assert_eq!(resolution.local.summary, "Draft");
    assert_eq!(resolution.local.priority, 1);
}

#[test]
fn is_conflict_requires_both_sides_to_have_moved() {
    let now = Utc::now();
    let list_id = ListUid::new();
    let mut binding = BackendBinding::new(fixed_task_uid("c"), "home", "r1", now);
    binding.etag = Some("v1".to_string());
    let mut task = sample_task(list_id, now);
    let remote = RemoteTask {
        remote_id: "r1".to_string(),
        remote_list_id: "l1".to_string(),
        summary: "x".to_string(),
        description: None,
        status: TaskStatus::NeedsAction,
        priority: 0,
        due_at: None,
        start_at: None,
        categories: Default::default(),
        etag: "v1".to_string(),
        modified_at: None,
    };
    assert!(!is_conflict(&binding, &task, &remote));

    task.touch(now + Duration::seconds(5));
    assert!(!is_conflict(&binding, &task, &remote));

    let mut remote_changed_task = remote.clone();
    remote_changed_task.etag = "v2".to_string();
    assert!(is_conflict(&binding, &task, &remote_changed_task));
}
