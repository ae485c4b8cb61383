use std::time::Duration;

use chrono::Utc;
use tempfile::tempdir;

use super::*;

#[test]
fn beat_then_read_roundtrips() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("daemon.heartbeat");

    beat(&path).expect("beat");
    let read_back = read(&path).expect("read");

    assert!((Utc::now() - read_back).num_seconds().abs() < 2);
}

#[test]
fn missing_file_reads_as_none() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("daemon.heartbeat");
    assert!(read(&path).is_none());
}

#[test]
fn fresh_heartbeat_is_not_stale() {
    let now = Utc::now();
    assert!(!is_stale(now, now, Duration::from_secs(30)));
}

#[test]
fn heartbeat_past_three_intervals_is_stale() {
    let last = Utc::now() - chrono::Duration::seconds(100);
    let now = Utc::now();
    assert!(is_stale(last, now, Duration::from_secs(30)));
}

#[test]
fn heartbeat_within_three_intervals_is_not_stale() {
    let last = Utc::now() - chrono::Duration::seconds(40);
    let now = Utc::now();
    assert!(!is_stale(last, now, Duration::from_secs(30)));
}

#[test]
fn mtime_check_treats_missing_file_as_stale() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("daemon.heartbeat");
    assert!(mtime_is_stale(&path, Duration::from_secs(30)));
}

#[test]
fn mtime_check_treats_fresh_write_as_not_stale() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("daemon.heartbeat");
    beat(&path).expect("beat");
    assert!(!mtime_is_stale(&path, Duration::from_secs(30)));
}

#[test]
fn is_alive_true_for_a_fresh_heartbeat() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("daemon.heartbeat");
    beat(&path).expect("beat");
    assert!(is_alive(&path, Utc::now(), Duration::from_secs(30)));
}

#[test]
fn is_alive_false_for_a_missing_heartbeat() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("daemon.heartbeat");
    assert!(!is_alive(&path, Utc::now(), Duration::from_secs(30)));
}

#[test]
fn is_alive_false_once_the_recorded_timestamp_is_stale() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("daemon.heartbeat");
    std::fs::write(&path, (Utc::now() - chrono::Duration::seconds(100)).to_rfc3339()).expect("write");
    assert!(!is_alive(&path, Utc::now(), Duration::from_secs(30)));
}
