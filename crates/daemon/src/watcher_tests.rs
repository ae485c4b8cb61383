use std::time::{Duration, Instant};

use super::*;

#[test]
fn fires_once_after_a_burst_settles() {
    let mut timer = SmartTimer::new(Duration::from_millis(100), Duration::from_millis(200));
    let start = Instant::now();

    timer.record_event(start);
    timer.record_event(start + Duration::from_millis(30));
    timer.record_event(start + Duration::from_millis(60));

    assert!(!timer.poll(start + Duration::from_millis(150)));
    assert!(timer.poll(start + Duration::from_millis(300)));
    assert!(!timer.has_pending());
}

#[test]
fn continuous_events_suppress_firing_until_silence() {
    let mut timer = SmartTimer::new(Duration::from_millis(50), Duration::from_millis(100));
    let start = Instant::now();

    timer.record_event(start);
    for ms in (20..500).step_by(20) {
        timer.record_event(start + Duration::from_millis(ms));
        assert!(!timer.poll(start + Duration::from_millis(ms + 10)));
    }

    let last = start + Duration::from_millis(480);
    assert!(timer.poll(last + Duration::from_millis(150)));
}

#[test]
fn zero_quiet_period_fires_as_soon_as_debounced() {
    let mut timer = SmartTimer::new(Duration::from_millis(50), Duration::ZERO);
    let start = Instant::now();
    timer.record_event(start);
    assert!(!timer.poll(start + Duration::from_millis(10)));
    assert!(timer.poll(start + Duration::from_millis(60)));
}

#[test]
fn no_pending_event_never_fires() {
    let mut timer = SmartTimer::new(Duration::from_millis(50), Duration::from_millis(100));
    assert!(!timer.poll(Instant::now()));
}
