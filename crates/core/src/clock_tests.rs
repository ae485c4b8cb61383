// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn fake_clock_advances_by_requested_amount() {
    let clock = FakeClock::at_epoch_ms(1_000);
    clock.advance_ms(500);
    assert_eq!(clock.epoch_ms(), 1_500);
}

#[test]
fn fake_clock_set_is_absolute() {
    let clock = FakeClock::at_epoch_ms(1_000);
    clock.set_epoch_ms(42);
    assert_eq!(clock.epoch_ms(), 42);
}

#[test]
fn system_clock_moves_forward() {
    let clock = SystemClock;
    let a = clock.now();
    std::thread::sleep(std::time::Duration::from_millis(5));
    let b = clock.now();
    assert!(b >= a);
}

#[test]
fn cloned_fake_clock_shares_state() {
    let clock = FakeClock::new();
    let clone = clock.clone();
    clock.advance_ms(1_000);
    assert_eq!(clock.epoch_ms(), clone.epoch_ms());
}
