// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn system_clock_returns_nonzero() {
    assert!(SystemClock.epoch_ms() > 0);
}

#[test]
fn fake_clock_starts_at_given_value() {
    let clock = FakeClock::new(1_000);
    assert_eq!(clock.epoch_ms(), 1_000);
}

#[test]
fn fake_clock_advances() {
    let clock = FakeClock::new(1_000);
    clock.advance_ms(500);
    assert_eq!(clock.epoch_ms(), 1_500);
}

#[test]
fn fake_clock_set_overrides() {
    let clock = FakeClock::new(1_000);
    clock.set_ms(42);
    assert_eq!(clock.epoch_ms(), 42);
}
