// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use bq_core::{Clock, FakeClock};

#[test]
fn timer_lifecycle() {
    let clock = FakeClock::new();
    let mut scheduler = Scheduler::new();

    scheduler.set_timer(TimerId::new("t"), Duration::from_millis(500), clock.now());
    assert!(scheduler.has_timers());
    assert!(scheduler.next_deadline().is_some());

    // Not due yet
    clock.advance(Duration::from_millis(250));
    assert!(scheduler.fired_timers(clock.now()).is_empty());
    assert!(scheduler.has_timers());

    // Fires once
    clock.advance(Duration::from_millis(500));
    let events = scheduler.fired_timers(clock.now());
    assert_eq!(events, vec![Event::TimerFired { id: TimerId::new("t") }]);
    assert!(!scheduler.has_timers());
}

#[test]
fn cancelled_timer_never_fires() {
    let clock = FakeClock::new();
    let mut scheduler = Scheduler::new();

    scheduler.set_timer(TimerId::new("t"), Duration::from_millis(100), clock.now());
    scheduler.cancel_timer(&TimerId::new("t"));

    clock.advance(Duration::from_secs(1));
    assert!(scheduler.fired_timers(clock.now()).is_empty());
}

#[test]
fn resetting_replaces_the_deadline() {
    let clock = FakeClock::new();
    let mut scheduler = Scheduler::new();

    scheduler.set_timer(TimerId::new("t"), Duration::from_millis(100), clock.now());
    scheduler.set_timer(TimerId::new("t"), Duration::from_millis(800), clock.now());

    clock.advance(Duration::from_millis(200));
    assert!(scheduler.fired_timers(clock.now()).is_empty());

    clock.advance(Duration::from_millis(700));
    assert_eq!(scheduler.fired_timers(clock.now()).len(), 1);
}

#[test]
fn due_timers_fire_earliest_first() {
    let clock = FakeClock::new();
    let mut scheduler = Scheduler::new();

    scheduler.set_timer(TimerId::new("late"), Duration::from_millis(300), clock.now());
    scheduler.set_timer(TimerId::new("early"), Duration::from_millis(100), clock.now());

    clock.advance(Duration::from_millis(500));
    let events = scheduler.fired_timers(clock.now());
    assert_eq!(
        events,
        vec![
            Event::TimerFired { id: TimerId::new("early") },
            Event::TimerFired { id: TimerId::new("late") },
        ]
    );
}
