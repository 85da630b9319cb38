// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timer store for the engine loop.
//!
//! Setting a timer records a deadline; the engine loop sleeps until the
//! earliest one and converts everything due into `TimerFired` events.
//! Cancellation is best-effort by design: a tick that raced its cancel is
//! dropped by the handler's identity checks, not here.

use bq_core::{Event, TimerId};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Pending timers, keyed by id. Re-setting an id replaces its deadline.
#[derive(Default)]
pub struct Scheduler {
    timers: HashMap<TimerId, Instant>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_timer(&mut self, id: TimerId, duration: Duration, now: Instant) {
        self.timers.insert(id, now + duration);
    }

    pub fn cancel_timer(&mut self, id: &TimerId) {
        self.timers.remove(id);
    }

    pub fn has_timers(&self) -> bool {
        !self.timers.is_empty()
    }

    /// Earliest pending deadline, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.values().min().copied()
    }

    /// Remove and return every timer due at `now`, earliest first.
    pub fn fired_timers(&mut self, now: Instant) -> Vec<Event> {
        let mut due: Vec<(TimerId, Instant)> = self
            .timers
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(id, deadline)| (id.clone(), *deadline))
            .collect();
        due.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));
        for (id, _) in &due {
            self.timers.remove(id);
        }
        due.into_iter().map(|(id, _)| Event::TimerFired { id }).collect()
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
