// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timer identifiers for the termination wait.
//!
//! A timer id is a structured string so the engine loop can route a fired
//! timer back to its queue without a side table. Two kinds exist: the
//! periodic re-check tick and the final fire that declares the job gone.

use crate::queue::QueueName;

/// Unique identifier for a scheduled timer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimerId(String);

impl TimerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Re-check tick for a terminating job.
    pub fn terminate_tick(queue: &QueueName) -> Self {
        TimerKind::TerminateTick { queue: queue.as_str() }.to_timer_id()
    }

    /// Final fire: the termination budget is exhausted.
    pub fn terminate_final(queue: &QueueName) -> Self {
        TimerKind::TerminateFinal { queue: queue.as_str() }.to_timer_id()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse this id into a typed [`TimerKind`].
    pub fn kind(&self) -> Option<TimerKind<'_>> {
        TimerKind::parse(&self.0)
    }
}

impl std::fmt::Display for TimerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parsed representation of a timer id for type-safe routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerKind<'a> {
    TerminateTick { queue: &'a str },
    TerminateFinal { queue: &'a str },
}

impl<'a> TimerKind<'a> {
    /// Parse a timer id string. Returns `None` for unrecognized formats.
    pub fn parse(id: &'a str) -> Option<TimerKind<'a>> {
        if let Some(queue) = id.strip_prefix("terminate:") {
            return Some(TimerKind::TerminateTick { queue });
        }
        if let Some(queue) = id.strip_prefix("terminated:") {
            return Some(TimerKind::TerminateFinal { queue });
        }
        None
    }

    /// Format this kind back into its canonical [`TimerId`].
    pub fn to_timer_id(&self) -> TimerId {
        match self {
            TimerKind::TerminateTick { queue } => TimerId::new(format!("terminate:{queue}")),
            TimerKind::TerminateFinal { queue } => TimerId::new(format!("terminated:{queue}")),
        }
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
