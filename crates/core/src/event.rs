// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events consumed by the coordinator's engine loop.
//!
//! Lifecycle events arrive from the runtime adapter (via the injected
//! `Notify` hooks); timer events arrive from the scheduler. Both are
//! serialized onto the same channel so the coordinator sees one ordered
//! stream.

use crate::queue::QueueName;
use crate::service::TerminateReason;
use crate::timer::TimerId;

/// An input to the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A queue's current job finished initialization.
    ServiceInit { queue: QueueName, timeout_init_ms: u64 },

    /// A queue's current job is terminating.
    ServiceTerminate {
        queue: QueueName,
        reason: TerminateReason,
        timeout_terminate_ms: u64,
    },

    /// A scheduled timer fired.
    TimerFired { id: TimerId },
}

impl Event {
    /// One-line summary for tracing.
    pub fn log_summary(&self) -> String {
        match self {
            Event::ServiceInit { queue, timeout_init_ms } => {
                format!("service:init queue={queue} timeout_init_ms={timeout_init_ms}")
            }
            Event::ServiceTerminate { queue, reason, timeout_terminate_ms } => {
                format!(
                    "service:terminate queue={queue} reason={reason} \
                     timeout_terminate_ms={timeout_terminate_ms}"
                )
            }
            Event::TimerFired { id } => format!("timer:fired id={id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summaries_name_the_queue() {
        let queue = QueueName::new("builds").unwrap();
        let init = Event::ServiceInit { queue: queue.clone(), timeout_init_ms: 5000 };
        assert_eq!(init.log_summary(), "service:init queue=builds timeout_init_ms=5000");

        let terminate = Event::ServiceTerminate {
            queue,
            reason: TerminateReason::Error("exit status 1".into()),
            timeout_terminate_ms: 100,
        };
        assert!(terminate.log_summary().contains("reason=error: exit status 1"));
    }
}
