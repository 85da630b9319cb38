// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The queue table: one entry per live queue.
//!
//! A queue name is present iff it has a running job, pending work, or is
//! dependency-suspended with pending work. All mutation goes through the
//! coordinator; nothing else holds a reference.

use bq_core::{QueueName, ServiceId, ServiceSpec, TimerId};
use std::collections::{HashMap, VecDeque};

/// Per-queue execution state.
pub(crate) struct QueueEntry {
    /// Pending configurations, front = next to run.
    pub data: VecDeque<ServiceSpec>,
    /// Runtime id of the current job; absent while nothing runs.
    pub service_id: Option<ServiceId>,
    /// Dependency-suspended: no job may be dequeued.
    pub suspended: bool,
    /// Initialization budget reported by the latest init event.
    pub timeout_init_ms: Option<u64>,
    /// A terminate event has been seen for the current job; awaiting its
    /// disappearance.
    pub terminate: bool,
    /// The pending re-check timer, while `terminate` is set.
    pub terminate_timer: Option<TimerId>,
    /// Wall budget left before the job is declared terminated regardless.
    pub terminate_remaining_ms: u64,
    /// Sticky: an error-class terminate was seen; drain the queue on final
    /// confirmation.
    pub terminate_purge: bool,
}

impl QueueEntry {
    /// Entry for a queue held back by its dependencies: pending work only.
    pub fn pending(data: impl Into<VecDeque<ServiceSpec>>) -> Self {
        Self {
            data: data.into(),
            service_id: None,
            suspended: true,
            timeout_init_ms: None,
            terminate: false,
            terminate_timer: None,
            terminate_remaining_ms: 0,
            terminate_purge: false,
        }
    }

    /// Entry for a queue whose first job just started.
    pub fn running(service_id: ServiceId, data: impl Into<VecDeque<ServiceSpec>>) -> Self {
        Self {
            data: data.into(),
            service_id: Some(service_id),
            suspended: false,
            timeout_init_ms: None,
            terminate: false,
            terminate_timer: None,
            terminate_remaining_ms: 0,
            terminate_purge: false,
        }
    }

    /// Number of pending configurations (excludes the running job).
    pub fn count(&self) -> usize {
        self.data.len()
    }

    /// Reset the termination bookkeeping for this job.
    pub fn clear_terminate(&mut self) {
        self.terminate = false;
        self.terminate_timer = None;
        self.terminate_remaining_ms = 0;
    }
}

/// All mutable coordinator state.
#[derive(Default)]
pub(crate) struct BatchState {
    pub queues: HashMap<QueueName, QueueEntry>,
}

impl BatchState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// One queue's observable state, for status output and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueStatus {
    pub name: QueueName,
    pub pending: usize,
    pub service_id: Option<ServiceId>,
    pub suspended: bool,
    pub terminating: bool,
}
