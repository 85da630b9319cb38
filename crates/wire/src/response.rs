// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use bq_core::ServiceSpec;
use serde::{Deserialize, Serialize};

/// Response from daemon to CLI
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// Generic success
    Ok,

    /// Health check response
    Pong,

    /// Daemon is shutting down
    ShuttingDown,

    /// New pending count after `ServicesAdd`
    Count { count: usize },

    /// A queue's pending configurations
    Queue { configs: Vec<ServiceSpec> },

    /// Daemon status
    Status { uptime_secs: u64, queues: Vec<QueueStatusEntry> },

    /// Encoded payload from the routed command surface
    Routed { content_type: String, body: String },

    /// Command failed
    Error { message: String },
}

/// One queue's execution state, for status output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueueStatusEntry {
    pub name: String,
    /// Pending configurations (excludes the running one).
    pub pending: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    pub suspended: bool,
    /// A terminate event has been seen; awaiting the job's disappearance.
    pub terminating: bool,
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
