// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use bq_core::ServiceConfig;
use serde::{Deserialize, Serialize};

/// Request from CLI to daemon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping
    Ping,

    /// Get daemon status
    Status,

    /// Request daemon shutdown
    Shutdown,

    /// List a queue's pending configurations
    QueueList { queue: String },

    /// Drop a queue's pending configurations (the running job continues)
    QueueClear { queue: String },

    /// Pause a queue's running job
    QueueSuspend { queue: String },

    /// Resume a queue's paused job
    QueueResume { queue: String },

    /// Enqueue configurations, creating the queue if needed
    ServicesAdd { queue: String, configs: Vec<ServiceConfig> },

    /// Stop the running job and erase the queue
    ServicesRemove { queue: String },

    /// Restart a queue's running job in place
    ServicesRestart { queue: String },

    /// URL-embedded command form: `batch/<queue>/<method>.<format>[/<verb>]`
    Route {
        suffix: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        verb: Option<String>,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        body: String,
    },
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
