// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors surfaced to command callers.

use thiserror::Error;

/// The command error taxonomy; `Display` gives the wire reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The named queue is absent.
    #[error("not_found")]
    NotFound,

    /// The queue exists but has no current runtime job.
    #[error("not_running")]
    NotRunning,

    /// The first job of a newly created queue failed to start; the queue
    /// was not created.
    #[error("purged")]
    Purged,
}
