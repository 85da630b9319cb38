// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment resolution: state directory, socket path, IPC timeout.

use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_IPC_TIMEOUT: Duration = Duration::from_secs(10);

/// Root state directory for the daemon.
///
/// `BQ_STATE_DIR` wins, then `$XDG_STATE_HOME/bq`, then
/// `$HOME/.local/state/bq`, with `/tmp/bq` as a last resort.
pub fn state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("BQ_STATE_DIR") {
        return PathBuf::from(dir);
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(xdg).join("bq");
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local/state/bq");
    }
    PathBuf::from("/tmp/bq")
}

/// Default Unix socket path for the command surface.
pub fn default_socket_path() -> PathBuf {
    state_dir().join("bqd.sock")
}

/// How long the daemon waits for a request on an accepted connection.
pub fn ipc_timeout() -> Duration {
    std::env::var("BQ_IPC_TIMEOUT_MS")
        .ok()
        .and_then(|ms| ms.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_IPC_TIMEOUT)
}
