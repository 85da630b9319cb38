// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle: wiring, the engine loop, shutdown.
//!
//! One mpsc channel carries every coordinator input: lifecycle events from
//! the runtime's hooks and timer fires from the scheduler. The loop is the
//! single consumer; commands reach the coordinator directly from listener
//! tasks and serialize on its state mutex.

use crate::adapters::ProcessRuntime;
use crate::config::Config;
use crate::engine::{Coordinator, CoordinatorConfig, Scheduler};
use crate::env;
use crate::listener::{ListenCtx, Listener};
use bq_core::{Clock, Event, SystemClock};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::net::UnixListener;
use tokio::sync::{mpsc, Notify};
use tracing::{debug, info};

/// The daemon's concrete coordinator type.
pub type DaemonCoordinator = Coordinator<ProcessRuntime, SystemClock>;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Lifecycle errors.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("failed to bind socket at {path}: {source}")]
    Bind {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run the daemon to completion.
pub async fn run(config: Config) -> Result<(), LifecycleError> {
    let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let scheduler = Arc::new(Mutex::new(Scheduler::new()));
    let shutdown = Arc::new(Notify::new());
    let clock = SystemClock;

    let coordinator = Arc::new(Coordinator::new(
        ProcessRuntime::new(event_tx),
        clock.clone(),
        Arc::clone(&scheduler),
        Arc::clone(&shutdown),
        CoordinatorConfig {
            purge_on_error: config.purge_on_error,
            suspend_dependants: config.suspend_dependants,
            stop_when_done: config.stop_when_done,
            graph: config.graph,
        },
    ));

    coordinator.seed(config.seed).await;

    // The command surface is disabled entirely under static queues.
    let socket_path = if config.queues_static {
        info!("static queue mode, command surface disabled");
        None
    } else {
        let path = config.socket_path.unwrap_or_else(env::default_socket_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        let unix = UnixListener::bind(&path)
            .map_err(|source| LifecycleError::Bind { path: path.clone(), source })?;
        let ctx = Arc::new(ListenCtx {
            coordinator: Arc::clone(&coordinator),
            shutdown: Arc::clone(&shutdown),
            start_time: Instant::now(),
        });
        tokio::spawn(Listener::new(unix, ctx).run());
        info!(socket = %path.display(), "listener ready");
        Some(path)
    };

    engine_loop(&coordinator, event_rx, &scheduler, &shutdown, &clock).await;

    if let Some(path) = socket_path {
        if let Err(err) = std::fs::remove_file(&path) {
            debug!(socket = %path.display(), error = %err, "socket cleanup failed");
        }
    }
    info!("daemon stopped");
    Ok(())
}

/// Single consumer of events and timers, until shutdown.
async fn engine_loop<C: Clock>(
    coordinator: &DaemonCoordinator,
    mut event_rx: mpsc::Receiver<Event>,
    scheduler: &Mutex<Scheduler>,
    shutdown: &Notify,
    clock: &C,
) {
    loop {
        let deadline = scheduler.lock().next_deadline();
        tokio::select! {
            maybe_event = event_rx.recv() => {
                match maybe_event {
                    Some(event) => {
                        debug!("event {}", event.log_summary());
                        coordinator.handle_event(event).await;
                    }
                    None => break,
                }
            }
            _ = shutdown.notified() => {
                info!("shutdown signal received");
                break;
            }
            _ = sleep_until(deadline), if deadline.is_some() => {
                let fired = scheduler.lock().fired_timers(clock.now());
                for event in fired {
                    debug!("event {}", event.log_summary());
                    coordinator.handle_event(event).await;
                }
            }
        }
    }
}

async fn sleep_until(deadline: Option<std::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}
