// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The coordinator: single owner of every queue.
//!
//! Commands (from the listener) and lifecycle events (from the engine
//! loop) each take the state mutex for their whole operation, adapter
//! awaits included. That is the serialization guarantee: no two state
//! changes ever interleave.

mod commands;
mod lifecycle;
mod timer;

use crate::adapters::{RuntimeApiError, ServiceRuntime};
use crate::engine::scheduler::Scheduler;
use crate::engine::state::{BatchState, QueueStatus};
use bq_core::{Clock, DependencyGraph, QueueName, ServiceId, ServiceSpec};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::Notify;

/// Immutable coordinator configuration.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Drain a queue after a non-clean termination.
    pub purge_on_error: bool,
    /// Pause running dependants when a queue starts.
    pub suspend_dependants: bool,
    /// Signal shutdown once every queue has drained.
    pub stop_when_done: bool,
    /// Static precedence between queues.
    pub graph: DependencyGraph,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            purge_on_error: true,
            suspend_dependants: true,
            stop_when_done: false,
            graph: DependencyGraph::empty(),
        }
    }
}

/// The batch scheduler state machine.
pub struct Coordinator<R, C: Clock> {
    runtime: R,
    clock: C,
    scheduler: Arc<Mutex<Scheduler>>,
    shutdown: Arc<Notify>,
    graph: DependencyGraph,
    purge_on_error: bool,
    suspend_dependants: bool,
    stop_when_done: bool,
    state: tokio::sync::Mutex<BatchState>,
}

impl<R, C> Coordinator<R, C>
where
    R: ServiceRuntime,
    C: Clock,
{
    pub fn new(
        runtime: R,
        clock: C,
        scheduler: Arc<Mutex<Scheduler>>,
        shutdown: Arc<Notify>,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            runtime,
            clock,
            scheduler,
            shutdown,
            graph: config.graph,
            purge_on_error: config.purge_on_error,
            suspend_dependants: config.suspend_dependants,
            stop_when_done: config.stop_when_done,
            state: tokio::sync::Mutex::new(BatchState::new()),
        }
    }

    /// Process seed pairs at startup. A queue whose first job fails to
    /// start is logged and purged; the rest proceed.
    pub async fn seed(&self, seed: Vec<(QueueName, Vec<ServiceSpec>)>) {
        for (queue, configs) in seed {
            match self.services_add(&queue, configs).await {
                Ok(pending) => tracing::info!(queue = %queue, pending, "seeded queue"),
                Err(err) => tracing::error!(queue = %queue, error = %err, "seed queue purged"),
            }
        }
        let state = self.state.lock().await;
        self.maybe_stop_when_done(&state);
    }

    /// Observable state of every queue, sorted by name.
    pub async fn status(&self) -> Vec<QueueStatus> {
        let state = self.state.lock().await;
        let mut entries: Vec<QueueStatus> = state
            .queues
            .iter()
            .map(|(name, entry)| QueueStatus {
                name: name.clone(),
                pending: entry.count(),
                service_id: entry.service_id,
                suspended: entry.suspended,
                terminating: entry.terminate,
            })
            .collect();
        entries.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()));
        entries
    }

    /// True iff some dependency of `queue` still has work.
    fn is_suspended_by_deps(&self, state: &BatchState, queue: &QueueName) -> bool {
        self.graph.depends_on(queue).iter().any(|dep| state.queues.contains_key(dep))
    }

    /// Decorate and start one configuration for `queue`.
    async fn start_service(
        &self,
        queue: &QueueName,
        mut spec: ServiceSpec,
    ) -> Result<ServiceId, RuntimeApiError> {
        spec.decorate(queue);
        self.runtime.add(&spec).await
    }

    fn maybe_stop_when_done(&self, state: &BatchState) {
        if self.stop_when_done && state.queues.is_empty() {
            tracing::info!("all queues drained, stopping");
            self.shutdown.notify_one();
        }
    }
}

#[cfg(test)]
#[path = "../coordinator_tests/mod.rs"]
mod tests;
