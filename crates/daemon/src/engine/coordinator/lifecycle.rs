// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle events and cascades.
//!
//! The termination wait: a terminate event opens a wall budget of
//! `timeout_terminate + timeout_init + slack`. Every 500 ms a tick probes
//! whether the job has disappeared from the runtime; disappearance (or an
//! exhausted budget) fires the terminated transition, which purges,
//! erases, holds, or advances the queue.

use super::Coordinator;
use crate::adapters::{RuntimeApiError, ServiceRuntime};
use crate::engine::state::BatchState;
use bq_core::{Clock, Event, QueueName, ServiceId, TerminateReason, TimerId};
use std::time::Duration;

/// Re-check period while awaiting a job's disappearance.
pub(super) const TERMINATE_TICK_MS: u64 = 500;
/// Extra wall budget beyond the job's own timeouts.
pub(super) const TERMINATE_SLACK_MS: u64 = 100;

impl<R, C> Coordinator<R, C>
where
    R: ServiceRuntime,
    C: Clock,
{
    /// Process one event from the engine loop.
    pub async fn handle_event(&self, event: Event) {
        match event {
            Event::ServiceInit { queue, timeout_init_ms } => {
                self.handle_init_after(queue, timeout_init_ms).await
            }
            Event::ServiceTerminate { queue, reason, timeout_terminate_ms } => {
                self.handle_terminate_before(queue, reason, timeout_terminate_ms).await
            }
            Event::TimerFired { id } => self.handle_timer(&id).await,
        }
    }

    async fn handle_init_after(&self, queue: QueueName, timeout_init_ms: u64) {
        let mut state = self.state.lock().await;
        let Some(entry) = state.queues.get_mut(&queue) else {
            tracing::debug!(queue = %queue, "init event for unknown queue");
            return;
        };
        if let Some(timer) = entry.terminate_timer.take() {
            self.scheduler.lock().cancel_timer(&timer);
        }
        entry.timeout_init_ms = Some(timeout_init_ms);
        entry.terminate = false;
        entry.terminate_remaining_ms = 0;
        tracing::debug!(queue = %queue, timeout_init_ms, "job initialized");
    }

    async fn handle_terminate_before(
        &self,
        queue: QueueName,
        reason: TerminateReason,
        timeout_terminate_ms: u64,
    ) {
        let mut state = self.state.lock().await;
        let Some(entry) = state.queues.get_mut(&queue) else {
            tracing::debug!(queue = %queue, "terminate event for unknown queue");
            return;
        };
        let purge_hit = self.purge_on_error && !reason.is_clean();
        if purge_hit {
            tracing::warn!(queue = %queue, %reason, "error termination, queue will purge");
        }
        if entry.terminate {
            // Repeat invocation inside the terminating window: only the
            // sticky purge flag may rise.
            entry.terminate_purge |= purge_hit;
            return;
        }
        let budget_ms =
            timeout_terminate_ms + entry.timeout_init_ms.unwrap_or(0) + TERMINATE_SLACK_MS;
        entry.terminate = true;
        entry.terminate_purge |= purge_hit;
        self.schedule_terminate_wait(&queue, entry, budget_ms);
        tracing::debug!(queue = %queue, %reason, budget_ms, "job terminating");
    }

    /// Arm the next timer for a terminating job.
    ///
    /// Budgets over one tick get a re-check tick; smaller budgets go
    /// straight to the final timer.
    pub(super) fn schedule_terminate_wait(
        &self,
        queue: &QueueName,
        entry: &mut crate::engine::state::QueueEntry,
        budget_ms: u64,
    ) {
        let (id, delay_ms, remaining_ms) = if budget_ms <= TERMINATE_TICK_MS {
            (TimerId::terminate_final(queue), budget_ms, 0)
        } else {
            (TimerId::terminate_tick(queue), TERMINATE_TICK_MS, budget_ms - TERMINATE_TICK_MS)
        };
        self.scheduler.lock().set_timer(
            id.clone(),
            Duration::from_millis(delay_ms),
            self.clock.now(),
        );
        entry.terminate_remaining_ms = remaining_ms;
        entry.terminate_timer = Some(id);
    }

    /// The job is confirmed gone; decide purge vs. hold vs. advance.
    pub(super) async fn handle_terminated(&self, state: &mut BatchState, queue: &QueueName) {
        let (terminate, purge, count) = match state.queues.get(queue) {
            Some(entry) => (entry.terminate, entry.terminate_purge, entry.count()),
            None => return,
        };
        if !terminate {
            return;
        }
        if purge {
            tracing::info!(queue = %queue, dropped = count, "purging queue after error termination");
            self.erase_and_cascade(state, queue.clone()).await;
        } else if count == 0 {
            self.erase_and_cascade(state, queue.clone()).await;
        } else if self.is_suspended_by_deps(state, queue) {
            if let Some(entry) = state.queues.get_mut(queue) {
                entry.service_id = None;
                entry.suspended = true;
                entry.clear_terminate();
            }
            tracing::debug!(queue = %queue, "queue held by dependencies");
        } else if !self.advance_queue(state, queue).await {
            self.erase_and_cascade(state, queue.clone()).await;
        }
        self.maybe_stop_when_done(state);
    }

    /// Start the queue's next pending configuration.
    ///
    /// Returns false when the start failed; the caller erases the queue.
    pub(super) async fn advance_queue(&self, state: &mut BatchState, queue: &QueueName) -> bool {
        let Some(next) = state.queues.get_mut(queue).and_then(|entry| entry.data.pop_front())
        else {
            return false;
        };
        if self.suspend_dependants {
            self.suspend_dependants_of(state, queue).await;
        }
        match self.start_service(queue, next).await {
            Ok(service_id) => {
                if let Some(entry) = state.queues.get_mut(queue) {
                    entry.service_id = Some(service_id);
                    entry.suspended = false;
                    entry.terminate_purge = false;
                    entry.clear_terminate();
                }
                tracing::info!(queue = %queue, service = %service_id, "queue advanced");
                true
            }
            Err(err) => {
                tracing::error!(queue = %queue, error = %err, "failed to start next configuration");
                false
            }
        }
    }

    /// Remove `queue`, then scan its dependants: any queue no longer held
    /// by a dependency is resumed (paused job) or advanced (pending work).
    /// Erasures discovered along the way cascade iteratively.
    pub(super) async fn erase_and_cascade(&self, state: &mut BatchState, start: QueueName) {
        let mut worklist = vec![start];
        while let Some(queue) = worklist.pop() {
            let Some(entry) = state.queues.remove(&queue) else { continue };
            if let Some(timer) = entry.terminate_timer {
                // Best-effort cancel; a late tick is dropped by the
                // handler's identity checks.
                self.scheduler.lock().cancel_timer(&timer);
            }
            tracing::info!(queue = %queue, "queue erased");

            for dependant in self.graph.dependants_of(&queue).to_vec() {
                let (suspended, service_id) = match state.queues.get(&dependant) {
                    Some(entry) => (entry.suspended, entry.service_id),
                    None => continue,
                };
                if !suspended || self.is_suspended_by_deps(state, &dependant) {
                    continue;
                }
                match service_id {
                    Some(service_id) => {
                        self.resume_paused_dependant(state, &dependant, service_id, &mut worklist)
                            .await
                    }
                    None => {
                        if !self.advance_queue(state, &dependant).await {
                            worklist.push(dependant);
                        }
                    }
                }
            }
        }
    }

    /// Resume a dependant whose job the adapter paused.
    async fn resume_paused_dependant(
        &self,
        state: &mut BatchState,
        dependant: &QueueName,
        service_id: ServiceId,
        worklist: &mut Vec<QueueName>,
    ) {
        match self.runtime.resume(&service_id).await {
            Ok(()) => {
                if let Some(entry) = state.queues.get_mut(dependant) {
                    entry.suspended = false;
                }
                tracing::info!(queue = %dependant, "dependant resumed");
            }
            Err(RuntimeApiError::ServiceNotFound) => {
                // The paused job vanished: advance past it, or erase the
                // queue when nothing is pending.
                let has_pending =
                    state.queues.get(dependant).map(|e| e.count() > 0).unwrap_or(false);
                if has_pending {
                    if let Some(entry) = state.queues.get_mut(dependant) {
                        entry.service_id = None;
                    }
                    if !self.advance_queue(state, dependant).await {
                        worklist.push(dependant.clone());
                    }
                } else {
                    worklist.push(dependant.clone());
                }
            }
            Err(err) => {
                tracing::warn!(queue = %dependant, error = %err, "dependant resume failed")
            }
        }
    }

    /// Pause dependants that are currently running, before `queue` starts.
    pub(super) async fn suspend_dependants_of(&self, state: &mut BatchState, queue: &QueueName) {
        for dependant in self.graph.dependants_of(queue).to_vec() {
            let target = match state.queues.get(&dependant) {
                Some(entry) if !entry.suspended => entry.service_id,
                _ => continue,
            };
            let Some(service_id) = target else { continue };
            match self.runtime.suspend(&service_id).await {
                Ok(()) => {
                    if let Some(entry) = state.queues.get_mut(&dependant) {
                        entry.suspended = true;
                    }
                    tracing::info!(queue = %dependant, "dependant suspended");
                }
                Err(RuntimeApiError::ServiceNotFound) => {
                    tracing::debug!(queue = %dependant, "dependant job vanished before suspend")
                }
                Err(err) => {
                    tracing::warn!(queue = %dependant, error = %err, "dependant suspend failed")
                }
            }
        }
    }

    /// Undo dependant pauses after a queue creation that never happened.
    pub(super) async fn resume_dependants_of(&self, state: &mut BatchState, queue: &QueueName) {
        for dependant in self.graph.dependants_of(queue).to_vec() {
            let (suspended, service_id) = match state.queues.get(&dependant) {
                Some(entry) => (entry.suspended, entry.service_id),
                None => continue,
            };
            if !suspended || self.is_suspended_by_deps(state, &dependant) {
                continue;
            }
            let Some(service_id) = service_id else { continue };
            match self.runtime.resume(&service_id).await {
                Ok(()) => {
                    if let Some(entry) = state.queues.get_mut(&dependant) {
                        entry.suspended = false;
                    }
                }
                Err(err) => {
                    tracing::warn!(queue = %dependant, error = %err, "dependant resume failed")
                }
            }
        }
    }
}
