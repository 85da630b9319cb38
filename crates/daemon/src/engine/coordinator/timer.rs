// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timer routing for the termination wait.
//!
//! Cancellation is fire-and-forget, so a tick may arrive after its queue
//! moved on. Three checks gate every tick: the terminate flag is still
//! set, the queue still exists, and the pending timer id matches. Any
//! mismatch is a silent drop.

use super::Coordinator;
use crate::adapters::ServiceRuntime;
use bq_core::{Clock, QueueName, TimerId, TimerKind};

impl<R, C> Coordinator<R, C>
where
    R: ServiceRuntime,
    C: Clock,
{
    pub(super) async fn handle_timer(&self, id: &TimerId) {
        match id.kind() {
            Some(TimerKind::TerminateTick { queue }) => {
                let Ok(queue) = QueueName::new(queue) else { return };
                self.handle_terminate_tick(&queue, id).await;
            }
            Some(TimerKind::TerminateFinal { queue }) => {
                let Ok(queue) = QueueName::new(queue) else { return };
                self.handle_terminate_final(&queue, id).await;
            }
            None => tracing::warn!(timer = %id, "unrecognized timer id"),
        }
    }

    /// Periodic re-check: is the terminating job gone yet?
    async fn handle_terminate_tick(&self, queue: &QueueName, id: &TimerId) {
        let mut state = self.state.lock().await;
        let (service_id, remaining_ms) = match state.queues.get(queue) {
            Some(entry) if entry.terminate && entry.terminate_timer.as_ref() == Some(id) => {
                (entry.service_id, entry.terminate_remaining_ms)
            }
            _ => return,
        };

        let running = match service_id {
            Some(service_id) => self.runtime.probe(&service_id).await.is_ok(),
            None => false,
        };
        if !running || remaining_ms == 0 {
            self.handle_terminated(&mut state, queue).await;
            return;
        }

        if let Some(entry) = state.queues.get_mut(queue) {
            self.schedule_terminate_wait(queue, entry, remaining_ms);
        }
    }

    /// The budget expired while scheduling: declare the job terminated.
    async fn handle_terminate_final(&self, queue: &QueueName, id: &TimerId) {
        let mut state = self.state.lock().await;
        match state.queues.get(queue) {
            Some(entry) if entry.terminate && entry.terminate_timer.as_ref() == Some(id) => {}
            _ => return,
        }
        self.handle_terminated(&mut state, queue).await;
    }
}
