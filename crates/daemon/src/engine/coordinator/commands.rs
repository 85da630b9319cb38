// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Synchronous commands: the operator-facing surface.

use super::Coordinator;
use crate::adapters::{RuntimeApiError, ServiceRuntime};
use crate::engine::error::CommandError;
use crate::engine::state::QueueEntry;
use bq_core::{Clock, QueueName, ServiceSpec};
use std::collections::VecDeque;

impl<R, C> Coordinator<R, C>
where
    R: ServiceRuntime,
    C: Clock,
{
    /// The queue's pending configurations, front first.
    pub async fn queue_list(&self, queue: &QueueName) -> Result<Vec<ServiceSpec>, CommandError> {
        let state = self.state.lock().await;
        let entry = state.queues.get(queue).ok_or(CommandError::NotFound)?;
        Ok(entry.data.iter().cloned().collect())
    }

    /// Drop pending entries. With a running job the entry stays (the job
    /// continues); otherwise the queue is erased and dependants resume.
    pub async fn queue_clear(&self, queue: &QueueName) -> Result<(), CommandError> {
        let mut state = self.state.lock().await;
        let has_job = state
            .queues
            .get(queue)
            .map(|entry| entry.service_id.is_some())
            .ok_or(CommandError::NotFound)?;
        if has_job {
            if let Some(entry) = state.queues.get_mut(queue) {
                entry.data.clear();
            }
        } else {
            self.erase_and_cascade(&mut state, queue.clone()).await;
        }
        Ok(())
    }

    /// Pause the queue's running job via the adapter.
    ///
    /// Does not touch the `suspended` flag; that flag belongs to
    /// dependency suspension.
    pub async fn queue_suspend(&self, queue: &QueueName) -> Result<(), CommandError> {
        let state = self.state.lock().await;
        let service_id = state
            .queues
            .get(queue)
            .ok_or(CommandError::NotFound)?
            .service_id
            .ok_or(CommandError::NotRunning)?;
        match self.runtime.suspend(&service_id).await {
            Ok(()) => Ok(()),
            Err(RuntimeApiError::ServiceNotFound) => {
                // The job vanished mid-suspend; leave the queue unchanged.
                tracing::debug!(queue = %queue, "suspend raced job disappearance");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(queue = %queue, error = %err, "suspend failed");
                Ok(())
            }
        }
    }

    /// Symmetric to [`Coordinator::queue_suspend`].
    pub async fn queue_resume(&self, queue: &QueueName) -> Result<(), CommandError> {
        let state = self.state.lock().await;
        let service_id = state
            .queues
            .get(queue)
            .ok_or(CommandError::NotFound)?
            .service_id
            .ok_or(CommandError::NotRunning)?;
        match self.runtime.resume(&service_id).await {
            Ok(()) => Ok(()),
            Err(RuntimeApiError::ServiceNotFound) => {
                tracing::debug!(queue = %queue, "resume raced job disappearance");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(queue = %queue, error = %err, "resume failed");
                Ok(())
            }
        }
    }

    /// Enqueue configurations, creating and starting the queue if needed.
    /// Returns the new pending count.
    pub async fn services_add(
        &self,
        queue: &QueueName,
        configs: Vec<ServiceSpec>,
    ) -> Result<usize, CommandError> {
        let mut state = self.state.lock().await;

        if let Some(entry) = state.queues.get_mut(queue) {
            entry.data.extend(configs);
            return Ok(entry.count());
        }

        if self.is_suspended_by_deps(&state, queue) {
            let count = configs.len();
            state.queues.insert(queue.clone(), QueueEntry::pending(configs));
            tracing::info!(queue = %queue, pending = count, "queue created dependency-suspended");
            return Ok(count);
        }

        let mut data: VecDeque<ServiceSpec> = configs.into();
        let Some(first) = data.pop_front() else {
            // The command surface rejects empty lists; nothing to create.
            return Ok(0);
        };
        if self.suspend_dependants {
            self.suspend_dependants_of(&mut state, queue).await;
        }
        match self.start_service(queue, first).await {
            Ok(service_id) => {
                let count = data.len();
                tracing::info!(queue = %queue, service = %service_id, pending = count, "queue started");
                state.queues.insert(queue.clone(), QueueEntry::running(service_id, data));
                Ok(count)
            }
            Err(err) => {
                tracing::error!(queue = %queue, error = %err, "first configuration failed to start");
                // The queue was never created; undo the dependant pause.
                self.resume_dependants_of(&mut state, queue).await;
                Err(CommandError::Purged)
            }
        }
    }

    /// Stop the running job (if any), erase the queue, resume dependants.
    pub async fn services_remove(&self, queue: &QueueName) -> Result<(), CommandError> {
        let mut state = self.state.lock().await;
        let service_id =
            state.queues.get(queue).ok_or(CommandError::NotFound)?.service_id;
        if let Some(service_id) = service_id {
            match self.runtime.remove(&service_id).await {
                Ok(()) => {}
                Err(RuntimeApiError::ServiceNotFound) => {
                    tracing::debug!(queue = %queue, "remove raced job disappearance")
                }
                Err(err) => tracing::warn!(queue = %queue, error = %err, "remove failed"),
            }
        }
        self.erase_and_cascade(&mut state, queue.clone()).await;
        Ok(())
    }

    /// Restart the queue's running job in place.
    pub async fn services_restart(&self, queue: &QueueName) -> Result<(), CommandError> {
        let state = self.state.lock().await;
        let service_id = state
            .queues
            .get(queue)
            .ok_or(CommandError::NotFound)?
            .service_id
            .ok_or(CommandError::NotRunning)?;
        match self.runtime.restart(&service_id).await {
            Ok(()) => Ok(()),
            Err(RuntimeApiError::ServiceNotFound) => Err(CommandError::NotRunning),
            Err(err) => {
                tracing::warn!(queue = %queue, error = %err, "restart failed");
                Ok(())
            }
        }
    }
}
