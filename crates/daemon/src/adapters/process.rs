// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-backed service runtime.
//!
//! Each job is a child process. `internal` configurations run through
//! `sh -c`; `external` ones exec their file directly. Lifecycle hooks are
//! fired from here: `Notify` hooks deliver events to the coordinator's
//! channel, `Command` hooks run as fire-and-forget shell lines. A watcher
//! task per child observes exit, classifies the reason, fires the
//! terminate hooks, and only then drops the child from the table, which
//! is what flips the liveness probe to `ServiceNotFound`.

use super::{RuntimeApiError, ServiceRuntime};
use async_trait::async_trait;
use bq_core::{Event, LifecycleHook, ServiceId, ServiceKind, ServiceSpec, TerminateReason};
use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

struct ManagedService {
    pid: Option<u32>,
    spec: ServiceSpec,
    /// Set when a stop was requested, so the exit classifies as clean.
    removing: Arc<AtomicBool>,
    /// Bumped on restart; a watcher only reaps its own generation.
    generation: u64,
}

/// Production runtime: services are child processes.
pub struct ProcessRuntime {
    event_tx: mpsc::Sender<Event>,
    table: Arc<Mutex<HashMap<ServiceId, ManagedService>>>,
}

impl ProcessRuntime {
    pub fn new(event_tx: mpsc::Sender<Event>) -> Self {
        Self { event_tx, table: Arc::new(Mutex::new(HashMap::new())) }
    }

    fn command_for(spec: &ServiceSpec) -> tokio::process::Command {
        let mut cmd = match spec.kind {
            ServiceKind::Internal => {
                let mut cmd = tokio::process::Command::new("sh");
                cmd.arg("-c").arg(&spec.run);
                cmd
            }
            ServiceKind::External => {
                let mut cmd = tokio::process::Command::new(&spec.run);
                cmd.args(&spec.args);
                cmd
            }
        };
        for (key, value) in &spec.env {
            cmd.env(key, value);
        }
        cmd.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());
        cmd
    }

    async fn spawn_service(
        &self,
        id: ServiceId,
        generation: u64,
        spec: ServiceSpec,
    ) -> Result<(), RuntimeApiError> {
        let mut child = Self::command_for(&spec)
            .spawn()
            .map_err(|err| RuntimeApiError::Start(err.to_string()))?;
        let pid = child.id();
        let removing = Arc::new(AtomicBool::new(false));

        self.table.lock().insert(
            id,
            ManagedService { pid, spec: spec.clone(), removing: Arc::clone(&removing), generation },
        );

        // Both hook firings live on the watcher task. That keeps init
        // strictly before terminate for instantly-exiting children, and
        // `add` never blocks on the event channel while the coordinator
        // holds its state lock.
        let table = Arc::clone(&self.table);
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            fire_init_hooks(&event_tx, &spec).await;
            let status = child.wait().await;
            let reason = match &status {
                Ok(status) if status.success() => TerminateReason::Shutdown,
                _ if removing.load(Ordering::SeqCst) => TerminateReason::Tagged("removed".into()),
                Ok(status) => TerminateReason::Error(status.to_string()),
                Err(err) => TerminateReason::Error(err.to_string()),
            };
            tracing::debug!(service = %id, %reason, "service exited");
            fire_terminate_hooks(&event_tx, &spec, &reason).await;
            let mut table = table.lock();
            if table.get(&id).is_some_and(|m| m.generation == generation) {
                table.remove(&id);
            }
        });

        Ok(())
    }

    fn signal(&self, id: &ServiceId, signal: Signal) -> Result<(), RuntimeApiError> {
        let pid = {
            let table = self.table.lock();
            let managed = table.get(id).ok_or(RuntimeApiError::ServiceNotFound)?;
            managed.pid.ok_or(RuntimeApiError::ServiceNotFound)?
        };
        match kill(Pid::from_raw(pid as i32), signal) {
            Ok(()) => Ok(()),
            Err(Errno::ESRCH) => Err(RuntimeApiError::ServiceNotFound),
            Err(err) => Err(RuntimeApiError::Signal(err.to_string())),
        }
    }
}

#[async_trait]
impl ServiceRuntime for ProcessRuntime {
    async fn add(&self, spec: &ServiceSpec) -> Result<ServiceId, RuntimeApiError> {
        let id = ServiceId::generate();
        self.spawn_service(id, 0, spec.clone()).await?;
        tracing::info!(service = %id, name = spec.display_name(), "service started");
        Ok(id)
    }

    async fn remove(&self, id: &ServiceId) -> Result<(), RuntimeApiError> {
        let pid = {
            let table = self.table.lock();
            let managed = table.get(id).ok_or(RuntimeApiError::ServiceNotFound)?;
            managed.removing.store(true, Ordering::SeqCst);
            managed.pid
        };
        let Some(pid) = pid else { return Ok(()) };
        match kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            // Already exiting; the watcher will clean up.
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(err) => Err(RuntimeApiError::Signal(err.to_string())),
        }
    }

    async fn suspend(&self, id: &ServiceId) -> Result<(), RuntimeApiError> {
        self.signal(id, Signal::SIGSTOP)
    }

    async fn resume(&self, id: &ServiceId) -> Result<(), RuntimeApiError> {
        self.signal(id, Signal::SIGCONT)
    }

    async fn restart(&self, id: &ServiceId) -> Result<(), RuntimeApiError> {
        let (spec, generation, pid) = {
            let table = self.table.lock();
            let managed = table.get(id).ok_or(RuntimeApiError::ServiceNotFound)?;
            managed.removing.store(true, Ordering::SeqCst);
            (managed.spec.clone(), managed.generation, managed.pid)
        };
        if let Some(pid) = pid {
            // Stop failure is not fatal; the replacement takes over the id.
            if let Err(err) = kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
                if err != Errno::ESRCH {
                    tracing::warn!(service = %id, error = %err, "restart: stop signal failed");
                }
            }
        }
        self.spawn_service(*id, generation + 1, spec).await?;
        tracing::info!(service = %id, "service restarted");
        Ok(())
    }

    async fn probe(&self, id: &ServiceId) -> Result<(), RuntimeApiError> {
        if self.table.lock().contains_key(id) {
            Ok(())
        } else {
            Err(RuntimeApiError::ServiceNotFound)
        }
    }
}

async fn fire_init_hooks(event_tx: &mpsc::Sender<Event>, spec: &ServiceSpec) {
    for hook in &spec.options.init_after {
        match hook {
            LifecycleHook::Notify { queue } => {
                let event = Event::ServiceInit {
                    queue: queue.clone(),
                    timeout_init_ms: spec.options.timeout_init_ms,
                };
                if event_tx.send(event).await.is_err() {
                    tracing::warn!("event channel closed during init hook");
                }
            }
            LifecycleHook::Command { run } => spawn_hook_command(run),
        }
    }
}

async fn fire_terminate_hooks(
    event_tx: &mpsc::Sender<Event>,
    spec: &ServiceSpec,
    reason: &TerminateReason,
) {
    for hook in &spec.options.terminate_before {
        match hook {
            LifecycleHook::Notify { queue } => {
                let event = Event::ServiceTerminate {
                    queue: queue.clone(),
                    reason: reason.clone(),
                    timeout_terminate_ms: spec.options.timeout_terminate_ms,
                };
                if event_tx.send(event).await.is_err() {
                    tracing::warn!("event channel closed during terminate hook");
                }
            }
            LifecycleHook::Command { run } => spawn_hook_command(run),
        }
    }
}

fn spawn_hook_command(run: &str) {
    let run = run.to_string();
    tokio::spawn(async move {
        let status = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(&run)
            .stdin(Stdio::null())
            .status()
            .await;
        match status {
            Ok(status) if !status.success() => {
                tracing::warn!(hook = %run, %status, "lifecycle hook failed")
            }
            Ok(_) => {}
            Err(err) => tracing::warn!(hook = %run, error = %err, "lifecycle hook failed to spawn"),
        }
    });
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
