// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for engine tests.

use crate::adapters::FakeRuntime;
use crate::engine::scheduler::Scheduler;
use crate::engine::state::QueueStatus;
use crate::engine::{Coordinator, CoordinatorConfig};
use bq_core::{
    Clock, DependencyGraph, Event, FakeClock, QueueName, ServiceSpec, TerminateReason,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

pub(crate) struct TestContext {
    pub runtime: FakeRuntime,
    pub clock: FakeClock,
    pub scheduler: Arc<Mutex<Scheduler>>,
    pub shutdown: Arc<Notify>,
    pub coordinator: Coordinator<FakeRuntime, FakeClock>,
}

pub(crate) fn setup() -> TestContext {
    setup_with(CoordinatorConfig::default())
}

pub(crate) fn setup_with(config: CoordinatorConfig) -> TestContext {
    let runtime = FakeRuntime::new();
    let clock = FakeClock::new();
    let scheduler = Arc::new(Mutex::new(Scheduler::new()));
    let shutdown = Arc::new(Notify::new());
    let coordinator = Coordinator::new(
        runtime.clone(),
        clock.clone(),
        Arc::clone(&scheduler),
        Arc::clone(&shutdown),
        config,
    );
    TestContext { runtime, clock, scheduler, shutdown, coordinator }
}

pub(crate) fn q(name: &str) -> QueueName {
    QueueName::new(name).unwrap()
}

pub(crate) fn graph(pairs: &[(&str, &[&str])]) -> DependencyGraph {
    DependencyGraph::new(
        pairs
            .iter()
            .map(|(name, deps)| (q(name), deps.iter().map(|d| q(d)).collect()))
            .collect::<Vec<_>>(),
    )
    .unwrap()
}

/// Internal config with 100 ms timeouts, named by its run line.
pub(crate) fn cfg(run: &str) -> ServiceSpec {
    let mut spec: ServiceSpec =
        serde_json::from_value(serde_json::json!({ "run": run })).unwrap();
    spec.options.timeout_init_ms = 100;
    spec.options.timeout_terminate_ms = 100;
    spec
}

impl TestContext {
    pub async fn init_after(&self, queue: &str, timeout_init_ms: u64) {
        self.coordinator
            .handle_event(Event::ServiceInit { queue: q(queue), timeout_init_ms })
            .await;
    }

    pub async fn terminate_before(&self, queue: &str, reason: TerminateReason, timeout_ms: u64) {
        self.coordinator
            .handle_event(Event::ServiceTerminate {
                queue: q(queue),
                reason,
                timeout_terminate_ms: timeout_ms,
            })
            .await;
    }

    /// Advance the clock by `ms` and deliver every timer that fires,
    /// including ones armed by the handlers themselves.
    pub async fn tick(&self, ms: u64) {
        self.clock.advance(Duration::from_millis(ms));
        loop {
            let fired = self.scheduler.lock().fired_timers(self.clock.now());
            if fired.is_empty() {
                break;
            }
            for event in fired {
                self.coordinator.handle_event(event).await;
            }
        }
    }

    pub async fn entry(&self, queue: &str) -> Option<QueueStatus> {
        self.coordinator.status().await.into_iter().find(|s| s.name.as_str() == queue)
    }

    /// Drive the current job of `queue` through a clean termination and
    /// disappearance: init, terminate, probe failure, timers.
    pub async fn complete_job(&self, queue: &str) {
        let entry = self.entry(queue).await.expect("queue missing");
        let service_id = entry.service_id.expect("no running job");
        self.init_after(queue, 100).await;
        self.terminate_before(queue, TerminateReason::Shutdown, 100).await;
        self.runtime.set_gone(&service_id);
        self.tick(500).await;
    }
}
