// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::adapters::{FakeRuntime, RuntimeCall};
use crate::engine::test_helpers::{cfg, graph, q, setup, setup_with};
use crate::engine::{CommandError, CoordinatorConfig};
use bq_core::LifecycleHook;

// ── services_add ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_starts_first_config_and_stores_rest() {
    let ctx = setup();

    let pending = ctx.coordinator.services_add(&q("a"), vec![cfg("c1"), cfg("c2")]).await.unwrap();

    assert_eq!(pending, 1);
    assert_eq!(ctx.runtime.added_runs(), vec!["c1"]);

    let entry = ctx.entry("a").await.unwrap();
    assert_eq!(entry.pending, 1);
    assert_eq!(entry.service_id, Some(FakeRuntime::nth_id(0)));
    assert!(!entry.suspended);
    assert!(!entry.terminating);
}

#[tokio::test]
async fn add_to_existing_queue_appends_without_starting() {
    let ctx = setup();
    ctx.coordinator.services_add(&q("a"), vec![cfg("c1")]).await.unwrap();

    let pending = ctx.coordinator.services_add(&q("a"), vec![cfg("c2"), cfg("c3")]).await.unwrap();

    assert_eq!(pending, 2);
    assert_eq!(ctx.runtime.added_runs(), vec!["c1"]);
}

#[tokio::test]
async fn add_decorates_the_started_config() {
    let ctx = setup();
    let mut config = cfg("c1");
    config.options.init_after.push(LifecycleHook::Command { run: "echo init".into() });
    config.options.terminate_before.push(LifecycleHook::Command { run: "echo bye".into() });

    ctx.coordinator.services_add(&q("a"), vec![config]).await.unwrap();

    let started = &ctx.runtime.added_specs()[0];
    assert_eq!(started.options.init_after[0], LifecycleHook::Notify { queue: q("a") });
    assert_eq!(
        started.options.init_after[1],
        LifecycleHook::Command { run: "echo init".into() }
    );
    assert_eq!(
        started.options.terminate_before.last(),
        Some(&LifecycleHook::Notify { queue: q("a") })
    );
}

#[tokio::test]
async fn add_with_empty_list_creates_nothing() {
    let ctx = setup();

    let pending = ctx.coordinator.services_add(&q("a"), vec![]).await.unwrap();

    assert_eq!(pending, 0);
    assert!(ctx.coordinator.status().await.is_empty());
    assert!(ctx.runtime.calls().is_empty());
}

#[tokio::test]
async fn add_start_failure_purges_the_queue() {
    let ctx = setup();
    ctx.runtime.fail_adds(1);

    let result = ctx.coordinator.services_add(&q("a"), vec![cfg("c1"), cfg("c2")]).await;

    assert_eq!(result, Err(CommandError::Purged));
    assert!(ctx.coordinator.status().await.is_empty());
}

// ── queue_list ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn queue_list_returns_pending_without_mutating() {
    let ctx = setup();
    ctx.coordinator.services_add(&q("a"), vec![cfg("c1"), cfg("c2"), cfg("c3")]).await.unwrap();

    let before = ctx.coordinator.status().await;
    let first = ctx.coordinator.queue_list(&q("a")).await.unwrap();
    let second = ctx.coordinator.queue_list(&q("a")).await.unwrap();

    let runs: Vec<&str> = first.iter().map(|s| s.run.as_str()).collect();
    assert_eq!(runs, vec!["c2", "c3"]);
    assert_eq!(first, second);
    assert_eq!(ctx.coordinator.status().await, before);
}

#[tokio::test]
async fn queue_list_missing_queue_is_not_found() {
    let ctx = setup();
    assert_eq!(ctx.coordinator.queue_list(&q("ghost")).await, Err(CommandError::NotFound));
}

// ── queue_clear ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn clear_with_running_job_drops_pending_only() {
    let ctx = setup();
    ctx.coordinator.services_add(&q("a"), vec![cfg("c1"), cfg("c2")]).await.unwrap();

    ctx.coordinator.queue_clear(&q("a")).await.unwrap();

    let entry = ctx.entry("a").await.unwrap();
    assert_eq!(entry.pending, 0);
    assert!(entry.service_id.is_some());
}

#[tokio::test]
async fn clear_without_running_job_erases_and_resumes_dependants() {
    let ctx = setup_with(CoordinatorConfig { graph: graph(&[("b", &["a"])]), ..Default::default() });
    ctx.coordinator.services_add(&q("a"), vec![cfg("ca")]).await.unwrap();
    ctx.coordinator.services_add(&q("b"), vec![cfg("cb")]).await.unwrap();
    assert!(ctx.entry("b").await.unwrap().suspended);

    // Clearing the dependency-held queue removes it outright.
    ctx.coordinator.queue_clear(&q("b")).await.unwrap();
    assert!(ctx.entry("b").await.is_none());

    assert_eq!(ctx.coordinator.queue_clear(&q("b")).await, Err(CommandError::NotFound));
}

// ── queue_suspend / queue_resume ─────────────────────────────────────────────

#[tokio::test]
async fn suspend_then_resume_is_a_net_noop() {
    let ctx = setup();
    ctx.coordinator.services_add(&q("a"), vec![cfg("c1")]).await.unwrap();
    let before = ctx.coordinator.status().await;
    ctx.runtime.take_calls();

    ctx.coordinator.queue_suspend(&q("a")).await.unwrap();
    ctx.coordinator.queue_resume(&q("a")).await.unwrap();

    let id = FakeRuntime::nth_id(0);
    assert_eq!(
        ctx.runtime.calls(),
        vec![RuntimeCall::Suspend { id }, RuntimeCall::Resume { id }]
    );
    assert_eq!(ctx.coordinator.status().await, before);
}

#[tokio::test]
async fn suspend_without_running_job_is_not_running() {
    let ctx = setup_with(CoordinatorConfig { graph: graph(&[("b", &["a"])]), ..Default::default() });
    ctx.coordinator.services_add(&q("a"), vec![cfg("ca")]).await.unwrap();
    ctx.coordinator.services_add(&q("b"), vec![cfg("cb")]).await.unwrap();

    assert_eq!(ctx.coordinator.queue_suspend(&q("b")).await, Err(CommandError::NotRunning));
    assert_eq!(ctx.coordinator.queue_suspend(&q("ghost")).await, Err(CommandError::NotFound));
}

#[tokio::test]
async fn suspend_swallows_a_vanished_job() {
    let ctx = setup();
    ctx.coordinator.services_add(&q("a"), vec![cfg("c1")]).await.unwrap();
    ctx.runtime.set_gone(&FakeRuntime::nth_id(0));

    // Policy: the race is absorbed and the queue's state left unchanged.
    assert_eq!(ctx.coordinator.queue_suspend(&q("a")).await, Ok(()));
    assert!(ctx.entry("a").await.is_some());
}

// ── services_remove ──────────────────────────────────────────────────────────

#[tokio::test]
async fn remove_stops_job_and_erases_queue() {
    let ctx = setup();
    ctx.coordinator.services_add(&q("a"), vec![cfg("c1"), cfg("c2")]).await.unwrap();

    ctx.coordinator.services_remove(&q("a")).await.unwrap();

    assert!(ctx.runtime.calls().contains(&RuntimeCall::Remove { id: FakeRuntime::nth_id(0) }));
    assert!(ctx.coordinator.status().await.is_empty());
}

#[tokio::test]
async fn second_remove_is_not_found() {
    let ctx = setup();
    ctx.coordinator.services_add(&q("a"), vec![cfg("c1")]).await.unwrap();

    assert_eq!(ctx.coordinator.services_remove(&q("a")).await, Ok(()));
    assert_eq!(ctx.coordinator.services_remove(&q("a")).await, Err(CommandError::NotFound));
}

// ── services_restart ─────────────────────────────────────────────────────────

#[tokio::test]
async fn restart_targets_the_running_job() {
    let ctx = setup();
    ctx.coordinator.services_add(&q("a"), vec![cfg("c1")]).await.unwrap();

    ctx.coordinator.services_restart(&q("a")).await.unwrap();

    assert!(ctx.runtime.calls().contains(&RuntimeCall::Restart { id: FakeRuntime::nth_id(0) }));
}

#[tokio::test]
async fn restart_maps_missing_job_to_not_running() {
    let ctx = setup();
    ctx.coordinator.services_add(&q("a"), vec![cfg("c1")]).await.unwrap();
    ctx.runtime.set_gone(&FakeRuntime::nth_id(0));

    assert_eq!(ctx.coordinator.services_restart(&q("a")).await, Err(CommandError::NotRunning));
    assert_eq!(ctx.coordinator.services_restart(&q("ghost")).await, Err(CommandError::NotFound));
}
