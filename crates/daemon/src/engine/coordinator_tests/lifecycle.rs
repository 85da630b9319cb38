// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::adapters::{FakeRuntime, RuntimeCall};
use crate::engine::test_helpers::{cfg, graph, q, setup, setup_with};
use crate::engine::CoordinatorConfig;
use bq_core::TerminateReason;
use std::time::Duration;

// ── Clean termination and advance ────────────────────────────────────────────

#[tokio::test]
async fn clean_termination_advances_to_the_next_config() {
    let ctx = setup();
    ctx.coordinator.services_add(&q("a"), vec![cfg("c1"), cfg("c2")]).await.unwrap();

    ctx.complete_job("a").await;

    assert_eq!(ctx.runtime.added_runs(), vec!["c1", "c2"]);
    let entry = ctx.entry("a").await.unwrap();
    assert_eq!(entry.pending, 0);
    assert_eq!(entry.service_id, Some(FakeRuntime::nth_id(1)));
    assert!(!entry.terminating);
}

#[tokio::test]
async fn draining_the_last_config_erases_the_queue() {
    let ctx = setup();
    ctx.coordinator.services_add(&q("a"), vec![cfg("c1")]).await.unwrap();

    ctx.complete_job("a").await;

    assert!(ctx.coordinator.status().await.is_empty());
}

// ── Purge on error ───────────────────────────────────────────────────────────

#[tokio::test]
async fn error_termination_purges_the_queue() {
    let ctx = setup();
    ctx.coordinator
        .services_add(&q("a"), vec![cfg("c1"), cfg("c2"), cfg("c3")])
        .await
        .unwrap();

    ctx.init_after("a", 100).await;
    ctx.terminate_before("a", TerminateReason::Error("crashed".into()), 100).await;
    ctx.runtime.set_gone(&FakeRuntime::nth_id(0));
    ctx.tick(500).await;

    // The queue is gone and c2 was never started.
    assert!(ctx.coordinator.status().await.is_empty());
    assert_eq!(ctx.runtime.added_runs(), vec!["c1"]);
}

#[tokio::test]
async fn purge_disabled_advances_past_errors() {
    let ctx = setup_with(CoordinatorConfig { purge_on_error: false, ..Default::default() });
    ctx.coordinator.services_add(&q("a"), vec![cfg("c1"), cfg("c2")]).await.unwrap();

    ctx.init_after("a", 100).await;
    ctx.terminate_before("a", TerminateReason::Error("crashed".into()), 100).await;
    ctx.runtime.set_gone(&FakeRuntime::nth_id(0));
    ctx.tick(500).await;

    assert_eq!(ctx.runtime.added_runs(), vec!["c1", "c2"]);
}

#[tokio::test]
async fn repeat_terminate_raises_the_sticky_purge_flag() {
    let ctx = setup();
    ctx.coordinator.services_add(&q("a"), vec![cfg("c1"), cfg("c2")]).await.unwrap();
    ctx.init_after("a", 100).await;

    // A clean terminate opens the window; an error-class repeat (an inner
    // user hook) raises the purge flag, which stays up.
    ctx.terminate_before("a", TerminateReason::Shutdown, 100).await;
    ctx.terminate_before("a", TerminateReason::Error("inner hook".into()), 100).await;
    ctx.terminate_before("a", TerminateReason::Shutdown, 100).await;
    ctx.runtime.set_gone(&FakeRuntime::nth_id(0));
    ctx.tick(500).await;

    assert!(ctx.coordinator.status().await.is_empty());
    assert_eq!(ctx.runtime.added_runs(), vec!["c1"]);
}

// ── Dependency hold ──────────────────────────────────────────────────────────

#[tokio::test]
async fn dependant_queue_waits_for_its_dependency() {
    let ctx = setup_with(CoordinatorConfig { graph: graph(&[("b", &["a"])]), ..Default::default() });
    ctx.coordinator.services_add(&q("a"), vec![cfg("ca")]).await.unwrap();

    let pending = ctx.coordinator.services_add(&q("b"), vec![cfg("cb")]).await.unwrap();

    // b exists suspended with nothing running; the adapter was not asked
    // to start cb.
    assert_eq!(pending, 1);
    let entry = ctx.entry("b").await.unwrap();
    assert!(entry.suspended);
    assert_eq!(entry.service_id, None);
    assert_eq!(ctx.runtime.added_runs(), vec!["ca"]);

    ctx.complete_job("a").await;

    assert!(ctx.entry("a").await.is_none());
    let entry = ctx.entry("b").await.unwrap();
    assert!(!entry.suspended);
    assert_eq!(entry.service_id, Some(FakeRuntime::nth_id(1)));
    assert_eq!(ctx.runtime.added_runs(), vec!["ca", "cb"]);
}

#[tokio::test]
async fn suspended_queues_always_have_a_live_dependency() {
    let ctx = setup_with(CoordinatorConfig {
        graph: graph(&[("b", &["a"]), ("c", &["b"])]),
        ..Default::default()
    });
    ctx.coordinator.services_add(&q("a"), vec![cfg("ca")]).await.unwrap();
    ctx.coordinator.services_add(&q("b"), vec![cfg("cb")]).await.unwrap();
    ctx.coordinator.services_add(&q("c"), vec![cfg("cc")]).await.unwrap();

    let deps = [("b", "a"), ("c", "b")];
    for status in ctx.coordinator.status().await {
        if status.suspended {
            let held_by = deps
                .iter()
                .find(|(name, _)| *name == status.name.as_str())
                .map(|(_, dep)| *dep)
                .unwrap();
            assert!(ctx.entry(held_by).await.is_some(), "{} suspended without {}", status.name, held_by);
        }
    }

    // Draining a cascades: b starts; c stays held by b.
    ctx.complete_job("a").await;
    assert!(!ctx.entry("b").await.unwrap().suspended);
    assert!(ctx.entry("c").await.unwrap().suspended);

    ctx.complete_job("b").await;
    assert!(!ctx.entry("c").await.unwrap().suspended);
}

// ── Suspend dependants ───────────────────────────────────────────────────────

#[tokio::test]
async fn starting_a_dependency_pauses_running_dependants() {
    let ctx = setup_with(CoordinatorConfig { graph: graph(&[("b", &["a"])]), ..Default::default() });
    ctx.coordinator.services_add(&q("b"), vec![cfg("cb")]).await.unwrap();

    ctx.coordinator.services_add(&q("a"), vec![cfg("ca")]).await.unwrap();

    let id_b = FakeRuntime::nth_id(0);
    let calls = ctx.runtime.calls();
    let suspend_at = calls.iter().position(|c| *c == RuntimeCall::Suspend { id: id_b }).unwrap();
    let add_a_at = calls.iter().position(|c| *c == RuntimeCall::Add { run: "ca".into() }).unwrap();
    assert!(suspend_at < add_a_at, "suspend must precede the dependency's start");
    assert!(ctx.entry("b").await.unwrap().suspended);

    ctx.complete_job("a").await;

    assert!(ctx.runtime.calls().contains(&RuntimeCall::Resume { id: id_b }));
    assert!(!ctx.entry("b").await.unwrap().suspended);
}

#[tokio::test]
async fn suspend_dependants_disabled_leaves_them_running() {
    let ctx = setup_with(CoordinatorConfig {
        suspend_dependants: false,
        graph: graph(&[("b", &["a"])]),
        ..Default::default()
    });
    ctx.coordinator.services_add(&q("b"), vec![cfg("cb")]).await.unwrap();
    ctx.coordinator.services_add(&q("a"), vec![cfg("ca")]).await.unwrap();

    assert!(!ctx.runtime.calls().iter().any(|c| matches!(c, RuntimeCall::Suspend { .. })));
    assert!(!ctx.entry("b").await.unwrap().suspended);
}

#[tokio::test]
async fn failed_queue_creation_resumes_paused_dependants() {
    let ctx = setup_with(CoordinatorConfig { graph: graph(&[("b", &["a"])]), ..Default::default() });
    ctx.coordinator.services_add(&q("b"), vec![cfg("cb")]).await.unwrap();
    ctx.runtime.fail_adds(1);

    let result = ctx.coordinator.services_add(&q("a"), vec![cfg("ca")]).await;

    assert!(result.is_err());
    let id_b = FakeRuntime::nth_id(0);
    assert!(ctx.runtime.calls().contains(&RuntimeCall::Resume { id: id_b }));
    assert!(!ctx.entry("b").await.unwrap().suspended);
}

#[tokio::test]
async fn terminated_queue_holds_while_dependencies_have_work() {
    let ctx = setup_with(CoordinatorConfig { graph: graph(&[("b", &["a"])]), ..Default::default() });
    ctx.coordinator.services_add(&q("b"), vec![cfg("cb1"), cfg("cb2")]).await.unwrap();
    ctx.coordinator.services_add(&q("a"), vec![cfg("ca")]).await.unwrap();
    let id_b = FakeRuntime::nth_id(0);

    // b's paused job terminates while a still has work: b must hold, not
    // advance.
    ctx.terminate_before("b", TerminateReason::Shutdown, 100).await;
    ctx.runtime.set_gone(&id_b);
    ctx.tick(500).await;

    let entry = ctx.entry("b").await.unwrap();
    assert!(entry.suspended);
    assert_eq!(entry.service_id, None);
    assert_eq!(entry.pending, 1);

    ctx.complete_job("a").await;

    let entry = ctx.entry("b").await.unwrap();
    assert!(!entry.suspended);
    assert_eq!(entry.pending, 0);
    assert_eq!(ctx.runtime.added_runs(), vec!["cb1", "ca", "cb2"]);
}

// ── Cascade edge cases ───────────────────────────────────────────────────────

#[tokio::test]
async fn mid_queue_start_failure_erases_and_cascades() {
    let ctx = setup_with(CoordinatorConfig { graph: graph(&[("b", &["a"])]), ..Default::default() });
    ctx.coordinator.services_add(&q("a"), vec![cfg("ca1"), cfg("ca2")]).await.unwrap();
    ctx.coordinator.services_add(&q("b"), vec![cfg("cb")]).await.unwrap();

    ctx.init_after("a", 100).await;
    ctx.terminate_before("a", TerminateReason::Shutdown, 100).await;
    ctx.runtime.set_gone(&FakeRuntime::nth_id(0));
    ctx.runtime.fail_adds(1);
    ctx.tick(500).await;

    // ca2 failed to start, so a is erased and b advances in its place.
    assert!(ctx.entry("a").await.is_none());
    let entry = ctx.entry("b").await.unwrap();
    assert!(!entry.suspended);
    assert!(entry.service_id.is_some());
}

#[tokio::test]
async fn vanished_paused_dependant_advances_past_its_job() {
    let ctx = setup_with(CoordinatorConfig { graph: graph(&[("b", &["a"])]), ..Default::default() });
    ctx.coordinator.services_add(&q("b"), vec![cfg("cb1"), cfg("cb2")]).await.unwrap();
    ctx.coordinator.services_add(&q("a"), vec![cfg("ca")]).await.unwrap();

    // b's paused job dies silently while suspended.
    ctx.runtime.set_gone(&FakeRuntime::nth_id(0));
    ctx.complete_job("a").await;

    let entry = ctx.entry("b").await.unwrap();
    assert!(!entry.suspended);
    assert_eq!(entry.service_id, Some(FakeRuntime::nth_id(2)));
    assert_eq!(entry.pending, 0);
}

#[tokio::test]
async fn vanished_paused_dependant_without_pending_is_erased() {
    let ctx = setup_with(CoordinatorConfig { graph: graph(&[("b", &["a"])]), ..Default::default() });
    ctx.coordinator.services_add(&q("b"), vec![cfg("cb")]).await.unwrap();
    ctx.coordinator.services_add(&q("a"), vec![cfg("ca")]).await.unwrap();

    ctx.runtime.set_gone(&FakeRuntime::nth_id(0));
    ctx.complete_job("a").await;

    assert!(ctx.coordinator.status().await.is_empty());
}

// ── Stop when done ───────────────────────────────────────────────────────────

#[tokio::test]
async fn stop_when_done_signals_after_the_last_queue_drains() {
    let ctx = setup_with(CoordinatorConfig { stop_when_done: true, ..Default::default() });
    ctx.coordinator.seed(vec![(q("a"), vec![cfg("c1")])]).await;

    assert!(
        tokio::time::timeout(Duration::from_millis(10), ctx.shutdown.notified()).await.is_err(),
        "must not stop while work remains"
    );

    ctx.complete_job("a").await;

    assert!(
        tokio::time::timeout(Duration::from_millis(10), ctx.shutdown.notified()).await.is_ok()
    );
}

#[tokio::test]
async fn stop_when_done_with_empty_seed_signals_immediately() {
    let ctx = setup_with(CoordinatorConfig { stop_when_done: true, ..Default::default() });
    ctx.coordinator.seed(vec![]).await;

    assert!(
        tokio::time::timeout(Duration::from_millis(10), ctx.shutdown.notified()).await.is_ok()
    );
}

// ── Stray events ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn events_for_unknown_queues_are_dropped() {
    let ctx = setup();

    ctx.init_after("ghost", 100).await;
    ctx.terminate_before("ghost", TerminateReason::Shutdown, 100).await;

    assert!(ctx.coordinator.status().await.is_empty());
    assert!(ctx.runtime.calls().is_empty());
}
