// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::adapters::{FakeRuntime, RuntimeCall};
use crate::engine::test_helpers::{cfg, q, setup};
use bq_core::{Event, TerminateReason, TimerId};

fn probe_count(runtime: &FakeRuntime) -> usize {
    runtime.calls().iter().filter(|c| matches!(c, RuntimeCall::Probe { .. })).count()
}

#[tokio::test]
async fn long_budget_rechecks_every_tick_until_the_job_disappears() {
    let ctx = setup();
    ctx.coordinator.services_add(&q("a"), vec![cfg("c1")]).await.unwrap();

    ctx.init_after("a", 1000).await;
    ctx.terminate_before("a", TerminateReason::Shutdown, 1000).await;
    assert!(ctx.entry("a").await.unwrap().terminating);

    // Nothing due before the first tick.
    ctx.tick(499).await;
    assert_eq!(probe_count(&ctx.runtime), 0);

    // First tick: still alive, reschedules.
    ctx.tick(1).await;
    assert_eq!(probe_count(&ctx.runtime), 1);
    assert!(ctx.entry("a").await.unwrap().terminating);

    // Job disappears; the next tick confirms and the queue drains away.
    ctx.runtime.set_gone(&FakeRuntime::nth_id(0));
    ctx.tick(500).await;
    assert_eq!(probe_count(&ctx.runtime), 2);
    assert!(ctx.entry("a").await.is_none());
}

#[tokio::test]
async fn exhausted_budget_terminates_a_job_that_never_disappears() {
    let ctx = setup();
    ctx.coordinator.services_add(&q("a"), vec![cfg("c1"), cfg("c2")]).await.unwrap();

    // Budget 500 + 100 + 100 = 700: one tick at 500, final at 200 more.
    ctx.init_after("a", 100).await;
    ctx.terminate_before("a", TerminateReason::Shutdown, 500).await;

    ctx.tick(500).await;
    assert!(ctx.entry("a").await.unwrap().terminating);

    ctx.tick(200).await;
    let entry = ctx.entry("a").await.unwrap();
    assert!(!entry.terminating);
    assert_eq!(entry.service_id, Some(FakeRuntime::nth_id(1)));
    assert_eq!(ctx.runtime.added_runs(), vec!["c1", "c2"]);
}

#[tokio::test]
async fn small_budget_skips_the_recheck_entirely() {
    let ctx = setup();
    ctx.coordinator.services_add(&q("a"), vec![cfg("c1")]).await.unwrap();

    // Budget 100 + 100 + 100 = 300 ≤ 500: straight to the final timer.
    ctx.init_after("a", 100).await;
    ctx.terminate_before("a", TerminateReason::Shutdown, 100).await;

    ctx.tick(299).await;
    assert!(ctx.entry("a").await.unwrap().terminating);

    ctx.tick(1).await;
    assert!(ctx.entry("a").await.is_none());
    assert_eq!(probe_count(&ctx.runtime), 0);
}

#[tokio::test]
async fn reinit_cancels_the_pending_wait() {
    let ctx = setup();
    ctx.coordinator.services_add(&q("a"), vec![cfg("c1"), cfg("c2")]).await.unwrap();

    ctx.init_after("a", 1000).await;
    ctx.terminate_before("a", TerminateReason::Shutdown, 1000).await;

    // The job comes back up (a restart) before the first tick.
    ctx.init_after("a", 1000).await;
    assert!(!ctx.entry("a").await.unwrap().terminating);

    // No timer left to fire; the queue never advances on its own.
    ctx.tick(5000).await;
    assert_eq!(ctx.runtime.added_runs(), vec!["c1"]);
    assert_eq!(ctx.entry("a").await.unwrap().service_id, Some(FakeRuntime::nth_id(0)));
}

#[tokio::test]
async fn late_tick_after_reinit_is_silently_dropped() {
    let ctx = setup();
    ctx.coordinator.services_add(&q("a"), vec![cfg("c1"), cfg("c2")]).await.unwrap();

    ctx.init_after("a", 1000).await;
    ctx.terminate_before("a", TerminateReason::Shutdown, 1000).await;
    ctx.init_after("a", 1000).await;

    // A tick that raced its cancellation: all identity checks fail.
    ctx.coordinator
        .handle_event(Event::TimerFired { id: TimerId::terminate_tick(&q("a")) })
        .await;

    assert_eq!(probe_count(&ctx.runtime), 0);
    let entry = ctx.entry("a").await.unwrap();
    assert!(!entry.terminating);
    assert_eq!(entry.service_id, Some(FakeRuntime::nth_id(0)));
    assert_eq!(entry.pending, 1);
}

#[tokio::test]
async fn tick_for_an_erased_queue_is_silently_dropped() {
    let ctx = setup();

    ctx.coordinator
        .handle_event(Event::TimerFired { id: TimerId::terminate_tick(&q("ghost")) })
        .await;
    ctx.coordinator
        .handle_event(Event::TimerFired { id: TimerId::terminate_final(&q("ghost")) })
        .await;

    assert!(ctx.runtime.calls().is_empty());
}

#[tokio::test]
async fn mismatched_timer_identity_is_silently_dropped() {
    let ctx = setup();
    ctx.coordinator.services_add(&q("a"), vec![cfg("c1")]).await.unwrap();

    ctx.init_after("a", 1000).await;
    ctx.terminate_before("a", TerminateReason::Shutdown, 1000).await;

    // The pending timer is the tick; a stray final for the same queue must
    // not short-circuit the wait.
    ctx.coordinator
        .handle_event(Event::TimerFired { id: TimerId::terminate_final(&q("a")) })
        .await;

    assert!(ctx.entry("a").await.unwrap().terminating);
}
