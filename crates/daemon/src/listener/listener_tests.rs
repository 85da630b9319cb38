// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request dispatch tests against a fake runtime.

use super::*;
use crate::adapters::FakeRuntime;
use crate::engine::test_helpers::{cfg, setup};
use bq_core::FakeClock;
use std::time::Duration;

fn listen_ctx() -> (ListenCtx<FakeRuntime, FakeClock>, FakeRuntime) {
    let engine = setup();
    let runtime = engine.runtime.clone();
    let ctx = ListenCtx {
        coordinator: Arc::new(engine.coordinator),
        shutdown: engine.shutdown,
        start_time: Instant::now(),
    };
    (ctx, runtime)
}

fn add_request(queue: &str, runs: &[&str]) -> Request {
    Request::ServicesAdd {
        queue: queue.to_string(),
        configs: runs.iter().map(|run| ServiceConfig::Spec(cfg(run))).collect(),
    }
}

#[tokio::test]
async fn ping_pongs() {
    let (ctx, _) = listen_ctx();
    assert_eq!(handle_request(&ctx, Request::Ping).await, Response::Pong);
}

#[tokio::test]
async fn shutdown_responds_before_signalling_the_engine_loop() {
    let (ctx, _) = listen_ctx();
    assert_eq!(handle_request(&ctx, Request::Shutdown).await, Response::ShuttingDown);

    // The notify comes from the connection handler, after the response is
    // written.
    let (client, server) = tokio::io::duplex(1024);
    let (server_read, server_write) = tokio::io::split(server);
    let (mut client_read, mut client_write) = tokio::io::split(client);

    let payload = bq_wire::encode(&Request::Shutdown).unwrap();
    bq_wire::write_message(&mut client_write, &payload).await.unwrap();

    handle_connection(server_read, server_write, &ctx).await.unwrap();

    let bytes = bq_wire::read_message(&mut client_read).await.unwrap();
    let response: Response = bq_wire::decode(&bytes).unwrap();
    assert_eq!(response, Response::ShuttingDown);
    assert!(
        tokio::time::timeout(Duration::from_millis(10), ctx.shutdown.notified()).await.is_ok()
    );
}

#[tokio::test]
async fn add_then_list_round_trips() {
    let (ctx, runtime) = listen_ctx();

    let response = handle_request(&ctx, add_request("a", &["c1", "c2"])).await;
    assert_eq!(response, Response::Count { count: 1 });
    assert_eq!(runtime.added_runs(), vec!["c1"]);

    let response = handle_request(&ctx, Request::QueueList { queue: "a".into() }).await;
    let Response::Queue { configs } = response else { panic!("expected queue listing") };
    assert_eq!(configs.len(), 1);
    assert_eq!(configs[0].run, "c2");
}

#[tokio::test]
async fn command_errors_carry_the_wire_reason() {
    let (ctx, _) = listen_ctx();

    let response = handle_request(&ctx, Request::QueueList { queue: "ghost".into() }).await;
    assert_eq!(response, Response::Error { message: "not_found".into() });

    let response = handle_request(&ctx, Request::ServicesRestart { queue: "ghost".into() }).await;
    assert_eq!(response, Response::Error { message: "not_found".into() });
}

#[tokio::test]
async fn invalid_queue_names_are_rejected_at_the_surface() {
    let (ctx, runtime) = listen_ctx();

    let response = handle_request(&ctx, add_request("bad*", &["c1"])).await;
    assert!(matches!(response, Response::Error { .. }));
    assert!(runtime.calls().is_empty());
}

#[tokio::test]
async fn empty_service_lists_are_rejected_at_the_surface() {
    let (ctx, runtime) = listen_ctx();

    let response = handle_request(&ctx, add_request("a", &[])).await;
    assert_eq!(response, Response::Error { message: "empty service list".into() });
    assert!(runtime.calls().is_empty());
}

#[tokio::test]
async fn status_reports_queue_state() {
    let (ctx, _) = listen_ctx();
    handle_request(&ctx, add_request("a", &["c1", "c2"])).await;

    let Response::Status { queues, .. } = handle_request(&ctx, Request::Status).await else {
        panic!("expected status");
    };
    assert_eq!(queues.len(), 1);
    assert_eq!(queues[0].name, "a");
    assert_eq!(queues[0].pending, 1);
    assert_eq!(queues[0].service_id.as_deref(), Some(FakeRuntime::nth_id(0).as_str()));
    assert!(!queues[0].suspended);
}

// ── Routed form ──────────────────────────────────────────────────────────────

async fn route(ctx: &ListenCtx<FakeRuntime, FakeClock>, suffix: &str, body: &str) -> Response {
    handle_request(
        ctx,
        Request::Route { suffix: suffix.to_string(), verb: None, body: body.to_string() },
    )
    .await
}

#[tokio::test]
async fn routed_json_add_and_list() {
    let (ctx, runtime) = listen_ctx();

    let response =
        route(&ctx, "batch/a/services_add.json/post", r#"[{"run": "c1"}, {"run": "c2"}]"#).await;
    assert_eq!(
        response,
        Response::Routed {
            content_type: "application/json".into(),
            body: r#"{"count":1,"success":true}"#.into(),
        }
    );
    assert_eq!(runtime.added_runs(), vec!["c1"]);

    let Response::Routed { body, .. } = route(&ctx, "batch/a/queue.json", "").await else {
        panic!("expected routed response");
    };
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["success"], true);
    assert_eq!(value["queue"][0]["run"], "c2");
}

#[tokio::test]
async fn routed_erl_add_and_list() {
    let (ctx, runtime) = listen_ctx();

    let response =
        route(&ctx, "batch/a/services_add.erl/post", r#"[[{run,"c1"}],[{run,"c2"}]]"#).await;
    assert_eq!(
        response,
        Response::Routed { content_type: "text/plain".into(), body: "{ok,1}".into() }
    );
    assert_eq!(runtime.added_runs(), vec!["c1"]);

    let Response::Routed { body, .. } = route(&ctx, "batch/a/queue.erl", "").await else {
        panic!("expected routed response");
    };
    assert!(body.starts_with("[["), "body: {body}");
    assert!(body.contains("{run,\"c2\"}"), "body: {body}");
}

#[tokio::test]
async fn routed_errors_encode_per_format() {
    let (ctx, _) = listen_ctx();

    let Response::Routed { body, .. } = route(&ctx, "batch/ghost/queue.erl", "").await else {
        panic!("expected routed response");
    };
    assert_eq!(body, "{error,not_found}");

    let Response::Routed { body, .. } = route(&ctx, "batch/ghost/queue.json", "").await else {
        panic!("expected routed response");
    };
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["success"], false);
    assert_eq!(value["error"], "not_found");
}

#[tokio::test]
async fn routed_parse_failures_are_plain_errors() {
    let (ctx, _) = listen_ctx();

    let response = route(&ctx, "batch/a/services_restart.json/post", "").await;
    assert!(matches!(response, Response::Error { .. }), "got {response:?}");
}
