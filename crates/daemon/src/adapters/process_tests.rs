// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use bq_core::QueueName;
use std::time::Duration;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(10);

fn decorated(run: &str) -> ServiceSpec {
    let mut spec = ServiceSpec {
        kind: ServiceKind::Internal,
        name: String::new(),
        run: run.to_string(),
        args: Vec::new(),
        env: Vec::new(),
        options: Default::default(),
    };
    spec.options.timeout_init_ms = 100;
    spec.options.timeout_terminate_ms = 100;
    spec.decorate(&QueueName::new("q").unwrap());
    spec
}

async fn recv(rx: &mut mpsc::Receiver<Event>) -> Event {
    timeout(WAIT, rx.recv()).await.expect("timed out waiting for event").expect("channel closed")
}

async fn wait_gone(runtime: &ProcessRuntime, id: &ServiceId) {
    timeout(WAIT, async {
        while runtime.probe(id).await.is_ok() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("service never disappeared");
}

#[tokio::test]
async fn clean_exit_fires_init_then_shutdown_terminate() {
    let (tx, mut rx) = mpsc::channel(16);
    let runtime = ProcessRuntime::new(tx);

    let id = runtime.add(&decorated("true")).await.unwrap();

    let init = recv(&mut rx).await;
    assert!(matches!(init, Event::ServiceInit { timeout_init_ms: 100, .. }), "got {init:?}");

    let terminate = recv(&mut rx).await;
    match terminate {
        Event::ServiceTerminate { reason, timeout_terminate_ms, .. } => {
            assert_eq!(reason, TerminateReason::Shutdown);
            assert_eq!(timeout_terminate_ms, 100);
        }
        other => panic!("expected terminate event, got {other:?}"),
    }

    wait_gone(&runtime, &id).await;
}

#[tokio::test]
async fn nonzero_exit_reports_error_reason() {
    let (tx, mut rx) = mpsc::channel(16);
    let runtime = ProcessRuntime::new(tx);

    runtime.add(&decorated("exit 3")).await.unwrap();
    let _init = recv(&mut rx).await;

    match recv(&mut rx).await {
        Event::ServiceTerminate { reason: TerminateReason::Error(detail), .. } => {
            assert!(detail.contains('3'), "detail: {detail}");
        }
        other => panic!("expected error terminate, got {other:?}"),
    }
}

#[tokio::test]
async fn remove_classifies_exit_as_clean() {
    let (tx, mut rx) = mpsc::channel(16);
    let runtime = ProcessRuntime::new(tx);

    let id = runtime.add(&decorated("sleep 30")).await.unwrap();
    let _init = recv(&mut rx).await;

    runtime.remove(&id).await.unwrap();

    match recv(&mut rx).await {
        Event::ServiceTerminate { reason, .. } => assert!(reason.is_clean(), "reason: {reason}"),
        other => panic!("expected terminate event, got {other:?}"),
    }
    wait_gone(&runtime, &id).await;
}

#[tokio::test]
async fn add_rejects_missing_executable() {
    let (tx, _rx) = mpsc::channel(16);
    let runtime = ProcessRuntime::new(tx);

    let mut spec = decorated("/nonexistent/bq-test-binary");
    spec.kind = ServiceKind::External;

    assert!(matches!(runtime.add(&spec).await, Err(RuntimeApiError::Start(_))));
}

#[tokio::test]
async fn signals_on_unknown_id_report_not_found() {
    let (tx, _rx) = mpsc::channel(16);
    let runtime = ProcessRuntime::new(tx);
    let id = ServiceId::from_string("svc-missing");

    assert!(matches!(runtime.suspend(&id).await, Err(RuntimeApiError::ServiceNotFound)));
    assert!(matches!(runtime.resume(&id).await, Err(RuntimeApiError::ServiceNotFound)));
    assert!(matches!(runtime.probe(&id).await, Err(RuntimeApiError::ServiceNotFound)));
}
