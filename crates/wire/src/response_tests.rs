// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn error_response_round_trips() {
    let response = Response::Error { message: "not_found".into() };
    let bytes = serde_json::to_vec(&response).unwrap();
    let back: Response = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(back, response);
}

#[test]
fn status_entry_omits_absent_service_id() {
    let entry = QueueStatusEntry {
        name: "builds".into(),
        pending: 3,
        service_id: None,
        suspended: true,
        terminating: false,
    };
    let json = serde_json::to_value(&entry).unwrap();
    assert!(json.get("service_id").is_none());
    assert_eq!(json["pending"], 3);
}

#[test]
fn queue_response_serializes_specs_inline() {
    let spec: ServiceSpec = serde_json::from_value(serde_json::json!({
        "run": "true",
        "timeout_init_ms": 100
    }))
    .unwrap();
    let json = serde_json::to_value(Response::Queue { configs: vec![spec] }).unwrap();
    assert_eq!(json["configs"][0]["run"], "true");
    assert_eq!(json["configs"][0]["timeout_init_ms"], 100);
}
