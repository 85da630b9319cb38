// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn queue(name: &str) -> QueueName {
    QueueName::new(name).unwrap()
}

#[test]
fn tick_id_round_trips() {
    let id = TimerId::terminate_tick(&queue("builds"));
    assert_eq!(id.as_str(), "terminate:builds");
    assert_eq!(id.kind(), Some(TimerKind::TerminateTick { queue: "builds" }));
    assert_eq!(id.kind().unwrap().to_timer_id(), id);
}

#[test]
fn final_id_round_trips() {
    let id = TimerId::terminate_final(&queue("ci.nightly"));
    assert_eq!(id.as_str(), "terminated:ci.nightly");
    assert_eq!(id.kind(), Some(TimerKind::TerminateFinal { queue: "ci.nightly" }));
    assert_eq!(id.kind().unwrap().to_timer_id(), id);
}

#[test]
fn unknown_format_parses_to_none() {
    assert_eq!(TimerId::new("liveness:svc-1").kind(), None);
    assert_eq!(TimerId::new("terminate").kind(), None);
}

#[test]
fn queue_names_with_colons_survive() {
    // Only the first separator is structural.
    let id = TimerId::new("terminate:a:b");
    assert_eq!(id.kind(), Some(TimerKind::TerminateTick { queue: "a:b" }));
}
