// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

fn q(name: &str) -> QueueName {
    QueueName::new(name).unwrap()
}

#[parameterized(
    bare = { "batch/a/queue.json", "a", Method::Queue, Format::Json },
    with_verb = { "batch/a/queue.erl/get", "a", Method::Queue, Format::Erl },
    prefixed = { "/api/v1/batch/a/services_add.json/post", "a", Method::ServicesAdd, Format::Json },
    slashed_queue = { "batch/team/builds/queue_clear.erl", "team/builds", Method::QueueClear, Format::Erl },
    dotted_queue = { "batch/ci.nightly/services_restart.json", "ci.nightly", Method::ServicesRestart, Format::Json },
    suspend = { "batch/a/queue_suspend.erl/get", "a", Method::QueueSuspend, Format::Erl },
    resume = { "batch/a/queue_resume.json", "a", Method::QueueResume, Format::Json },
    remove = { "batch/a/services_remove.erl/delete", "a", Method::ServicesRemove, Format::Erl },
)]
fn parses_valid_suffixes(suffix: &str, queue: &str, method: Method, format: Format) {
    let route = parse_suffix(suffix, None).unwrap();
    assert_eq!(route, Route { queue: q(queue), method, format });
}

#[test]
fn transport_verb_is_validated_when_suffix_has_none() {
    assert!(parse_suffix("batch/a/queue.json", Some("get")).is_ok());
    assert_eq!(
        parse_suffix("batch/a/queue.json", Some("post")),
        Err(RouteError::VerbMismatch { method: "queue", verb: "post" })
    );
}

#[parameterized(
    restart_is_get = { "batch/a/services_restart.json/post", "services_restart", "post" },
    add_is_post = { "batch/a/services_add.json/get", "services_add", "get" },
    clear_is_delete = { "batch/a/queue_clear.json/post", "queue_clear", "post" },
    remove_is_delete = { "batch/a/services_remove.erl/get", "services_remove", "get" },
)]
fn verb_mismatches_are_rejected(suffix: &str, method: &'static str, verb: &'static str) {
    assert_eq!(parse_suffix(suffix, None), Err(RouteError::VerbMismatch { method, verb }));
}

#[parameterized(
    no_batch_segment = { "queues/a/queue.json" },
    missing_queue = { "batch/queue.json" },
    missing_format = { "batch/a/queue" },
    trailing_only_verb = { "batch/get" },
)]
fn unroutable_suffixes_are_rejected(suffix: &str) {
    assert!(matches!(parse_suffix(suffix, None), Err(RouteError::Unroutable(_))));
}

#[test]
fn unknown_parts_name_the_offender() {
    assert_eq!(
        parse_suffix("batch/a/queue_drain.json", None),
        Err(RouteError::UnknownMethod("queue_drain".into()))
    );
    assert_eq!(
        parse_suffix("batch/a/queue.xml", None),
        Err(RouteError::UnknownFormat("xml".into()))
    );
    assert_eq!(
        parse_suffix("batch/a/queue.json/patch", None),
        Err(RouteError::UnknownVerb("patch".into()))
    );
}

#[test]
fn wildcard_queue_names_are_rejected() {
    assert!(matches!(parse_suffix("batch/a*/queue.json", None), Err(RouteError::Queue(_))));
}
