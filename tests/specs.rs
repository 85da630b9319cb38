// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace-level specs: drive the built binaries end to end.

use assert_cmd::Command;
use serial_test::serial;
use std::path::Path;
use std::time::{Duration, Instant};

fn write_config(dir: &Path, text: &str) -> std::path::PathBuf {
    let path = dir.join("bq.toml");
    std::fs::write(&path, text).unwrap();
    path
}

#[test]
fn rejects_cyclic_dependency_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        r#"
        [dependencies]
        a = ["b"]
        b = ["a"]
        "#,
    );

    Command::cargo_bin("bqd")
        .unwrap()
        .arg(&config)
        .timeout(Duration::from_secs(30))
        .assert()
        .failure()
        .stderr(predicates::str::contains("dependency cycle"));
}

#[test]
fn rejects_static_queues_without_stop_when_done() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "[scheduler]\nqueues_static = true\n");

    Command::cargo_bin("bqd")
        .unwrap()
        .arg(&config)
        .timeout(Duration::from_secs(30))
        .assert()
        .failure()
        .stderr(predicates::str::contains("stop_when_done"));
}

#[test]
#[serial]
fn static_seed_runs_to_clean_exit() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        r#"
        [scheduler]
        queues_static = true
        stop_when_done = true

        [[queue]]
        name = "a"

        [[queue.service]]
        run = "true"
        timeout_init_ms = 100
        timeout_terminate_ms = 100
        "#,
    );

    Command::cargo_bin("bqd")
        .unwrap()
        .arg(&config)
        .timeout(Duration::from_secs(30))
        .assert()
        .success();
}

#[test]
#[serial]
fn dependant_queue_runs_after_its_dependency_drains() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("order.log");
    let config = write_config(
        dir.path(),
        &format!(
            r#"
            [scheduler]
            queues_static = true
            stop_when_done = true

            [[queue]]
            name = "a"

            [[queue.service]]
            run = "echo a >> {out}"
            timeout_init_ms = 100
            timeout_terminate_ms = 100

            [[queue]]
            name = "b"

            [[queue.service]]
            run = "echo b >> {out}"
            timeout_init_ms = 100
            timeout_terminate_ms = 100

            [dependencies]
            b = ["a"]
            "#,
            out = out.display()
        ),
    );

    Command::cargo_bin("bqd")
        .unwrap()
        .arg(&config)
        .timeout(Duration::from_secs(30))
        .assert()
        .success();

    assert_eq!(std::fs::read_to_string(&out).unwrap(), "a\nb\n");
}

#[test]
#[serial]
fn socket_surface_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("bqd.sock");
    let config = write_config(
        dir.path(),
        &format!("[scheduler]\nsocket_path = \"{}\"\n", socket.display()),
    );

    let mut daemon = std::process::Command::new(assert_cmd::cargo::cargo_bin("bqd"))
        .arg(&config)
        .spawn()
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    while !socket.exists() {
        assert!(Instant::now() < deadline, "socket never appeared");
        std::thread::sleep(Duration::from_millis(50));
    }
    let socket_arg = socket.to_str().unwrap();

    Command::cargo_bin("bq")
        .unwrap()
        .args(["--socket", socket_arg, "ping"])
        .timeout(Duration::from_secs(10))
        .assert()
        .success()
        .stdout("pong\n");

    Command::cargo_bin("bq")
        .unwrap()
        .args(["--socket", socket_arg, "services-add", "builds"])
        .write_stdin(r#"[{"run": "sleep 5"}, {"run": "true"}]"#)
        .timeout(Duration::from_secs(10))
        .assert()
        .success()
        .stdout("1\n");

    Command::cargo_bin("bq")
        .unwrap()
        .args(["--socket", socket_arg, "queue", "builds"])
        .timeout(Duration::from_secs(10))
        .assert()
        .success()
        .stdout(predicates::str::contains("true"));

    Command::cargo_bin("bq")
        .unwrap()
        .args(["--socket", socket_arg, "shutdown"])
        .timeout(Duration::from_secs(10))
        .assert()
        .success();

    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        match daemon.try_wait().unwrap() {
            Some(status) => {
                assert!(status.success(), "daemon exited with {status}");
                break;
            }
            None if Instant::now() > deadline => {
                let _ = daemon.kill();
                panic!("daemon did not exit after shutdown request");
            }
            None => std::thread::sleep(Duration::from_millis(50)),
        }
    }
}
