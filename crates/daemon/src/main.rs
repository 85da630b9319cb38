// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! bqd: the batch scheduler daemon binary.

use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_env("BQ_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let mut args = std::env::args().skip(1);
    let config_path = match (args.next(), args.next()) {
        (Some(path), None) if path != "--help" && path != "-h" => PathBuf::from(path),
        _ => {
            eprintln!("usage: bqd <config.toml>");
            return ExitCode::from(2);
        }
    };

    let config = match bq_daemon::config::load(&config_path) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(config = %config_path.display(), error = %err, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    match bq_daemon::lifecycle::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "daemon failed");
            ExitCode::FAILURE
        }
    }
}
