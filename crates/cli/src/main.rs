// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! bq: operator CLI for the batch scheduler daemon.

mod client;

use anyhow::{bail, Context};
use bq_core::ServiceConfig;
use bq_wire::{Request, Response};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bq", about = "Batch scheduler control", version)]
struct Cli {
    /// Daemon socket path (default: under the state dir)
    #[arg(long, global = true)]
    socket: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check the daemon is alive
    Ping,
    /// Show every queue's state
    Status,
    /// Ask the daemon to stop
    Shutdown,
    /// List a queue's pending configurations
    Queue { queue: String },
    /// Drop a queue's pending configurations
    QueueClear { queue: String },
    /// Pause a queue's running job
    QueueSuspend { queue: String },
    /// Resume a queue's paused job
    QueueResume { queue: String },
    /// Enqueue configurations from a JSON file (or stdin)
    ServicesAdd {
        queue: String,
        /// JSON array of configurations; stdin when omitted
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Stop the running job and erase the queue
    ServicesRemove { queue: String },
    /// Restart a queue's running job
    ServicesRestart { queue: String },
    /// Send a URL-suffix routed command
    Route {
        suffix: String,
        #[arg(long)]
        verb: Option<String>,
        #[arg(long, default_value = "")]
        body: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let socket = cli.socket.unwrap_or_else(bq_daemon::env::default_socket_path);

    let request = match cli.command {
        Command::Ping => Request::Ping,
        Command::Status => Request::Status,
        Command::Shutdown => Request::Shutdown,
        Command::Queue { queue } => Request::QueueList { queue },
        Command::QueueClear { queue } => Request::QueueClear { queue },
        Command::QueueSuspend { queue } => Request::QueueSuspend { queue },
        Command::QueueResume { queue } => Request::QueueResume { queue },
        Command::ServicesAdd { queue, file } => {
            Request::ServicesAdd { queue, configs: read_configs(file)? }
        }
        Command::ServicesRemove { queue } => Request::ServicesRemove { queue },
        Command::ServicesRestart { queue } => Request::ServicesRestart { queue },
        Command::Route { suffix, verb, body } => Request::Route { suffix, verb, body },
    };

    let response = client::call(&socket, request).await?;
    print_response(response)
}

fn read_configs(file: Option<PathBuf>) -> anyhow::Result<Vec<ServiceConfig>> {
    let text = match file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text).context("failed to read stdin")?;
            text
        }
    };
    serde_json::from_str(&text).context("expected a JSON array of service configurations")
}

fn print_response(response: Response) -> anyhow::Result<()> {
    match response {
        Response::Ok => println!("ok"),
        Response::Pong => println!("pong"),
        Response::ShuttingDown => println!("shutting down"),
        Response::Count { count } => println!("{count}"),
        Response::Queue { configs } => println!("{}", serde_json::to_string_pretty(&configs)?),
        Response::Status { uptime_secs, queues } => {
            println!("uptime: {uptime_secs}s");
            if queues.is_empty() {
                println!("no queues");
            }
            for queue in queues {
                let state = match (&queue.service_id, queue.suspended, queue.terminating) {
                    (_, _, true) => "terminating",
                    (_, true, _) => "suspended",
                    (Some(_), _, _) => "running",
                    (None, _, _) => "idle",
                };
                println!("{:<24} {:>8} pending  {}", queue.name, queue.pending, state);
            }
        }
        Response::Routed { body, .. } => println!("{body}"),
        Response::Error { message } => bail!(message),
    }
    Ok(())
}
