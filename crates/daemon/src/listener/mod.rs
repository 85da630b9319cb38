// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for the command surface.
//!
//! Accepts Unix socket connections and handles each in a spawned task:
//! one framed request in, one framed response out. Parsing only; every
//! decoded command is invoked synchronously against the coordinator.

pub(crate) mod router;

use crate::adapters::ServiceRuntime;
use crate::engine::{CommandError, Coordinator, QueueStatus};
use crate::env;
use bq_core::{Clock, QueueName, ServiceConfig, ServiceSpec};
use bq_wire::{ProtocolError, QueueStatusEntry, Request, Response};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::UnixListener;
use tokio::sync::Notify;
use tracing::{debug, error, warn};

/// Shared daemon context for request handlers.
pub struct ListenCtx<R: ServiceRuntime, C: Clock> {
    pub coordinator: Arc<Coordinator<R, C>>,
    pub shutdown: Arc<Notify>,
    pub start_time: Instant,
}

/// Listener task accepting socket connections.
pub struct Listener<R: ServiceRuntime, C: Clock> {
    unix: UnixListener,
    ctx: Arc<ListenCtx<R, C>>,
}

impl<R, C> Listener<R, C>
where
    R: ServiceRuntime,
    C: Clock + 'static,
{
    pub fn new(unix: UnixListener, ctx: Arc<ListenCtx<R, C>>) -> Self {
        Self { unix, ctx }
    }

    /// Accept loop; runs until the daemon's runtime is torn down.
    pub async fn run(self) {
        loop {
            match self.unix.accept().await {
                Ok((stream, _)) => {
                    let ctx = Arc::clone(&self.ctx);
                    tokio::spawn(async move {
                        let (reader, writer) = stream.into_split();
                        if let Err(err) = handle_connection(reader, writer, &ctx).await {
                            log_connection_error(err);
                        }
                    });
                }
                Err(err) => error!("accept error: {}", err),
            }
        }
    }
}

fn log_connection_error(err: ProtocolError) {
    match err {
        ProtocolError::ConnectionClosed => debug!("client disconnected"),
        ProtocolError::Timeout => warn!("connection timed out"),
        other => error!("connection error: {}", other),
    }
}

/// Handle a single client connection: one request, one response.
async fn handle_connection<R, C, Rd, Wr>(
    mut reader: Rd,
    mut writer: Wr,
    ctx: &ListenCtx<R, C>,
) -> Result<(), ProtocolError>
where
    R: ServiceRuntime,
    C: Clock,
    Rd: AsyncRead + Unpin,
    Wr: AsyncWrite + Unpin,
{
    let request = bq_wire::read_request(&mut reader, env::ipc_timeout()).await?;
    let is_shutdown = matches!(request, Request::Shutdown);
    let response = handle_request(ctx, request).await;
    bq_wire::write_response(&mut writer, &response).await?;
    // Signal only after the response is on the wire, so the client is not
    // cut off by the daemon exiting first.
    if is_shutdown {
        ctx.shutdown.notify_one();
    }
    Ok(())
}

/// Decode and dispatch one request against the coordinator.
pub(crate) async fn handle_request<R, C>(ctx: &ListenCtx<R, C>, request: Request) -> Response
where
    R: ServiceRuntime,
    C: Clock,
{
    match request {
        Request::Ping => Response::Pong,
        // The shutdown notify happens in `handle_connection`, after the
        // response has been written.
        Request::Shutdown => Response::ShuttingDown,
        Request::Status => {
            let queues =
                ctx.coordinator.status().await.iter().map(QueueStatusEntry::from).collect();
            Response::Status { uptime_secs: ctx.start_time.elapsed().as_secs(), queues }
        }
        Request::QueueList { queue } => {
            with_queue(&queue, |name| async move {
                match ctx.coordinator.queue_list(&name).await {
                    Ok(configs) => Response::Queue { configs },
                    Err(err) => error_response(err),
                }
            })
            .await
        }
        Request::QueueClear { queue } => {
            with_queue(&queue, |name| async move {
                done(ctx.coordinator.queue_clear(&name).await)
            })
            .await
        }
        Request::QueueSuspend { queue } => {
            with_queue(&queue, |name| async move {
                done(ctx.coordinator.queue_suspend(&name).await)
            })
            .await
        }
        Request::QueueResume { queue } => {
            with_queue(&queue, |name| async move {
                done(ctx.coordinator.queue_resume(&name).await)
            })
            .await
        }
        Request::ServicesAdd { queue, configs } => {
            let specs = match normalize_configs(configs) {
                Ok(specs) => specs,
                Err(response) => return response,
            };
            with_queue(&queue, |name| async move {
                match ctx.coordinator.services_add(&name, specs).await {
                    Ok(count) => Response::Count { count },
                    Err(err) => error_response(err),
                }
            })
            .await
        }
        Request::ServicesRemove { queue } => {
            with_queue(&queue, |name| async move {
                done(ctx.coordinator.services_remove(&name).await)
            })
            .await
        }
        Request::ServicesRestart { queue } => {
            with_queue(&queue, |name| async move {
                done(ctx.coordinator.services_restart(&name).await)
            })
            .await
        }
        Request::Route { suffix, verb, body } => {
            router::route(ctx, &suffix, verb.as_deref(), &body).await
        }
    }
}

async fn with_queue<F, Fut>(queue: &str, handler: F) -> Response
where
    F: FnOnce(QueueName) -> Fut,
    Fut: std::future::Future<Output = Response>,
{
    match QueueName::new(queue) {
        Ok(name) => handler(name).await,
        Err(err) => Response::Error { message: err.to_string() },
    }
}

fn done(result: Result<(), CommandError>) -> Response {
    match result {
        Ok(()) => Response::Ok,
        Err(err) => error_response(err),
    }
}

fn error_response(err: CommandError) -> Response {
    Response::Error { message: err.to_string() }
}

/// Resolve submitted configurations; the command surface rejects empty
/// lists and malformed shapes before the coordinator sees them.
fn normalize_configs(configs: Vec<ServiceConfig>) -> Result<Vec<ServiceSpec>, Response> {
    if configs.is_empty() {
        return Err(Response::Error { message: "empty service list".into() });
    }
    let mut specs = Vec::with_capacity(configs.len());
    for config in configs {
        match config.normalize() {
            Ok(spec) => specs.push(spec),
            Err(err) => return Err(Response::Error { message: err.to_string() }),
        }
    }
    Ok(specs)
}

impl From<&QueueStatus> for QueueStatusEntry {
    fn from(status: &QueueStatus) -> Self {
        QueueStatusEntry {
            name: status.name.to_string(),
            pending: status.pending,
            service_id: status.service_id.map(|id| id.to_string()),
            suspended: status.suspended,
            terminating: status.terminating,
        }
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
