// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Socket client for the daemon protocol.

use anyhow::Context;
use bq_wire::{Request, Response};
use std::path::Path;
use tokio::net::UnixStream;

/// Send one request and read its response.
pub async fn call(socket: &Path, request: Request) -> anyhow::Result<Response> {
    let mut stream = UnixStream::connect(socket)
        .await
        .with_context(|| format!("daemon not reachable at {}", socket.display()))?;
    let payload = bq_wire::encode(&request)?;
    bq_wire::write_message(&mut stream, &payload).await?;
    let bytes = bq_wire::read_message(&mut stream).await?;
    Ok(bq_wire::decode(&bytes)?)
}
