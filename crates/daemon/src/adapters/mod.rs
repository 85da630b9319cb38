// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime adapters: the capability the coordinator drives jobs with.

mod process;

#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use process::ProcessRuntime;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeRuntime, RuntimeCall};

use async_trait::async_trait;
use bq_core::{ServiceId, ServiceSpec};
use thiserror::Error;

/// Errors from runtime adapter calls.
///
/// Only [`RuntimeApiError::ServiceNotFound`] is handled specially by the
/// coordinator; everything else is consumed and logged at the call site.
#[derive(Debug, Error)]
pub enum RuntimeApiError {
    #[error("service not found")]
    ServiceNotFound,

    #[error("failed to start service: {0}")]
    Start(String),

    #[error("signal delivery failed: {0}")]
    Signal(String),
}

/// The service runtime as the coordinator sees it.
///
/// Calls are made from the coordinator's single-owner context and awaited
/// in order; lifecycle events flow back separately, through the hooks the
/// coordinator injects into each configuration.
#[async_trait]
pub trait ServiceRuntime: Send + Sync + 'static {
    /// Start one job; returns its runtime id.
    async fn add(&self, spec: &ServiceSpec) -> Result<ServiceId, RuntimeApiError>;

    /// Request the job to stop.
    async fn remove(&self, id: &ServiceId) -> Result<(), RuntimeApiError>;

    /// Pause the job in place.
    async fn suspend(&self, id: &ServiceId) -> Result<(), RuntimeApiError>;

    /// Undo a suspension.
    async fn resume(&self, id: &ServiceId) -> Result<(), RuntimeApiError>;

    /// Stop and start the job again under the same id.
    async fn restart(&self, id: &ServiceId) -> Result<(), RuntimeApiError>;

    /// Liveness probe: `Ok` while the job is still present in the runtime.
    async fn probe(&self, id: &ServiceId) -> Result<(), RuntimeApiError>;
}
