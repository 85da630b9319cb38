// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted runtime for coordinator tests.
//!
//! Records every call, hands out deterministic ids, and lets tests script
//! start failures and job disappearance. Lifecycle events are not emitted
//! here; tests feed them to the coordinator directly.

use super::{RuntimeApiError, ServiceRuntime};
use async_trait::async_trait;
use bq_core::{ServiceId, ServiceSpec};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// One recorded adapter call.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeCall {
    Add { run: String },
    Remove { id: ServiceId },
    Suspend { id: ServiceId },
    Resume { id: ServiceId },
    Restart { id: ServiceId },
    Probe { id: ServiceId },
}

#[derive(Default)]
struct FakeInner {
    calls: Vec<RuntimeCall>,
    added: Vec<ServiceSpec>,
    next_id: u64,
    fail_adds: usize,
    gone: HashSet<ServiceId>,
}

/// Test double for the service runtime.
#[derive(Clone, Default)]
pub struct FakeRuntime {
    inner: Arc<Mutex<FakeInner>>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id the n-th successful `add` returns (0-based).
    pub fn nth_id(n: u64) -> ServiceId {
        ServiceId::from_string(format!("svc-{n:019}"))
    }

    /// Fail the next `count` add calls.
    pub fn fail_adds(&self, count: usize) {
        self.inner.lock().fail_adds = count;
    }

    /// Make `id` report `ServiceNotFound` from every call.
    pub fn set_gone(&self, id: &ServiceId) {
        self.inner.lock().gone.insert(*id);
    }

    /// All calls recorded so far.
    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.inner.lock().calls.clone()
    }

    /// Calls recorded so far, draining the record.
    pub fn take_calls(&self) -> Vec<RuntimeCall> {
        std::mem::take(&mut self.inner.lock().calls)
    }

    /// The decorated specs passed to successful `add` calls, in order.
    pub fn added_specs(&self) -> Vec<ServiceSpec> {
        self.inner.lock().added.clone()
    }

    /// The `run` lines of successful `add` calls, in order.
    pub fn added_runs(&self) -> Vec<String> {
        self.inner.lock().added.iter().map(|spec| spec.run.clone()).collect()
    }

    fn check_known(&self, id: &ServiceId) -> Result<(), RuntimeApiError> {
        if self.inner.lock().gone.contains(id) {
            Err(RuntimeApiError::ServiceNotFound)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ServiceRuntime for FakeRuntime {
    async fn add(&self, spec: &ServiceSpec) -> Result<ServiceId, RuntimeApiError> {
        let mut inner = self.inner.lock();
        inner.calls.push(RuntimeCall::Add { run: spec.run.clone() });
        if inner.fail_adds > 0 {
            inner.fail_adds -= 1;
            return Err(RuntimeApiError::Start("scripted start failure".into()));
        }
        let id = Self::nth_id(inner.next_id);
        inner.next_id += 1;
        inner.added.push(spec.clone());
        Ok(id)
    }

    async fn remove(&self, id: &ServiceId) -> Result<(), RuntimeApiError> {
        self.inner.lock().calls.push(RuntimeCall::Remove { id: *id });
        self.check_known(id)
    }

    async fn suspend(&self, id: &ServiceId) -> Result<(), RuntimeApiError> {
        self.inner.lock().calls.push(RuntimeCall::Suspend { id: *id });
        self.check_known(id)
    }

    async fn resume(&self, id: &ServiceId) -> Result<(), RuntimeApiError> {
        self.inner.lock().calls.push(RuntimeCall::Resume { id: *id });
        self.check_known(id)
    }

    async fn restart(&self, id: &ServiceId) -> Result<(), RuntimeApiError> {
        self.inner.lock().calls.push(RuntimeCall::Restart { id: *id });
        self.check_known(id)
    }

    async fn probe(&self, id: &ServiceId) -> Result<(), RuntimeApiError> {
        self.inner.lock().calls.push(RuntimeCall::Probe { id: *id });
        self.check_known(id)
    }
}
