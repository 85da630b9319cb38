// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service configurations and their lifecycle options.
//!
//! A configuration is what callers submit to a queue and what the runtime
//! adapter knows how to start. The coordinator treats it as opaque except
//! for the options slot, where it injects its two [`LifecycleHook::Notify`]
//! hooks (see [`ServiceSpec::decorate`]).

use crate::queue::QueueName;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default initialization and termination budget in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// How the runtime executes a service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    /// A shell line, run through `sh -c`.
    #[default]
    Internal,
    /// An executable invoked directly with its argument vector.
    External,
}

crate::simple_display! {
    ServiceKind {
        Internal => "internal",
        External => "external",
    }
}

/// A hook in a configuration's options slot.
///
/// `Notify` hooks are injected by the coordinator; `Command` hooks are
/// user-supplied shell lines the runtime fires at the same points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "hook", rename_all = "snake_case")]
pub enum LifecycleHook {
    /// Deliver a lifecycle event for `queue` to the coordinator.
    Notify { queue: QueueName },
    /// Run a shell line, fire-and-forget.
    Command { run: String },
}

/// The options slot of a configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceOptions {
    #[serde(default = "default_timeout_ms")]
    pub timeout_init_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub timeout_terminate_ms: u64,
    /// Hooks fired once the service finished initialization, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub init_after: Vec<LifecycleHook>,
    /// Hooks fired when the service terminates, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub terminate_before: Vec<LifecycleHook>,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            timeout_init_ms: DEFAULT_TIMEOUT_MS,
            timeout_terminate_ms: DEFAULT_TIMEOUT_MS,
            init_after: Vec::new(),
            terminate_before: Vec::new(),
        }
    }
}

/// The inline-struct shape of a configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSpec {
    #[serde(default)]
    pub kind: ServiceKind,
    /// Display name; falls back to `run` when empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub run: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<(String, String)>,
    #[serde(flatten)]
    pub options: ServiceOptions,
}

impl ServiceSpec {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.run
        } else {
            &self.name
        }
    }

    /// Inject the coordinator's lifecycle hooks for `queue`.
    ///
    /// The init hook is prepended and the terminate hook appended, so the
    /// coordinator's view of start and termination brackets whatever user
    /// hooks the configuration already carries.
    pub fn decorate(&mut self, queue: &QueueName) {
        self.options
            .init_after
            .insert(0, LifecycleHook::Notify { queue: queue.clone() });
        self.options
            .terminate_before
            .push(LifecycleHook::Notify { queue: queue.clone() });
    }
}

/// A submitted configuration, in either of its two wire shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServiceConfig {
    /// Inline struct shape.
    Spec(ServiceSpec),
    /// Key-value list shape; normalized via [`ServiceConfig::normalize`].
    Table(Vec<(String, serde_json::Value)>),
}

/// Errors from normalizing the key-value shape.
#[derive(Debug, Error)]
pub enum ConfigShapeError {
    #[error("configuration has no 'run' entry")]
    MissingRun,

    #[error("unknown configuration key: {0:?}")]
    UnknownKey(String),

    #[error("bad value for configuration key {key:?}: {source}")]
    BadValue {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ServiceConfig {
    /// Resolve either shape into a [`ServiceSpec`].
    pub fn normalize(self) -> Result<ServiceSpec, ConfigShapeError> {
        let table = match self {
            ServiceConfig::Spec(spec) => return Ok(spec),
            ServiceConfig::Table(table) => table,
        };

        let mut run = None;
        let mut spec = ServiceSpec {
            kind: ServiceKind::default(),
            name: String::new(),
            run: String::new(),
            args: Vec::new(),
            env: Vec::new(),
            options: ServiceOptions::default(),
        };

        fn take<T: serde::de::DeserializeOwned>(
            key: &str,
            value: serde_json::Value,
        ) -> Result<T, ConfigShapeError> {
            serde_json::from_value(value)
                .map_err(|source| ConfigShapeError::BadValue { key: key.to_string(), source })
        }

        for (key, value) in table {
            match key.as_str() {
                "kind" => spec.kind = take(&key, value)?,
                "name" => spec.name = take(&key, value)?,
                "run" => run = Some(take::<String>(&key, value)?),
                "args" => spec.args = take(&key, value)?,
                "env" => spec.env = take(&key, value)?,
                "timeout_init_ms" => spec.options.timeout_init_ms = take(&key, value)?,
                "timeout_terminate_ms" => spec.options.timeout_terminate_ms = take(&key, value)?,
                "init_after" => spec.options.init_after = take(&key, value)?,
                "terminate_before" => spec.options.terminate_before = take(&key, value)?,
                _ => return Err(ConfigShapeError::UnknownKey(key)),
            }
        }

        spec.run = run.ok_or(ConfigShapeError::MissingRun)?;
        Ok(spec)
    }
}

/// Why a service terminated, as reported by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminateReason {
    /// Ordinary shutdown.
    Shutdown,
    /// Shutdown with a detail payload; still clean.
    Tagged(String),
    /// Anything else; drives purge-on-error.
    Error(String),
}

impl TerminateReason {
    /// Clean terminations never purge the queue.
    pub fn is_clean(&self) -> bool {
        matches!(self, TerminateReason::Shutdown | TerminateReason::Tagged(_))
    }
}

impl std::fmt::Display for TerminateReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminateReason::Shutdown => f.write_str("shutdown"),
            TerminateReason::Tagged(detail) => write!(f, "shutdown: {detail}"),
            TerminateReason::Error(detail) => write!(f, "error: {detail}"),
        }
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
