// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration: TOML file → validated [`Config`].
//!
//! Validation happens here, at the boundary: queue names, non-empty seed
//! lists, graph acyclicity, and the `queues_static ⇒ stop_when_done`
//! constraint. The engine never re-checks any of it.

use bq_core::{DependencyGraph, GraphError, QueueName, QueueNameError, ServiceSpec};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Validated daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Drain a queue after a non-clean termination.
    pub purge_on_error: bool,
    /// Pause running dependants when a queue starts.
    pub suspend_dependants: bool,
    /// Disable the command surface; requires `stop_when_done`.
    pub queues_static: bool,
    /// Exit cleanly when all queues drain.
    pub stop_when_done: bool,
    /// Command surface socket; defaults under the state dir.
    pub socket_path: Option<PathBuf>,
    /// Seed pairs processed at startup.
    pub seed: Vec<(QueueName, Vec<ServiceSpec>)>,
    /// Validated precedence between queues.
    pub graph: DependencyGraph,
}

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Name(#[from] QueueNameError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("seed queue {0:?} has no services")]
    EmptySeed(String),

    #[error("queues_static requires stop_when_done")]
    StaticRequiresStop,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    scheduler: RawScheduler,
    #[serde(default, rename = "queue")]
    queues: Vec<RawSeedQueue>,
    #[serde(default)]
    dependencies: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawScheduler {
    #[serde(default = "default_true")]
    purge_on_error: bool,
    #[serde(default = "default_true")]
    suspend_dependants: bool,
    #[serde(default)]
    queues_static: bool,
    #[serde(default)]
    stop_when_done: bool,
    #[serde(default)]
    socket_path: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for RawScheduler {
    fn default() -> Self {
        Self {
            purge_on_error: true,
            suspend_dependants: true,
            queues_static: false,
            stop_when_done: false,
            socket_path: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSeedQueue {
    name: String,
    #[serde(default, rename = "service")]
    services: Vec<ServiceSpec>,
}

/// Load and validate a configuration file.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    let raw: RawConfig = toml::from_str(&text)
        .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
    validate(raw)
}

fn validate(raw: RawConfig) -> Result<Config, ConfigError> {
    if raw.scheduler.queues_static && !raw.scheduler.stop_when_done {
        return Err(ConfigError::StaticRequiresStop);
    }

    let mut seed = Vec::with_capacity(raw.queues.len());
    for queue in raw.queues {
        if queue.services.is_empty() {
            return Err(ConfigError::EmptySeed(queue.name));
        }
        seed.push((QueueName::new(queue.name)?, queue.services));
    }

    let mut pairs = Vec::with_capacity(raw.dependencies.len());
    for (name, deps) in raw.dependencies {
        let name = QueueName::new(name)?;
        let deps = deps.into_iter().map(QueueName::new).collect::<Result<Vec<_>, _>>()?;
        pairs.push((name, deps));
    }

    Ok(Config {
        purge_on_error: raw.scheduler.purge_on_error,
        suspend_dependants: raw.scheduler.suspend_dependants,
        queues_static: raw.scheduler.queues_static,
        stop_when_done: raw.scheduler.stop_when_done,
        socket_path: raw.scheduler.socket_path,
        seed,
        graph: DependencyGraph::new(pairs)?,
    })
}

#[cfg(test)]
fn from_str(text: &str) -> Result<Config, ConfigError> {
    let raw: RawConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
        path: PathBuf::from("<inline>"),
        source,
    })?;
    validate(raw)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
