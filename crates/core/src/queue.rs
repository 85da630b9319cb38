// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validated queue names.
//!
//! A queue name is used as an identifier in every table the coordinator
//! keeps, so it is validated once at the boundary: non-empty and free of
//! wildcard characters.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of a batch queue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QueueName(String);

/// Errors from queue name validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueNameError {
    #[error("queue name is empty")]
    Empty,

    #[error("queue name contains wildcard character: {0:?}")]
    Wildcard(String),
}

impl QueueName {
    pub fn new(name: impl Into<String>) -> Result<Self, QueueNameError> {
        let name = name.into();
        if name.is_empty() {
            return Err(QueueNameError::Empty);
        }
        if name.contains(['*', '?']) {
            return Err(QueueNameError::Wildcard(name));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QueueName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for QueueName {
    type Error = QueueNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<QueueName> for String {
    fn from(name: QueueName) -> Self {
        name.0
    }
}

impl std::borrow::Borrow<str> for QueueName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for QueueName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
