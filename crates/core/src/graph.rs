// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Static precedence between queues.
//!
//! Built once from configuration. For each queue the forward index lists
//! the queues that must be idle before it may run; the reverse index is
//! what the coordinator walks to cascade suspend and resume. Construction
//! rejects cycles; nothing re-validates at runtime.

use crate::queue::QueueName;
use std::collections::HashMap;
use thiserror::Error;

/// Precedence relation between queues, with forward and reverse indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyGraph {
    deps: HashMap<QueueName, Vec<QueueName>>,
    dependants: HashMap<QueueName, Vec<QueueName>>,
}

/// Errors from graph construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("dependency cycle through queue {0:?}")]
    Cycle(String),
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Visiting,
    Done,
}

impl DependencyGraph {
    /// Build the graph from `(queue, [dependency])` pairs.
    ///
    /// Duplicate pairs for the same queue merge; the first back-edge found
    /// by DFS fails construction.
    pub fn new(
        pairs: impl IntoIterator<Item = (QueueName, Vec<QueueName>)>,
    ) -> Result<Self, GraphError> {
        let mut graph = Self::default();
        for (name, deps) in pairs {
            for dep in deps {
                let reverse = graph.dependants.entry(dep.clone()).or_default();
                if !reverse.contains(&name) {
                    reverse.push(name.clone());
                }
                let forward = graph.deps.entry(name.clone()).or_default();
                if !forward.contains(&dep) {
                    forward.push(dep);
                }
            }
        }

        let mut marks: HashMap<&QueueName, Mark> = HashMap::new();
        for name in graph.deps.keys() {
            graph.visit(name, &mut marks)?;
        }
        Ok(graph)
    }

    /// Graph with no precedence at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Queues that must be idle before `queue` may run.
    pub fn depends_on(&self, queue: &QueueName) -> &[QueueName] {
        self.deps.get(queue).map(Vec::as_slice).unwrap_or_default()
    }

    /// Queues whose advance is gated on `queue`.
    pub fn dependants_of(&self, queue: &QueueName) -> &[QueueName] {
        self.dependants.get(queue).map(Vec::as_slice).unwrap_or_default()
    }

    fn visit<'a>(
        &'a self,
        name: &'a QueueName,
        marks: &mut HashMap<&'a QueueName, Mark>,
    ) -> Result<(), GraphError> {
        match marks.get(name).copied() {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => return Err(GraphError::Cycle(name.as_str().to_string())),
            None => {}
        }
        marks.insert(name, Mark::Visiting);
        for dep in self.depends_on(name) {
            self.visit(dep, marks)?;
        }
        marks.insert(name, Mark::Done);
        Ok(())
    }
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
