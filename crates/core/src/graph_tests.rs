// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn q(name: &str) -> QueueName {
    QueueName::new(name).unwrap()
}

fn graph(pairs: &[(&str, &[&str])]) -> Result<DependencyGraph, GraphError> {
    DependencyGraph::new(
        pairs
            .iter()
            .map(|(name, deps)| (q(name), deps.iter().map(|d| q(d)).collect()))
            .collect::<Vec<_>>(),
    )
}

#[test]
fn forward_and_reverse_indices_agree() {
    let g = graph(&[("b", &["a"]), ("c", &["a", "b"])]).unwrap();

    assert_eq!(g.depends_on(&q("b")), &[q("a")]);
    assert_eq!(g.depends_on(&q("c")), &[q("a"), q("b")]);
    assert_eq!(g.depends_on(&q("a")), &[] as &[QueueName]);

    assert_eq!(g.dependants_of(&q("a")), &[q("b"), q("c")]);
    assert_eq!(g.dependants_of(&q("b")), &[q("c")]);
    assert_eq!(g.dependants_of(&q("c")), &[] as &[QueueName]);
}

#[test]
fn duplicate_pairs_merge_without_duplicate_edges() {
    let g = graph(&[("b", &["a"]), ("b", &["a", "c"])]).unwrap();
    assert_eq!(g.depends_on(&q("b")), &[q("a"), q("c")]);
    assert_eq!(g.dependants_of(&q("a")), &[q("b")]);
}

#[test]
fn rejects_self_loop() {
    assert_eq!(graph(&[("a", &["a"])]), Err(GraphError::Cycle("a".into())));
}

#[test]
fn rejects_transitive_cycle() {
    let err = graph(&[("a", &["b"]), ("b", &["c"]), ("c", &["a"])]).unwrap_err();
    assert!(matches!(err, GraphError::Cycle(_)));
}

#[test]
fn diamond_is_acyclic() {
    // a → b → d, a → c → d
    assert!(graph(&[("b", &["a"]), ("c", &["a"]), ("d", &["b", "c"])]).is_ok());
}

#[test]
fn empty_graph_answers_queries() {
    let g = DependencyGraph::empty();
    assert!(g.depends_on(&q("anything")).is_empty());
    assert!(g.dependants_of(&q("anything")).is_empty());
}
