// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Property tests: the canonical printed form always parses back.

use crate::term::{parse, Term};
use proptest::prelude::*;

fn atom_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z][a-z0-9_@]{0,8}",
        // Atoms that need quoting when printed
        "[A-Z ][a-zA-Z ']{0,8}",
    ]
}

fn term_strategy() -> impl Strategy<Value = Term> {
    let leaf = prop_oneof![
        atom_text().prop_map(Term::Atom),
        any::<i64>().prop_map(Term::Int),
        "[ -~]{0,12}".prop_map(Term::Str),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Term::List),
            prop::collection::vec(inner, 0..4).prop_map(Term::Tuple),
        ]
    })
}

proptest! {
    #[test]
    fn print_then_parse_is_identity(term in term_strategy()) {
        let printed = term.to_string();
        let parsed = parse(&printed);
        prop_assert_eq!(parsed.as_ref(), Ok(&term), "printed: {}", printed);
    }
}
