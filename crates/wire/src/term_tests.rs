// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    bare_atom = { "ok", Term::atom("ok") },
    underscored = { "not_found", Term::atom("not_found") },
    quoted_atom = { "'Queue A'", Term::atom("Queue A") },
    int = { "42", Term::Int(42) },
    negative_int = { "-7", Term::Int(-7) },
    float = { "1.5", Term::Float(1.5) },
    string = { "\"hello\"", Term::str("hello") },
    empty_list = { "[]", Term::list([]) },
    empty_tuple = { "{}", Term::tuple([]) },
)]
fn parses_scalars(input: &str, expected: Term) {
    assert_eq!(parse(input).unwrap(), expected);
}

#[test]
fn parses_nested_structure() {
    let term = parse("[{run,\"true\"},{timeout_init_ms,100}]").unwrap();
    assert_eq!(
        term,
        Term::list([
            Term::tuple([Term::atom("run"), Term::str("true")]),
            Term::tuple([Term::atom("timeout_init_ms"), Term::Int(100)]),
        ])
    );
}

#[test]
fn accepts_whitespace_and_trailing_full_stop() {
    let term = parse(" { ok , 3 } .\n").unwrap();
    assert_eq!(term, Term::tuple([Term::atom("ok"), Term::Int(3)]));
}

#[test]
fn parses_escapes_in_strings() {
    assert_eq!(parse(r#""a\"b\\c\nd""#).unwrap(), Term::str("a\"b\\c\nd"));
}

#[test]
fn parses_exponent_floats() {
    assert_eq!(parse("1e3").unwrap(), Term::Float(1000.0));
    assert_eq!(parse("-2.5e-1").unwrap(), Term::Float(-0.25));
}

#[parameterized(
    unclosed_list = { "[a, b" },
    unclosed_string = { "\"abc" },
    bad_separator = { "{a; b}" },
    uppercase_start = { "Ok" },
    lone_minus = { "-" },
)]
fn rejects_malformed_input(input: &str) {
    assert!(parse(input).is_err());
}

#[test]
fn rejects_trailing_garbage() {
    assert_eq!(parse("ok ok"), Err(TermError::TrailingInput(3)));
}

#[test]
fn rejects_unknown_escape() {
    assert_eq!(parse(r#""\q""#), Err(TermError::BadEscape('q')));
}

// ── Printing ─────────────────────────────────────────────────────────────────

#[parameterized(
    bare_atom = { Term::atom("ok"), "ok" },
    quoted_atom = { Term::atom("Queue A"), "'Queue A'" },
    error_tuple = {
        Term::tuple([Term::atom("error"), Term::atom("not_found")]),
        "{error,not_found}"
    },
    count_tuple = { Term::tuple([Term::atom("ok"), Term::Int(3)]), "{ok,3}" },
    string_escapes = { Term::str("a\"b\nc"), r#""a\"b\nc""# },
    nested = {
        Term::list([Term::tuple([Term::atom("run"), Term::str("true")])]),
        "[{run,\"true\"}]"
    },
    float = { Term::Float(1.5), "1.5" },
    whole_float = { Term::Float(2.0), "2.0" },
)]
fn prints_canonical_form(term: Term, expected: &str) {
    assert_eq!(term.to_string(), expected);
}

#[test]
fn printed_form_parses_back() {
    let term = Term::list([
        Term::tuple([Term::atom("kind"), Term::atom("internal")]),
        Term::tuple([Term::atom("env"), Term::list([Term::str("K=V")])]),
        Term::tuple([Term::atom("tricky name"), Term::str("quote \" here")]),
    ]);
    assert_eq!(parse(&term.to_string()).unwrap(), term);
}
