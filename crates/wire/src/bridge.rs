// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Term ↔ JSON value bridge.
//!
//! The routed surface decodes `erl` bodies into JSON values and feeds them
//! through the same serde types as the `json` format. The mapping is
//! shape-preserving: proplists stay arrays of pairs (so both configuration
//! shapes survive), atoms become strings except the three JSON-primitive
//! atoms, and objects going the other way become proplists with atom keys.

use crate::term::Term;
use serde_json::Value;

/// Convert a parsed term into a JSON value.
pub fn term_to_json(term: &Term) -> Value {
    match term {
        Term::Atom(s) => match s.as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "undefined" => Value::Null,
            _ => Value::String(s.clone()),
        },
        Term::Int(n) => Value::Number((*n).into()),
        Term::Float(x) => serde_json::Number::from_f64(*x).map(Value::Number).unwrap_or(Value::Null),
        Term::Str(s) => Value::String(s.clone()),
        Term::List(items) | Term::Tuple(items) => {
            Value::Array(items.iter().map(term_to_json).collect())
        }
    }
}

/// Convert a JSON value into a term for printing.
pub fn json_to_term(value: &Value) -> Term {
    match value {
        Value::Null => Term::atom("undefined"),
        Value::Bool(true) => Term::atom("true"),
        Value::Bool(false) => Term::atom("false"),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Term::Int(i),
            None => Term::Float(n.as_f64().unwrap_or(0.0)),
        },
        Value::String(s) => Term::str(s.clone()),
        Value::Array(items) => Term::List(items.iter().map(json_to_term).collect()),
        Value::Object(map) => Term::List(
            map.iter()
                .map(|(key, value)| Term::tuple([Term::atom(key.clone()), json_to_term(value)]))
                .collect(),
        ),
    }
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;
