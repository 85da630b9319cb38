// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::term::parse;
use serde_json::json;

#[test]
fn proplist_becomes_array_of_pairs() {
    let term = parse("[{run,\"true\"},{timeout_init_ms,100}]").unwrap();
    assert_eq!(term_to_json(&term), json!([["run", "true"], ["timeout_init_ms", 100]]));
}

#[test]
fn primitive_atoms_map_to_json_primitives() {
    assert_eq!(term_to_json(&parse("true").unwrap()), json!(true));
    assert_eq!(term_to_json(&parse("false").unwrap()), json!(false));
    assert_eq!(term_to_json(&parse("undefined").unwrap()), json!(null));
    assert_eq!(term_to_json(&parse("internal").unwrap()), json!("internal"));
}

#[test]
fn object_becomes_proplist() {
    let value = json!({"name": "builds", "pending": 2, "suspended": false});
    assert_eq!(
        json_to_term(&value).to_string(),
        "[{name,\"builds\"},{pending,2},{suspended,false}]"
    );
}

#[test]
fn numbers_round_trip_through_the_bridge() {
    assert_eq!(json_to_term(&json!(42)).to_string(), "42");
    assert_eq!(json_to_term(&json!(1.5)).to_string(), "1.5");
    assert_eq!(term_to_json(&parse("-7").unwrap()), json!(-7));
}
